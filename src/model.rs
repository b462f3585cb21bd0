//! Core data types shared by the parsers and the aggregator.

use std::fmt;

use crate::counter::OptCounter;

/// Traffic direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Rx,
    Tx,
}

impl Direction {
    /// Parses an already lower-cased direction token. Only exact
    /// `rx` / `tx` are accepted.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "rx" => Some(Direction::Rx),
            "tx" => Some(Direction::Tx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Rx => "RX",
            Direction::Tx => "TX",
        }
    }
}

/// What a counter measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Bytes,
    Packets,
}

impl Metric {
    /// Classifies an already lower-cased metric token. `bytes` and `octets`
    /// are synonyms; every other token (packets, frames, ucast_packets, ...)
    /// counts packets.
    pub fn from_token(token: &str) -> Self {
        match token {
            "bytes" | "octets" => Metric::Bytes,
            _ => Metric::Packets,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Bytes => "B",
            Metric::Packets => "P",
        }
    }
}

/// A (direction, metric) pair, i.e. one of the four slots of [`IfStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub direction: Direction,
    pub metric: Metric,
}

impl Slot {
    pub const TX_PACKETS: Slot = Slot::new(Direction::Tx, Metric::Packets);
    pub const RX_PACKETS: Slot = Slot::new(Direction::Rx, Metric::Packets);
    pub const TX_BYTES: Slot = Slot::new(Direction::Tx, Metric::Bytes);
    pub const RX_BYTES: Slot = Slot::new(Direction::Rx, Metric::Bytes);

    /// All slots in display order.
    pub const ALL: [Slot; 4] = [
        Slot::TX_PACKETS,
        Slot::RX_PACKETS,
        Slot::TX_BYTES,
        Slot::RX_BYTES,
    ];

    pub const fn new(direction: Direction, metric: Metric) -> Self {
        Self { direction, metric }
    }

    /// Index into the four-slot array: rx adds 1, bytes adds 2.
    pub const fn index(&self) -> usize {
        let rx = matches!(self.direction, Direction::Rx) as usize;
        let bytes = matches!(self.metric, Metric::Bytes) as usize;
        rx + 2 * bytes
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction.as_str(), self.metric.as_str())
    }
}

/// Result of classifying one counter name.
///
/// `queue == None` marks a device-total field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationTag {
    pub slot: Slot,
    pub queue: Option<usize>,
}

impl ClassificationTag {
    pub fn total(slot: Slot) -> Self {
        Self { slot, queue: None }
    }

    pub fn queue(slot: Slot, queue: usize) -> Self {
        Self {
            slot,
            queue: Some(queue),
        }
    }
}

/// Four optional counters addressed by [`Slot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IfStats {
    counts: [OptCounter; 4],
}

impl IfStats {
    pub fn get(&self, slot: Slot) -> OptCounter {
        self.counts[slot.index()]
    }

    pub fn add(&mut self, slot: Slot, delta: u64) {
        self.counts[slot.index()].add(delta);
    }

    /// Clears every slot back to unset.
    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(OptCounter::reset);
    }

    /// Returns `true` if any slot holds a value.
    pub fn any_set(&self) -> bool {
        self.counts.iter().any(OptCounter::is_set)
    }

    pub fn tx_packets(&self) -> OptCounter {
        self.get(Slot::TX_PACKETS)
    }

    pub fn rx_packets(&self) -> OptCounter {
        self.get(Slot::RX_PACKETS)
    }

    pub fn tx_bytes(&self) -> OptCounter {
        self.get(Slot::TX_BYTES)
    }

    pub fn rx_bytes(&self) -> OptCounter {
        self.get(Slot::RX_BYTES)
    }
}
