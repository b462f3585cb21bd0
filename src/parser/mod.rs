//! Driver naming strategies.
//!
//! Each NIC driver family names its counters differently. A [`DriverParser`]
//! turns one counter name (and, for stateful formats, its value and position
//! in the sequence) into a [`ClassificationTag`].
//!
//! # Strategies
//!
//! | variant       | totals | queues | example                      |
//! |---------------|--------|--------|------------------------------|
//! | `PatternPair` | yes    | yes    | `rx_bytes`, `[3]: rx_bytes`  |
//! | `Fused`       | no     | yes    | `rx_queue_3_bytes`           |
//! | `Stateful`    | no     | yes    | `Rx Queue#` + `ucast bytes rx` |
//!
//! A strategy that lacks a capability answers "no match" for it.

pub mod drivers;
mod fused;
mod pattern;
mod stateful;

pub use fused::FusedParser;
pub use pattern::{Matched, Matcher, PatternPairParser, PatternSpec};
pub use stateful::{ParseContext, StatefulParser};

use crate::model::{ClassificationTag, Slot};

/// One parser per driver family.
#[derive(Debug, Clone)]
pub enum DriverParser {
    PatternPair(PatternPairParser),
    Fused(FusedParser),
    Stateful(StatefulParser),
}

/// Outcome of classifying a single counter name with both capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub total: Option<Slot>,
    pub queue: Option<(Slot, usize)>,
}

impl Classification {
    /// The tags this counter contributes, total first.
    pub fn tags(&self) -> impl Iterator<Item = ClassificationTag> + '_ {
        self.total
            .map(ClassificationTag::total)
            .into_iter()
            .chain(self.queue.map(|(slot, q)| ClassificationTag::queue(slot, q)))
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_none() && self.queue.is_none()
    }
}

impl DriverParser {
    /// Short name of the strategy, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            DriverParser::PatternPair(_) => "pattern-pair",
            DriverParser::Fused(_) => "fused",
            DriverParser::Stateful(_) => "stateful",
        }
    }

    /// Classifies `name` as a device-total counter.
    pub fn classify_total(&self, name: &str) -> Option<Slot> {
        match self {
            DriverParser::PatternPair(p) => p.classify_total(name),
            DriverParser::Fused(_) | DriverParser::Stateful(_) => None,
        }
    }

    /// Classifies `name` as a per-queue counter. `value` is the counter's
    /// current reading, which stateful formats use as a queue index.
    pub fn classify_queue(
        &self,
        ctx: &mut ParseContext,
        name: &str,
        value: u64,
    ) -> Option<(Slot, usize)> {
        match self {
            DriverParser::PatternPair(p) => p.classify_queue(name),
            DriverParser::Fused(p) => p.classify_queue(name),
            DriverParser::Stateful(p) => p.classify_queue(ctx, name, value),
        }
    }

    /// Runs both capabilities on one name.
    pub fn classify(&self, ctx: &mut ParseContext, name: &str, value: u64) -> Classification {
        Classification {
            total: self.classify_total(name),
            queue: self.classify_queue(ctx, name, value),
        }
    }

    /// Classifies a whole name sequence in order, threading the context.
    ///
    /// `values` supplies the reading at each position; missing readings are
    /// taken as zero.
    pub fn classify_all<S: AsRef<str>>(&self, names: &[S], values: &[u64]) -> Vec<Classification> {
        let mut ctx = ParseContext::new();
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = values.get(i).copied().unwrap_or(0);
                self.classify(&mut ctx, name.as_ref(), value)
            })
            .collect()
    }
}

impl From<PatternPairParser> for DriverParser {
    fn from(p: PatternPairParser) -> Self {
        DriverParser::PatternPair(p)
    }
}

impl From<FusedParser> for DriverParser {
    fn from(p: FusedParser) -> Self {
        DriverParser::Fused(p)
    }
}

impl From<StatefulParser> for DriverParser {
    fn from(p: StatefulParser) -> Self {
        DriverParser::Stateful(p)
    }
}
