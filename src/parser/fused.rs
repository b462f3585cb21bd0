//! Single-pattern strategy for drivers whose per-queue names share nothing
//! with their totals. Direction, queue and metric come from one match.

use crate::error::RegistryError;
use crate::model::Slot;

use super::pattern::{Matcher, PatternSpec};

#[derive(Debug, Clone)]
pub struct FusedParser {
    matcher: Matcher,
}

impl FusedParser {
    /// Builds a parser with the common direction, queue, metric group order.
    pub fn dnm(pattern: &str) -> Result<Self, RegistryError> {
        Self::new(&PatternSpec::new(pattern, 1, 3).with_queue(2))
    }

    pub fn new(spec: &PatternSpec) -> Result<Self, RegistryError> {
        let matcher = Matcher::compile(spec)?;
        let matcher = if matcher.has_queue() {
            matcher
        } else {
            Matcher::disabled()
        };
        Ok(Self { matcher })
    }

    pub fn classify_queue(&self, name: &str) -> Option<(Slot, usize)> {
        let m = self.matcher.matches(name)?;
        Some((m.slot, m.queue?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intel_style() {
        let p = FusedParser::dnm(r"(rx|tx)_queue_(\d+)_(bytes|packets)").unwrap();
        assert_eq!(p.classify_queue("rx_queue_0_bytes"), Some((Slot::RX_BYTES, 0)));
        assert_eq!(p.classify_queue("tx_queue_15_packets"), Some((Slot::TX_PACKETS, 15)));
        assert_eq!(p.classify_queue("rx_bytes"), None);
        assert_eq!(p.classify_queue("rx_queue_0_drops"), None);
    }

    #[test]
    fn test_spec_without_queue_is_disabled() {
        let p = FusedParser::new(&PatternSpec::new(r"(rx|tx)_(bytes)", 1, 2)).unwrap();
        assert_eq!(p.classify_queue("rx_bytes"), None);
    }
}
