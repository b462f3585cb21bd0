//! Two-line strategy for drivers that declare a queue on one line and
//! report its counters on the following lines.
//!
//! ```text
//! Rx Queue#: 2          <- value is the queue index
//!   ucast pkts rx: 1234
//!   ucast bytes rx: 777
//! ```
//!
//! The most recent declaration is carried in a [`ParseContext`] that the
//! caller threads through the name sequence in order.

use regex::{Regex, RegexBuilder};

use crate::error::RegistryError;
use crate::model::{Direction, Metric, Slot};

/// Queue context carried between successive classification calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseContext {
    current: Option<(usize, Direction)>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue and direction applied to the next metric line, if any.
    pub fn current(&self) -> Option<(usize, Direction)> {
        self.current
    }
}

#[derive(Debug, Clone)]
pub struct StatefulParser {
    declaration: Regex,
    metric: Regex,
}

impl StatefulParser {
    /// `declaration` captures the direction in group 1; `metric` captures the
    /// metric token in group 1.
    pub fn new(declaration: &str, metric: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            declaration: build(declaration)?,
            metric: build(metric)?,
        })
    }

    /// Classifies one line, updating `ctx` on declaration lines.
    ///
    /// Declaration lines never classify themselves. A metric line seen before
    /// any declaration yields no match.
    pub fn classify_queue(
        &self,
        ctx: &mut ParseContext,
        name: &str,
        value: u64,
    ) -> Option<(Slot, usize)> {
        if let Some(caps) = self.declaration.captures(name) {
            let direction = caps
                .get(1)
                .and_then(|m| Direction::from_token(&m.as_str().to_ascii_lowercase()));
            let queue = usize::try_from(value).ok();
            ctx.current = queue.zip(direction);
            return None;
        }

        let caps = self.metric.captures(name)?;
        let (queue, direction) = ctx.current?;
        let metric = Metric::from_token(&caps.get(1)?.as_str().to_ascii_lowercase());
        Some((Slot::new(direction, metric), queue))
    }
}

fn build(pattern: &str) -> Result<Regex, RegistryError> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()
        .map_err(|source| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vmxnet3() -> StatefulParser {
        StatefulParser::new(r"(rx|tx) queue#", r"\s*[bum]cast (pkts|bytes) (?:rx|tx)").unwrap()
    }

    #[test]
    fn test_declaration_then_metric() {
        let p = vmxnet3();
        let mut ctx = ParseContext::new();
        assert_eq!(p.classify_queue(&mut ctx, "Rx Queue#", 2), None);
        assert_eq!(ctx.current(), Some((2, Direction::Rx)));
        assert_eq!(
            p.classify_queue(&mut ctx, "ucast bytes rx", 777),
            Some((Slot::RX_BYTES, 2))
        );
        assert_eq!(
            p.classify_queue(&mut ctx, "  mcast pkts rx", 5),
            Some((Slot::RX_PACKETS, 2))
        );
    }

    #[test]
    fn test_metric_before_declaration() {
        let p = vmxnet3();
        let mut ctx = ParseContext::new();
        assert_eq!(p.classify_queue(&mut ctx, "ucast bytes rx", 777), None);
    }

    #[test]
    fn test_context_carries_until_overwritten() {
        let p = vmxnet3();
        let mut ctx = ParseContext::new();
        p.classify_queue(&mut ctx, "Tx Queue#", 0);
        assert_eq!(p.classify_queue(&mut ctx, "TSO pkts tx", 1), None);
        assert_eq!(
            p.classify_queue(&mut ctx, "bcast bytes tx", 9),
            Some((Slot::TX_BYTES, 0))
        );
        p.classify_queue(&mut ctx, "Rx Queue#", 1);
        assert_eq!(
            p.classify_queue(&mut ctx, "ucast pkts rx", 9),
            Some((Slot::RX_PACKETS, 1))
        );
    }

    #[test]
    fn test_direction_comes_from_declaration() {
        let p = vmxnet3();
        let mut ctx = ParseContext::new();
        p.classify_queue(&mut ctx, "Tx Queue#", 3);
        // the trailing token on the metric line is not consulted
        assert_eq!(
            p.classify_queue(&mut ctx, "ucast bytes rx", 1),
            Some((Slot::TX_BYTES, 3))
        );
    }
}
