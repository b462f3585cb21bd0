//! Counter aggregation.
//!
//! An [`IndexMap`] is built once from the counter names and tells which
//! snapshot positions feed which slot. A [`StatsAggregator`] applies that map
//! to successive snapshots, turning monotonic counters into per-interval
//! deltas for every queue and for the device as a whole.

use tracing::{trace, warn};

use crate::error::SnapshotLenError;
use crate::model::{IfStats, Slot};
use crate::parser::{DriverParser, ParseContext};

/// Highest queue index accepted when building a map. Counters naming a
/// queue past it are dropped.
pub const MAX_QUEUE_INDEX: usize = 4095;

/// Whether a per-queue counter reading zero when the map is built is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueZeroPolicy {
    /// Keep every classified queue counter.
    #[default]
    Include,
    /// Drop queue counters that read zero at build time, treating the queue
    /// as not yet active.
    SkipZero,
}

/// Snapshot position to slot mapping. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMap {
    totals: Vec<(usize, Slot)>,
    queues: Vec<(usize, usize, Slot)>,
    queue_count: usize,
}

impl IndexMap {
    /// Classifies every name in one ordered pass.
    ///
    /// `values` is the snapshot taken alongside the names; stateful parsers
    /// read queue indices from it, and [`QueueZeroPolicy::SkipZero`] checks it.
    pub fn build<S: AsRef<str>>(
        parser: &DriverParser,
        names: &[S],
        values: &[u64],
        policy: QueueZeroPolicy,
    ) -> Self {
        let mut map = Self::default();
        let mut ctx = ParseContext::new();

        for (pos, name) in names.iter().enumerate() {
            let name = name.as_ref();
            let value = values.get(pos).copied().unwrap_or(0);
            let class = parser.classify(&mut ctx, name, value);

            if let Some(slot) = class.total {
                map.totals.push((pos, slot));
            }

            if let Some((slot, queue)) = class.queue {
                if queue > MAX_QUEUE_INDEX {
                    warn!("ignoring counter {:?}: queue index {} out of range", name, queue);
                    continue;
                }
                if policy == QueueZeroPolicy::SkipZero && value == 0 {
                    trace!("skipping idle queue counter {:?} (queue {})", name, queue);
                    continue;
                }
                map.queues.push((pos, queue, slot));
                map.queue_count = map.queue_count.max(queue + 1);
            }
        }

        map
    }

    /// `true` if no position was classified at all.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty() && self.queues.is_empty()
    }

    /// `max(queue) + 1` over all mapped queue counters.
    pub fn queue_count(&self) -> usize {
        self.queue_count
    }

    /// Positions holding device totals.
    pub fn totals(&self) -> &[(usize, Slot)] {
        &self.totals
    }

    /// Positions holding per-queue counters, as `(position, queue, slot)`.
    pub fn queues(&self) -> &[(usize, usize, Slot)] {
        &self.queues
    }

    /// Whether device totals are synthesized from the queues.
    pub fn synthesizes_total(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Per-interval statistics for one device.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    map: IndexMap,
    baseline: Vec<u64>,
    total: IfStats,
    queues: Vec<IfStats>,
}

impl StatsAggregator {
    /// Creates an aggregator. `baseline` is the snapshot the first update is
    /// measured against.
    pub fn new(map: IndexMap, baseline: Vec<u64>) -> Self {
        let queues = vec![IfStats::default(); map.queue_count()];
        Self {
            map,
            baseline,
            total: IfStats::default(),
            queues,
        }
    }

    /// Replaces the statistics with the deltas between the baseline and
    /// `current`, then makes `current` the new baseline.
    ///
    /// A counter that went backwards is taken as a device reset and
    /// contributes zero.
    pub fn update(&mut self, current: Vec<u64>) -> Result<(), SnapshotLenError> {
        if current.len() != self.baseline.len() {
            return Err(SnapshotLenError {
                expected: self.baseline.len(),
                actual: current.len(),
            });
        }

        self.total.reset();
        self.queues.iter_mut().for_each(IfStats::reset);

        for &(pos, slot) in &self.map.totals {
            let d = delta(self.baseline[pos], current[pos], pos);
            self.total.add(slot, d);
        }

        let synthesize = self.map.synthesizes_total();
        for &(pos, queue, slot) in &self.map.queues {
            let d = delta(self.baseline[pos], current[pos], pos);
            self.queues[queue].add(slot, d);
            if synthesize {
                self.total.add(slot, d);
            }
        }

        self.baseline = current;
        Ok(())
    }

    pub fn map(&self) -> &IndexMap {
        &self.map
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Statistics for queue `index`, or `None` past the last queue.
    pub fn queue_stats(&self, index: usize) -> Option<&IfStats> {
        self.queues.get(index)
    }

    /// Statistics for every queue, indexed by queue number.
    pub fn queues(&self) -> &[IfStats] {
        &self.queues
    }

    pub fn total_stats(&self) -> &IfStats {
        &self.total
    }

    /// The snapshot the next update is measured against.
    pub fn baseline(&self) -> &[u64] {
        &self.baseline
    }
}

fn delta(prev: u64, current: u64, pos: usize) -> u64 {
    match current.checked_sub(prev) {
        Some(d) => d,
        None => {
            trace!("counter {} reset: {} -> {}", pos, prev, current);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::drivers;
    use crate::parser::{FusedParser, PatternPairParser, PatternSpec};
    use crate::registry::ParserRegistry;

    fn generic() -> DriverParser {
        drivers::generic().unwrap()
    }

    fn queue_only() -> DriverParser {
        PatternPairParser::new(
            None,
            Some(&PatternSpec::new(r"(rx|tx)_queue_(\d+)_(bytes|packets)", 1, 3).with_queue(2)),
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_generic_two_field_driver() {
        let names = ["rx_bytes", "tx_bytes", "rx_packets", "tx_packets"];
        let baseline = vec![0, 0, 0, 0];
        let map = IndexMap::build(&generic(), &names, &baseline, QueueZeroPolicy::Include);
        let mut agg = StatsAggregator::new(map, baseline);

        agg.update(vec![100, 50, 10, 5]).unwrap();

        let total = agg.total_stats();
        assert_eq!(total.rx_bytes().get(), Some(100));
        assert_eq!(total.tx_bytes().get(), Some(50));
        assert_eq!(total.rx_packets().get(), Some(10));
        assert_eq!(total.tx_packets().get(), Some(5));
        assert_eq!(agg.queue_count(), 0);
    }

    #[test]
    fn test_per_queue_driver_synthesizes_total() {
        let names = ["rx_queue_0_bytes", "rx_queue_1_bytes"];
        let baseline = vec![0, 0];
        let map = IndexMap::build(&queue_only(), &names, &baseline, QueueZeroPolicy::Include);
        assert!(map.synthesizes_total());
        let mut agg = StatsAggregator::new(map, baseline);

        agg.update(vec![200, 300]).unwrap();

        assert_eq!(agg.queue_count(), 2);
        assert_eq!(agg.queue_stats(0).unwrap().rx_bytes().get(), Some(200));
        assert_eq!(agg.queue_stats(1).unwrap().rx_bytes().get(), Some(300));
        assert_eq!(agg.total_stats().rx_bytes().get(), Some(500));
        // fields the driver never reports stay unset
        assert!(!agg.total_stats().tx_bytes().is_set());
        assert!(!agg.queue_stats(0).unwrap().rx_packets().is_set());
        assert!(agg.queue_stats(2).is_none());
    }

    #[test]
    fn test_reported_totals_are_not_double_counted() {
        let names = ["rx_bytes", "rx_queue_0_bytes", "rx_queue_1_bytes"];
        let baseline = vec![0, 0, 0];
        let map = IndexMap::build(&generic(), &names, &baseline, QueueZeroPolicy::Include);
        let mut agg = StatsAggregator::new(map, baseline);

        agg.update(vec![1000, 200, 300]).unwrap();
        assert_eq!(agg.total_stats().rx_bytes().get(), Some(1000));
    }

    #[test]
    fn test_reset_clamps_to_zero() {
        let names = ["rx_bytes"];
        let map = IndexMap::build(&generic(), &names, &[1000], QueueZeroPolicy::Include);
        let mut agg = StatsAggregator::new(map, vec![1000]);

        agg.update(vec![10]).unwrap();
        assert_eq!(agg.total_stats().rx_bytes().get(), Some(0));

        agg.update(vec![15]).unwrap();
        assert_eq!(agg.total_stats().rx_bytes().get(), Some(5));
    }

    #[test]
    fn test_identical_snapshot_yields_zero_deltas() {
        let names = ["rx_bytes", "tx_bytes", "rx_queue_0_packets"];
        let snap = vec![7, 8, 9];
        let map = IndexMap::build(&generic(), &names, &snap, QueueZeroPolicy::Include);
        let mut agg = StatsAggregator::new(map, vec![0, 0, 0]);

        agg.update(snap.clone()).unwrap();
        assert_eq!(agg.total_stats().rx_bytes().get(), Some(7));

        agg.update(snap).unwrap();
        for slot in Slot::ALL {
            let v = agg.total_stats().get(slot);
            assert!(v.get().unwrap_or(0) == 0, "{slot}");
        }
        assert_eq!(agg.queue_stats(0).unwrap().rx_packets().get(), Some(0));
    }

    #[test]
    fn test_sparse_queues() {
        let names = ["rx_queue_0_bytes", "rx_queue_2_bytes"];
        let map = IndexMap::build(&queue_only(), &names, &[0, 0], QueueZeroPolicy::Include);
        assert_eq!(map.queue_count(), 3);
        let mut agg = StatsAggregator::new(map, vec![0, 0]);
        agg.update(vec![1, 2]).unwrap();
        assert!(!agg.queue_stats(1).unwrap().any_set());
        assert_eq!(agg.queue_stats(2).unwrap().rx_bytes().get(), Some(2));
    }

    #[test]
    fn test_queue_count_is_max_plus_one() {
        let parser: DriverParser = FusedParser::dnm(r"(rx|tx)_queue_(\d+)_(bytes|packets)")
            .unwrap()
            .into();
        let names = ["tx_queue_5_bytes", "rx_queue_1_bytes", "rx_queue_3_packets"];
        let map = IndexMap::build(&parser, &names, &[0, 0, 0], QueueZeroPolicy::Include);
        let max = map.queues().iter().map(|&(_, q, _)| q).max().unwrap();
        assert_eq!(map.queue_count(), max + 1);
    }

    #[test]
    fn test_out_of_range_queue_is_dropped() {
        let parser: DriverParser = FusedParser::dnm(r"(rx|tx)_queue_(\d+)_(bytes|packets)")
            .unwrap()
            .into();
        let names = [
            "rx_queue_18446744073709551615_bytes",
            "rx_queue_4000000000_bytes",
            "rx_queue_4096_bytes",
            "rx_queue_4095_bytes",
        ];
        let map = IndexMap::build(&parser, &names, &[0; 4], QueueZeroPolicy::Include);
        assert_eq!(map.queues(), &[(3, MAX_QUEUE_INDEX, Slot::RX_BYTES)]);
        assert_eq!(map.queue_count(), MAX_QUEUE_INDEX + 1);

        let mut agg = StatsAggregator::new(map, vec![0; 4]);
        agg.update(vec![1, 2, 3, 4]).unwrap();
        assert_eq!(agg.total_stats().rx_bytes().get(), Some(4));
    }

    #[test]
    fn test_stateful_out_of_range_queue_is_dropped() {
        let registry = ParserRegistry::builtin().unwrap();
        let parser = registry.find("vmxnet3").unwrap();
        let names = ["Rx Queue#", "ucast bytes rx", "Tx Queue#", "ucast pkts tx"];
        let values = [u64::MAX, 5, 1, 6];
        let map = IndexMap::build(parser, &names, &values, QueueZeroPolicy::Include);
        assert_eq!(map.queues(), &[(3, 1, Slot::TX_PACKETS)]);
        assert_eq!(map.queue_count(), 2);
    }

    #[test]
    fn test_skip_zero_policy() {
        let names = ["rx_queue_0_bytes", "rx_queue_1_bytes"];
        let values = [0, 300];

        let map = IndexMap::build(&queue_only(), &names, &values, QueueZeroPolicy::SkipZero);
        assert_eq!(map.queues(), &[(1, 1, Slot::RX_BYTES)]);
        assert_eq!(map.queue_count(), 2);

        let map = IndexMap::build(&queue_only(), &names, &values, QueueZeroPolicy::Include);
        assert_eq!(map.queues().len(), 2);
    }

    #[test]
    fn test_stateful_map() {
        let registry = ParserRegistry::builtin().unwrap();
        let parser = registry.find("vmxnet3").unwrap();
        let names = ["Rx Queue#", "ucast bytes rx"];
        let values = vec![2, 777];
        let map = IndexMap::build(parser, &names, &values, QueueZeroPolicy::Include);
        assert_eq!(map.queues(), &[(1, 2, Slot::RX_BYTES)]);
        assert_eq!(map.queue_count(), 3);
        assert!(map.totals().is_empty());
    }

    #[test]
    fn test_unmatched_names_are_excluded() {
        let names = ["rx_errors", "tx_dropped", "rx_bytes"];
        let map = IndexMap::build(&generic(), &names, &[0, 0, 0], QueueZeroPolicy::Include);
        assert_eq!(map.totals(), &[(2, Slot::RX_BYTES)]);
        assert!(map.queues().is_empty());

        let map = IndexMap::build(&generic(), &["foo", "bar"], &[0, 0], QueueZeroPolicy::Include);
        assert!(map.is_empty());
    }

    #[test]
    fn test_variant_tokens_sum_into_one_slot() {
        let registry = ParserRegistry::builtin().unwrap();
        let parser = registry.find("bnxt_en").unwrap();
        let names = ["rx_ucast_frames", "rx_mcast_frames", "rx_bcast_frames"];
        let map = IndexMap::build(parser, &names, &[0, 0, 0], QueueZeroPolicy::Include);
        let mut agg = StatsAggregator::new(map, vec![0, 0, 0]);
        agg.update(vec![10, 2, 1]).unwrap();
        assert_eq!(agg.total_stats().rx_packets().get(), Some(13));
    }

    #[test]
    fn test_length_mismatch() {
        let map = IndexMap::build(&generic(), &["rx_bytes"], &[0], QueueZeroPolicy::Include);
        let mut agg = StatsAggregator::new(map, vec![0]);
        let err = agg.update(vec![1, 2]).unwrap_err();
        assert_eq!(err, SnapshotLenError { expected: 1, actual: 2 });
        // baseline untouched
        assert_eq!(agg.baseline(), &[0]);
    }
}
