//! Pre-built mock sources that mimic real drivers.
//!
//! Counters grow linearly so that demo mode shows steady traffic.

use super::mock::MockSource;

/// Builds name, base and step lists entry by entry.
#[derive(Default)]
struct Builder {
    names: Vec<String>,
    base: Vec<u64>,
    step: Vec<u64>,
}

impl Builder {
    fn counter(&mut self, name: impl Into<String>, base: u64, step: u64) -> &mut Self {
        self.names.push(name.into());
        self.base.push(base);
        self.step.push(step);
        self
    }

    fn build(self, driver: &str) -> MockSource {
        MockSource::new(driver, self.names).with_ramp(self.base, self.step)
    }
}

/// Per-queue packet rate, uneven so queues are told apart on screen.
fn pps(queue: usize, rx: bool) -> u64 {
    let q = queue as u64;
    if rx { 900 + 170 * q } else { 600 + 90 * q }
}

const AVG_FRAME: u64 = 1100;

impl MockSource {
    /// Intel-style source: unmatched device totals followed by
    /// `{rx,tx}_queue_N_{packets,bytes}` lines.
    pub fn ixgbe_demo(queues: usize) -> Self {
        let mut b = Builder::default();
        b.counter("rx_packets", 0, 0)
            .counter("tx_packets", 0, 0)
            .counter("rx_errors", 0, 0)
            .counter("alloc_rx_page_failed", 0, 0);
        for q in 0..queues {
            let (tx, rx) = (pps(q, false), pps(q, true));
            b.counter(format!("tx_queue_{q}_packets"), 0, tx)
                .counter(format!("tx_queue_{q}_bytes"), 0, tx * AVG_FRAME)
                .counter(format!("rx_queue_{q}_packets"), 0, rx)
                .counter(format!("rx_queue_{q}_bytes"), 0, rx * AVG_FRAME);
        }
        b.build("ixgbe")
    }

    /// Mellanox-style source with both device totals and `rxN_bytes` lines.
    pub fn mlx5_demo(queues: usize) -> Self {
        let mut b = Builder::default();
        let tx_total: u64 = (0..queues).map(|q| pps(q, false)).sum();
        let rx_total: u64 = (0..queues).map(|q| pps(q, true)).sum();
        b.counter("rx_packets", 0, rx_total)
            .counter("rx_bytes", 0, rx_total * AVG_FRAME)
            .counter("tx_packets", 0, tx_total)
            .counter("tx_bytes", 0, tx_total * AVG_FRAME)
            .counter("rx_csum_unnecessary", 0, rx_total);
        for q in 0..queues {
            let (tx, rx) = (pps(q, false), pps(q, true));
            b.counter(format!("rx{q}_packets"), 0, rx)
                .counter(format!("rx{q}_bytes"), 0, rx * AVG_FRAME)
                .counter(format!("tx{q}_packets"), 0, tx)
                .counter(format!("tx{q}_bytes"), 0, tx * AVG_FRAME);
        }
        b.build("mlx5_core")
    }

    /// VMware-style source: `Tx Queue#` / `Rx Queue#` declaration lines whose
    /// value is the queue index, each followed by its counters.
    pub fn vmxnet3_demo(queues: usize) -> Self {
        let mut b = Builder::default();
        for q in 0..queues {
            let tx = pps(q, false);
            b.counter("Tx Queue#", q as u64, 0)
                .counter("  TSO pkts tx", 0, 0)
                .counter("  ucast pkts tx", 0, tx)
                .counter("  ucast bytes tx", 0, tx * AVG_FRAME)
                .counter("  mcast pkts tx", 0, 1)
                .counter("  mcast bytes tx", 0, 90);
        }
        for q in 0..queues {
            let rx = pps(q, true);
            b.counter("Rx Queue#", q as u64, 0)
                .counter("  LRO pkts rx", 0, 0)
                .counter("  ucast pkts rx", 0, rx)
                .counter("  ucast bytes rx", 0, rx * AVG_FRAME)
                .counter("  bcast pkts rx", 0, 2)
                .counter("  bcast bytes rx", 0, 120);
        }
        b.build("vmxnet3")
    }

    /// Source for a driver no builtin parser knows, named in the generic
    /// `rx_bytes` style.
    pub fn unknown_driver_demo() -> Self {
        let mut b = Builder::default();
        b.counter("rx_packets", 0, 1500)
            .counter("tx_packets", 0, 700)
            .counter("rx_bytes", 0, 1500 * AVG_FRAME)
            .counter("tx_bytes", 0, 700 * AVG_FRAME);
        b.build("e1000e")
    }
}
