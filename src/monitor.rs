//! Polling loop pacing.
//!
//! Deadlines are absolute: each cycle's deadline is the previous one plus the
//! interval, so time spent refreshing and rendering does not make the loop
//! drift.

use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::trace;

use crate::error::InterfaceError;
use crate::interface::Interface;
use crate::output::{DeviceReport, Report};
use crate::source::CounterSource;

pub struct Monitor<S> {
    interfaces: Vec<Interface<S>>,
    interval: Duration,
    deadline: Instant,
}

impl<S: CounterSource> Monitor<S> {
    /// Starts the clock: the first deadline is one interval from now.
    pub fn new(interfaces: Vec<Interface<S>>, interval: Duration) -> Self {
        Self {
            interfaces,
            interval,
            deadline: Instant::now() + interval,
        }
    }

    pub fn interfaces(&self) -> &[Interface<S>] {
        &self.interfaces
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_due(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Sleeps until the next deadline.
    pub fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }

    /// Refreshes every interface and advances the deadline.
    pub fn poll(&mut self) -> Result<Report, InterfaceError> {
        for iface in &mut self.interfaces {
            iface.refresh()?;
        }
        self.deadline += self.interval;
        trace!("next deadline in {:?}", self.remaining());
        Ok(self.report())
    }

    /// Waits for the deadline, then polls.
    pub fn next_report(&mut self) -> Result<Report, InterfaceError> {
        self.wait();
        self.poll()
    }

    /// Current statistics of every interface.
    pub fn report(&self) -> Report {
        Report {
            time: Utc::now(),
            interval: self.interval.as_secs_f64(),
            devices: self.interfaces.iter().map(DeviceReport::from_interface).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::InterfaceOptions;
    use crate::registry::ParserRegistry;
    use crate::source::MockSource;

    fn monitor(interval: Duration) -> Monitor<MockSource> {
        let registry = ParserRegistry::builtin().unwrap();
        let iface = Interface::open(
            "eth0",
            MockSource::ixgbe_demo(2),
            &registry,
            &InterfaceOptions::default(),
        )
        .unwrap();
        Monitor::new(vec![iface], interval)
    }

    #[test]
    fn test_deadline_advances_by_interval() {
        let mut m = monitor(Duration::from_millis(20));
        assert!(!m.is_due());
        let first = m.deadline;
        m.wait();
        assert!(m.is_due());
        m.poll().unwrap();
        assert_eq!(m.deadline, first + Duration::from_millis(20));
    }

    #[test]
    fn test_report() {
        let mut m = monitor(Duration::from_millis(1));
        let report = m.next_report().unwrap();
        assert_eq!(report.interval, 0.001);
        assert_eq!(report.devices.len(), 1);
        let dev = &report.devices[0];
        assert_eq!(dev.name, "eth0");
        assert_eq!(dev.queues.len(), 2);
        assert_eq!(dev.queues[0].rx_packets().get(), Some(900));
    }
}
