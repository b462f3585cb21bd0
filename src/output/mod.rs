//! Line-oriented renderers.
//!
//! Every polling cycle produces a [`Report`]; a [`Sink`] writes it out.
//!
//! ```text
//!   Interface ──► Report ──► TextSink  (stdout, fixed width)
//!                        └─► LogSink   (file, TSV or JSON lines)
//! ```

mod logfile;
mod text;

use std::io;

use chrono::{DateTime, Utc};

use crate::interface::Interface;
use crate::model::IfStats;

pub use logfile::{LogFormat, LogSink};
pub use text::TextSink;

/// Statistics of one interface for one interval.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub name: String,
    pub total: IfStats,
    pub queues: Vec<IfStats>,
}

impl DeviceReport {
    pub fn from_interface<S>(iface: &Interface<S>) -> Self {
        Self {
            name: iface.name().to_string(),
            total: *iface.total_stats(),
            queues: iface.queues().to_vec(),
        }
    }
}

/// Everything rendered for one polling cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// End of the interval.
    pub time: DateTime<Utc>,
    /// Interval length in seconds.
    pub interval: f64,
    pub devices: Vec<DeviceReport>,
}

pub trait Sink {
    fn write_report(&mut self, report: &Report) -> io::Result<()>;
}
