//! nicq - per-queue NIC statistics.
//!
//! Reads a network interface's driver statistics, works out which counters
//! carry per-queue and device-wide packet and byte counts, and turns them
//! into per-interval deltas.
//!
//! The pieces, bottom-up:
//! - [`source`]: where counter names and values come from (ethtool, mocks)
//! - [`parser`] and [`registry`]: per-driver naming conventions
//! - [`aggregator`]: the pure name-to-slot mapping and delta accumulation
//! - [`interface`]: one monitored device
//! - [`monitor`], [`output`], [`tui`]: polling and rendering

pub mod aggregator;
pub mod counter;
pub mod error;
pub mod fmt;
pub mod interface;
pub mod model;
pub mod monitor;
pub mod output;
pub mod parser;
pub mod registry;
pub mod source;
pub mod tui;

pub use aggregator::{IndexMap, QueueZeroPolicy, StatsAggregator};
pub use counter::OptCounter;
pub use error::{InterfaceError, RegistryError, SourceError};
pub use interface::{Interface, InterfaceOptions};
pub use model::{Direction, IfStats, Metric, Slot};
pub use monitor::Monitor;
pub use parser::DriverParser;
pub use registry::ParserRegistry;
pub use source::CounterSource;
