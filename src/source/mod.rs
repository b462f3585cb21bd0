//! Counter sources.
//!
//! A counter source reports a driver identifier, an ordered list of counter
//! names and, on every call, the matching list of values. The name list must
//! keep its length and order for the lifetime of the source.
//!
//! ```text
//!        ┌───────────────┐
//!        │ CounterSource │ (trait)
//!        └───────┬───────┘
//!        ┌───────┴────────┐
//! ┌──────▼───────┐ ┌──────▼──────┐
//! │ EthtoolSource│ │ MockSource  │
//! │ (Linux)      │ │ (tests/demo)│
//! └──────────────┘ └─────────────┘
//! ```

pub mod dump;
#[cfg(target_os = "linux")]
pub mod ethtool;
pub mod mock;
mod scenarios;

#[cfg(target_os = "linux")]
pub use ethtool::EthtoolSource;
pub use mock::MockSource;

use crate::error::SourceError;

/// Supplier of raw device counters.
pub trait CounterSource {
    /// Driver identifier, stable for the life of the source.
    fn driver(&self) -> &str;

    /// Ordered counter names.
    fn names(&mut self) -> Result<Vec<String>, SourceError>;

    /// Current counter values, positionally aligned with [`names`](Self::names).
    fn values(&mut self) -> Result<Vec<u64>, SourceError>;
}

impl<S: CounterSource + ?Sized> CounterSource for Box<S> {
    fn driver(&self) -> &str {
        (**self).driver()
    }

    fn names(&mut self) -> Result<Vec<String>, SourceError> {
        (**self).names()
    }

    fn values(&mut self) -> Result<Vec<u64>, SourceError> {
        (**self).values()
    }
}
