//! Optional 64-bit counter.
//!
//! Drivers do not report every field, so a counter has to distinguish
//! "never reported" from "reported as zero". `OptCounter` wraps an
//! `Option<u64>` and gives it the arithmetic the aggregator needs.

use std::fmt;

use serde::Serialize;

/// A counter that is either unset or holds a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptCounter(Option<u64>);

impl OptCounter {
    /// An unset counter.
    pub const UNSET: Self = Self(None);

    /// Creates a counter holding `value`.
    pub fn new(value: u64) -> Self {
        Self(Some(value))
    }

    /// Returns `true` if a value has been supplied.
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<u64> {
        self.0
    }

    /// Adds `delta`, marking the counter set. Saturates instead of wrapping.
    pub fn add(&mut self, delta: u64) {
        self.0 = Some(self.0.unwrap_or(0).saturating_add(delta));
    }

    /// Returns the counter to the unset state.
    pub fn reset(&mut self) {
        self.0 = None;
    }
}

impl From<u64> for OptCounter {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Option<u64>> for OptCounter {
    fn from(value: Option<u64>) -> Self {
        Self(value)
    }
}

impl fmt::Display for OptCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => fmt::Display::fmt(&v, f),
            None => f.pad("-"),
        }
    }
}
