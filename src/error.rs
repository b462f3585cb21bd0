//! Error types.
//!
//! Driver-support failures surface once, when an interface is opened.
//! Counter resets are never errors. A counter source that changes the shape
//! of its snapshot breaks positional alignment, and is reported as
//! [`InterfaceError::SnapshotMismatch`] for the caller to treat as fatal.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a counter source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{op} failed on {interface}: {source}")]
    Io {
        op: &'static str,
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid interface name: {0:?}")]
    InvalidName(String),

    #[error("line {line}: invalid counter value {value:?}")]
    InvalidValue { line: usize, value: String },
}

/// Errors raised while building the parser registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern {pattern:?} has {groups} capture groups, {field} refers to group {index}")]
    CaptureOutOfRange {
        pattern: String,
        field: &'static str,
        index: usize,
        groups: usize,
    },

    #[error("cannot read driver file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed driver file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("driver definition #{0} has no names")]
    EmptyDriverNames(usize),
}

/// Errors raised by an [`Interface`](crate::Interface).
#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("unsupported NIC driver ({driver}:{interface})")]
    UnsupportedDriver { driver: String, interface: String },

    #[error("couldn't parse NIC stats ({driver}:{interface})")]
    NoCountersMapped { driver: String, interface: String },

    #[error("counter snapshot for {interface} has {actual} values, expected {expected}")]
    SnapshotMismatch {
        interface: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A value snapshot whose length differs from the counter name list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("snapshot has {actual} values, expected {expected}")]
pub struct SnapshotLenError {
    pub expected: usize,
    pub actual: usize,
}
