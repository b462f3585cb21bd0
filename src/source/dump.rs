//! Parser for `ethtool -S <iface>` text output.
//!
//! ```text
//! NIC statistics:
//!      rx_packets: 1824
//!      [0]: rx_bytes: 98211
//! ```
//!
//! Names may themselves contain `": "`, so the value is whatever follows the
//! last separator.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SourceError;

static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.*?): (\d+)\s*$").expect("invalid dump line regex"));

/// One counter line from a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLine {
    /// 1-based line number in the input.
    pub line: usize,
    pub name: String,
    pub value: u64,
}

/// Parses one line. Returns `Ok(None)` for lines that carry no counter,
/// such as the `NIC statistics:` header.
pub fn parse_line(lineno: usize, line: &str) -> Result<Option<DumpLine>, SourceError> {
    let Some(caps) = LINE_RE.captures(line) else {
        return Ok(None);
    };
    let raw = &caps[2];
    let value = raw.parse::<u64>().map_err(|_| SourceError::InvalidValue {
        line: lineno,
        value: raw.to_string(),
    })?;
    Ok(Some(DumpLine {
        line: lineno,
        name: caps[1].to_string(),
        value,
    }))
}

/// Parses a whole dump into aligned name and value lists.
pub fn parse_dump(content: &str) -> Result<(Vec<String>, Vec<u64>), SourceError> {
    let mut names = Vec::new();
    let mut values = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if let Some(entry) = parse_line(i + 1, line)? {
            names.push(entry.name);
            values.push(entry.value);
        }
    }
    Ok((names, values))
}
