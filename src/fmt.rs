//! Shared formatting helpers.
//!
//! Pure functions turning [`IfStats`] into display cells; the text, log and
//! dashboard renderers all build on them.

use crate::counter::OptCounter;
use crate::model::IfStats;

/// Column titles, in display order.
pub const COLUMNS: [&str; 7] = [
    "NIC", "TX pkts", "RX pkts", "TX bytes", "RX bytes", "TX Mbps", "RX Mbps",
];

/// Short column titles used by text mode.
pub const SHORT_COLUMNS: [&str; 7] = ["nic", "txp", "rxp", "txb", "rxb", "txmbps", "rxmbps"];

/// Column widths for fixed-width output. The first fits an interface name.
pub const WIDTHS: [usize; 7] = [16, 8, 8, 10, 10, 10, 10];

/// Megabits per second for a byte count over `secs` seconds.
pub fn mbps(bytes: u64, secs: f64) -> f64 {
    bytes as f64 * 8.0 / 1e6 / secs
}

/// Formats a byte counter as Mbps with three decimals, or `"-"` when unset.
pub fn format_mbps(bytes: OptCounter, secs: f64) -> String {
    match bytes.get() {
        Some(b) => format!("{:.3}", mbps(b, secs)),
        None => "-".to_string(),
    }
}

/// The six value cells of a row, in [`COLUMNS`] order after the label.
pub fn stats_cells(stats: &IfStats, secs: f64) -> [String; 6] {
    [
        stats.tx_packets().to_string(),
        stats.rx_packets().to_string(),
        stats.tx_bytes().to_string(),
        stats.rx_bytes().to_string(),
        format_mbps(stats.tx_bytes(), secs),
        format_mbps(stats.rx_bytes(), secs),
    ]
}

/// One display row.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    /// Interface name for totals, queue index otherwise.
    pub label: String,
    pub total: bool,
    pub cells: [String; 6],
}

impl StatsRow {
    pub fn new(label: impl Into<String>, total: bool, stats: &IfStats, secs: f64) -> Self {
        Self {
            label: label.into(),
            total,
            cells: stats_cells(stats, secs),
        }
    }
}

/// Total row followed by one row per queue.
pub fn device_rows(name: &str, total: &IfStats, queues: &[IfStats], secs: f64) -> Vec<StatsRow> {
    let mut rows = Vec::with_capacity(queues.len() + 1);
    rows.push(StatsRow::new(name, true, total, secs));
    rows.extend(
        queues
            .iter()
            .enumerate()
            .map(|(i, q)| StatsRow::new(i.to_string(), false, q, secs)),
    );
    rows
}

/// Right-aligns `cells` into [`WIDTHS`] columns separated by one space.
pub fn fixed_width<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .zip(WIDTHS)
        .map(|(cell, width)| format!("{:>width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A row as one fixed-width line.
pub fn format_row(row: &StatsRow) -> String {
    let mut cells = Vec::with_capacity(7);
    cells.push(row.label.as_str());
    cells.extend(row.cells.iter().map(String::as_str));
    fixed_width(&cells)
}
