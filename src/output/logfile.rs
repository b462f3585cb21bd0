//! Log file output.
//!
//! One record per queue per interval, stamped with the wall-clock time in
//! nanoseconds since the Unix epoch. TSV files start with a header line,
//! written only when the file is empty so that runs can append to the same
//! log. JSON output writes one object per line.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::counter::OptCounter;
use crate::fmt::{COLUMNS, mbps, stats_cells};
use crate::model::IfStats;

use super::{Report, Sink};

/// Record format of a log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Tsv,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(LogFormat::Tsv),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format '{}' (expected tsv or json)", s)),
        }
    }
}

#[derive(Serialize)]
struct LogRecord<'a> {
    time: i64,
    nic: &'a str,
    queue: usize,
    tx_packets: OptCounter,
    rx_packets: OptCounter,
    tx_bytes: OptCounter,
    rx_bytes: OptCounter,
    tx_mbps: Option<f64>,
    rx_mbps: Option<f64>,
}

impl<'a> LogRecord<'a> {
    fn new(time: i64, nic: &'a str, queue: usize, stats: &IfStats, secs: f64) -> Self {
        Self {
            time,
            nic,
            queue,
            tx_packets: stats.tx_packets(),
            rx_packets: stats.rx_packets(),
            tx_bytes: stats.tx_bytes(),
            rx_bytes: stats.rx_bytes(),
            tx_mbps: stats.tx_bytes().get().map(|b| mbps(b, secs)),
            rx_mbps: stats.rx_bytes().get().map(|b| mbps(b, secs)),
        }
    }
}

pub struct LogSink<W> {
    out: W,
    format: LogFormat,
    header_pending: bool,
}

impl LogSink<BufWriter<File>> {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: &Path, format: LogFormat) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let empty = file.metadata()?.len() == 0;
        Ok(Self::new(BufWriter::new(file), format, empty))
    }
}

impl<W: Write> LogSink<W> {
    /// `write_header` asks for a TSV header before the first record.
    pub fn new(out: W, format: LogFormat, write_header: bool) -> Self {
        Self {
            out,
            format,
            header_pending: write_header && format == LogFormat::Tsv,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for LogSink<W> {
    fn write_report(&mut self, report: &Report) -> io::Result<()> {
        if self.header_pending {
            writeln!(self.out, "time\t{}", COLUMNS.join("\t"))?;
            self.header_pending = false;
        }

        let time = report.time.timestamp_nanos_opt().unwrap_or_default();
        for dev in &report.devices {
            for (q, stats) in dev.queues.iter().enumerate() {
                match self.format {
                    LogFormat::Tsv => {
                        let cells = stats_cells(stats, report.interval);
                        writeln!(self.out, "{}\t{}-{}\t{}", time, dev.name, q, cells.join("\t"))?;
                    }
                    LogFormat::Json => {
                        let record = LogRecord::new(time, &dev.name, q, stats, report.interval);
                        serde_json::to_writer(&mut self.out, &record)?;
                        writeln!(self.out)?;
                    }
                }
            }
        }
        self.out.flush()
    }
}
