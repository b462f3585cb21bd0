//! Plain text output: a header, then one total row and one row per queue
//! for every interface, then a blank line.

use std::io::{self, Write};

use crate::fmt::{SHORT_COLUMNS, device_rows, fixed_width, format_row};

use super::{Report, Sink};

pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn write_report(&mut self, report: &Report) -> io::Result<()> {
        writeln!(self.out, "{}", fixed_width(&SHORT_COLUMNS))?;
        for dev in &report.devices {
            for row in device_rows(&dev.name, &dev.total, &dev.queues, report.interval) {
                writeln!(self.out, "{}", format_row(&row))?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{IfStats, Slot};
    use crate::output::DeviceReport;

    #[test]
    fn test_text_report() {
        let mut total = IfStats::default();
        total.add(Slot::RX_BYTES, 250_000);
        let mut q0 = IfStats::default();
        q0.add(Slot::RX_BYTES, 250_000);

        let report = Report {
            time: Utc.timestamp_opt(0, 0).unwrap(),
            interval: 1.0,
            devices: vec![DeviceReport {
                name: "eth0".to_string(),
                total,
                queues: vec![q0, IfStats::default()],
            }],
        };

        let mut sink = TextSink::new(Vec::new());
        sink.write_report(&report).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].trim_start().starts_with("nic"));
        assert!(lines[1].trim_start().starts_with("eth0"));
        assert!(lines[1].ends_with("     2.000"));
        assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), ["0", "-", "-", "-", "250000", "-", "2.000"]);
        assert!(lines[3].split_whitespace().skip(1).all(|c| c == "-"));
        assert_eq!(lines[4], "");
    }
}
