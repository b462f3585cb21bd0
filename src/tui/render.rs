//! Dashboard rendering.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use crate::fmt::{COLUMNS, StatsRow, WIDTHS, device_rows};
use crate::output::Report;

use super::style::Styles;

/// Main render function.
pub fn render(frame: &mut Frame, report: &Report) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(0),    // Table
    ])
    .split(frame.area());

    render_header(frame, chunks[0], report);
    render_table(frame, chunks[1], report);
}

fn render_header(frame: &mut Frame, area: Rect, report: &Report) {
    let text = format!(
        "  {}  nicq  interval {:.1}s   q: quit",
        report.time.format("%H:%M:%S"),
        report.interval
    );
    frame.render_widget(Paragraph::new(text).style(Styles::header()), area);
}

fn render_table(frame: &mut Frame, area: Rect, report: &Report) {
    let header = Row::new(COLUMNS.iter().map(|c| right(c))).style(Styles::table_header());

    let rows = report.devices.iter().flat_map(|dev| {
        device_rows(&dev.name, &dev.total, &dev.queues, report.interval)
            .into_iter()
            .map(|row| {
                let style = row_style(&row);
                let mut cells = vec![right(&row.label)];
                cells.extend(row.cells.iter().map(|c| right(c)));
                Row::new(cells).style(style)
            })
    });

    let widths = WIDTHS.map(|w| Constraint::Length(w as u16));
    frame.render_widget(Table::new(rows, widths).header(header), area);
}

fn row_style(row: &StatsRow) -> ratatui::style::Style {
    if row.total {
        Styles::total()
    } else if row.cells.iter().all(|c| c == "-") {
        Styles::idle_queue()
    } else {
        Styles::queue()
    }
}

fn right(text: &str) -> Cell<'static> {
    Cell::from(Line::from(text.to_string()).alignment(Alignment::Right))
}
