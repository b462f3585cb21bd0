//! Main TUI application.

use std::io;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::error;

use crate::monitor::Monitor;
use crate::output::Report;
use crate::source::CounterSource;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;

/// Upper bound on key handling latency.
const POLL_STEP: Duration = Duration::from_millis(100);

pub struct App<S> {
    monitor: Monitor<S>,
    report: Report,
    should_quit: bool,
}

impl<S: CounterSource> App<S> {
    pub fn new(monitor: Monitor<S>) -> Self {
        let report = monitor.report();
        Self {
            monitor,
            report,
            should_quit: false,
        }
    }

    /// Runs the dashboard until a quit key is pressed or a refresh fails.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let events = EventHandler::new(POLL_STEP.min(self.monitor.interval()));

        while !self.should_quit {
            terminal.draw(|frame| render(frame, &self.report))?;

            match events.next() {
                Ok(Event::Key(key)) => {
                    if handle_key(key) == KeyAction::Quit {
                        self.should_quit = true;
                    }
                }
                Ok(Event::Tick | Event::Resize) => {}
                Err(_) => self.should_quit = true,
            }

            // keys may keep arriving faster than the poll step
            if !self.should_quit && self.monitor.is_due() {
                self.report = self.monitor.poll().map_err(|e| {
                    error!("refresh failed: {}", e);
                    io::Error::other(e)
                })?;
            }
        }

        Ok(())
    }
}
