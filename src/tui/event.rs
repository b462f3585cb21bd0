//! Terminal event thread.
//!
//! Polls crossterm in the background and forwards key presses and resizes.
//! A `Tick` is sent whenever a poll times out, letting the app check its
//! refresh deadline without blocking key handling.

use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

#[derive(Debug)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Resize,
}

pub struct EventHandler {
    rx: Receiver<Event>,
    /// Keeps the channel open if the thread exits first.
    _tx: Sender<Event>,
}

impl EventHandler {
    /// Spawns the polling thread; `step` bounds how long a poll waits.
    pub fn new(step: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread_tx = tx.clone();
        thread::spawn(move || poll_loop(&thread_tx, step));
        Self { rx, _tx: tx }
    }

    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }
}

fn poll_loop(tx: &Sender<Event>, step: Duration) {
    loop {
        let event = match event::poll(step) {
            Ok(true) => match event::read() {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                Ok(CrosstermEvent::Resize(..)) => Event::Resize,
                Ok(_) => continue,
                Err(_) => return,
            },
            Ok(false) => Event::Tick,
            Err(_) => return,
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}
