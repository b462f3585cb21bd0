//! Full-screen dashboard.
//!
//! Shows one bold total row per interface followed by its queues, refreshed
//! every interval, under a header bar carrying the wall-clock time.

mod app;
mod event;
mod input;
mod render;
mod style;

pub use app::App;
