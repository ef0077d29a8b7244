//! Presentation module
//! Pure formatting of events and session status for terminal display

pub mod format;

pub use format::{format_line, label, render_events, render_status, symbol};
