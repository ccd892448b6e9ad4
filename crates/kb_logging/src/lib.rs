#![deny(missing_docs)]
//! Shared logging utilities for the kbsearch workspace.
//!
//! This crate provides the `kb_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line is
//! stamped with the sequence number of the message currently being applied
//! to the session, so log output can be lined up with the transcript.

use std::cell::Cell;

thread_local! {
    /// Sequence number of the message being dispatched on this thread.
    static DISPATCH_SEQ: Cell<u64> = const { Cell::new(0) };
}

/// Sets the dispatch sequence number for the current thread.
/// The session driver calls this once per applied message.
pub fn set_dispatch_seq(seq: u64) {
    DISPATCH_SEQ.with(|v| v.set(seq));
}

/// Retrieves the dispatch sequence number for the current thread.
/// Returns 0 outside of a dispatch.
pub fn dispatch_seq() -> u64 {
    DISPATCH_SEQ.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! kb_trace {
    ($($arg:tt)*) => {{
        log::trace!("[#{}] {}", $crate::dispatch_seq(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! kb_info {
    ($($arg:tt)*) => {{
        log::info!("[#{}] {}", $crate::dispatch_seq(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! kb_debug {
    ($($arg:tt)*) => {{
        log::debug!("[#{}] {}", $crate::dispatch_seq(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! kb_warn {
    ($($arg:tt)*) => {{
        log::warn!("[#{}] {}", $crate::dispatch_seq(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! kb_error {
    ($($arg:tt)*) => {{
        log::error!("[#{}] {}", $crate::dispatch_seq(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test binary thread may have won the race.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
