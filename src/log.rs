// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Minimal structured logging with severity levels
//! OWNERS: capability subsystem
//! PUBLIC API: log_* macros, emit(level,target,args), set_sink
//! DEPENDS_ON: a host-supplied `Sink`
//! INVARIANTS: Debug/Trace only when the `debug_log` feature is on; single-line emission
//!
//! Unlike a bare-metal kernel this crate has no UART of its own to write to,
//! so the destination is a trait the host supplies. Until the host installs
//! one, log lines are simply dropped rather than assuming any console exists.

use core::fmt::{Arguments, Write};
use spin::Once;

/// Logging severity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    /// Short tag (`"ERROR"`, `"WARN"`, …) a host [`Sink`] can use to render
    /// the line the way `neuron`'s own UART logger did, without depending
    /// on `Level`'s `Debug` output staying stable.
    pub const fn tag(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn enabled(self) -> bool {
        match self {
            Level::Debug | Level::Trace => cfg!(feature = "debug_log"),
            _ => true,
        }
    }
}

/// Destination for log lines. The host implements this and calls
/// [`set_sink`] once during setup; a no-op default applies until then.
pub trait Sink: Sync {
    fn write_line(&self, level: Level, target: &str, line: &str);
}

struct NullSink;
impl Sink for NullSink {
    fn write_line(&self, _level: Level, _target: &str, _line: &str) {}
}

static SINK: Once<&'static (dyn Sink + Sync)> = Once::new();

/// Installs the host's log sink. Only the first call takes effect.
pub fn set_sink(sink: &'static (dyn Sink + Sync)) {
    SINK.call_once(|| sink);
}

fn current_sink() -> &'static (dyn Sink + Sync) {
    *SINK.call_once(|| &NullSink)
}

/// Emits a structured log line if the level is enabled for the current build.
pub fn emit(level: Level, target: &'static str, args: Arguments<'_>) {
    if !level.enabled() {
        return;
    }
    let mut line = alloc::string::String::new();
    let _ = line.write_fmt(args);
    current_sink().write_line(level, target, &line);
}

#[macro_export]
macro_rules! log_error {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Error, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Error, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_warn {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Warn, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Warn, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_info {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Info, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Info, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_debug {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Debug, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Debug, module_path!(), format_args!($($arg)+));
    }};
}
