//! Logging for systems.
//!
//! Two channels exist side by side:
//!
//! - The [`log`] facade, which the engine core itself uses for its own
//!   diagnostics. [`init_env_logger`] installs `env_logger` behind it
//!   (filtered by `RUST_LOG`). [`App::run`](crate::App::run) calls it when
//!   `console_logging` is on.
//! - The [`Logger`] trait, which systems reach through
//!   [`Context::logger`](crate::Context::logger). The context holds a
//!   [`MultiLogger`] that fans every message out to its sinks, e.g. a
//!   [`ConsoleLogger`] plus an in-game console backed by a [`MemoryLogger`].
//!
//! `fatal` is a severity, not an action: no logger here ends the process.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Message severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Info,
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Trace => "TRACE",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        };
        f.write_str(label)
    }
}

/// A destination for log messages.
///
/// Only [`write`](Self::write) is required; the per-level methods forward to
/// it.
pub trait Logger: Send + Sync {
    fn write(&self, level: Level, message: &str);

    /// Trace-level message.
    fn log(&self, message: &str) {
        self.write(Level::Trace, message);
    }

    fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(Level::Error, message);
    }

    /// Highest severity. Does not terminate anything.
    fn fatal(&self, message: &str) {
        self.write(Level::Fatal, message);
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn write(&self, level: Level, message: &str) {
        (**self).write(level, message);
    }
}

// ── ConsoleLogger ────────────────────────────────────────────────────────

/// Forwards to the [`log`] facade under the `ulfr::console` target.
///
/// `fatal` maps to `log::error!` with a `FATAL:` prefix, since `log` has no
/// higher level.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn write(&self, level: Level, message: &str) {
        const TARGET: &str = "ulfr::console";
        match level {
            Level::Trace => log::trace!(target: TARGET, "{message}"),
            Level::Info => log::info!(target: TARGET, "{message}"),
            Level::Warn => log::warn!(target: TARGET, "{message}"),
            Level::Error => log::error!(target: TARGET, "{message}"),
            Level::Fatal => log::error!(target: TARGET, "FATAL: {message}"),
        }
    }
}

// ── MemoryLogger ─────────────────────────────────────────────────────────

/// Keeps every message in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded `(level, message)` pair, oldest first.
    pub fn entries(&self) -> Vec<(Level, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages at `level` or above.
    pub fn messages_at_least(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l >= level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn write(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

// ── MultiLogger ──────────────────────────────────────────────────────────

/// Handle returned by [`MultiLogger::add_sink`], used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

/// Fans every message out to all registered sinks, in registration order.
#[derive(Default)]
pub struct MultiLogger {
    sinks: Vec<(SinkId, Box<dyn Logger>)>,
    next_id: u64,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: impl Logger + 'static) -> SinkId {
        let id = SinkId(self.next_id);
        self.next_id += 1;
        self.sinks.push((id, Box::new(sink)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_sink(&mut self, id: SinkId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sink_id, _)| *sink_id != id);
        self.sinks.len() != before
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Logger for MultiLogger {
    fn write(&self, level: Level, message: &str) {
        for (_, sink) in &self.sinks {
            sink.write(level, message);
        }
    }
}

impl fmt::Debug for MultiLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLogger")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

// ── env_logger ───────────────────────────────────────────────────────────

/// Install `env_logger` as the global [`log`] backend.
///
/// Reads `RUST_LOG`; shows `info` and above when unset. If another logger is
/// already installed this prints a warning and leaves it in place.
pub fn init_env_logger() {
    let inner = env_logger::Builder::new().parse_default_env().build();
    let max_level = inner.filter();

    if log::set_boxed_logger(Box::new(inner)).is_err() {
        eprintln!("[ulfr] Warning: a logger is already set. Keeping it.");
        return;
    }
    log::set_max_level(max_level.max(log::LevelFilter::Info));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_methods_map_to_levels() {
        let memory = MemoryLogger::new();
        memory.log("t");
        memory.info("i");
        memory.warn("w");
        memory.error("e");
        memory.fatal("f");

        let levels: Vec<_> = memory.entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            levels,
            vec![Level::Trace, Level::Info, Level::Warn, Level::Error, Level::Fatal]
        );
        assert_eq!(memory.messages_at_least(Level::Error), vec!["e", "f"]);
    }

    #[test]
    fn multi_logger_fans_out_and_removes() {
        let a = MemoryLogger::new();
        let b = MemoryLogger::new();
        let mut multi = MultiLogger::new();
        let id_a = multi.add_sink(a.clone());
        multi.add_sink(b.clone());

        multi.info("both");
        assert!(multi.remove_sink(id_a));
        assert!(!multi.remove_sink(id_a));
        multi.warn("only b");

        assert_eq!(a.entries().len(), 1);
        assert_eq!(b.entries().len(), 2);
        assert_eq!(multi.sink_count(), 1);
    }

    #[test]
    fn fatal_does_not_terminate() {
        ConsoleLogger.fatal("still here");
        let memory = MemoryLogger::new();
        memory.fatal("still here");
        assert_eq!(memory.entries().len(), 1);
    }

    #[test]
    fn init_env_logger_twice_is_harmless() {
        init_env_logger();
        init_env_logger();
        log::info!("logger installed");
    }

    #[test]
    fn level_display() {
        assert_eq!(Level::Fatal.to_string(), "FATAL");
        assert!(Level::Warn > Level::Info);
    }
}
