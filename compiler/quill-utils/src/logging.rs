//! Quill compiler logging utilities. This defines a simple logger with a
//! style which should be used across the compiler to log and print messages.

use std::io::Write;

use once_cell::sync::OnceCell;

use crate::{
    log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError},
    stream::CompilerOutputStream,
};

/// The compiler logger that is used by the compiler for `log!` statements.
///
/// Messages are written as `<level>: <message>`, errors go to the error
/// stream and everything else to the output stream.
pub struct CompilerLogger {
    /// The output stream that the logger will write to.
    pub output_stream: OnceCell<CompilerOutputStream>,

    /// The error stream that the logger will write to.
    pub error_stream: OnceCell<CompilerOutputStream>,

    /// The most verbose level that is emitted.
    max_level: LevelFilter,
}

impl CompilerLogger {
    /// Create a new compiler logger which emits everything up to (and
    /// including) `max_level`.
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { output_stream: OnceCell::new(), error_stream: OnceCell::new(), max_level }
    }

    /// Register this logger as the global `log` sink, defaulting the streams to
    /// `stdout` and `stderr` if they have not been set yet.
    pub fn install(&'static self) -> Result<(), SetLoggerError> {
        let _ = self.output_stream.set(CompilerOutputStream::Stdout);
        let _ = self.error_stream.set(CompilerOutputStream::Stderr);

        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }

    /// The coloured prefix that is printed before each message.
    fn level_prefix(level: Level) -> String {
        const RESET: &str = "\u{001b}[0m";

        let (colour, label) = match level {
            Level::Error => ("\u{001b}[31;1m", "error"),
            Level::Warn => ("\u{001b}[33;1m", "warn"),
            Level::Info => ("\u{001b}[34;1m", "info"),
            Level::Debug => ("\u{001b}[34;1m", "debug"),
            Level::Trace => ("\u{001b}[35;1m", "trace"),
        };

        format!("{colour}{label}{RESET}")
    }
}

impl Log for CompilerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let stream =
            if record.level() == Level::Error { &self.error_stream } else { &self.output_stream };

        // If the logger hasn't been given any streams, there is nowhere to write to.
        let Some(stream) = stream.get() else {
            return;
        };

        let _ = writeln!(
            stream.clone(),
            "{level_prefix}: {message}",
            level_prefix = Self::level_prefix(record.level()),
            message = record.args()
        );
    }

    fn flush(&self) {}
}
