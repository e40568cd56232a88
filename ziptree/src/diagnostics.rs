//! Diagnostic sink for recoverable problems.
//!
//! Nested archive mounting is best-effort: when a nested container can't be
//! opened the builder keeps going and reports what happened through a
//! `Diagnostics` implementation instead of failing the whole build.

use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Verbose,
    Info,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticLevel::Verbose => "verbose",
            DiagnosticLevel::Info => "info",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        f.write_str(s)
    }
}

pub trait Diagnostics {
    fn log(&self, level: DiagnosticLevel, message: &str);

    fn verbose(&self, message: &str) {
        self.log(DiagnosticLevel::Verbose, message)
    }

    fn info(&self, message: &str) {
        self.log(DiagnosticLevel::Info, message)
    }

    fn warning(&self, message: &str) {
        self.log(DiagnosticLevel::Warning, message)
    }

    fn error(&self, message: &str) {
        self.log(DiagnosticLevel::Error, message)
    }
}

/// Forwards every message to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn log(&self, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Verbose => log::debug!("{message}"),
            DiagnosticLevel::Info => log::info!("{message}"),
            DiagnosticLevel::Warning => log::warn!("{message}"),
            DiagnosticLevel::Error => log::error!("{message}"),
        }
    }
}

/// Keeps messages in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryDiagnostics {
    messages: Arc<Mutex<Vec<(DiagnosticLevel, String)>>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(DiagnosticLevel, String)> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages at `level` or above.
    pub fn at_least(&self, level: DiagnosticLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l >= level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn log(&self, level: DiagnosticLevel, message: &str) {
        let mut guard = match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((level, message.to_string()));
    }
}
