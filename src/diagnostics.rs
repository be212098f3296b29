//! Diagnostics sink
//!
//! Everything the sync reports goes through a [`DiagnosticSink`] passed in
//! by the caller. The CLI uses [`ConsoleSink`]; tests use [`CollectingSink`].

use colored::Colorize;
use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn name(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// One reported message, optionally about a specific theorem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub key: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}: [{}] {}", self.level.name(), key, self.message),
            None => write!(f, "{}: {}", self.level.name(), self.message),
        }
    }
}

pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);

    fn info(&mut self, key: Option<&str>, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(Diagnostic {
            level: Level::Info,
            key: key.map(str::to_string),
            message: message.into(),
        });
    }

    fn warning(&mut self, key: Option<&str>, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(Diagnostic {
            level: Level::Warning,
            key: key.map(str::to_string),
            message: message.into(),
        });
    }

    fn error(&mut self, key: Option<&str>, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(Diagnostic {
            level: Level::Error,
            key: key.map(str::to_string),
            message: message.into(),
        });
    }
}

/// Colored output on stderr
#[derive(Debug, Default)]
pub struct ConsoleSink {
    quiet: bool,
    errors: usize,
    warnings: usize,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Default::default()
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }
}

impl DiagnosticSink for ConsoleSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let prefix = match diagnostic.level {
            Level::Info if self.quiet => return,
            Level::Info => "info:".cyan(),
            Level::Warning => {
                self.warnings += 1;
                "warning:".yellow().bold()
            }
            Level::Error => {
                self.errors += 1;
                "error:".red().bold()
            }
        };
        match &diagnostic.key {
            Some(key) => eprintln!("{} [{}] {}", prefix, key.bold(), diagnostic.message),
            None => eprintln!("{} {}", prefix, diagnostic.message),
        }
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_level(&self, level: Level) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.level == level)
    }

    pub fn count(&self, level: Level) -> usize {
        self.at_level(level).count()
    }

    /// Diagnostics about one theorem key
    pub fn for_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.key.as_deref() == Some(key))
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
