// thmsync - Theorem formalization data sync
// Keeps per-theorem record files and a downstream aggregate YAML file in step

pub mod cli;
pub mod context;
pub mod diagnostics;
pub mod models;
pub mod parser;
pub mod services;
pub mod sync;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use diagnostics::{CollectingSink, ConsoleSink, Diagnostic, DiagnosticSink, Level};
pub use models::{FormalizationEntry, SyncConfig, TheoremKey, TheoremRecord};
pub use sync::{Outcome, ReconcileReport, Reconciler};
