//! Reconciliation of downstream edits back into theorem records
//!
//! For every key in the downstream file the engine derives the Lean entry the
//! downstream file implies, compares it with the record's current Lean
//! entries and either leaves the record alone, reports drift, or rewrites
//! the record's `lean` field.
//!
//! Only additions and changes flow upstream. A downstream entry that lacks a
//! formalization never removes one upstream, and a record with several Lean
//! entries is never rewritten automatically.

use crate::diagnostics::DiagnosticSink;
use crate::models::config::SyncConfig;
use crate::models::downstream::{Declarations, DownstreamEntry};
use crate::models::formalization::{
    FormalizationEntry, FormalizationStatus, Library, PartialDate, ProofAssistant,
};
use crate::models::theorem::{TheoremKey, TheoremRecord};
use crate::parser::frontmatter::{render_record, split_record, RecordDocument};
use crate::parser::record::parse_theorem;
use crate::parser::wikilink::derive_title;
use crate::services::RecordStore;
use crate::sync::check::misnamed_record;
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

// =============================================================================
// Candidate derivation and classification
// =============================================================================

/// The Lean entry implied by a downstream entry, if it records a formalization
///
/// The downstream schema carries no URL and cannot tell the standard library
/// from the main library, so library-hosted candidates start out as
/// `MainLibrary` with no URL.
pub fn candidate_from_downstream(entry: &DownstreamEntry) -> Option<FormalizationEntry> {
    let (status, library, identifiers) = match entry.declarations.as_ref()? {
        Declarations::Statement(names) => (
            FormalizationStatus::Statement,
            Library::MainLibrary,
            Some(names.clone()),
        ),
        Declarations::Decl(name) => (
            FormalizationStatus::FullProof,
            Library::MainLibrary,
            Some(vec![name.clone()]),
        ),
        Declarations::Decls(names) => (
            FormalizationStatus::FullProof,
            Library::MainLibrary,
            Some(names.clone()),
        ),
        Declarations::ExternalUrl(_) => (FormalizationStatus::FullProof, Library::External, None),
    };

    let authors = entry
        .authors
        .as_deref()
        .map(|joined| {
            joined
                .split(" and ")
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|authors| !authors.is_empty());

    Some(FormalizationEntry {
        status,
        library,
        url: None,
        authors,
        identifiers: identifiers.filter(|names| !names.is_empty()),
        date: entry.date,
        comment: entry.comment.clone(),
    })
}

/// Fill in what the downstream file cannot express from the upstream entry
fn rebase_unobserved(candidate: FormalizationEntry, upstream: &FormalizationEntry) -> FormalizationEntry {
    let library = if candidate.library.is_library() && upstream.library.is_library() {
        upstream.library
    } else {
        candidate.library
    };
    FormalizationEntry {
        library,
        url: upstream.url.clone(),
        ..candidate
    }
}

/// One field on which downstream and upstream disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDifference {
    pub field: &'static str,
    pub downstream: String,
    pub upstream: String,
}

fn show_text(value: Option<&str>) -> String {
    value.map_or_else(|| "(none)".to_string(), str::to_string)
}

fn show_list(value: Option<&Vec<String>>) -> String {
    value.map_or_else(|| "(none)".to_string(), |items| format!("[{}]", items.join(", ")))
}

fn show_date(value: Option<&PartialDate>) -> String {
    value.map_or_else(|| "(none)".to_string(), PartialDate::to_string)
}

/// Field-by-field comparison, in record field order
pub fn differences(downstream: &FormalizationEntry, upstream: &FormalizationEntry) -> Vec<FieldDifference> {
    let mut diffs = Vec::new();
    let mut compare = |field: &'static str, equal: bool, d: String, u: String| {
        if !equal {
            diffs.push(FieldDifference {
                field,
                downstream: d,
                upstream: u,
            });
        }
    };

    compare(
        "status",
        downstream.status == upstream.status,
        downstream.status.to_string(),
        upstream.status.to_string(),
    );
    compare(
        "library",
        downstream.library == upstream.library,
        downstream.library.to_string(),
        upstream.library.to_string(),
    );
    compare(
        "url",
        downstream.url == upstream.url,
        show_text(downstream.url.as_deref()),
        show_text(upstream.url.as_deref()),
    );
    compare(
        "authors",
        downstream.authors == upstream.authors,
        show_list(downstream.authors.as_ref()),
        show_list(upstream.authors.as_ref()),
    );
    compare(
        "identifiers",
        downstream.identifiers == upstream.identifiers,
        show_list(downstream.identifiers.as_ref()),
        show_list(upstream.identifiers.as_ref()),
    );
    compare(
        "date",
        downstream.date == upstream.date,
        show_date(downstream.date.as_ref()),
        show_date(upstream.date.as_ref()),
    );
    compare(
        "comment",
        downstream.comment == upstream.comment,
        show_text(downstream.comment.as_deref()),
        show_text(upstream.comment.as_deref()),
    );
    diffs
}

/// Decision for one theorem, before any I/O
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Nothing to do
    NoOp,
    /// Downstream has a formalization upstream lacks; write this entry
    DownstreamAhead(FormalizationEntry),
    /// Upstream has entries downstream lacks; report only
    UpstreamAhead { upstream_entries: usize },
    /// One downstream entry against several upstream entries; report only
    Ambiguous { upstream_entries: usize },
    /// Both sides have one entry and they differ; write this entry
    Diverged {
        entry: FormalizationEntry,
        differences: Vec<FieldDifference>,
    },
}

/// Classify a downstream candidate against the record's Lean entries
pub fn classify(candidate: Option<FormalizationEntry>, upstream: &[FormalizationEntry]) -> Classification {
    match (candidate, upstream) {
        (None, []) => Classification::NoOp,
        (None, entries) => Classification::UpstreamAhead {
            upstream_entries: entries.len(),
        },
        (Some(candidate), []) => Classification::DownstreamAhead(candidate),
        (Some(candidate), [current]) => {
            let candidate = rebase_unobserved(candidate, current);
            let differences = differences(&candidate, current);
            if differences.is_empty() {
                Classification::NoOp
            } else {
                Classification::Diverged {
                    entry: candidate,
                    differences,
                }
            }
        }
        (Some(_), entries) => Classification::Ambiguous {
            upstream_entries: entries.len(),
        },
    }
}

// =============================================================================
// Report
// =============================================================================

/// What happened to one theorem key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    NoOp,
    DownstreamAhead { written: bool },
    UpstreamAhead { upstream_entries: usize },
    Ambiguous { upstream_entries: usize },
    Diverged {
        differences: Vec<FieldDifference>,
        written: bool,
    },
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub key: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Per-key outcomes of one reconciliation run, in downstream file order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub outcomes: Vec<KeyOutcome>,
}

impl ReconcileReport {
    pub fn outcome(&self, key: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.key == key).map(|o| &o.outcome)
    }

    /// Number of records rewritten
    pub fn written(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                Outcome::DownstreamAhead { written: true } | Outcome::Diverged { written: true, .. }
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    pub fn needs_attention(&self) -> usize {
        self.count(|o| matches!(o, Outcome::UpstreamAhead { .. } | Outcome::Ambiguous { .. }))
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.outcome)).count()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Applies a downstream file to the record store
pub struct Reconciler<'a> {
    store: &'a RecordStore,
    config: &'a SyncConfig,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a RecordStore, config: &'a SyncConfig) -> Self {
        Self {
            store,
            config,
            dry_run: false,
        }
    }

    /// Classify and report without writing any record
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile against the text of a downstream file
    pub fn reconcile_str<S: DiagnosticSink>(&self, downstream: &str, sink: &mut S) -> Result<ReconcileReport> {
        let mapping: Mapping = if downstream.trim().is_empty() {
            Mapping::new()
        } else {
            serde_yaml::from_str(downstream).context("Failed to parse downstream YAML file")?
        };
        self.reconcile(&mapping, sink)
    }

    /// Reconcile every key of a parsed downstream file
    ///
    /// Problems with a single key are reported and recorded as
    /// [`Outcome::Failed`]; only a record without `---` framing aborts.
    pub fn reconcile<S: DiagnosticSink>(&self, downstream: &Mapping, sink: &mut S) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        for (key, value) in downstream {
            let Some(key) = key.as_str() else {
                let key = format!("{:?}", key);
                let outcome = self.fail(&key, "downstream key is not a string".to_string(), sink);
                report.outcomes.push(KeyOutcome { key, outcome });
                continue;
            };
            let outcome = self.reconcile_key(key, value, sink)?;
            report.outcomes.push(KeyOutcome {
                key: key.to_string(),
                outcome,
            });
        }
        Ok(report)
    }

    fn fail<S: DiagnosticSink>(&self, key: &str, reason: String, sink: &mut S) -> Outcome {
        sink.error(Some(key), format!("skipping: {}", reason));
        Outcome::Failed { reason }
    }

    fn reconcile_key<S: DiagnosticSink>(&self, key: &str, value: &Value, sink: &mut S) -> Result<Outcome> {
        if self.config.is_skipped(key) {
            sink.info(Some(key), "listed in skip_keys, leaving the record untouched");
            return Ok(Outcome::Skipped);
        }
        if TheoremKey::parse(key).is_none() {
            return Ok(self.fail(key, "downstream key is not a theorem key".to_string(), sink));
        }

        let downstream = match self.config.downstream_fields.read_entry(value) {
            Ok(entry) => entry,
            Err(e) => return Ok(self.fail(key, format!("malformed downstream entry: {}", e), sink)),
        };
        let candidate = candidate_from_downstream(&downstream);

        let content = match self.store.read(key) {
            Ok(content) => content,
            Err(e) => return Ok(self.fail(key, format!("{:#}", e), sink)),
        };
        let document = split_record(&content)
            .with_context(|| format!("Malformed record {}", self.store.path_for(key).display()))?;
        let record = match parse_theorem(&document) {
            Ok(record) => record,
            Err(e) => return Ok(self.fail(key, format!("invalid record: {}", e), sink)),
        };
        if let Some(problem) = misnamed_record(&record, key) {
            return Ok(self.fail(key, problem, sink));
        }

        let had_candidate = candidate.is_some();
        match classify(candidate, record.lean_entries()) {
            Classification::NoOp => {
                if had_candidate {
                    sink.info(Some(key), "Lean formalisations have the same data");
                }
                Ok(Outcome::NoOp)
            }
            Classification::UpstreamAhead { upstream_entries } => {
                sink.info(
                    Some(key),
                    format!(
                        "{} Lean formalisation(s) noted upstream, but none downstream",
                        upstream_entries
                    ),
                );
                Ok(Outcome::UpstreamAhead { upstream_entries })
            }
            Classification::Ambiguous { upstream_entries } => {
                sink.warning(
                    Some(key),
                    format!(
                        "one Lean formalisation downstream, but {} upstream; please update manually",
                        upstream_entries
                    ),
                );
                Ok(Outcome::Ambiguous { upstream_entries })
            }
            Classification::DownstreamAhead(entry) => {
                sink.info(Some(key), "new Lean formalisation found downstream, updating record");
                match self.overwrite(key, &document, &record, entry, sink) {
                    Ok(written) => Ok(Outcome::DownstreamAhead { written }),
                    Err(e) => Ok(self.fail(key, format!("{:#}", e), sink)),
                }
            }
            Classification::Diverged { entry, differences } => {
                for diff in &differences {
                    sink.warning(
                        Some(key),
                        format!(
                            "entries differ in field {}: downstream has {}, upstream has {}",
                            diff.field, diff.downstream, diff.upstream
                        ),
                    );
                }
                match self.overwrite(key, &document, &record, entry, sink) {
                    Ok(written) => Ok(Outcome::Diverged { differences, written }),
                    Err(e) => Ok(self.fail(key, format!("{:#}", e), sink)),
                }
            }
        }
    }

    /// Replace the record's `lean` field with `entry`, keeping everything else
    fn overwrite<S: DiagnosticSink>(
        &self,
        key: &str,
        document: &RecordDocument,
        record: &TheoremRecord,
        entry: FormalizationEntry,
        sink: &mut S,
    ) -> Result<bool> {
        // URLs are rebuilt from the key so they survive declaration renames.
        let entry = entry.with_url(self.config.canonical_url(key));

        let mut body: Mapping =
            serde_yaml::from_str(&document.body).context("Failed to re-read record body")?;
        body.insert(
            Value::from(ProofAssistant::Lean.record_key()),
            Value::Sequence(vec![entry.to_yaml()?]),
        );

        let title = derive_title(&record.wikipedia_links).unwrap_or_else(|| document.header_title.clone());
        let content = render_record(document.header_level, &title, &body)?;

        if self.dry_run {
            sink.info(Some(key), "dry run, record not written");
            return Ok(false);
        }
        self.store.write(key, &content)?;
        sink.info(
            Some(key),
            format!("overwrote {} with downstream data", self.store.path_for(key).display()),
        );
        Ok(true)
    }
}

// =============================================================================
// Tests
// =============================================================================
