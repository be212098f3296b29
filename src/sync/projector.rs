//! Downstream projection
//!
//! Collapses each theorem's Lean entries to at most one downstream entry and
//! renders the aggregate file in numeric wikidata order.

use crate::diagnostics::DiagnosticSink;
use crate::models::downstream::{Declarations, DownstreamEntry, DownstreamFields};
use crate::models::formalization::{FormalizationEntry, FormalizationStatus, Library};
use crate::models::theorem::{compare_wikidata, TheoremRecord};
use crate::parser::record::parse_record;
use crate::parser::wikilink::derive_title;
use crate::services::RecordStore;
use crate::Result;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;

/// Library tiers, most preferred first
const LIBRARY_PRIORITY: [Library; 2] = [Library::StandardLibrary, Library::MainLibrary];

/// The entry chosen to represent a theorem downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Hosted in the standard or main library
    Library(&'a FormalizationEntry),
    /// Only external formalizations exist
    External(&'a FormalizationEntry),
}

impl<'a> Selection<'a> {
    pub fn entry(&self) -> &'a FormalizationEntry {
        match *self {
            Selection::Library(entry) | Selection::External(entry) => entry,
        }
    }
}

/// Pick the entry to project: first standard library entry, else first main
/// library entry, else the first (external) entry
pub fn select_entry(entries: &[FormalizationEntry]) -> Option<Selection<'_>> {
    for tier in LIBRARY_PRIORITY {
        if let Some(entry) = entries.iter().find(|e| e.library == tier) {
            return Some(Selection::Library(entry));
        }
    }

    let fallback = entries.first()?;
    match fallback.library {
        Library::External => Some(Selection::External(fallback)),
        tier => unreachable!("library tier {tier} survived the priority scan"),
    }
}

/// Downstream declaration fields for a library-hosted entry
fn declarations_for(entry: &FormalizationEntry) -> Option<Declarations> {
    let identifiers = entry.identifiers.as_ref()?;
    match (entry.status, identifiers.as_slice()) {
        (_, []) => None,
        (FormalizationStatus::Statement, names) => Some(Declarations::Statement(names.to_vec())),
        (FormalizationStatus::FullProof, [single]) => Some(Declarations::Decl(single.clone())),
        (FormalizationStatus::FullProof, names) => Some(Declarations::Decls(names.to_vec())),
    }
}

/// Project one theorem to its downstream entry
pub fn project<S: DiagnosticSink>(record: &TheoremRecord, sink: &mut S) -> DownstreamEntry {
    let key = record.key().to_string();
    let title = derive_title(&record.wikipedia_links).unwrap_or_else(|| {
        sink.warning(Some(&key), "no wikipedia links, emitting an empty title");
        String::new()
    });
    let mut projected = DownstreamEntry {
        title,
        ..Default::default()
    };

    let lean = record.lean_entries();
    if lean.len() > 1 {
        sink.warning(
            Some(&key),
            format!(
                "{} Lean formalisations found, only the highest-priority one is exported",
                lean.len()
            ),
        );
    }

    let Some(selection) = select_entry(lean) else {
        return projected;
    };

    // External URLs are owned downstream: regenerating must not clobber them.
    if let Selection::Library(entry) = selection {
        projected.declarations = declarations_for(entry);
        if projected.declarations.is_none() {
            sink.warning(
                Some(&key),
                format!(
                    "{} library formalisation has no declaration identifiers",
                    entry.library
                ),
            );
        }
    }

    let chosen = selection.entry();
    projected.authors = chosen.authors.as_ref().map(|authors| authors.join(" and "));
    projected.date = chosen.date;
    projected.comment = chosen.comment.clone();
    projected
}

/// Render the aggregate downstream file
///
/// Records are ordered by the numeric value of their wikidata identifier;
/// ties keep their input order. A repeated key keeps its first record.
pub fn render_downstream<S: DiagnosticSink>(
    records: &[TheoremRecord],
    fields: &DownstreamFields,
    sink: &mut S,
) -> Result<String> {
    let mut ordered: Vec<&TheoremRecord> = records.iter().collect();
    ordered.sort_by(|a, b| compare_wikidata(&a.wikidata, &b.wikidata));

    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(ordered.len());
    for record in ordered {
        let key = record.key().to_string();
        if !seen.insert(key.clone()) {
            sink.warning(Some(&key), "duplicate theorem key, keeping the first record");
            continue;
        }

        let entry = project(record, sink);
        let mut document = Mapping::new();
        document.insert(Value::from(key), Value::Mapping(fields.write_entry(&entry)?));
        documents.push(serde_yaml::to_string(&document)?);
    }

    Ok(documents.join("\n"))
}

/// Outcome of generating the downstream file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamSummary {
    pub content: String,
    pub projected: usize,
    pub rejected: usize,
}

/// Parse every record in the store and render the downstream file
///
/// Rejected records are reported and left out. A record that is not framed
/// as a record at all aborts the run.
pub fn generate_downstream<S: DiagnosticSink>(
    store: &RecordStore,
    fields: &DownstreamFields,
    sink: &mut S,
) -> Result<DownstreamSummary> {
    let mut records = Vec::new();
    let mut rejected = 0;

    for key in store.list_keys()? {
        let content = match store.read(&key) {
            Ok(content) => content,
            Err(e) => {
                sink.error(Some(&key), format!("{:#}", e));
                rejected += 1;
                continue;
            }
        };
        match parse_record(&content) {
            Ok(record) => records.push(record),
            Err(e) if e.is_contract_violation() => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Malformed record {}", store.path_for(&key).display())));
            }
            Err(e) => {
                sink.warning(
                    Some(&key),
                    format!("{} contains invalid input, ignoring: {}", store.path_for(&key).display(), e),
                );
                rejected += 1;
            }
        }
    }

    let content = render_downstream(&records, fields, sink)?;
    Ok(DownstreamSummary {
        content,
        projected: records.len(),
        rejected,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Level};
    use crate::models::formalization::{PartialDate, ProofAssistant};
    use std::collections::BTreeMap;

    fn record(wikidata: &str, link: &str, lean: Vec<FormalizationEntry>) -> TheoremRecord {
        let mut formalizations = BTreeMap::new();
        for assistant in ProofAssistant::ALL {
            formalizations.insert(assistant, Vec::new());
        }
        formalizations.insert(ProofAssistant::Lean, lean);
        TheoremRecord {
            wikidata: wikidata.to_string(),
            id_suffix: None,
            msc_classification: "11".to_string(),
            wikipedia_links: vec![link.to_string()],
            formalizations,
        }
    }

    fn entry(status: FormalizationStatus, library: Library) -> FormalizationEntry {
        FormalizationEntry::new(status, library).with_url("https://example.org")
    }

    #[test]
    fn test_select_prefers_standard_library() {
        let entries = vec![
            entry(FormalizationStatus::FullProof, Library::External),
            entry(FormalizationStatus::Statement, Library::MainLibrary),
            entry(FormalizationStatus::FullProof, Library::StandardLibrary),
        ];
        let selected = select_entry(&entries).unwrap();
        assert_eq!(selected, Selection::Library(&entries[2]));

        let mut reversed = entries.clone();
        reversed.reverse();
        assert_eq!(select_entry(&reversed), Some(Selection::Library(&reversed[0])));
    }

    #[test]
    fn test_select_main_library_over_external() {
        let entries = vec![
            entry(FormalizationStatus::FullProof, Library::External),
            entry(FormalizationStatus::Statement, Library::MainLibrary),
        ];
        assert_eq!(select_entry(&entries), Some(Selection::Library(&entries[1])));
    }

    #[test]
    fn test_select_external_fallback() {
        let entries = vec![
            entry(FormalizationStatus::Statement, Library::External),
            entry(FormalizationStatus::FullProof, Library::External),
        ];
        assert_eq!(select_entry(&entries), Some(Selection::External(&entries[0])));
        assert_eq!(select_entry(&[]), None);
    }

    #[test]
    fn test_project_empty_list_title_only() {
        let mut sink = CollectingSink::new();
        let projected = project(&record("Q1", "[[Pythagorean theorem]]", vec![]), &mut sink);
        assert_eq!(
            projected,
            DownstreamEntry {
                title: "Pythagorean theorem".to_string(),
                ..Default::default()
            }
        );
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn test_project_decl_and_metadata() {
        let lean = vec![entry(FormalizationStatus::FullProof, Library::MainLibrary)
            .with_identifiers(["Nat.exists_infinite_primes"])
            .with_authors(["Ada", "Alan"])
            .with_date(PartialDate::YearMonth(2020, 1))
            .with_comment("short")];
        let mut sink = CollectingSink::new();
        let projected = project(&record("Q1", "[[Euclid's theorem]]", lean), &mut sink);

        assert_eq!(
            projected.declarations,
            Some(Declarations::Decl("Nat.exists_infinite_primes".to_string()))
        );
        assert_eq!(projected.authors.as_deref(), Some("Ada and Alan"));
        assert_eq!(projected.date, Some(PartialDate::YearMonth(2020, 1)));
        assert_eq!(projected.comment.as_deref(), Some("short"));
    }

    #[test]
    fn test_project_statement_and_decls() {
        let mut sink = CollectingSink::new();
        let statement = vec![entry(FormalizationStatus::Statement, Library::MainLibrary)
            .with_identifiers(["FermatLastTheorem"])];
        assert_eq!(
            project(&record("Q1", "[[T theorem]]", statement), &mut sink).declarations,
            Some(Declarations::Statement(vec!["FermatLastTheorem".to_string()]))
        );

        let decls = vec![entry(FormalizationStatus::FullProof, Library::StandardLibrary)
            .with_identifiers(["a", "b"])];
        assert_eq!(
            project(&record("Q1", "[[T theorem]]", decls), &mut sink).declarations,
            Some(Declarations::Decls(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_project_library_without_identifiers_warns() {
        let mut sink = CollectingSink::new();
        let lean = vec![entry(FormalizationStatus::FullProof, Library::MainLibrary)];
        let projected = project(&record("Q5", "[[T theorem]]", lean), &mut sink);
        assert_eq!(projected.declarations, None);
        assert_eq!(sink.count(Level::Warning), 1);
        assert_eq!(sink.diagnostics[0].key.as_deref(), Some("Q5"));
    }

    #[test]
    fn test_project_external_omits_url() {
        let mut sink = CollectingSink::new();
        let lean = vec![entry(FormalizationStatus::FullProof, Library::External)
            .with_identifiers(["x"])
            .with_authors(["Ada"])];
        let projected = project(&record("Q5", "[[T theorem]]", lean), &mut sink);
        assert_eq!(projected.declarations, None);
        assert_eq!(projected.authors.as_deref(), Some("Ada"));
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn test_project_several_entries_warns() {
        let mut sink = CollectingSink::new();
        let lean = vec![
            entry(FormalizationStatus::FullProof, Library::External).with_authors(["Ext"]),
            entry(FormalizationStatus::FullProof, Library::MainLibrary)
                .with_identifiers(["m"])
                .with_authors(["Main"]),
        ];
        let projected = project(&record("Q5", "[[T theorem]]", lean), &mut sink);
        assert_eq!(projected.declarations, Some(Declarations::Decl("m".to_string())));
        assert_eq!(projected.authors.as_deref(), Some("Main"));
        assert_eq!(sink.count(Level::Warning), 1);
    }

    #[test]
    fn test_render_numeric_order() {
        let records = vec![
            record("Q100", "[[Hundred theorem]]", vec![]),
            record("Q9", "[[Nine theorem]]", vec![]),
            record("Q42", "[[Answer theorem]]", vec![]),
        ];
        let mut sink = CollectingSink::new();
        let rendered = render_downstream(&records, &DownstreamFields::default(), &mut sink).unwrap();
        assert_eq!(
            rendered,
            "Q9:\n  title: Nine theorem\n\nQ42:\n  title: Answer theorem\n\nQ100:\n  title: Hundred theorem\n"
        );
    }

    #[test]
    fn test_render_duplicate_key_keeps_first() {
        let records = vec![
            record("Q9", "[[First theorem]]", vec![]),
            record("Q9", "[[Second theorem]]", vec![]),
        ];
        let mut sink = CollectingSink::new();
        let rendered = render_downstream(&records, &DownstreamFields::default(), &mut sink).unwrap();
        assert!(rendered.contains("First theorem"));
        assert!(!rendered.contains("Second theorem"));
        assert_eq!(sink.count(Level::Warning), 1);
    }
}
