//! Theorem record parser
//!
//! Two passes: the YAML body is deserialized into loosely-typed raw structs,
//! then every field is validated and converted into a [`TheoremRecord`].
//! One bad formalization entry rejects the whole record.

use crate::models::formalization::{
    FormalizationEntry, FormalizationStatus, Library, PartialDate, ProofAssistant,
};
use crate::models::theorem::{is_valid_wikidata, TheoremRecord};
use crate::parser::frontmatter::{split_record, FramingError, RecordDocument};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a well-framed record was rejected
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid wikidata identifier '{0}': must be the letter 'Q' followed by a number")]
    InvalidWikidata(String),

    #[error("invalid id_suffix '{0}': must be a single character")]
    InvalidIdSuffix(String),

    #[error("{assistant} entry #{index}: unrecognized status '{code}'")]
    UnknownStatus {
        assistant: &'static str,
        index: usize,
        code: String,
    },

    #[error("{assistant} entry #{index}: unrecognized library '{code}'")]
    UnknownLibrary {
        assistant: &'static str,
        index: usize,
        code: String,
    },

    #[error("record body does not match the theorem schema: {0}")]
    Schema(#[from] serde_yaml::Error),
}

/// Failure to turn record text into a [`TheoremRecord`]
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Rejected(#[from] RecordError),
}

impl ParseError {
    /// Framing problems mean the caller handed us something that is not a
    /// record file at all; these abort a batch.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ParseError::Framing(_))
    }
}

/// Untyped formalization entry
#[derive(Debug, Clone, Deserialize)]
struct FormalizationEntryRaw {
    status: String,
    library: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    authors: Option<Vec<String>>,
    #[serde(default)]
    identifiers: Option<Vec<String>>,
    #[serde(default)]
    date: Option<PartialDate>,
    #[serde(default)]
    comment: Option<String>,
}

/// Untyped theorem record body
#[derive(Debug, Clone, Deserialize)]
struct TheoremRecordRaw {
    wikidata: String,
    #[serde(default)]
    id_suffix: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    msc_classification: String,
    wikipedia_links: Vec<String>,
    #[serde(default)]
    isabelle: Option<Vec<FormalizationEntryRaw>>,
    #[serde(default)]
    hol_light: Option<Vec<FormalizationEntryRaw>>,
    #[serde(default, alias = "rocq")]
    coq: Option<Vec<FormalizationEntryRaw>>,
    #[serde(default)]
    lean: Option<Vec<FormalizationEntryRaw>>,
    #[serde(default)]
    metamath: Option<Vec<FormalizationEntryRaw>>,
    #[serde(default)]
    mizar: Option<Vec<FormalizationEntryRaw>>,
}

impl TheoremRecordRaw {
    fn take(&mut self, assistant: ProofAssistant) -> Option<Vec<FormalizationEntryRaw>> {
        match assistant {
            ProofAssistant::Isabelle => self.isabelle.take(),
            ProofAssistant::HolLight => self.hol_light.take(),
            ProofAssistant::Coq => self.coq.take(),
            ProofAssistant::Lean => self.lean.take(),
            ProofAssistant::Metamath => self.metamath.take(),
            ProofAssistant::Mizar => self.mizar.take(),
        }
    }
}

/// MSC codes like `11` are read by YAML as numbers
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
    })
}

fn non_empty(list: Option<Vec<String>>) -> Option<Vec<String>> {
    list.filter(|items| !items.is_empty())
}

fn parse_entry(
    assistant: ProofAssistant,
    index: usize,
    raw: FormalizationEntryRaw,
) -> Result<FormalizationEntry, RecordError> {
    let status =
        FormalizationStatus::decode(&raw.status).ok_or_else(|| RecordError::UnknownStatus {
            assistant: assistant.record_key(),
            index,
            code: raw.status.clone(),
        })?;
    let library = Library::decode(&raw.library).ok_or_else(|| RecordError::UnknownLibrary {
        assistant: assistant.record_key(),
        index,
        code: raw.library.clone(),
    })?;

    Ok(FormalizationEntry {
        status,
        library,
        url: raw.url,
        authors: non_empty(raw.authors),
        identifiers: non_empty(raw.identifiers),
        date: raw.date,
        comment: raw.comment,
    })
}

/// Validate a framed record into a [`TheoremRecord`]
pub fn parse_theorem(document: &RecordDocument) -> Result<TheoremRecord, RecordError> {
    let mut raw: TheoremRecordRaw = serde_yaml::from_str(&document.body)?;

    if !is_valid_wikidata(&raw.wikidata) {
        return Err(RecordError::InvalidWikidata(raw.wikidata));
    }

    let id_suffix = match raw.id_suffix.take() {
        None => None,
        Some(suffix) if suffix.trim().is_empty() => None,
        Some(suffix) => {
            let mut chars = suffix.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => return Err(RecordError::InvalidIdSuffix(suffix)),
            }
        }
    };

    let mut formalizations = BTreeMap::new();
    for assistant in ProofAssistant::ALL {
        let entries = raw
            .take(assistant)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(assistant, index, entry))
            .collect::<Result<Vec<_>, _>>()?;
        formalizations.insert(assistant, entries);
    }

    Ok(TheoremRecord {
        wikidata: raw.wikidata,
        id_suffix,
        msc_classification: raw.msc_classification,
        wikipedia_links: raw.wikipedia_links,
        formalizations,
    })
}

/// Frame and validate record text in one step
pub fn parse_record(content: &str) -> Result<TheoremRecord, ParseError> {
    let document = split_record(content)?;
    Ok(parse_theorem(&document)?)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHAGORAS: &str = r#"---
# Pythagorean theorem

wikidata: Q11518
msc_classification: "51"
wikipedia_links:
  - "[[Pythagorean theorem]]"
isabelle:
  - status: formalized
    library: L
    url: https://www.isa-afp.org/entries/Pythagoras.html
lean:
  - status: formalized
    library: L
    url: https://leanprover-community.github.io/1000.html#Q11518
    authors:
      - Joseph Myers
    identifiers:
      - EuclideanGeometry.dist_sq_eq_dist_sq_add_dist_sq_iff_angle_eq_pi_div_two
    date: 2019
---
"#;

    #[test]
    fn test_parse_valid_record() {
        let record = parse_record(PYTHAGORAS).unwrap();
        assert_eq!(record.wikidata, "Q11518");
        assert_eq!(record.id_suffix, None);
        assert_eq!(record.msc_classification, "51");
        assert_eq!(record.wikipedia_links, vec!["[[Pythagorean theorem]]"]);

        let lean = record.lean_entries();
        assert_eq!(lean.len(), 1);
        assert_eq!(lean[0].status, FormalizationStatus::FullProof);
        assert_eq!(lean[0].library, Library::MainLibrary);
        assert_eq!(lean[0].authors, Some(vec!["Joseph Myers".to_string()]));
        assert_eq!(lean[0].date, Some(PartialDate::Year(2019)));
        assert_eq!(record.entries(ProofAssistant::Isabelle).len(), 1);
    }

    #[test]
    fn test_absent_assistants_are_empty_lists() {
        let record = parse_record(PYTHAGORAS).unwrap();
        for assistant in ProofAssistant::ALL {
            assert!(record.formalizations.contains_key(&assistant));
        }
        assert!(record.entries(ProofAssistant::Mizar).is_empty());
        assert!(record.entries(ProofAssistant::Coq).is_empty());
    }

    #[test]
    fn test_numeric_msc_and_suffix() {
        let content = "---\n# T\nwikidata: Q42\nid_suffix: X\nmsc_classification: 11\nwikipedia_links: ['[[T]]']\n---\n";
        let record = parse_record(content).unwrap();
        assert_eq!(record.msc_classification, "11");
        assert_eq!(record.id_suffix, Some('X'));
        assert_eq!(record.key().to_string(), "Q42X");
    }

    #[test]
    fn test_rocq_alias() {
        let content = "---\n# T\nwikidata: Q42\nmsc_classification: '11'\nwikipedia_links: ['[[T]]']\nrocq:\n  - status: statement\n    library: X\n    url: https://example.org\n---\n";
        let record = parse_record(content).unwrap();
        assert_eq!(record.entries(ProofAssistant::Coq).len(), 1);
    }

    #[test]
    fn test_invalid_wikidata_rejected() {
        let content = PYTHAGORAS.replace("wikidata: Q11518", "wikidata: P11518");
        let err = parse_record(&content).unwrap_err();
        assert!(!err.is_contract_violation());
        assert!(matches!(err, ParseError::Rejected(RecordError::InvalidWikidata(_))));
    }

    #[test]
    fn test_unknown_status_rejects_whole_record() {
        let content = PYTHAGORAS.replacen("status: formalized", "status: proven", 1);
        let err = parse_record(&content).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Rejected(RecordError::UnknownStatus { assistant: "isabelle", .. })
        ));
    }

    #[test]
    fn test_unknown_library_rejects_whole_record() {
        let content = PYTHAGORAS.replace("library: L\n    url: https://leanprover", "library: M\n    url: https://leanprover");
        let err = parse_record(&content).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Rejected(RecordError::UnknownLibrary { assistant: "lean", .. })
        ));
    }

    #[test]
    fn test_missing_required_key_rejected() {
        let content = "---\n# T\nwikidata: Q42\nwikipedia_links: ['[[T]]']\n---\n";
        assert!(matches!(
            parse_record(content),
            Err(ParseError::Rejected(RecordError::Schema(_)))
        ));
    }

    #[test]
    fn test_long_suffix_rejected() {
        let content = "---\n# T\nwikidata: Q42\nid_suffix: XY\nmsc_classification: '11'\nwikipedia_links: ['[[T]]']\n---\n";
        assert!(matches!(
            parse_record(content),
            Err(ParseError::Rejected(RecordError::InvalidIdSuffix(_)))
        ));
    }

    #[test]
    fn test_empty_suffix_is_none() {
        for suffix in ["''", "' '"] {
            let content = format!(
                "---\n# T\nwikidata: Q42\nid_suffix: {}\nmsc_classification: '11'\nwikipedia_links: ['[[T]]']\n---\n",
                suffix
            );
            let record = parse_record(&content).unwrap();
            assert_eq!(record.id_suffix, None);
            assert_eq!(record.key().to_string(), "Q42");
        }
    }

    #[test]
    fn test_framing_is_contract_violation() {
        let err = parse_record("wikidata: Q42\n").unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_empty_identifier_list_normalized() {
        let content = "---\n# T\nwikidata: Q42\nmsc_classification: '11'\nwikipedia_links: ['[[T]]']\nlean:\n  - status: statement\n    library: L\n    identifiers: []\n---\n";
        let record = parse_record(content).unwrap();
        assert_eq!(record.lean_entries()[0].identifiers, None);
        assert_eq!(record.lean_entries()[0].url, None);
    }
}
