//! Theorem record model

use crate::models::formalization::{FormalizationEntry, ProofAssistant};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Check that `input` is the letter `Q` followed by one or more digits
pub fn is_valid_wikidata(input: &str) -> bool {
    input
        .strip_prefix('Q')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Compare two valid wikidata identifiers by their numeric value
///
/// Works on the digit strings directly, so arbitrarily long identifiers
/// cannot overflow.
pub fn compare_wikidata(a: &str, b: &str) -> Ordering {
    let digits = |s: &str| s.trim_start_matches('Q').trim_start_matches('0').to_string();
    let (a, b) = (digits(a), digits(b));
    a.len().cmp(&b.len()).then_with(|| a.cmp(&b))
}

/// Join key between the record store and the downstream file: wikidata + id suffix
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TheoremKey {
    pub wikidata: String,
    pub id_suffix: Option<char>,
}

impl TheoremKey {
    pub fn new(wikidata: impl Into<String>, id_suffix: Option<char>) -> Self {
        Self {
            wikidata: wikidata.into(),
            id_suffix,
        }
    }

    /// Parse a composite key such as `Q42` or `Q42X`
    ///
    /// The suffix, when present, is a single ASCII letter.
    pub fn parse(input: &str) -> Option<Self> {
        let (wikidata, id_suffix) = match input.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => (&input[..input.len() - 1], Some(c)),
            _ => (input, None),
        };
        is_valid_wikidata(wikidata).then(|| Self::new(wikidata, id_suffix))
    }
}

impl fmt::Display for TheoremKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wikidata)?;
        if let Some(suffix) = self.id_suffix {
            write!(f, "{}", suffix)?;
        }
        Ok(())
    }
}

/// All metadata about one theorem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoremRecord {
    /// Wikidata identifier, `Q` followed by digits
    pub wikidata: String,
    /// `X` for an extra theorem on a page, `A`/`B`/... for pages without a main theorem
    pub id_suffix: Option<char>,
    /// Best-guess MSC classification, not validated
    pub msc_classification: String,
    /// Wiki links; the first one names the theorem
    pub wikipedia_links: Vec<String>,
    /// Entries per assistant; every assistant has a (possibly empty) list
    pub formalizations: BTreeMap<ProofAssistant, Vec<FormalizationEntry>>,
}

impl TheoremRecord {
    pub fn key(&self) -> TheoremKey {
        TheoremKey::new(self.wikidata.clone(), self.id_suffix)
    }

    pub fn entries(&self, assistant: ProofAssistant) -> &[FormalizationEntry] {
        self.formalizations
            .get(&assistant)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lean_entries(&self) -> &[FormalizationEntry] {
        self.entries(ProofAssistant::Lean)
    }
}
