//! Formalization Types
//!
//! Defines the typed view of one claimed formalization:
//! - `ProofAssistant`: the supported formal systems
//! - `FormalizationStatus` / `Library`: enums with short schema codes
//! - `PartialDate`: a year, year-month or full date
//! - `FormalizationEntry`: one formalization of one theorem

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Proof Assistants
// =============================================================================

/// Supported proof assistants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProofAssistant {
    Isabelle,
    HolLight,
    Coq,
    Lean,
    Metamath,
    Mizar,
}

impl ProofAssistant {
    /// All assistants, in record key order
    pub const ALL: [ProofAssistant; 6] = [
        ProofAssistant::Isabelle,
        ProofAssistant::HolLight,
        ProofAssistant::Coq,
        ProofAssistant::Lean,
        ProofAssistant::Metamath,
        ProofAssistant::Mizar,
    ];

    /// Top-level key holding this assistant's entries in a theorem record
    pub fn record_key(&self) -> &'static str {
        match self {
            ProofAssistant::Isabelle => "isabelle",
            ProofAssistant::HolLight => "hol_light",
            ProofAssistant::Coq => "coq",
            ProofAssistant::Lean => "lean",
            ProofAssistant::Metamath => "metamath",
            ProofAssistant::Mizar => "mizar",
        }
    }
}

// =============================================================================
// Status and Library Codecs
// =============================================================================

/// How much of a result has been formalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormalizationStatus {
    /// Only the statement is formalized
    Statement,
    /// Statement and proof are formalized
    FullProof,
}

impl FormalizationStatus {
    /// Decode a schema code; `None` for unknown codes
    pub fn decode(code: &str) -> Option<Self> {
        match code {
            "statement" => Some(FormalizationStatus::Statement),
            "formalized" => Some(FormalizationStatus::FullProof),
            _ => None,
        }
    }

    /// Schema code for this status
    pub fn encode(&self) -> &'static str {
        match self {
            FormalizationStatus::Statement => "statement",
            FormalizationStatus::FullProof => "formalized",
        }
    }
}

impl fmt::Display for FormalizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode())
    }
}

/// Where a formalization lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Library {
    /// The assistant's standard library ("S")
    StandardLibrary,
    /// The main mathematical library, e.g. mathlib or the AFP ("L")
    MainLibrary,
    /// A dedicated external project ("X")
    External,
}

impl Library {
    /// Decode a single-letter schema code; `None` for unknown codes
    pub fn decode(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Library::StandardLibrary),
            "L" => Some(Library::MainLibrary),
            "X" => Some(Library::External),
            _ => None,
        }
    }

    /// Single-letter schema code for this library tier
    pub fn encode(&self) -> &'static str {
        match self {
            Library::StandardLibrary => "S",
            Library::MainLibrary => "L",
            Library::External => "X",
        }
    }

    /// True for the standard and main library tiers
    pub fn is_library(&self) -> bool {
        !matches!(self, Library::External)
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode())
    }
}

// =============================================================================
// Partial Dates
// =============================================================================

/// Invalid partial date text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid date '{0}': expected YYYY, YYYY-MM or YYYY-MM-DD")]
pub struct InvalidDate(pub String);

/// A date known to year, month or day precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawDate")]
pub enum PartialDate {
    Year(i32),
    YearMonth(i32, u32),
    Day(NaiveDate),
}

/// YAML reads a bare year as an integer and everything else as a string
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Year(i64),
    Text(String),
}

impl TryFrom<RawDate> for PartialDate {
    type Error = InvalidDate;

    fn try_from(raw: RawDate) -> Result<Self, Self::Error> {
        match raw {
            RawDate::Year(year) => i32::try_from(year)
                .ok()
                .filter(|y| (0..=9999).contains(y))
                .map(PartialDate::Year)
                .ok_or_else(|| InvalidDate(year.to_string())),
            RawDate::Text(text) => text.parse(),
        }
    }
}

impl FromStr for PartialDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDate(s.to_string());
        let parts: Vec<&str> = s.trim().split('-').collect();
        let number = |part: &str, width: usize| -> Option<u32> {
            if part.len() == width && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().ok()
            } else {
                None
            }
        };

        match parts[..] {
            [y] => number(y, 4)
                .map(|y| PartialDate::Year(y as i32))
                .ok_or_else(invalid),
            [y, m] => {
                let year = number(y, 4).ok_or_else(invalid)? as i32;
                let month = number(m, 2).filter(|m| (1..=12).contains(m)).ok_or_else(invalid)?;
                Ok(PartialDate::YearMonth(year, month))
            }
            [y, m, d] => {
                let year = number(y, 4).ok_or_else(invalid)? as i32;
                let month = number(m, 2).ok_or_else(invalid)?;
                let day = number(d, 2).ok_or_else(invalid)?;
                NaiveDate::from_ymd_opt(year, month, day)
                    .map(PartialDate::Day)
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialDate::Year(y) => write!(f, "{:04}", y),
            PartialDate::YearMonth(y, m) => write!(f, "{:04}-{:02}", y, m),
            PartialDate::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for PartialDate {
    /// Years stay bare integers so rewritten records keep `date: 2019`
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PartialDate::Year(y) => serializer.serialize_i32(*y),
            other => serializer.collect_str(other),
        }
    }
}

// =============================================================================
// Formalization Entry
// =============================================================================

/// One claimed formalization of a theorem in one proof assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalizationEntry {
    pub status: FormalizationStatus,
    pub library: Library,
    pub url: Option<String>,
    pub authors: Option<Vec<String>>,
    /// Declaration names, in source order
    pub identifiers: Option<Vec<String>>,
    pub date: Option<PartialDate>,
    pub comment: Option<String>,
}

impl FormalizationEntry {
    pub fn new(status: FormalizationStatus, library: Library) -> Self {
        Self {
            status,
            library,
            url: None,
            authors: None,
            identifiers: None,
            date: None,
            comment: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_identifiers<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifiers = Some(identifiers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date(mut self, date: PartialDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Record sub-document for this entry, in README field order
    pub fn to_yaml(&self) -> serde_yaml::Result<serde_yaml::Value> {
        let mut map = serde_yaml::Mapping::new();
        map.insert("status".into(), self.status.encode().into());
        map.insert("library".into(), self.library.encode().into());
        if let Some(url) = &self.url {
            map.insert("url".into(), url.as_str().into());
        }
        if let Some(authors) = &self.authors {
            map.insert("authors".into(), serde_yaml::to_value(authors)?);
        }
        if let Some(identifiers) = &self.identifiers {
            map.insert("identifiers".into(), serde_yaml::to_value(identifiers)?);
        }
        if let Some(date) = &self.date {
            map.insert("date".into(), serde_yaml::to_value(date)?);
        }
        if let Some(comment) = &self.comment {
            map.insert("comment".into(), comment.as_str().into());
        }
        Ok(serde_yaml::Value::Mapping(map))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codec_roundtrip() {
        for status in [FormalizationStatus::Statement, FormalizationStatus::FullProof] {
            assert_eq!(FormalizationStatus::decode(status.encode()), Some(status));
        }
        assert_eq!(FormalizationStatus::decode("formalised"), None);
        assert_eq!(FormalizationStatus::decode(""), None);
    }

    #[test]
    fn test_library_codec_roundtrip() {
        for library in [Library::StandardLibrary, Library::MainLibrary, Library::External] {
            assert_eq!(Library::decode(library.encode()), Some(library));
        }
        assert_eq!(Library::decode("s"), None);
        assert_eq!(Library::decode("M"), None);
    }

    #[test]
    fn test_partial_date_parse() {
        assert_eq!("2019".parse::<PartialDate>(), Ok(PartialDate::Year(2019)));
        assert_eq!("2019-03".parse::<PartialDate>(), Ok(PartialDate::YearMonth(2019, 3)));
        assert_eq!(
            "2019-03-31".parse::<PartialDate>(),
            Ok(PartialDate::Day(NaiveDate::from_ymd_opt(2019, 3, 31).unwrap()))
        );
        assert!("2019-13".parse::<PartialDate>().is_err());
        assert!("2019-02-30".parse::<PartialDate>().is_err());
        assert!("19".parse::<PartialDate>().is_err());
        assert!("March 2019".parse::<PartialDate>().is_err());
    }

    #[test]
    fn test_partial_date_display() {
        assert_eq!(PartialDate::Year(2019).to_string(), "2019");
        assert_eq!(PartialDate::YearMonth(2019, 3).to_string(), "2019-03");
        assert_eq!("2021-07-04".parse::<PartialDate>().unwrap().to_string(), "2021-07-04");
    }

    #[test]
    fn test_partial_date_from_yaml() {
        let year: PartialDate = serde_yaml::from_str("2019").unwrap();
        assert_eq!(year, PartialDate::Year(2019));
        let month: PartialDate = serde_yaml::from_str("'2019-03'").unwrap();
        assert_eq!(month, PartialDate::YearMonth(2019, 3));
        assert!(serde_yaml::from_str::<PartialDate>("yesterday").is_err());
    }

    #[test]
    fn test_year_serializes_as_integer() {
        let value = serde_yaml::to_value(PartialDate::Year(2019)).unwrap();
        assert_eq!(value.as_i64(), Some(2019));
        let value = serde_yaml::to_value(PartialDate::YearMonth(2019, 3)).unwrap();
        assert_eq!(value.as_str(), Some("2019-03"));
    }

    #[test]
    fn test_entry_to_yaml_field_order() {
        let entry = FormalizationEntry::new(FormalizationStatus::FullProof, Library::MainLibrary)
            .with_url("https://example.org")
            .with_authors(["Ada", "Alan"])
            .with_comment("ported");
        let value = entry.to_yaml().unwrap();
        let keys: Vec<&str> = value
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["status", "library", "url", "authors", "comment"]);
    }
}
