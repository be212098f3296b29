//! Downstream aggregate schema
//!
//! The downstream file is one YAML mapping from theorem key to a small
//! document. Every field name of that document is looked up through
//! [`DownstreamFields`], so a rename on the downstream side is a config change.

use crate::models::formalization::PartialDate;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Field names used by the downstream schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownstreamFields {
    pub title: String,
    pub statement: String,
    pub decl: String,
    pub decls: String,
    pub url: String,
    pub authors: String,
    pub date: String,
    pub comment: String,
}

impl Default for DownstreamFields {
    fn default() -> Self {
        Self {
            title: "title".to_string(),
            statement: "statement".to_string(),
            decl: "decl".to_string(),
            decls: "decls".to_string(),
            url: "url".to_string(),
            authors: "authors".to_string(),
            date: "date".to_string(),
            comment: "comment".to_string(),
        }
    }
}

/// Malformed downstream entry
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("entry is not a mapping")]
    NotAMapping,

    #[error("field '{field}' must be {expected}")]
    WrongShape { field: String, expected: &'static str },

    #[error("field '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// What the downstream entry says about the formalization itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declarations {
    /// Only the statement is formalized, under these names
    Statement(Vec<String>),
    /// Fully formalized as a single declaration
    Decl(String),
    /// Fully formalized across several declarations
    Decls(Vec<String>),
    /// Formalized in an external project
    ExternalUrl(String),
}

/// One theorem's document in the downstream file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownstreamEntry {
    pub title: String,
    pub declarations: Option<Declarations>,
    /// Already joined with `" and "`
    pub authors: Option<String>,
    pub date: Option<PartialDate>,
    pub comment: Option<String>,
}

impl DownstreamFields {
    /// Serialize an entry; field order is title, declarations, authors, date, comment
    pub fn write_entry(&self, entry: &DownstreamEntry) -> serde_yaml::Result<Mapping> {
        let mut map = Mapping::new();
        map.insert(self.title.as_str().into(), entry.title.as_str().into());

        match &entry.declarations {
            Some(Declarations::Statement(names)) => {
                let value = match names.as_slice() {
                    [single] => Value::from(single.as_str()),
                    _ => serde_yaml::to_value(names)?,
                };
                map.insert(self.statement.as_str().into(), value);
            }
            Some(Declarations::Decl(name)) => {
                map.insert(self.decl.as_str().into(), name.as_str().into());
            }
            Some(Declarations::Decls(names)) => {
                map.insert(self.decls.as_str().into(), serde_yaml::to_value(names)?);
            }
            Some(Declarations::ExternalUrl(url)) => {
                map.insert(self.url.as_str().into(), url.as_str().into());
            }
            None => {}
        }

        if let Some(authors) = &entry.authors {
            map.insert(self.authors.as_str().into(), authors.as_str().into());
        }
        if let Some(date) = &entry.date {
            map.insert(self.date.as_str().into(), serde_yaml::to_value(date)?);
        }
        if let Some(comment) = &entry.comment {
            map.insert(self.comment.as_str().into(), comment.as_str().into());
        }
        Ok(map)
    }

    /// Read an entry back
    ///
    /// The declaration trigger keys are checked in priority order
    /// `statement`, then `decl`/`decls`, then `url`; the first present wins.
    pub fn read_entry(&self, value: &Value) -> Result<DownstreamEntry, DownstreamError> {
        let map = value.as_mapping().ok_or(DownstreamError::NotAMapping)?;

        let declarations = if let Some(v) = map.get(self.statement.as_str()) {
            Some(Declarations::Statement(self.names(&self.statement, v)?))
        } else if let Some(v) = map.get(self.decl.as_str()) {
            Some(Declarations::Decl(self.text(&self.decl, v)?))
        } else if let Some(v) = map.get(self.decls.as_str()) {
            Some(Declarations::Decls(self.names(&self.decls, v)?))
        } else if let Some(v) = map.get(self.url.as_str()) {
            Some(Declarations::ExternalUrl(self.text(&self.url, v)?))
        } else {
            None
        };

        let optional_text = |field: &str| -> Result<Option<String>, DownstreamError> {
            map.get(field).map(|v| self.text(field, v)).transpose()
        };

        let date = map
            .get(self.date.as_str())
            .map(|v| {
                serde_yaml::from_value::<PartialDate>(v.clone()).map_err(|source| {
                    DownstreamError::InvalidValue {
                        field: self.date.clone(),
                        source,
                    }
                })
            })
            .transpose()?;

        Ok(DownstreamEntry {
            title: optional_text(&self.title)?.unwrap_or_default(),
            declarations,
            authors: optional_text(&self.authors)?,
            date,
            comment: optional_text(&self.comment)?,
        })
    }

    fn text(&self, field: &str, value: &Value) -> Result<String, DownstreamError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DownstreamError::WrongShape {
                field: field.to_string(),
                expected: "a string",
            })
    }

    /// A single name or a list of names
    fn names(&self, field: &str, value: &Value) -> Result<Vec<String>, DownstreamError> {
        let wrong_shape = || DownstreamError::WrongShape {
            field: field.to_string(),
            expected: "a string or a list of strings",
        };
        match value {
            Value::String(name) => Ok(vec![name.clone()]),
            Value::Sequence(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(wrong_shape))
                .collect(),
            _ => Err(wrong_shape()),
        }
    }
}
