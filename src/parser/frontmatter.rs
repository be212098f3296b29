//! Delimited record framing
//!
//! A theorem record is a YAML document wrapped in `---` lines whose first
//! line is a markdown heading used as a title comment:
//!
//! ```text
//! ---
//! # Pythagorean theorem
//!
//! wikidata: Q11518
//! ...
//! ---
//! ```
//!
//! Content is normalized first:
//! - BOM (Byte Order Mark) stripping
//! - Line ending normalization (CRLF → LF)

use thiserror::Error;

const DELIMITER: &str = "---";

/// The record does not have the `---` / heading / `---` shape
///
/// Record files come from a trusted enumeration, so this is a contract
/// violation rather than bad data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("record must start with a '---' line")]
    MissingOpening,

    #[error("record must end with a '---' line")]
    MissingClosing,

    #[error("second line of a record must be a '# ' or '## ' title comment, found {0:?}")]
    MissingHeader(String),
}

/// Heading level of the title comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderLevel {
    #[default]
    Section,
    Subsection,
}

impl HeaderLevel {
    pub fn marker(&self) -> &'static str {
        match self {
            HeaderLevel::Section => "#",
            HeaderLevel::Subsection => "##",
        }
    }
}

/// A framed record, split into its title comment and YAML body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDocument {
    pub header_level: HeaderLevel,
    /// Title text from the header comment (informational only)
    pub header_title: String,
    /// Everything between the delimiters, header comment included
    pub body: String,
}

/// Normalize content: strip BOM, normalize line endings
pub fn normalize_content(content: &str) -> String {
    let s = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split a record into header and body, checking the framing
pub fn split_record(content: &str) -> Result<RecordDocument, FramingError> {
    let normalized = normalize_content(content);
    let lines: Vec<&str> = normalized.lines().collect();

    if lines.first().map(|l| l.trim_end()) != Some(DELIMITER) {
        return Err(FramingError::MissingOpening);
    }
    if lines.len() < 3 || lines.last().map(|l| l.trim_end()) != Some(DELIMITER) {
        return Err(FramingError::MissingClosing);
    }

    let header = lines[1];
    let (header_level, header_title) = if let Some(title) = header.strip_prefix("## ") {
        (HeaderLevel::Subsection, title)
    } else if let Some(title) = header.strip_prefix("# ") {
        (HeaderLevel::Section, title)
    } else {
        return Err(FramingError::MissingHeader(header.to_string()));
    };

    let mut body = lines[1..lines.len() - 1].join("\n");
    body.push('\n');

    Ok(RecordDocument {
        header_level,
        header_title: header_title.trim().to_string(),
        body,
    })
}

/// Render a record from a title and a YAML body mapping
pub fn render_record(
    header_level: HeaderLevel,
    title: &str,
    body: &serde_yaml::Mapping,
) -> serde_yaml::Result<String> {
    let yaml = serde_yaml::to_string(body)?;
    Ok(format!(
        "{DELIMITER}\n{} {}\n\n{}{DELIMITER}\n",
        header_level.marker(),
        title,
        yaml
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_record() {
        let content = "---\n# Pythagorean theorem\n\nwikidata: Q11518\n---\n";
        let doc = split_record(content).unwrap();
        assert_eq!(doc.header_level, HeaderLevel::Section);
        assert_eq!(doc.header_title, "Pythagorean theorem");
        assert_eq!(doc.body, "# Pythagorean theorem\n\nwikidata: Q11518\n");
    }

    #[test]
    fn test_split_subsection_header() {
        let doc = split_record("---\n## Extra\nwikidata: Q1\n---").unwrap();
        assert_eq!(doc.header_level, HeaderLevel::Subsection);
        assert_eq!(doc.header_title, "Extra");
    }

    #[test]
    fn test_normalize_bom_and_crlf() {
        let content = "\u{FEFF}---\r\n# T\r\nwikidata: Q1\r\n---\r\n";
        let doc = split_record(content).unwrap();
        assert!(!doc.body.contains('\r'));
        assert_eq!(doc.header_title, "T");
    }

    #[test]
    fn test_trailing_whitespace_on_delimiters() {
        assert!(split_record("--- \n# T\nwikidata: Q1\n---\t\n").is_ok());
    }

    #[test]
    fn test_missing_opening() {
        assert_eq!(
            split_record("# T\nwikidata: Q1\n---\n"),
            Err(FramingError::MissingOpening)
        );
    }

    #[test]
    fn test_missing_closing() {
        assert_eq!(
            split_record("---\n# T\nwikidata: Q1\n"),
            Err(FramingError::MissingClosing)
        );
        assert_eq!(split_record("---\n"), Err(FramingError::MissingClosing));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            split_record("---\nwikidata: Q1\n---\n"),
            Err(FramingError::MissingHeader(_))
        ));
        assert!(matches!(
            split_record("---\n#NoSpace\nwikidata: Q1\n---\n"),
            Err(FramingError::MissingHeader(_))
        ));
    }

    #[test]
    fn test_render_record() {
        let mut body = serde_yaml::Mapping::new();
        body.insert("wikidata".into(), "Q1".into());
        let rendered = render_record(HeaderLevel::Subsection, "One", &body).unwrap();
        assert_eq!(rendered, "---\n## One\n\nwikidata: Q1\n---\n");

        let doc = split_record(&rendered).unwrap();
        assert_eq!(doc.header_level, HeaderLevel::Subsection);
    }
}
