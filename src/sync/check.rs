//! Record store consistency check
//!
//! Parses every record and reports rejections, records whose key disagrees
//! with their file name, and keys used by more than one record.

use crate::diagnostics::DiagnosticSink;
use crate::models::theorem::TheoremRecord;
use crate::parser::record::parse_record;
use crate::services::RecordStore;
use crate::Result;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub valid: usize,
    pub rejected: usize,
    pub misnamed: usize,
    pub duplicates: usize,
}

impl CheckSummary {
    pub fn is_clean(&self) -> bool {
        self.rejected == 0 && self.misnamed == 0 && self.duplicates == 0
    }
}

/// Describe a record whose declared key disagrees with its file name
pub fn misnamed_record(record: &TheoremRecord, file_key: &str) -> Option<String> {
    let key = record.key().to_string();
    (key != file_key).then(|| format!("record declares key {} but is stored as {}.md", key, file_key))
}

/// Check every record in the store
///
/// Unlike the sync commands, badly framed records are reported here rather
/// than aborting, since finding them is the point of the check.
pub fn check_records<S: DiagnosticSink>(store: &RecordStore, sink: &mut S) -> Result<CheckSummary> {
    let mut summary = CheckSummary::default();
    let mut owners: HashMap<String, String> = HashMap::new();

    for file_key in store.list_keys()? {
        let parsed = store
            .read(&file_key)
            .and_then(|content| parse_record(&content).map_err(anyhow::Error::new));
        let record = match parsed {
            Ok(record) => record,
            Err(e) => {
                sink.error(Some(&file_key), format!("{:#}", e));
                summary.rejected += 1;
                continue;
            }
        };

        summary.valid += 1;
        if let Some(problem) = misnamed_record(&record, &file_key) {
            sink.error(Some(&file_key), problem);
            summary.misnamed += 1;
        }
        let key = record.key().to_string();
        if let Some(first) = owners.get(&key) {
            sink.error(
                Some(&key),
                format!("key is used by both {}.md and {}.md", first, file_key),
            );
            summary.duplicates += 1;
        } else {
            owners.insert(key, file_key);
        }
    }

    Ok(summary)
}
