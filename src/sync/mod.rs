//! Bidirectional sync between theorem records and the downstream file
//!
//! - [`projector`]: records → downstream aggregate file
//! - [`reconcile`]: downstream aggregate file → records
//! - [`check`]: record store consistency

pub mod check;
pub mod projector;
pub mod reconcile;

pub use check::{check_records, misnamed_record, CheckSummary};
pub use projector::{
    generate_downstream, project, render_downstream, select_entry, DownstreamSummary, Selection,
};
pub use reconcile::{
    candidate_from_downstream, classify, Classification, FieldDifference, KeyOutcome, Outcome,
    ReconcileReport, Reconciler,
};
