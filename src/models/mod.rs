pub mod config;
pub mod downstream;
pub mod formalization;
pub mod theorem;

pub use config::SyncConfig;
pub use downstream::{Declarations, DownstreamEntry, DownstreamError, DownstreamFields};
pub use formalization::{
    FormalizationEntry, FormalizationStatus, Library, PartialDate, ProofAssistant,
};
pub use theorem::{compare_wikidata, is_valid_wikidata, TheoremKey, TheoremRecord};
