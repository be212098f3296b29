//! Service layer for thmsync
//!
//! File-system collaborators shared by the sync engine and CLI commands.

pub mod record_store;

pub use record_store::RecordStore;
