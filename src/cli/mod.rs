//! CLI commands

pub mod check;
pub mod downstream;
pub mod upstream;
