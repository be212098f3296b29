//! `thmsync check`: validate every theorem record

use crate::context::ProjectContext;
use crate::diagnostics::ConsoleSink;
use crate::sync::check_records;
use crate::Result;
use colored::Colorize;

pub fn run(context: &ProjectContext, quiet: bool) -> Result<()> {
    let mut sink = ConsoleSink::new(quiet);
    let summary = check_records(&context.store, &mut sink)?;

    if summary.is_clean() {
        println!(
            "{}",
            format!("✅ {} record(s) checked, no problems found", summary.valid).green()
        );
        return Ok(());
    }

    anyhow::bail!(
        "{} rejected, {} misnamed, {} duplicated record(s)",
        summary.rejected,
        summary.misnamed,
        summary.duplicates
    )
}
