//! `thmsync downstream`: regenerate the aggregate downstream file

use crate::context::ProjectContext;
use crate::diagnostics::{ConsoleSink, DiagnosticSink};
use crate::sync::generate_downstream;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

pub fn run(context: &ProjectContext, output: Option<&Path>, quiet: bool) -> Result<()> {
    let mut sink = ConsoleSink::new(quiet);
    let output = context.resolve(output.unwrap_or(context.config.downstream_file.as_path()));

    let summary = generate_downstream(&context.store, &context.config.downstream_fields, &mut sink)?;
    std::fs::write(&output, &summary.content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    sink.info(
        None,
        format!(
            "{} theorem(s) projected, {} record(s) ignored",
            summary.projected, summary.rejected
        ),
    );
    println!("{}", format!("✅ Wrote {}", output.display()).green());
    if sink.warning_count() > 0 {
        println!(
            "{}",
            format!("⚠️  {} warning(s), see above", sink.warning_count()).yellow()
        );
    }
    Ok(())
}
