//! `thmsync upstream`: apply a downstream file to the theorem records

use crate::context::ProjectContext;
use crate::diagnostics::ConsoleSink;
use crate::sync::Reconciler;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

pub fn run(context: &ProjectContext, input: &Path, dry_run: bool, json: bool, quiet: bool) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut sink = ConsoleSink::new(quiet || json);
    let report = Reconciler::new(&context.store, &context.config)
        .with_dry_run(dry_run)
        .reconcile_str(&content, &mut sink)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return finish(report.failed());
    }

    println!();
    println!("{}", "Reconciliation summary:".cyan().bold());
    println!("   Theorems:        {}", report.outcomes.len());
    println!("   Records written: {}", report.written());
    if dry_run {
        println!("   {}", "(dry run: no records were written)".bright_black());
    }
    if report.needs_attention() > 0 {
        println!(
            "   {}",
            format!("Need manual attention: {}", report.needs_attention()).yellow()
        );
    }
    if report.failed() > 0 {
        println!("   {}", format!("Failed: {}", report.failed()).red());
    }
    finish(report.failed())
}

fn finish(failed: usize) -> Result<()> {
    if failed > 0 {
        anyhow::bail!("{} theorem(s) could not be reconciled", failed);
    }
    Ok(())
}
