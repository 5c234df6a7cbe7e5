//! Lint command implementation.
//!
//! Malformed rules are dropped silently at evaluation time; this
//! command gives operators a way to see which lines were dropped.

use anyhow::Result;
use std::path::Path;

use crate::config::GateConfig;
use crate::rules::{self, LintOutcome};

/// Run the lint command
pub fn run(config_path: &Path) -> Result<()> {
    let config = GateConfig::load(config_path)?;
    let report = rules::lint(&config.rules);

    if report.is_empty() {
        println!("No rules configured");
        return Ok(());
    }

    let mut skipped = 0;
    for (line, outcome) in &report {
        match outcome {
            LintOutcome::Accepted => println!("  ok      {}", line),
            LintOutcome::Skipped => {
                skipped += 1;
                println!("  SKIPPED {}", line);
            }
        }
    }
    println!();
    println!("{} rules, {} skipped", report.len(), skipped);

    Ok(())
}
