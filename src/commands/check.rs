//! Check command implementation.

use anyhow::Result;
use std::path::Path;

use crate::config::GateConfig;
use crate::engine::AccessGate;
use crate::matcher;

/// Run the check command
pub async fn run(addr: &str, locale: &str, rules_only: bool, config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        GateConfig::load(config_path)?
    } else {
        GateConfig::default()
    };

    if rules_only {
        let matchers = config.matchers();
        let hit = matcher::matches_any(addr, &matchers);
        print_verdict(addr, hit, " by rule");
        return Ok(());
    }

    let gate = AccessGate::from_config(&config)?;
    let blocked = gate.should_block(addr, locale).await;
    print_verdict(addr, blocked, "");

    Ok(())
}

fn print_verdict(addr: &str, blocked: bool, suffix: &str) {
    println!();
    if blocked {
        println!("Address {} is BLOCKED{}", addr, suffix);
    } else {
        println!("Address {} is NOT blocked{}", addr, suffix);
    }
    println!();
}
