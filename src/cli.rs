//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ipgate")]
#[command(author, version, about = "Address-rule access gate with geo fallback")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "/etc/ipgate/config.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one address against the configured gate
    Check {
        /// Client address to evaluate
        addr: String,

        /// Locale hint, e.g. an Accept-Language header value
        #[arg(long, default_value = "")]
        locale: String,

        /// Skip the geo lookup; report the rule verdict only
        #[arg(long)]
        rules_only: bool,
    },

    /// Compile the configured rules and report dropped lines
    Lint,

    /// Show version information
    Version,
}
