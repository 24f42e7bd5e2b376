//! Command-line interface for the security scanner.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Security scanner for Android application projects.
#[derive(Parser, Debug)]
#[command(name = "droidscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "cli")]
    pub format: String,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a project tree for security issues
    Scan {
        /// Path to scan (project directory, or a single manifest/Java file)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum severity to report (info, low, medium, high, critical)
        #[arg(long, default_value = "low")]
        min_severity: String,

        /// Fail with exit code 1 if any findings at this severity or above
        #[arg(long)]
        fail_on: Option<String>,
    },

    /// Show information about available rules
    Rules {
        /// Show details for a specific rule ID
        #[arg(short, long)]
        rule: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(default_value = "droidscan.toml")]
        output: PathBuf,
    },
}
