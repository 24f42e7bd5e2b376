//! CLI entry point for the Android security scanner.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use droidscan::{
    cli::{Cli, Commands},
    config::{generate_default_config, Config},
    registry,
    reporters::{report, OutputFormat},
    ScanConfig, Scanner, Severity,
};
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into()))
        .with_target(false)
        .init();

    // Load config file if specified, otherwise use defaults
    let base_config = if let Some(ref config_path) = cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default()
    };

    match cli.command {
        Commands::Scan {
            path,
            output,
            min_severity,
            fail_on,
        } => {
            let min_severity = parse_severity(&min_severity)?;
            let fail_on_severity = fail_on.as_ref().map(|s| parse_severity(s)).transpose()?;

            let config = ScanConfig {
                min_severity,
                filter_config: base_config,
                ..Default::default()
            };

            let scanner = Scanner::with_config(config);
            let scan_report = scanner.scan_path(&path)?;

            let format: OutputFormat = cli.format.parse()?;

            if let Some(output_path) = output {
                let mut file = std::fs::File::create(&output_path)?;
                report(&scan_report, format, &mut file)?;
                eprintln!("Report written to: {}", output_path.display());
            } else {
                let mut stdout = io::stdout().lock();
                report(&scan_report, format, &mut stdout)?;
            }

            // Check fail condition
            if let Some(fail_severity) = fail_on_severity {
                if let Some(max_sev) = scan_report.max_severity() {
                    if max_sev >= fail_severity {
                        std::process::exit(1);
                    }
                }
            }
        }

        Commands::Rules { rule, json } => {
            let rules = registry::all_rules();

            if let Some(rule_id) = rule {
                // Show specific rule
                if let Some(r) = registry::rule(&rule_id) {
                    if json {
                        println!("{}", serde_json::to_string_pretty(r)?);
                    } else {
                        println!("{}", format!("Rule: {}", r.id).bold());
                        println!("Title:       {}", r.title);
                        println!("Severity:    {}", r.severity);
                        println!("Category:    {}", r.category);
                        println!("Priority:    {}", r.priority);
                        println!("Description: {}", r.description);
                    }
                } else {
                    eprintln!("Rule not found: {}", rule_id);
                    std::process::exit(1);
                }
            } else {
                // List all rules
                if json {
                    println!("{}", serde_json::to_string_pretty(&rules)?);
                } else {
                    println!("{}", "Available Rules".bold().underline());

                    let mut current_category = String::new();
                    let mut sorted_rules: Vec<_> = rules.iter().collect();
                    sorted_rules
                        .sort_by(|a, b| format!("{}", a.category).cmp(&format!("{}", b.category)));

                    for r in sorted_rules {
                        let cat = format!("{}", r.category);
                        if cat != current_category {
                            println!("\n{}", cat.bold());
                            current_category = cat;
                        }

                        let severity_color = match r.severity {
                            Severity::Critical => r.severity.to_string().bright_red(),
                            Severity::High => r.severity.to_string().red(),
                            Severity::Medium => r.severity.to_string().yellow(),
                            Severity::Low => r.severity.to_string().blue(),
                            Severity::Info => r.severity.to_string().white(),
                        };

                        println!(
                            "  {} [{}] - {}",
                            r.id.bright_cyan(),
                            severity_color,
                            r.title
                        );
                    }
                    println!();
                    println!("Total: {} rules", rules.len());
                }
            }
        }

        Commands::Init { output } => {
            if output.exists() {
                eprintln!(
                    "{}",
                    format!("Config file already exists: {}", output.display()).yellow()
                );
                eprintln!("Use a different path or remove the existing file.");
                std::process::exit(1);
            }

            std::fs::write(&output, generate_default_config())?;
            println!(
                "{}",
                format!("Created config file: {}", output.display()).green()
            );
            println!("Edit this file to customize skip paths and disabled rules.");
        }
    }

    Ok(())
}

fn parse_severity(s: &str) -> Result<Severity> {
    match s.to_lowercase().as_str() {
        "info" => Ok(Severity::Info),
        "low" => Ok(Severity::Low),
        "medium" | "med" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" | "crit" => Ok(Severity::Critical),
        _ => Err(anyhow::anyhow!("Unknown severity: {}", s)),
    }
}
