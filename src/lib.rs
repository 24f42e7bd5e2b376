//! DroidScan - Security Scanner for Android Projects
//!
//! A security scanner for Android application projects. It walks a project
//! tree, parses every `AndroidManifest.xml` and `.java` source, and runs a
//! fixed set of security rules over the parsed trees.
//!
//! # Quick Start
//!
//! ```no_run
//! use droidscan::Scanner;
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let scanner = Scanner::new();
//!     let report = scanner.scan_path(&PathBuf::from("./app"))?;
//!
//!     println!("Found {} issues", report.total_findings());
//!     Ok(())
//! }
//! ```

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod registry;
pub mod reporters;
pub mod schemes;
pub mod types;

// Re-exports for convenience
pub use analyzers::{JavaAnalyzer, JavaAnalyzerConfig, ManifestAnalyzer, ProjectFacts};
pub use config::Config;
pub use registry::{all_rules, rule, RuleInfo};
pub use reporters::{report, OutputFormat};
pub use types::{truncate, Finding, ScanReport, ScanResult, Severity};

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Configuration for the scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Minimum severity to include in results.
    pub min_severity: Severity,
    /// Filter configuration (skip paths, disabled rules).
    pub filter_config: Config,
    /// Java analyzer configuration.
    pub java_config: JavaAnalyzerConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Low,
            filter_config: Config::load_default(),
            java_config: JavaAnalyzerConfig::default(),
        }
    }
}

/// The main scanner that coordinates the manifest and code passes.
pub struct Scanner {
    config: ScanConfig,
    manifest_analyzer: ManifestAnalyzer,
    java_analyzer: JavaAnalyzer,
}

impl Scanner {
    /// Create a new scanner with default configuration.
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Create a scanner with custom configuration.
    pub fn with_config(mut config: ScanConfig) -> Self {
        if config.filter_config.max_file_size > 0 {
            config.java_config.max_file_size = config.filter_config.max_file_size;
        }
        let java_analyzer = JavaAnalyzer::with_config(config.java_config.clone());
        Self {
            config,
            manifest_analyzer: ManifestAnalyzer::new(),
            java_analyzer,
        }
    }

    /// Scan a path (project directory, or a single manifest/Java file).
    ///
    /// Manifests are analyzed first so the provider facts they contribute
    /// are available to the code pass.
    pub fn scan_path(&self, path: &Path) -> Result<ScanReport> {
        let start = Instant::now();
        let mut report = ScanReport::new(path.to_path_buf());

        let (manifests, sources) = self.discover(path)?;
        tracing::info!(
            "Discovered {} manifest(s) and {} Java file(s) to scan",
            manifests.len(),
            sources.len()
        );

        let mut facts = ProjectFacts::default();
        for manifest in &manifests {
            tracing::debug!("Scanning manifest: {}", manifest.display());
            let content = match std::fs::read_to_string(manifest) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", manifest.display(), e);
                    continue;
                }
            };
            let (mut result, providers) =
                self.manifest_analyzer.analyze_content_str(&content, manifest);
            result.content_hash = Some(content_hash(&content));
            facts.guarded_providers.extend(providers);
            self.filter(&mut result);
            report.results.push(result);
        }

        for source in &sources {
            tracing::debug!("Scanning: {}", source.display());
            let content = match std::fs::read_to_string(source) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", source.display(), e);
                    continue;
                }
            };
            match self
                .java_analyzer
                .analyze_content_str(&content, source, &facts)
            {
                Ok(mut result) => {
                    result.content_hash = Some(content_hash(&content));
                    self.filter(&mut result);
                    report.results.push(result);
                }
                Err(e) => {
                    tracing::warn!("Failed to scan {}: {}", source.display(), e);
                }
            }
        }

        report.total_time_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Apply the severity floor and disabled-rule filters.
    fn filter(&self, result: &mut ScanResult) {
        result.findings.retain(|f| {
            f.severity >= self.config.min_severity
                && !self.config.filter_config.is_rule_disabled(&f.rule_id)
        });
    }

    /// Collect the manifests and Java sources under `path`.
    fn discover(&self, path: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut manifests = Vec::new();
        let mut sources = Vec::new();
        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file = entry.path();
            if self.config.filter_config.should_skip_path(file) {
                tracing::debug!("Skipping: {}", file.display());
                continue;
            }
            if file.file_name().map(|n| n == "AndroidManifest.xml").unwrap_or(false) {
                manifests.push(file.to_path_buf());
            } else if file.extension().map(|e| e == "java").unwrap_or(false) {
                sources.push(file.to_path_buf());
            }
        }
        Ok((manifests, sources))
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}
