//! Core type definitions for the DroidScan security scanner.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for security findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Category of security finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// Weak or misused cryptographic primitives
    WeakCryptography,
    /// Unprotected or spoofable inter-component messaging
    IntentHandling,
    /// Broken or bypassable permission checks
    PermissionMisuse,
    /// Insecure channels between apps or with remote hosts
    InsecureCommunication,
    /// Unrestricted or misconfigured web content loading
    WebContent,
    /// Content provider data reachable without the intended guard
    DataExposure,
    /// Task or activity hijacking through manifest settings
    TaskHijacking,
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingCategory::WeakCryptography => write!(f, "Weak Cryptography"),
            FindingCategory::IntentHandling => write!(f, "Intent Handling"),
            FindingCategory::PermissionMisuse => write!(f, "Permission Misuse"),
            FindingCategory::InsecureCommunication => write!(f, "Insecure Communication"),
            FindingCategory::WebContent => write!(f, "Web Content"),
            FindingCategory::DataExposure => write!(f, "Data Exposure"),
            FindingCategory::TaskHijacking => write!(f, "Task Hijacking"),
        }
    }
}

/// Location of a finding within a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// File path where the finding was detected.
    pub file: PathBuf,
    /// Starting line number (1-indexed).
    pub start_line: usize,
    /// Ending line number (1-indexed).
    pub end_line: usize,
    /// Starting column (1-indexed, optional).
    pub start_column: Option<usize>,
    /// Ending column (1-indexed, optional).
    pub end_column: Option<usize>,
}

impl Location {
    pub fn new(file: PathBuf, start_line: usize, end_line: usize) -> Self {
        Self {
            file,
            start_line,
            end_line,
            start_column: None,
            end_column: None,
        }
    }

    pub fn with_columns(mut self, start: usize, end: usize) -> Self {
        self.start_column = Some(start);
        self.end_column = Some(end);
        self
    }
}

/// A security finding detected by the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique identifier for the rule that triggered this finding.
    pub rule_id: String,
    /// Human-readable title of the finding.
    pub title: String,
    /// Detailed description of the security concern.
    pub description: String,
    /// Severity level.
    pub severity: Severity,
    /// Category of the finding.
    pub category: FindingCategory,
    /// Location in the source file.
    pub location: Location,
    /// The actual code/content that triggered the finding.
    pub snippet: String,
    /// Suggested remediation (optional).
    pub remediation: Option<String>,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        category: FindingCategory,
        location: Location,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            title: title.into(),
            description: description.into(),
            severity,
            category,
            location,
            snippet: snippet.into(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

/// Result of scanning a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Path that was scanned.
    pub path: PathBuf,
    /// All findings detected.
    pub findings: Vec<Finding>,
    /// Time taken to scan (in milliseconds).
    pub scan_time_ms: u64,
    /// SHA256 hash of the scanned content.
    pub content_hash: Option<String>,
}

impl ScanResult {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            findings: Vec::new(),
            scan_time_ms: 0,
            content_hash: None,
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}

/// Aggregated report from scanning a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Root path that was scanned.
    pub scan_root: PathBuf,
    /// Individual scan results.
    pub results: Vec<ScanResult>,
    /// Total time taken (in milliseconds).
    pub total_time_ms: u64,
    /// Timestamp of the scan.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ScanReport {
    pub fn new(scan_root: PathBuf) -> Self {
        Self {
            scan_root,
            results: Vec::new(),
            total_time_ms: 0,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn total_findings(&self) -> usize {
        self.results.iter().map(|r| r.findings.len()).sum()
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.results.iter().filter_map(|r| r.max_severity()).max()
    }

    pub fn findings_count_by_severity(&self) -> std::collections::HashMap<Severity, usize> {
        let mut counts = std::collections::HashMap::new();
        for result in &self.results {
            for finding in &result.findings {
                *counts.entry(finding.severity).or_insert(0) += 1;
            }
        }
        counts
    }

    /// All findings with a given rule id, across every scanned file.
    pub fn findings_for_rule(&self, rule_id: &str) -> Vec<&Finding> {
        self.results
            .iter()
            .flat_map(|r| r.findings.iter())
            .filter(|f| f.rule_id == rule_id)
            .collect()
    }
}

/// Truncate a string to a maximum number of characters (UTF-8 safe).
/// Appends "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
