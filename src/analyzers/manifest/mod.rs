//! AndroidManifest.xml analyzer.
//!
//! Parses the manifest into an element tree, runs the manifest rules over
//! it and extracts the project facts the code analyzer needs (guarded
//! content providers).

pub mod document;
pub mod rules;

use crate::analyzers::GuardedProvider;
use crate::types::ScanResult;
use anyhow::{Context, Result};
use document::ManifestDocument;
use rules::ManifestRule;
use std::path::Path;
use std::time::Instant;

pub struct ManifestAnalyzer {
    rules: Vec<Box<dyn ManifestRule>>,
}

impl Default for ManifestAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestAnalyzer {
    pub fn new() -> Self {
        Self {
            rules: rules::all_rules(),
        }
    }

    /// Analyze a manifest file on disk.
    pub fn analyze_file(&self, path: &Path) -> Result<(ScanResult, Vec<GuardedProvider>)> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Ok(self.analyze_content_str(&content, path))
    }

    /// Analyze manifest content. A manifest that does not parse yields an
    /// empty result rather than an error so one broken file cannot abort
    /// a project scan.
    pub fn analyze_content_str(
        &self,
        content: &str,
        path: &Path,
    ) -> (ScanResult, Vec<GuardedProvider>) {
        let start = Instant::now();
        let mut result = ScanResult::new(path.to_path_buf());

        let doc = match ManifestDocument::parse(content) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Skipping unparseable manifest {}: {:#}", path.display(), e);
                result.scan_time_ms = start.elapsed().as_millis() as u64;
                return (result, Vec::new());
            }
        };

        for rule in &self.rules {
            let findings = rule.check(&doc.root, path);
            if !findings.is_empty() {
                tracing::debug!(
                    "{}: {} finding(s) in {}",
                    rule.rule_id(),
                    findings.len(),
                    path.display()
                );
            }
            result.findings.extend(findings);
        }

        let providers = rules::collect_guarded_providers(&doc.root, path);
        result.scan_time_ms = start.elapsed().as_millis() as u64;
        (result, providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unparseable_manifest_is_skipped() {
        let analyzer = ManifestAnalyzer::new();
        let (result, providers) =
            analyzer.analyze_content_str("<manifest><broken", &PathBuf::from("AndroidManifest.xml"));
        assert!(result.findings.is_empty());
        assert!(providers.is_empty());
    }

    #[test]
    fn test_full_manifest_scan() {
        let xml = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app">
    <uses-permission android:name="android.permission.BROADCAST_STICKY" />
    <permission android:name="com.example.DO_IT" />
    <application>
        <activity android:name=".Main">
            <intent-filter>
                <data android:scheme="myapp" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#;
        let analyzer = ManifestAnalyzer::new();
        let (result, providers) =
            analyzer.analyze_content_str(xml, &PathBuf::from("AndroidManifest.xml"));
        let mut ids: Vec<_> = result.findings.iter().map(|f| f.rule_id.as_str()).collect();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                "CommonTaskAffinity",
                "CustomSchemeChannel",
                "StickyBroadcast",
                "UnprotectedPermission",
            ]
        );
        assert!(providers.is_empty());
    }
}
