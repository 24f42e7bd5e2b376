//! Configuration for the scanner, loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scanner configuration that can be loaded from a file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Paths to skip (glob patterns).
    #[serde(default)]
    pub skip_paths: Vec<String>,

    /// Rule IDs to disable.
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// Maximum Java file size to analyze, in bytes. 0 means the built-in
    /// default.
    #[serde(default)]
    pub max_file_size: usize,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default locations, or return default config.
    pub fn load_default() -> Self {
        // Try current directory
        if let Ok(config) = Self::load(Path::new("droidscan.toml")) {
            return config;
        }

        // Try home directory
        if let Some(home) = dirs::home_dir() {
            if let Ok(config) = Self::load(&home.join(".droidscan.toml")) {
                return config;
            }
        }

        Self::with_defaults()
    }

    /// Create config with sensible defaults for Android project trees.
    pub fn with_defaults() -> Self {
        Self {
            skip_paths: vec![
                "**/build/**".to_string(),
                "**/.gradle/**".to_string(),
                "**/.git/**".to_string(),
                "**/.idea/**".to_string(),
                "**/generated/**".to_string(),
            ],
            disabled_rules: vec![],
            max_file_size: 0,
        }
    }

    /// Check if a path should be skipped.
    pub fn should_skip_path(&self, path: &Path) -> bool {
        for pattern in &self.skip_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                if glob.compile_matcher().is_match(path) {
                    return true;
                }
            }
        }
        false
    }

    /// Check if a rule is disabled.
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.iter().any(|r| r == rule_id)
    }
}

/// Generate a default config file content.
pub fn generate_default_config() -> String {
    r#"# DroidScan Configuration
# Place this file at ./droidscan.toml or ~/.droidscan.toml

# Skip these path patterns (glob syntax)
skip_paths = [
    "**/build/**",
    "**/.gradle/**",
    "**/.git/**",
    "**/.idea/**",
    "**/generated/**",
]

# Disable specific rules by ID
disabled_rules = [
    # "CommonTaskAffinity",  # Uncomment to disable a rule
]

# Maximum Java file size to analyze, in bytes (0 = default, 2 MiB)
max_file_size = 0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skips_build_output() {
        let config = Config::with_defaults();
        assert!(config.should_skip_path(Path::new("/project/app/build/tmp/Gen.java")));
        assert!(config.should_skip_path(Path::new("/project/.gradle/7.4/checksums.lock")));
        assert!(!config.should_skip_path(Path::new("/project/app/src/main/java/Main.java")));
    }

    #[test]
    fn test_disabled_rules() {
        let mut config = Config::with_defaults();
        config.disabled_rules.push("StickyBroadcast".to_string());
        assert!(config.is_rule_disabled("StickyBroadcast"));
        assert!(!config.is_rule_disabled("WeakHashFunction"));
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert!(!config.skip_paths.is_empty());
        assert!(config.disabled_rules.is_empty());
    }
}
