//! Analysis engines for Android project files.
//!
//! Two analyzers cover the two file kinds a project contributes:
//!
//! - [`manifest::ManifestAnalyzer`] checks `AndroidManifest.xml`
//! - [`code::JavaAnalyzer`] checks `.java` sources
//!
//! The manifest pass runs first and records a small set of facts (exported
//! providers guarded by path permissions) that one code rule consumes.
//! This is the only information that crosses file boundaries; every other
//! rule sees exactly one file.

pub mod code;
pub mod manifest;

pub use code::{JavaAnalyzer, JavaAnalyzerConfig};
pub use manifest::ManifestAnalyzer;

use crate::types::Location;

/// An exported `<provider>` with at least one `path-permission` child,
/// as declared in the manifest.
#[derive(Debug, Clone)]
pub struct GuardedProvider {
    /// Unqualified class name from `android:name`.
    pub class_name: String,
    /// Location of the provider element in the manifest.
    pub location: Location,
}

/// Facts collected from the manifest pass and handed to the code pass.
#[derive(Debug, Clone, Default)]
pub struct ProjectFacts {
    pub guarded_providers: Vec<GuardedProvider>,
}

impl ProjectFacts {
    pub fn guarded_provider(&self, class_name: &str) -> Option<&GuardedProvider> {
        self.guarded_providers
            .iter()
            .find(|p| p.class_name == class_name)
    }
}
