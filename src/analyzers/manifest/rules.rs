//! Declarative security rules over the parsed manifest.

use super::document::XmlElement;
use crate::analyzers::GuardedProvider;
use crate::registry;
use crate::schemes;
use crate::types::{truncate, Finding, Location};
use std::path::Path;

/// A rule that inspects the manifest element tree.
pub trait ManifestRule: Send + Sync {
    /// Returns the rule ID this rule reports under.
    fn rule_id(&self) -> &str;

    /// Check the document and return any findings.
    fn check(&self, root: &XmlElement, path: &Path) -> Vec<Finding>;
}

/// All built-in manifest rules.
pub fn all_rules() -> Vec<Box<dyn ManifestRule>> {
    vec![
        Box::new(TaskAffinityRule),
        Box::new(UnprotectedPermissionRule),
        Box::new(StickyPermissionRule),
        Box::new(CustomSchemeRule),
        Box::new(PathPermissionPrecedenceRule),
    ]
}

/// Collect the exported providers guarded by a `path-permission` child.
/// These feed the `InsecurePathPermission` code rule: a `UriMatcher`
/// constructed inside one of these classes is reported at the manifest
/// element recorded here.
pub fn collect_guarded_providers(root: &XmlElement, path: &Path) -> Vec<GuardedProvider> {
    let mut providers = Vec::new();
    root.for_each(&mut |el| {
        if el.name != "provider" || !is_exported(el) {
            return;
        }
        if el.children_named("path-permission").next().is_none() {
            return;
        }
        let Some(name) = el.android_attr("name") else {
            return;
        };
        let class_name = name.rsplit('.').next().unwrap_or(name).to_string();
        providers.push(GuardedProvider {
            class_name,
            location: element_location(el, path),
        });
    });
    providers
}

fn is_exported(el: &XmlElement) -> bool {
    el.android_attr("exported") == Some("true")
}

fn element_location(el: &XmlElement, path: &Path) -> Location {
    Location::new(path.to_path_buf(), el.line, el.line).with_columns(el.column, el.column)
}

fn element_snippet(el: &XmlElement) -> String {
    let mut s = format!("<{}", el.name);
    for attr in &el.attrs {
        s.push_str(&format!(" {}=\"{}\"", attr.name, attr.value));
    }
    s.push('>');
    truncate(&s, 120)
}

// A rule id missing from the registry declines silently; the registry
// coverage test below keeps that path unreachable.
fn finding(rule_id: &str, description: &str, el: &XmlElement, path: &Path) -> Option<Finding> {
    let info = registry::rule(rule_id)?;
    Some(Finding::new(
        info.id,
        info.title,
        description,
        info.severity,
        info.category,
        element_location(el, path),
        element_snippet(el),
    ))
}

/// Flags activities that set a task affinity and applications that do not
/// explicitly set an empty one. An explicit empty value gives the app a
/// unique affinity at run time; the check is deliberately asymmetric.
struct TaskAffinityRule;

impl ManifestRule for TaskAffinityRule {
    fn rule_id(&self) -> &str {
        "CommonTaskAffinity"
    }

    fn check(&self, root: &XmlElement, path: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();
        root.for_each(&mut |el| match el.name.as_str() {
            "application" => {
                let affinity = el.android_attr("taskAffinity");
                if affinity != Some("") {
                    findings.extend(
                        finding(
                            self.rule_id(),
                            "Consider setting the task affinity of your app explicitly to an empty value",
                            el,
                            path,
                        )
                        .map(|f| {
                            f.with_remediation(
                                "Add android:taskAffinity=\"\" to the <application> element",
                            )
                        }),
                    );
                }
            }
            "activity" => {
                if el.android_attr("taskAffinity").is_some() {
                    findings.extend(
                        finding(self.rule_id(), "Do not set taskAffinity", el, path).map(|f| {
                            f.with_remediation(
                                "Remove android:taskAffinity from the <activity> element",
                            )
                        }),
                    );
                }
            }
            _ => {}
        });
        findings
    }
}

/// Flags custom `<permission>` declarations without an explicit
/// protection level.
struct UnprotectedPermissionRule;

impl ManifestRule for UnprotectedPermissionRule {
    fn rule_id(&self) -> &str {
        "UnprotectedPermission"
    }

    fn check(&self, root: &XmlElement, path: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();
        root.for_each(&mut |el| {
            if el.name == "permission" && el.android_attr("protectionLevel").is_none() {
                findings.extend(
                    finding(
                        self.rule_id(),
                        "No explicit android:protectionLevel set for this permission; the default is \"normal\", which is only for low risk features",
                        el,
                        path,
                    )
                    .map(|f| {
                        f.with_remediation(
                            "Declare android:protectionLevel=\"signature\" or another appropriate level",
                        )
                    }),
                );
            }
        });
        findings
    }
}

/// Flags use of the BROADCAST_STICKY permission.
struct StickyPermissionRule;

const BROADCAST_STICKY: &str = "android.permission.BROADCAST_STICKY";

impl ManifestRule for StickyPermissionRule {
    fn rule_id(&self) -> &str {
        "StickyBroadcast"
    }

    fn check(&self, root: &XmlElement, path: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();
        root.for_each(&mut |el| {
            if el.name == "uses-permission" && el.android_attr("name") == Some(BROADCAST_STICKY) {
                findings.extend(finding(
                    self.rule_id(),
                    "The usage of sticky broadcasts is discouraged due to its weak security; replace them with alternatives and remove this permission",
                    el,
                    path,
                ));
            }
        });
        findings
    }
}

/// Flags `<data android:scheme>` entries in intent filters whose scheme
/// is not on the IANA registry.
struct CustomSchemeRule;

impl ManifestRule for CustomSchemeRule {
    fn rule_id(&self) -> &str {
        "CustomSchemeChannel"
    }

    fn check(&self, root: &XmlElement, path: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();
        root.for_each(&mut |el| {
            if el.name != "intent-filter" {
                return;
            }
            for data in el.children_named("data") {
                if let Some(scheme) = data.android_attr("scheme") {
                    if !schemes::is_registered(scheme) {
                        findings.extend(finding(
                            self.rule_id(),
                            "Avoid using custom URI schemes",
                            data,
                            path,
                        ));
                    }
                }
            }
        });
        findings
    }
}

/// Flags `path-permission` children of exported providers that already
/// carry a provider-level permission.
struct PathPermissionPrecedenceRule;

const SEARCH_SUGGEST_QUERY: &str = "search_suggest_query";

impl ManifestRule for PathPermissionPrecedenceRule {
    fn rule_id(&self) -> &str {
        "BrokenPathPermissionPrecedence"
    }

    fn check(&self, root: &XmlElement, path: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();
        root.for_each(&mut |el| {
            if el.name != "provider" || !is_exported(el) || !has_provider_permission(el) {
                return;
            }
            for child in el.children_named("path-permission") {
                // Search suggestion paths intentionally release
                // non-sensitive data; hitting one stops processing of
                // this provider's remaining children. Earlier children
                // keep their findings.
                if protects_search_suggest_path(child) {
                    return;
                }
                findings.extend(finding(
                    self.rule_id(),
                    "Path permissions cannot be used to make certain provider paths more secure if the provider already defines a permission",
                    child,
                    path,
                ));
            }
        });
        findings
    }
}

fn has_provider_permission(el: &XmlElement) -> bool {
    ["permission", "readPermission", "writePermission"]
        .iter()
        .any(|attr| el.android_attr(attr).map(|v| !v.is_empty()).unwrap_or(false))
}

fn protects_search_suggest_path(el: &XmlElement) -> bool {
    ["path", "pathPattern", "pathPrefix"]
        .iter()
        .any(|attr| {
            el.android_attr(attr)
                .map(|v| v.contains(SEARCH_SUGGEST_QUERY))
                .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::manifest::document::ManifestDocument;
    use std::path::PathBuf;

    fn check(rule: &dyn ManifestRule, xml: &str) -> Vec<Finding> {
        let doc = ManifestDocument::parse(xml).unwrap();
        rule.check(&doc.root, &PathBuf::from("AndroidManifest.xml"))
    }

    fn wrap(body: &str) -> String {
        format!(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app">{}</manifest>"#,
            body
        )
    }

    #[test]
    fn test_task_affinity_unset_application() {
        let findings = check(&TaskAffinityRule, &wrap("<application />"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "CommonTaskAffinity");
    }

    #[test]
    fn test_task_affinity_empty_application_is_fine() {
        let findings = check(
            &TaskAffinityRule,
            &wrap(r#"<application android:taskAffinity="" />"#),
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_task_affinity_on_activity() {
        let xml = wrap(
            r#"<application android:taskAffinity="">
                <activity android:name=".Main" android:taskAffinity="" />
            </application>"#,
        );
        let findings = check(&TaskAffinityRule, &xml);
        // Even an empty affinity on an activity is flagged.
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_permission_without_protection_level() {
        let xml = wrap(r#"<permission android:name="com.example.DO_IT" />"#);
        let findings = check(&UnprotectedPermissionRule, &xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "UnprotectedPermission");
    }

    #[test]
    fn test_permission_with_protection_level() {
        let xml = wrap(
            r#"<permission android:name="com.example.DO_IT"
                android:protectionLevel="signature" />"#,
        );
        assert!(check(&UnprotectedPermissionRule, &xml).is_empty());
    }

    #[test]
    fn test_sticky_broadcast_permission() {
        let xml = wrap(
            r#"<uses-permission android:name="android.permission.BROADCAST_STICKY" />
               <uses-permission android:name="android.permission.INTERNET" />"#,
        );
        let findings = check(&StickyPermissionRule, &xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "StickyBroadcast");
    }

    #[test]
    fn test_custom_scheme_flagged() {
        let xml = wrap(
            r#"<application><activity android:name=".Main"><intent-filter>
                <data android:scheme="myapp" />
                <data android:scheme="https" />
            </intent-filter></activity></application>"#,
        );
        let findings = check(&CustomSchemeRule, &xml);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].snippet.contains("myapp"));
    }

    #[test]
    fn test_path_permission_under_guarded_provider() {
        let xml = wrap(
            r#"<application><provider android:name=".Data"
                android:exported="true" android:permission="com.example.P">
                <path-permission android:path="/secret"
                    android:readPermission="com.example.R" />
            </provider></application>"#,
        );
        let findings = check(&PathPermissionPrecedenceRule, &xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "BrokenPathPermissionPrecedence");
    }

    #[test]
    fn test_path_permission_not_exported() {
        let xml = wrap(
            r#"<application><provider android:name=".Data"
                android:permission="com.example.P">
                <path-permission android:path="/secret" />
            </provider></application>"#,
        );
        assert!(check(&PathPermissionPrecedenceRule, &xml).is_empty());
    }

    #[test]
    fn test_search_suggest_path_stops_provider_processing() {
        let xml = wrap(
            r#"<application><provider android:name=".Data"
                android:exported="true" android:permission="com.example.P">
                <path-permission android:pathPrefix="/search_suggest_query" />
                <path-permission android:path="/other" />
            </provider></application>"#,
        );
        assert!(check(&PathPermissionPrecedenceRule, &xml).is_empty());
    }

    #[test]
    fn test_children_before_search_suggest_are_still_reported() {
        let xml = wrap(
            r#"<application><provider android:name=".Data"
                android:exported="true" android:permission="com.example.P">
                <path-permission android:path="/other" />
                <path-permission android:pathPrefix="/search_suggest_query" />
                <path-permission android:path="/after" />
            </provider></application>"#,
        );
        let findings = check(&PathPermissionPrecedenceRule, &xml);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].snippet.contains("/other"));
    }

    #[test]
    fn test_manifest_rule_ids_are_registered() {
        for rule in all_rules() {
            assert!(
                registry::rule(rule.rule_id()).is_some(),
                "unregistered rule id: {}",
                rule.rule_id()
            );
        }
    }

    #[test]
    fn test_collect_guarded_providers() {
        let xml = wrap(
            r#"<application>
                <provider android:name="com.example.data.SecretProvider"
                    android:exported="true">
                    <path-permission android:path="/secret" />
                </provider>
                <provider android:name=".OpenProvider" android:exported="true" />
            </application>"#,
        );
        let doc = ManifestDocument::parse(&xml).unwrap();
        let providers =
            collect_guarded_providers(&doc.root, &PathBuf::from("AndroidManifest.xml"));
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].class_name, "SecretProvider");
    }
}
