//! Syntax-tree analysis of Java sources.
//!
//! Uses tree-sitter to parse `.java` files and runs the security
//! detectors over the tree. Parsers are created per call since
//! tree-sitter `Parser` is `!Send`; the analyzer itself holds only
//! immutable shared data and is `Send + Sync`.

pub mod detectors;
pub mod resolver;
pub mod sdk;

use crate::analyzers::ProjectFacts;
use crate::types::{Finding, ScanResult};
use anyhow::Result;
use detectors::{DetectorSet, FileContext};
use std::path::Path;
use std::time::Instant;
use tree_sitter::{Node, Parser};

/// Configuration for the Java analyzer.
#[derive(Debug, Clone)]
pub struct JavaAnalyzerConfig {
    /// Maximum file size to analyze (in bytes).
    pub max_file_size: usize,
}

impl Default for JavaAnalyzerConfig {
    fn default() -> Self {
        Self {
            max_file_size: 2 * 1024 * 1024,
        }
    }
}

pub struct JavaAnalyzer {
    config: JavaAnalyzerConfig,
    detectors: DetectorSet,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self::with_config(JavaAnalyzerConfig::default())
    }

    pub fn with_config(config: JavaAnalyzerConfig) -> Self {
        Self {
            config,
            detectors: DetectorSet::all(),
        }
    }

    /// Analyze a Java file on disk.
    pub fn analyze_file(&self, path: &Path, facts: &ProjectFacts) -> Result<ScanResult> {
        let content = std::fs::read_to_string(path)?;
        self.analyze_content_str(&content, path, facts)
    }

    /// Analyze pre-read Java content. Oversized or unparseable content
    /// yields an empty result and a log line, never an error.
    pub fn analyze_content_str(
        &self,
        content: &str,
        path: &Path,
        facts: &ProjectFacts,
    ) -> Result<ScanResult> {
        let start = Instant::now();
        let mut result = ScanResult::new(path.to_path_buf());

        if content.len() > self.config.max_file_size {
            tracing::warn!(
                "File {} exceeds max size for analysis ({} > {}), skipping",
                path.display(),
                content.len(),
                self.config.max_file_size
            );
            return Ok(result);
        }

        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into())?;
        let tree = match parser.parse(content, None) {
            Some(t) => t,
            None => {
                tracing::warn!("Failed to parse {}, skipping", path.display());
                return Ok(result);
            }
        };

        let ctx = FileContext {
            source: content,
            path,
            facts,
        };
        let mut findings = Vec::new();
        self.walk_tree(tree.root_node(), &ctx, &mut findings);

        result.findings = findings;
        result.scan_time_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Recursively walk the tree and run detectors on each node.
    fn walk_tree(&self, node: Node, ctx: &FileContext, findings: &mut Vec<Finding>) {
        for detector in self.detectors.for_node_kind(node.kind()) {
            findings.extend(detector.check(node, ctx));
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk_tree(child, ctx, findings);
        }
    }
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::GuardedProvider;
    use crate::types::Location;
    use std::path::PathBuf;

    fn scan(source: &str) -> Vec<Finding> {
        scan_with_facts(source, &ProjectFacts::default())
    }

    fn scan_with_facts(source: &str, facts: &ProjectFacts) -> Vec<Finding> {
        let analyzer = JavaAnalyzer::new();
        let result = analyzer
            .analyze_content_str(source, &PathBuf::from("Test.java"), facts)
            .unwrap();
        result.findings
    }

    fn rule_ids(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.rule_id.as_str()).collect()
    }

    #[test]
    fn test_md5_literal() {
        let findings = scan(
            r#"class A { void m() throws Exception {
                MessageDigest.getInstance("MD5");
            } }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["WeakHashFunction"]);
    }

    #[test]
    fn test_md5_via_variable_and_concat() {
        let findings = scan(
            r#"class A { void m() throws Exception {
                String alg = "M" + "D5";
                MessageDigest.getInstance(alg);
            } }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["WeakHashFunction"]);
    }

    #[test]
    fn test_sha256_not_flagged() {
        let findings = scan(
            r#"class A { void m() throws Exception {
                MessageDigest.getInstance("SHA-256");
            } }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unresolvable_algorithm_is_silent() {
        let findings = scan(
            r#"class A { void m(String alg) throws Exception {
                MessageDigest.getInstance(alg);
            } }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_small_rsa_key() {
        let findings = scan(
            r#"class A { void m() throws Exception {
                KeyPairGenerator gen = KeyPairGenerator.getInstance("RSA");
                gen.initialize(1024);
            } }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["InsufficientRSAKeySize"]);
    }

    #[test]
    fn test_large_rsa_key_not_flagged() {
        let findings = scan(
            r#"class A { void m() throws Exception {
                KeyPairGenerator gen = KeyPairGenerator.getInstance("RSA");
                gen.initialize(4096);
            } }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_rsa_state_is_per_method() {
        // getInstance and initialize in different methods never pair up.
        let findings = scan(
            r#"class A {
                KeyPairGenerator gen;
                void a() throws Exception { gen = KeyPairGenerator.getInstance("RSA"); }
                void b() { gen.initialize(512); }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_sticky_broadcast_in_service() {
        let findings = scan(
            r#"class MyService extends Service {
                void m(Intent i) { sendStickyBroadcast(i); }
            }"#,
        );
        assert!(rule_ids(&findings).contains(&"StickyBroadcast"));
    }

    #[test]
    fn test_sticky_name_on_unknown_receiver_is_silent() {
        let findings = scan(
            r#"class A { void m(Helper h, Intent i) { h.sendStickyBroadcast(i); } }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_calling_or_self_permission() {
        let findings = scan(
            r#"class MyService extends Service {
                int m() { return checkCallingOrSelfPermission("com.example.P"); }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["BrokenServicePermission"]);
    }

    #[test]
    fn test_binder_pid_uid_check() {
        let findings = scan(
            r#"class MyService extends Service {
                void m() {
                    checkPermission("com.example.P", Binder.getCallingPid(), Binder.getCallingUid());
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["BrokenServicePermission"]);
    }

    #[test]
    fn test_binder_pid_uid_through_locals() {
        let findings = scan(
            r#"class MyService extends Service {
                void m() {
                    int pid = Binder.getCallingPid();
                    int uid = Binder.getCallingUid();
                    checkPermission("com.example.P", pid, uid);
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["BrokenServicePermission"]);
    }

    #[test]
    fn test_register_receiver_without_permission() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(BroadcastReceiver r, IntentFilter f) {
                    registerReceiver(r, f);
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["UnprotectedBroadcastReceiver"]);
    }

    #[test]
    fn test_register_receiver_null_permission() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(BroadcastReceiver r, IntentFilter f, Handler h) {
                    registerReceiver(r, f, null, h);
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["UnprotectedBroadcastReceiver"]);
        assert!(findings[0].description.contains("Null objects"));
    }

    #[test]
    fn test_register_receiver_with_permission() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(BroadcastReceiver r, IntentFilter f, Handler h) {
                    registerReceiver(r, f, "com.example.P", h);
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_sticky_query_with_null_receiver() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(IntentFilter f) { registerReceiver(null, f); }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_implicit_intent_sent() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m() {
                    Intent i = new Intent("com.example.ACTION");
                    startActivity(i);
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["UnauthorizedIntent"]);
    }

    #[test]
    fn test_explicit_intent_not_flagged() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m() {
                    Intent i = new Intent(this, OtherActivity.class);
                    startActivity(i);
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_component_set_suppresses() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m() {
                    Intent i = new Intent("com.example.ACTION");
                    i.setPackage("com.example");
                    startActivity(i);
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_broadcast_with_permission_suppresses() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m() {
                    Intent i = new Intent("com.example.ACTION");
                    sendBroadcast(i, "com.example.P");
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_implicit_pending_intent() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(Context c) {
                    PendingIntent.getBroadcast(c, 0, new Intent("com.example.ACTION"), 0);
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["ImplicitPendingIntent"]);
    }

    #[test]
    fn test_custom_scheme_in_code() {
        let findings = scan(
            r#"class A { void m(IntentFilter f) { f.addDataScheme("myapp"); } }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["CustomSchemeChannel"]);
    }

    #[test]
    fn test_registered_scheme_in_code() {
        let findings = scan(
            r#"class A { void m(IntentFilter f) { f.addDataScheme("https"); } }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_grant_without_revoke() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(Uri uri) {
                    grantUriPermission("com.other.app", uri, 1);
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["PersistedDynamicPermission"]);
    }

    #[test]
    fn test_grant_with_revoke_in_same_file() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(Uri uri) { grantUriPermission("com.other.app", uri, 1); }
                void n(Uri uri) { revokeUriPermission(uri, 1); }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_intercept_request_only_null() {
        let findings = scan(
            r#"class MyClient extends WebViewClient {
                public WebResourceResponse shouldInterceptRequest(WebView view, String url) {
                    return null;
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["SlackWebViewClient"]);
    }

    #[test]
    fn test_override_url_always_false() {
        let findings = scan(
            r#"class MyClient extends WebViewClient {
                public boolean shouldOverrideUrlLoading(WebView view, String url) {
                    return false;
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["SlackWebViewClient"]);
    }

    #[test]
    fn test_override_url_load_everything() {
        let findings = scan(
            r#"class MyClient extends WebViewClient {
                public boolean shouldOverrideUrlLoading(WebView view, String url) {
                    view.loadUrl(url);
                    return true;
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["SlackWebViewClient"]);
    }

    #[test]
    fn test_override_url_with_whitelist() {
        let findings = scan(
            r#"class MyClient extends WebViewClient {
                public boolean shouldOverrideUrlLoading(WebView view, String url) {
                    if (url.startsWith("https://example.com/")) {
                        view.loadUrl(url);
                        return true;
                    }
                    return false;
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_proceed_on_ssl_error() {
        let findings = scan(
            r#"class MyClient extends WebViewClient {
                public void onReceivedSslError(WebView view, SslErrorHandler handler, SslError error) {
                    handler.proceed();
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["ProceedOnSslError"]);
    }

    #[test]
    fn test_ssl_error_with_cancel_path() {
        let findings = scan(
            r#"class MyClient extends WebViewClient {
                public void onReceivedSslError(WebView view, SslErrorHandler handler, SslError error) {
                    if (trusted(view)) { handler.proceed(); } else { handler.cancel(); }
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_ssl_handler_passed_on_is_silent() {
        let findings = scan(
            r#"class MyClient extends WebViewClient {
                public void onReceivedSslError(WebView view, SslErrorHandler handler, SslError error) {
                    handler.proceed();
                    askUser(handler);
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_anonymous_client_checked() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(WebView view) {
                    view.setWebViewClient(new WebViewClient() {
                        public WebResourceResponse shouldInterceptRequest(WebView v, String u) {
                            return null;
                        }
                    });
                }
            }"#,
        );
        // Both the slack override and the missing shouldOverrideUrlLoading
        // on the configured client are reported.
        assert_eq!(
            rule_ids(&findings),
            vec!["SlackWebViewClient", "SlackWebViewClient"]
        );
    }

    #[test]
    fn test_default_web_view_client() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(WebView view) {
                    view.setWebViewClient(new WebViewClient());
                }
            }"#,
        );
        assert_eq!(rule_ids(&findings), vec!["SlackWebViewClient"]);
    }

    #[test]
    fn test_named_client_with_override_not_flagged_on_setup() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(WebView view) { view.setWebViewClient(new SafeClient()); }
            }
            class SafeClient extends WebViewClient {
                public boolean shouldOverrideUrlLoading(WebView view, String url) {
                    return !url.startsWith("https://example.com/");
                }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unknown_client_class_is_silent() {
        let findings = scan(
            r#"class MyActivity extends Activity {
                void m(WebView view, SomeClient client) { view.setWebViewClient(client); }
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_uri_matcher_in_guarded_provider() {
        let facts = ProjectFacts {
            guarded_providers: vec![GuardedProvider {
                class_name: "SecretProvider".to_string(),
                location: Location::new(PathBuf::from("AndroidManifest.xml"), 12, 12),
            }],
        };
        let findings = scan_with_facts(
            r#"class SecretProvider extends ContentProvider {
                static final UriMatcher MATCHER = new UriMatcher(UriMatcher.NO_MATCH);
            }"#,
            &facts,
        );
        assert_eq!(rule_ids(&findings), vec!["InsecurePathPermission"]);
        // The finding points at the manifest element, not the Java file.
        assert_eq!(
            findings[0].location.file,
            PathBuf::from("AndroidManifest.xml")
        );
        assert_eq!(findings[0].location.start_line, 12);
    }

    #[test]
    fn test_uri_matcher_in_unguarded_class() {
        let findings = scan(
            r#"class OtherProvider extends ContentProvider {
                static final UriMatcher MATCHER = new UriMatcher(UriMatcher.NO_MATCH);
            }"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unparseable_content_yields_empty_result() {
        // tree-sitter still produces a tree with errors; no detector
        // should fire on garbage.
        let findings = scan("this is not java at all {{{");
        assert!(findings.is_empty());
    }
}
