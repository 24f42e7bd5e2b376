//! The built-in rule registry.
//!
//! Every rule the scanner knows about is listed here with its metadata.
//! A rule id can be shared by several checks that report different facets
//! of the same weakness (e.g. `SlackWebViewClient` covers the default
//! client as well as slack method overrides), so the registry is keyed by
//! id, not by check.

use crate::types::{FindingCategory, Severity};
use serde::Serialize;
use std::sync::LazyLock;

/// Metadata for a single rule.
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    /// Relative importance within the rule set, 1 (lowest) to 10.
    pub priority: u8,
}

static RULES: LazyLock<Vec<RuleInfo>> = LazyLock::new(|| {
    vec![
        RuleInfo {
            id: "WeakHashFunction",
            title: "Weak hash function",
            description: "A weak hashing function facilitates collision attacks. \
                MD5 is considered broken and should be replaced with SHA-256 or stronger.",
            category: FindingCategory::WeakCryptography,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "InsufficientRSAKeySize",
            title: "Insufficient RSA key size",
            description: "It is recommended to use a key size of at least 2048 bits for the \
                RSA algorithm to ensure a minimal level of security.",
            category: FindingCategory::WeakCryptography,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "CustomSchemeChannel",
            title: "Custom URI scheme channel",
            description: "Any app can register a handler for any custom URI scheme, so custom \
                schemes are neither unique nor protected: a malicious app registering the same \
                scheme can intercept everything encoded in the URL. Use an explicit intent with \
                the receiver's package name instead.",
            category: FindingCategory::InsecureCommunication,
            severity: Severity::Medium,
            priority: 5,
        },
        RuleInfo {
            id: "StickyBroadcast",
            title: "Sticky broadcast",
            description: "Sticky broadcasts provide no security: anyone can access them, anyone \
                can modify them, and they are deprecated since API level 21. Use a non-sticky \
                broadcast to report changes and a separate mechanism to retrieve the current \
                value.",
            category: FindingCategory::IntentHandling,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "UnprotectedPermission",
            title: "Missing protection level on custom permission",
            description: "A custom <permission> without an explicit android:protectionLevel \
                defaults to \"normal\", which is only meant for low-risk features and is \
                granted to any requesting app at install time.",
            category: FindingCategory::PermissionMisuse,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "UnprotectedBroadcastReceiver",
            title: "Unprotected dynamic broadcast receiver",
            description: "Broadcast receivers registered via registerReceiver() without a \
                permission argument are reachable by every app, which enables intent spoofing: \
                a malicious app can invoke onReceive with arbitrary data. Pass a non-null \
                broadcastPermission, or use LocalBroadcastManager for in-app messaging.",
            category: FindingCategory::IntentHandling,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "SlackWebViewClient",
            title: "Slack WebViewClient",
            description: "A WebViewClient that performs no URL restriction opens every page \
                inside the WebView, exposing the app to phishing and cross-site scripting. \
                Override shouldOverrideUrlLoading and maintain a white-list of accessible \
                pages.",
            category: FindingCategory::WebContent,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "ProceedOnSslError",
            title: "SSL errors ignored",
            description: "Calling exclusively handler.proceed() in onReceivedSslError makes the \
                WebViewClient ignore all SSL errors, including certificate validation failures, \
                leaving the WebView open to man-in-the-middle attacks.",
            category: FindingCategory::InsecureCommunication,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "BrokenServicePermission",
            title: "Broken service permission check",
            description: "Binder.getCallingPid()/getCallingUid() return the current app's own \
                pid and uid when no IPC transaction is in progress, and the CallingOrSelf \
                permission check variants also pass when the app itself holds the permission. \
                Either way the check can succeed for an underprivileged caller. Declare the \
                permission statically in the manifest, or use the checkCalling* variants.",
            category: FindingCategory::PermissionMisuse,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "UnauthorizedIntent",
            title: "Implicit intent sent without protection",
            description: "Any app can register itself to receive any implicit intent, so \
                sensitive data in implicit intents can leak to arbitrary apps. Use explicit \
                intents when the receiver is known, or specify a permission in the send call \
                that the receiver must hold.",
            category: FindingCategory::IntentHandling,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "ImplicitPendingIntent",
            title: "PendingIntent built from an implicit intent",
            description: "A PendingIntent should always wrap an explicit intent. Built from an \
                implicit intent it can be intercepted by other apps, which may then modify the \
                intent or read the data it carries.",
            category: FindingCategory::IntentHandling,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "CommonTaskAffinity",
            title: "Common task affinity",
            description: "Non-empty task affinities are shared namespaces: any app can adopt \
                the same affinity and mount phishing or denial-of-service attacks by attaching \
                to the task. Set the application task affinity explicitly to an empty value and \
                do not set it on individual activities.",
            category: FindingCategory::TaskHijacking,
            severity: Severity::Medium,
            priority: 5,
        },
        RuleInfo {
            id: "PersistedDynamicPermission",
            title: "URI permission grant never revoked",
            description: "Context.grantUriPermission grants do not expire; the granting app has \
                to revoke them explicitly with revokeUriPermission. Prefer attaching \
                FLAG_GRANT_READ_URI_PERMISSION or FLAG_GRANT_WRITE_URI_PERMISSION to the \
                intent, which is revoked automatically when the receiver finishes.",
            category: FindingCategory::PermissionMisuse,
            severity: Severity::Medium,
            priority: 6,
        },
        RuleInfo {
            id: "BrokenPathPermissionPrecedence",
            title: "Broken path permission precedence",
            description: "Path permissions cannot make certain provider paths more secure: \
                access is decided by the provider-level permission alone, regardless of \
                narrower path permissions.",
            category: FindingCategory::DataExposure,
            severity: Severity::Medium,
            priority: 5,
        },
        RuleInfo {
            id: "InsecurePathPermission",
            title: "Path permission combined with UriMatcher",
            description: "Path permissions and UriMatcher match paths differently: an extra \
                slash bypasses the path permission check while still matching the UriMatcher, \
                so guarded provider data can leak. Avoid combining path permissions with a \
                UriMatcher in the same content provider.",
            category: FindingCategory::DataExposure,
            severity: Severity::Medium,
            priority: 5,
        },
    ]
});

/// All built-in rules.
pub fn all_rules() -> &'static [RuleInfo] {
    &RULES
}

/// Look up a rule by id.
pub fn rule(id: &str) -> Option<&'static RuleInfo> {
    RULES.iter().find(|r| r.id == id)
}
