//! Detector for the CallingOrSelf permission check variants.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

const CALLING_OR_SELF: &[&str] = &[
    "checkCallingOrSelfPermission",
    "checkCallingOrSelfUriPermission",
    "enforceCallingOrSelfPermission",
    "enforceCallingOrSelfUriPermission",
];

/// Flags the `*CallingOrSelf*` check variants: they pass whenever the app
/// itself holds the permission, even when the remote caller does not.
pub struct CallingOrSelfPermissionDetector;

impl Detector for CallingOrSelfPermissionDetector {
    fn rule_id(&self) -> &str {
        "BrokenServicePermission"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "method_invocation"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        let Some(name) = resolver::call_name(node, ctx.source) else {
            return Vec::new();
        };
        if !CALLING_OR_SELF.contains(&name) {
            return Vec::new();
        }
        if !resolver::receiver_extends(node, ctx.source, "Context")
            && !resolver::receiver_extends(node, ctx.source, "PermissionChecker")
        {
            return Vec::new();
        }
        finding_at(
            self.rule_id(),
            format!("{} could grant access to malicious apps", name),
            node,
            ctx,
        )
        .into_iter()
        .collect()
    }
}
