//! Detector for URI permission grants that are never revoked.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

/// Flags every `grantUriPermission` call in a file that contains no
/// `revokeUriPermission` call. Grants persist across reboots until
/// explicitly revoked, so a file that only ever grants is suspect.
pub struct UriPermissionDetector;

impl Detector for UriPermissionDetector {
    fn rule_id(&self) -> &str {
        "PersistedDynamicPermission"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "program"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        let mut grants: Vec<Node> = Vec::new();
        let mut revokes = false;

        resolver::walk(node, &mut |n| {
            if n.kind() != "method_invocation" {
                return;
            }
            match resolver::call_name(n, ctx.source) {
                Some("grantUriPermission")
                    if resolver::receiver_extends(n, ctx.source, "Context") =>
                {
                    grants.push(n);
                }
                Some("revokeUriPermission")
                    if resolver::receiver_extends(n, ctx.source, "Context") =>
                {
                    revokes = true;
                }
                _ => {}
            }
        });

        if revokes {
            return Vec::new();
        }
        grants
            .into_iter()
            .filter_map(|grant| {
                finding_at(
                    self.rule_id(),
                    "grantUriPermission() grants persist until explicitly revoked, but no \
                     revokeUriPermission() call was found; prefer intent grant flags, which \
                     are withdrawn automatically",
                    grant,
                    ctx,
                )
            })
            .collect()
    }
}
