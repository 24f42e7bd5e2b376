//! Detector for MD5 message digests.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

pub struct WeakHashDetector;

impl Detector for WeakHashDetector {
    fn rule_id(&self) -> &str {
        "WeakHashFunction"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "method_invocation"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        if resolver::call_name(node, ctx.source) != Some("getInstance")
            || !resolver::receiver_extends(node, ctx.source, "MessageDigest")
        {
            return Vec::new();
        }
        let args = resolver::call_args(node);
        let Some(&algorithm) = args.first() else {
            return Vec::new();
        };
        match resolver::resolve_string(algorithm, ctx.source) {
            Some(alg) if alg.to_uppercase() == "MD5" => finding_at(
                self.rule_id(),
                "MD5 is a broken hash function that no longer withstands collision attacks; \
                 use SHA-256 or stronger",
                algorithm,
                ctx,
            )
            .into_iter()
            .collect(),
            _ => Vec::new(),
        }
    }
}
