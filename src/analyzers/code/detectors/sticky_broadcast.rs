//! Detector for sticky broadcast usage.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

const STICKY_METHODS: &[&str] = &[
    "sendStickyBroadcast",
    "sendStickyBroadcastAsUser",
    "sendStickyOrderedBroadcast",
    "sendStickyOrderedBroadcastAsUser",
    "removeStickyBroadcast",
    "removeStickyBroadcastAsUser",
];

pub struct StickyBroadcastDetector;

impl Detector for StickyBroadcastDetector {
    fn rule_id(&self) -> &str {
        "StickyBroadcast"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "method_invocation"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        let Some(name) = resolver::call_name(node, ctx.source) else {
            return Vec::new();
        };
        if !STICKY_METHODS.contains(&name)
            || !resolver::receiver_extends(node, ctx.source, "Context")
        {
            return Vec::new();
        }
        finding_at(
            self.rule_id(),
            "Sticky broadcasts should not be used as they offer nearly no security or \
             protection",
            node,
            ctx,
        )
        .into_iter()
        .collect()
    }
}
