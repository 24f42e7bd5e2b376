//! Detector for custom URI schemes added to intent filters in code.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::schemes;
use crate::types::Finding;
use tree_sitter::Node;

pub struct SchemeChannelDetector;

impl Detector for SchemeChannelDetector {
    fn rule_id(&self) -> &str {
        "CustomSchemeChannel"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "method_invocation"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        if resolver::call_name(node, ctx.source) != Some("addDataScheme")
            || !resolver::receiver_extends(node, ctx.source, "IntentFilter")
        {
            return Vec::new();
        }
        let args = resolver::call_args(node);
        if args.len() != 1 {
            return Vec::new();
        }
        match resolver::resolve_string(args[0], ctx.source) {
            Some(scheme) if !schemes::is_registered(&scheme) => finding_at(
                self.rule_id(),
                "Avoid using custom URI schemes",
                node,
                ctx,
            )
            .into_iter()
            .collect(),
            _ => Vec::new(),
        }
    }
}
