//! Detector for unprotected dynamically registered broadcast receivers.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

/// Flags `registerReceiver` calls without a broadcast permission (1-3
/// argument forms) or with an explicit null permission (4-5 argument
/// forms). A null first argument is a sticky-broadcast query, not a
/// registration, and is skipped.
pub struct DynamicReceiverDetector;

impl Detector for DynamicReceiverDetector {
    fn rule_id(&self) -> &str {
        "UnprotectedBroadcastReceiver"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "method_invocation"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        if resolver::call_name(node, ctx.source) != Some("registerReceiver")
            || !resolver::receiver_extends(node, ctx.source, "Context")
        {
            return Vec::new();
        }
        let args = resolver::call_args(node);
        let Some(&receiver) = args.first() else {
            return Vec::new();
        };
        if resolver::is_null(receiver, ctx.source) {
            return Vec::new();
        }
        match args.len() {
            1..=3 => finding_at(
                self.rule_id(),
                "Registering a broadcast receiver without a broadcast permission leaves it \
                 open to intent spoofing from any app",
                node,
                ctx,
            )
            .into_iter()
            .collect(),
            4 | 5 if resolver::is_null(args[2], ctx.source) => finding_at(
                self.rule_id(),
                "Null objects should not be used as permission arguments",
                node,
                ctx,
            )
            .into_iter()
            .collect(),
            _ => Vec::new(),
        }
    }
}
