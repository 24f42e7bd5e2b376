//! Detector for undersized RSA key pairs.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

const MIN_KEY_SIZE: i64 = 2048;

/// Flags methods that request an RSA `KeyPairGenerator` and initialize it
/// with fewer than 2048 bits. Both calls must occur in the same method;
/// the order does not matter.
pub struct RsaKeySizeDetector;

impl Detector for RsaKeySizeDetector {
    fn rule_id(&self) -> &str {
        "InsufficientRSAKeySize"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        matches!(kind, "method_declaration" | "constructor_declaration")
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        let mut rsa_requested = false;
        let mut weak_initialize: Option<Node> = None;

        resolver::walk(node, &mut |n| {
            if n.kind() != "method_invocation" {
                return;
            }
            match resolver::call_name(n, ctx.source) {
                Some("getInstance")
                    if resolver::receiver_extends(n, ctx.source, "KeyPairGenerator") =>
                {
                    let args = resolver::call_args(n);
                    if matches!(args.len(), 1 | 2) {
                        let is_rsa = resolver::resolve_string(args[0], ctx.source)
                            .map(|a| a.to_uppercase().starts_with("RSA"))
                            .unwrap_or(false);
                        rsa_requested = rsa_requested || is_rsa;
                    }
                }
                Some("initialize")
                    if resolver::receiver_extends(n, ctx.source, "KeyPairGenerator") =>
                {
                    let args = resolver::call_args(n);
                    if args.len() == 1 {
                        let too_small = resolver::resolve_int(args[0], ctx.source)
                            .map(|bits| bits < MIN_KEY_SIZE)
                            .unwrap_or(false);
                        if too_small {
                            weak_initialize = Some(n);
                        }
                    }
                }
                _ => {}
            }
        });

        match (rsa_requested, weak_initialize) {
            (true, Some(call)) => finding_at(
                self.rule_id(),
                "Use a key size of at least 2048 bits for the RSA algorithm to ensure a \
                 minimal level of security",
                call,
                ctx,
            )
            .into_iter()
            .collect(),
            _ => Vec::new(),
        }
    }
}
