//! Detector for permission checks fed from Binder.getCallingPid/Uid.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

/// Flags `checkPermission`-family calls whose pid and uid arguments come
/// from `Binder.getCallingPid()`/`getCallingUid()`. Outside an IPC
/// transaction those return the app's own pid and uid, so the check can
/// pass for an unauthorized caller.
pub struct PermissionCheckDetector;

/// (pid index, uid index) for a given method name and argument count.
fn pid_uid_positions(name: &str, argc: usize) -> Option<(usize, usize)> {
    match (name, argc) {
        ("checkPermission", 3) => Some((1, 2)),
        ("enforcePermission", 4) => Some((1, 2)),
        ("checkUriPermission", 4) => Some((1, 2)),
        ("enforceUriPermission", 5) => Some((1, 2)),
        ("checkUriPermission", 6) => Some((3, 4)),
        ("enforceUriPermission", 7) => Some((3, 4)),
        _ => None,
    }
}

fn is_binder_call(arg: Node, source: &str, method: &str) -> bool {
    let call = match arg.kind() {
        "method_invocation" => Some(arg),
        "identifier" => resolver::last_assignment(resolver::node_text(arg, source), arg, source)
            .filter(|v| v.kind() == "method_invocation"),
        _ => None,
    };
    match call {
        Some(c) => {
            resolver::call_name(c, source) == Some(method)
                && resolver::receiver_extends(c, source, "Binder")
        }
        None => false,
    }
}

impl Detector for PermissionCheckDetector {
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
        let args = resolver::call_args(node);
        let Some((pid_idx, uid_idx)) = pid_uid_positions(name, args.len()) else {
            return Vec::new();
        };
        if !resolver::receiver_extends(node, ctx.source, "Context") {
            return Vec::new();
        }
        if is_binder_call(args[pid_idx], ctx.source, "getCallingPid")
            && is_binder_call(args[uid_idx], ctx.source, "getCallingUid")
        {
            return finding_at(
                self.rule_id(),
                "Binder.getCallingPid() and Binder.getCallingUid() return the app's own pid \
                 and uid when no IPC transaction is in progress, so this check can pass for \
                 an unauthorized caller",
                node,
                ctx,
            )
            .into_iter()
            .collect();
        }
        Vec::new()
    }
}
