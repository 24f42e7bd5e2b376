//! Detector for implicit intents handed to send-style calls.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

const CONTEXT_SENDS: &[&str] = &[
    "sendBroadcast",
    "sendBroadcastAsUser",
    "sendOrderedBroadcast",
    "sendOrderedBroadcastAsUser",
    "sendStickyBroadcast",
    "sendStickyBroadcastAsUser",
    "sendStickyOrderedBroadcast",
    "sendStickyOrderedBroadcastAsUser",
    "startActivity",
    "startActivities",
    "startActivityForResult",
    "startActivityIfNeeded",
    "startService",
    "bindService",
];

const PENDING_GETS: &[&str] = &[
    "getActivity",
    "getBroadcast",
    "getService",
    "getForegroundService",
];

const COMPONENT_SETTERS: &[&str] = &[
    "setClass",
    "setClassName",
    "setComponentName",
    "setPackage",
    "setComponent",
];

/// Flags send-style calls whose Intent argument is implicit and never made
/// explicit by a component-setting call in the enclosing method.
///
/// Intent constructors with 2 or 4 arguments take a component and are
/// treated as explicit; everything else is implicit. The analysis is
/// control-flow blind: a component-setting call anywhere in the method
/// suppresses the finding.
pub struct ImplicitIntentDetector;

/// Index of the broadcast permission parameter, when the overload has one.
fn permission_arg_index(name: &str, argc: usize) -> Option<usize> {
    match name {
        "sendBroadcast" | "sendOrderedBroadcast" if argc >= 2 => Some(1),
        "sendBroadcastAsUser" | "sendOrderedBroadcastAsUser" if argc >= 3 => Some(2),
        _ => None,
    }
}

fn is_intent_creation(node: Node, source: &str) -> bool {
    node.kind() == "object_creation_expression"
        && node
            .child_by_field_name("type")
            .map(|t| resolver::simple_type_name(resolver::node_text(t, source)) == "Intent")
            .unwrap_or(false)
}

fn is_implicit(creation: Node) -> bool {
    !matches!(resolver::call_args(creation).len(), 2 | 4)
}

/// Whether any component-setting call in the enclosing method could apply
/// to `var`. Calls on unresolvable receivers count as applying.
fn component_set_in_method(usage: Node, var: &str, source: &str) -> bool {
    let Some(scope) = resolver::enclosing_scope(usage) else {
        return false;
    };
    let mut found = false;
    resolver::walk(scope, &mut |n| {
        if found || n.kind() != "method_invocation" {
            return;
        }
        let is_setter = resolver::call_name(n, source)
            .map(|name| COMPONENT_SETTERS.contains(&name))
            .unwrap_or(false);
        if !is_setter {
            return;
        }
        found = match n.child_by_field_name("object") {
            None => true,
            Some(obj) if obj.kind() == "identifier" => resolver::node_text(obj, source) == var,
            Some(_) => true,
        };
    });
    found
}

impl Detector for ImplicitIntentDetector {
    fn rule_id(&self) -> &str {
        "UnauthorizedIntent"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "method_invocation"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        let Some(name) = resolver::call_name(node, ctx.source) else {
            return Vec::new();
        };
        let pending = PENDING_GETS.contains(&name);
        if !pending && !CONTEXT_SENDS.contains(&name) {
            return Vec::new();
        }
        let receiver_ok = if pending {
            resolver::receiver_extends(node, ctx.source, "PendingIntent")
        } else {
            resolver::receiver_extends(node, ctx.source, "Context")
                || resolver::receiver_extends(node, ctx.source, "Activity")
        };
        if !receiver_ok {
            return Vec::new();
        }

        let args = resolver::call_args(node);
        if let Some(idx) = permission_arg_index(name, args.len()) {
            if !resolver::is_null(args[idx], ctx.source) {
                // The receiver must hold the given permission.
                return Vec::new();
            }
        }

        for &arg in &args {
            if is_intent_creation(arg, ctx.source) {
                if is_implicit(arg) {
                    return self.report(pending, node, ctx).into_iter().collect();
                }
                return Vec::new();
            }
            if arg.kind() != "identifier" {
                continue;
            }
            let var = resolver::node_text(arg, ctx.source);
            let assigned = resolver::last_assignment(var, arg, ctx.source);
            let is_intent_var = assigned
                .map(|v| is_intent_creation(v, ctx.source))
                .unwrap_or(false)
                || resolver::declared_type(var, arg, ctx.source).as_deref() == Some("Intent");
            if !is_intent_var {
                continue;
            }
            // An Intent variable whose construction we cannot see is
            // unresolvable and stays silent.
            let Some(creation) = assigned.filter(|v| is_intent_creation(*v, ctx.source)) else {
                return Vec::new();
            };
            if !is_implicit(creation) || component_set_in_method(node, var, ctx.source) {
                return Vec::new();
            }
            return self.report(pending, node, ctx).into_iter().collect();
        }

        Vec::new()
    }
}

impl ImplicitIntentDetector {
    fn report(&self, pending: bool, node: Node, ctx: &FileContext) -> Option<Finding> {
        if pending {
            finding_at(
                "ImplicitPendingIntent",
                "PendingIntents should always be created from explicit intents; an implicit \
                 base intent can be intercepted and modified by other apps",
                node,
                ctx,
            )
        } else {
            finding_at(
                "UnauthorizedIntent",
                "Sending an implicit intent without a receiver permission can expose its \
                 data to any app on the device",
                node,
                ctx,
            )
        }
    }
}
