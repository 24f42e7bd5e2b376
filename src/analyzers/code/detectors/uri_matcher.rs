//! Detector for UriMatcher use inside path-permission guarded providers.

use super::{Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::registry;
use crate::types::{truncate, Finding};
use tree_sitter::Node;

/// Flags `new UriMatcher(...)` inside a class the manifest recorded as an
/// exported provider guarded by a `path-permission`. UriMatcher and path
/// permissions disagree on path matching (an extra slash bypasses the
/// permission but still matches), so the combination leaks guarded data.
/// The finding points at the provider element in the manifest.
pub struct UriMatcherDetector;

impl Detector for UriMatcherDetector {
    fn rule_id(&self) -> &str {
        "InsecurePathPermission"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "object_creation_expression"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        let is_matcher = node
            .child_by_field_name("type")
            .map(|t| resolver::simple_type_name(resolver::node_text(t, ctx.source)) == "UriMatcher")
            .unwrap_or(false);
        if !is_matcher {
            return Vec::new();
        }
        let Some(class) = resolver::enclosing_class(node) else {
            return Vec::new();
        };
        let Some(class_name) = class
            .child_by_field_name("name")
            .map(|n| resolver::node_text(n, ctx.source))
        else {
            return Vec::new();
        };
        let Some(provider) = ctx.facts.guarded_provider(class_name) else {
            return Vec::new();
        };
        let Some(info) = registry::rule(self.rule_id()) else {
            return Vec::new();
        };
        vec![Finding::new(
            info.id,
            info.title,
            "This provider combines a path permission with a UriMatcher; an extra slash in \
             the request bypasses the path permission but still matches the UriMatcher",
            info.severity,
            info.category,
            provider.location.clone(),
            truncate(resolver::node_text(node, ctx.source), 120),
        )]
    }
}
