//! Detector for WebViews configured with a default WebViewClient.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

const MESSAGE: &str =
    "The configured WebViewClient will open any page within your WebView and thus leave \
     your app vulnerable to a wide range of attacks";

/// Flags `setWebViewClient` calls whose client is a plain
/// `new WebViewClient()` or an instance of a client class visible in the
/// file that does not override `shouldOverrideUrlLoading`. Clients of
/// unknown classes stay silent.
pub struct WebViewSetupDetector;

impl Detector for WebViewSetupDetector {
    fn rule_id(&self) -> &str {
        "SlackWebViewClient"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        kind == "method_invocation"
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        if resolver::call_name(node, ctx.source) != Some("setWebViewClient")
            || !resolver::receiver_extends(node, ctx.source, "WebView")
        {
            return Vec::new();
        }
        let args = resolver::call_args(node);
        if args.len() != 1 {
            return Vec::new();
        }
        if self.client_is_slack(args[0], ctx) {
            finding_at(self.rule_id(), MESSAGE, node, ctx)
                .into_iter()
                .collect()
        } else {
            Vec::new()
        }
    }
}

impl WebViewSetupDetector {
    fn client_is_slack(&self, client: Node, ctx: &FileContext) -> bool {
        let root = resolver::file_root(client);
        match client.kind() {
            "object_creation_expression" => {
                let Some(type_name) = client
                    .child_by_field_name("type")
                    .map(|t| resolver::simple_type_name(resolver::node_text(t, ctx.source)))
                else {
                    return false;
                };
                let mut cursor = client.walk();
                let body = client
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "class_body");
                match body {
                    Some(body) => !declares_override_url(body, ctx.source),
                    None if type_name == "WebViewClient" => true,
                    None => class_in_file(type_name, root, ctx.source)
                        .map(|body| !declares_override_url(body, ctx.source))
                        .unwrap_or(false),
                }
            }
            "identifier" => {
                let name = resolver::node_text(client, ctx.source);
                let Some(type_name) = resolver::declared_type(name, client, ctx.source) else {
                    return false;
                };
                if type_name == "WebViewClient" {
                    return true;
                }
                class_in_file(&type_name, root, ctx.source)
                    .map(|body| !declares_override_url(body, ctx.source))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }
}

/// Body of the class declaration named `name` in this file, if present.
fn class_in_file<'a>(name: &str, root: Node<'a>, source: &str) -> Option<Node<'a>> {
    let mut found = None;
    resolver::walk(root, &mut |n| {
        if found.is_some() || n.kind() != "class_declaration" {
            return;
        }
        let matches = n
            .child_by_field_name("name")
            .map(|c| resolver::node_text(c, source) == name)
            .unwrap_or(false);
        if matches {
            found = n.child_by_field_name("body");
        }
    });
    found
}

fn declares_override_url(body: Node, source: &str) -> bool {
    let mut cursor = body.walk();
    let found = body.named_children(&mut cursor).any(|member| {
        member.kind() == "method_declaration"
            && member
                .child_by_field_name("name")
                .map(|n| resolver::node_text(n, source) == "shouldOverrideUrlLoading")
                .unwrap_or(false)
    });
    found
}
