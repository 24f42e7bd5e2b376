//! Detector for WebViewClient subclasses that do not restrict content.

use super::{finding_at, Detector, FileContext};
use crate::analyzers::code::resolver;
use crate::types::Finding;
use tree_sitter::Node;

/// Inspects `WebViewClient` subclasses, named or anonymous, for override
/// methods that wave everything through: a `shouldInterceptRequest` that
/// only returns null, a `shouldOverrideUrlLoading` that loads every page,
/// and an `onReceivedSslError` that exclusively proceeds.
pub struct WebViewClientDetector;

impl Detector for WebViewClientDetector {
    fn rule_id(&self) -> &str {
        "SlackWebViewClient"
    }

    fn handles_node_kind(&self, kind: &str) -> bool {
        matches!(kind, "class_declaration" | "object_creation_expression")
    }

    fn check(&self, node: Node, ctx: &FileContext) -> Vec<Finding> {
        let root = resolver::file_root(node);
        let body = match node.kind() {
            "class_declaration" => {
                let Some(name) = node.child_by_field_name("name") else {
                    return Vec::new();
                };
                let name = resolver::node_text(name, ctx.source);
                if !resolver::class_extends(name, "WebViewClient", root, ctx.source)
                    || name == "WebViewClient"
                {
                    return Vec::new();
                }
                node.child_by_field_name("body")
            }
            "object_creation_expression" => {
                let extends_client = node
                    .child_by_field_name("type")
                    .map(|t| {
                        resolver::class_extends(
                            resolver::simple_type_name(resolver::node_text(t, ctx.source)),
                            "WebViewClient",
                            root,
                            ctx.source,
                        )
                    })
                    .unwrap_or(false);
                if !extends_client {
                    return Vec::new();
                }
                let mut cursor = node.walk();
                let body = node
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "class_body");
                body
            }
            _ => None,
        };

        let Some(body) = body else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() != "method_declaration" {
                continue;
            }
            let Some(name) = member.child_by_field_name("name") else {
                continue;
            };
            match resolver::node_text(name, ctx.source) {
                "shouldInterceptRequest" => self.check_intercept(member, ctx, &mut findings),
                "shouldOverrideUrlLoading" => self.check_override_url(member, ctx, &mut findings),
                "onReceivedSslError" => self.check_ssl_error(member, ctx, &mut findings),
                _ => {}
            }
        }
        findings
    }
}

impl WebViewClientDetector {
    /// Flag when every return expression is the null literal.
    fn check_intercept(&self, method: Node, ctx: &FileContext, findings: &mut Vec<Finding>) {
        let returns = return_expressions(method);
        let all_null = !returns.is_empty()
            && returns
                .iter()
                .all(|r| r.map(|e| e.kind() == "null_literal").unwrap_or(false));
        if all_null {
            findings.extend(finding_at(
                self.rule_id(),
                "This shouldInterceptRequest implementation only returns null and does not \
                 restrict the resources loaded inside the WebView",
                method,
                ctx,
            ));
        }
    }

    /// Flag unless some return is not `false`, and even then flag the
    /// "load everything myself" shape: an unconditional loadUrl call with
    /// every return being `true`.
    fn check_override_url(&self, method: Node, ctx: &FileContext, findings: &mut Vec<Finding>) {
        let returns = return_expressions(method);
        let some_not_false = returns
            .iter()
            .any(|r| r.map(|e| e.kind() != "false").unwrap_or(true));
        let all_true = returns
            .iter()
            .all(|r| r.map(|e| e.kind() == "true").unwrap_or(false));
        let loads_unconditionally = has_unconditional_load_url(method, ctx.source);

        let safe = some_not_false && !(loads_unconditionally && all_true);
        if !safe {
            findings.extend(finding_at(
                self.rule_id(),
                "This shouldOverrideUrlLoading implementation does not restrict the pages \
                 opened within the WebView; maintain a white-list of accessible pages",
                method,
                ctx,
            ));
        }
    }

    /// Flag when the handler exclusively proceeds: a proceed() call is
    /// present, no cancel() call, and the handler is never handed to
    /// another call (which could decide either way).
    fn check_ssl_error(&self, method: Node, ctx: &FileContext, findings: &mut Vec<Finding>) {
        let Some(handler) = ssl_handler_param(method, ctx.source) else {
            return;
        };
        let mut proceeds = false;
        let mut cancels = false;
        let mut escapes = false;
        resolver::walk(method, &mut |n| {
            if n.kind() != "method_invocation" {
                return;
            }
            let on_handler = n
                .child_by_field_name("object")
                .map(|o| o.kind() == "identifier" && resolver::node_text(o, ctx.source) == handler)
                .unwrap_or(false);
            match resolver::call_name(n, ctx.source) {
                Some("proceed") if on_handler => proceeds = true,
                Some("cancel") if on_handler => cancels = true,
                _ => {}
            }
            if resolver::call_args(n)
                .iter()
                .any(|a| a.kind() == "identifier" && resolver::node_text(*a, ctx.source) == handler)
            {
                escapes = true;
            }
        });
        if proceeds && !cancels && !escapes {
            findings.extend(finding_at(
                "ProceedOnSslError",
                "Calling exclusively handler.proceed() in onReceivedSslError ignores every \
                 SSL error and leaves the WebView open to man-in-the-middle attacks",
                method,
                ctx,
            ));
        }
    }
}

/// Expressions of every return statement in the method, `None` for a bare
/// `return;`.
fn return_expressions(method: Node) -> Vec<Option<Node>> {
    let mut returns = Vec::new();
    resolver::walk(method, &mut |n| {
        if n.kind() == "return_statement" {
            returns.push(n.named_child(0));
        }
    });
    returns
}

/// Whether the method's top-level block contains a plain `loadUrl` call
/// statement on a WebView receiver.
fn has_unconditional_load_url(method: Node, source: &str) -> bool {
    let Some(block) = method.child_by_field_name("body") else {
        return false;
    };
    let mut cursor = block.walk();
    let found = block.named_children(&mut cursor).any(|stmt| {
        if stmt.kind() != "expression_statement" {
            return false;
        }
        stmt.named_child(0)
            .map(|expr| {
                expr.kind() == "method_invocation"
                    && resolver::call_name(expr, source) == Some("loadUrl")
                    && resolver::receiver_extends(expr, source, "WebView")
            })
            .unwrap_or(false)
    });
    found
}

/// Name of the method's `SslErrorHandler` parameter, if declared.
fn ssl_handler_param<'a>(method: Node, source: &'a str) -> Option<&'a str> {
    let params = method.child_by_field_name("parameters")?;
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        if param.kind() != "formal_parameter" {
            continue;
        }
        let is_handler = param
            .child_by_field_name("type")
            .map(|t| resolver::simple_type_name(resolver::node_text(t, source)) == "SslErrorHandler")
            .unwrap_or(false);
        if is_handler {
            return param
                .child_by_field_name("name")
                .map(|n| resolver::node_text(n, source));
        }
    }
    None
}
