//! Bounded resolution helpers over the Java syntax tree.
//!
//! Every query here is deliberately shallow: literals, a single level of
//! back-reference to the most recent assignment of a simple identifier, a
//! declared-type lookup and a subtype check against the embedded SDK table
//! plus same-file `extends` chains. Anything that cannot be resolved
//! returns `None`/`false`, and the caller stays silent.

use super::sdk;
use tree_sitter::Node;

/// Upper bound on `extends` chain walks, SDK plus same-file.
const MAX_EXTENDS_DEPTH: usize = 16;

/// Source text of a node.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Run `f` on `node` and every named descendant, pre-order.
pub fn walk<'a>(node: Node<'a>, f: &mut impl FnMut(Node<'a>)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk(child, f);
    }
}

/// Name of a method invocation.
pub fn call_name<'a>(call: Node, source: &'a str) -> Option<&'a str> {
    call.child_by_field_name("name")
        .map(|n| node_text(n, source))
}

/// Named argument nodes of a method invocation or constructor call.
pub fn call_args<'a>(call: Node<'a>) -> Vec<Node<'a>> {
    let Some(args) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = args.walk();
    args.named_children(&mut cursor).collect()
}

/// Resolve a string expression: literal, `+` concatenation, or one level
/// of back-reference to the latest assignment of a simple identifier.
pub fn resolve_string(node: Node, source: &str) -> Option<String> {
    resolve_string_depth(node, source, 1)
}

fn resolve_string_depth(node: Node, source: &str, depth: usize) -> Option<String> {
    match node.kind() {
        "string_literal" => Some(unquote(node_text(node, source))),
        "parenthesized_expression" => {
            resolve_string_depth(node.named_child(0)?, source, depth)
        }
        "binary_expression" => {
            let op = node.child_by_field_name("operator")?;
            if node_text(op, source) != "+" {
                return None;
            }
            let left = resolve_string_depth(node.child_by_field_name("left")?, source, depth)?;
            let right = resolve_string_depth(node.child_by_field_name("right")?, source, depth)?;
            Some(left + &right)
        }
        "identifier" if depth > 0 => {
            let value = last_assignment(node_text(node, source), node, source)?;
            resolve_string_depth(value, source, depth - 1)
        }
        _ => None,
    }
}

/// Resolve an integer expression, same bounds as [`resolve_string`].
pub fn resolve_int(node: Node, source: &str) -> Option<i64> {
    resolve_int_depth(node, source, 1)
}

fn resolve_int_depth(node: Node, source: &str, depth: usize) -> Option<i64> {
    match node.kind() {
        "decimal_integer_literal" => {
            let text = node_text(node, source)
                .trim_end_matches(['l', 'L'])
                .replace('_', "");
            text.parse().ok()
        }
        "parenthesized_expression" => resolve_int_depth(node.named_child(0)?, source, depth),
        "unary_expression" => {
            let op = node.child_by_field_name("operator")?;
            let operand = resolve_int_depth(node.child_by_field_name("operand")?, source, depth)?;
            match node_text(op, source) {
                "-" => Some(-operand),
                "+" => Some(operand),
                _ => None,
            }
        }
        "identifier" if depth > 0 => {
            let value = last_assignment(node_text(node, source), node, source)?;
            resolve_int_depth(value, source, depth - 1)
        }
        _ => None,
    }
}

/// Whether an expression is the null literal, directly or through one
/// back-reference.
pub fn is_null(node: Node, source: &str) -> bool {
    match node.kind() {
        "null_literal" => true,
        "identifier" => last_assignment(node_text(node, source), node, source)
            .map(|v| v.kind() == "null_literal")
            .unwrap_or(false),
        _ => false,
    }
}

fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// The enclosing method or constructor declaration, if any.
pub fn enclosing_scope(node: Node) -> Option<Node> {
    let mut current = node.parent();
    while let Some(n) = current {
        if matches!(n.kind(), "method_declaration" | "constructor_declaration") {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// The enclosing named class declaration, if any.
pub fn enclosing_class(node: Node) -> Option<Node> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "class_declaration" {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Unqualified name of the class a node sits in. For a node inside an
/// anonymous subclass body this is the instantiated type, which is what
/// the subtype check needs.
pub fn enclosing_class_name<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "class_declaration" => {
                return n.child_by_field_name("name").map(|c| node_text(c, source));
            }
            "class_body" => {
                if let Some(parent) = n.parent() {
                    if parent.kind() == "object_creation_expression" {
                        return parent
                            .child_by_field_name("type")
                            .map(|t| simple_type_name(node_text(t, source)));
                    }
                }
            }
            _ => {}
        }
        current = n.parent();
    }
    None
}

/// Root node of the file the node belongs to.
pub fn file_root(node: Node) -> Node {
    let mut current = node;
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

/// The value most recently assigned to `name` before `usage`, searching
/// declarators and assignments in the enclosing method by byte position,
/// then `final` field initializers in the enclosing class.
pub fn last_assignment<'a>(name: &str, usage: Node<'a>, source: &str) -> Option<Node<'a>> {
    if let Some(scope) = enclosing_scope(usage) {
        let mut best: Option<Node> = None;
        walk(scope, &mut |n| {
            let value = match n.kind() {
                "variable_declarator" => {
                    let decl_name = n.child_by_field_name("name");
                    match decl_name {
                        Some(dn) if node_text(dn, source) == name => {
                            n.child_by_field_name("value")
                        }
                        _ => None,
                    }
                }
                "assignment_expression" => {
                    let left = n.child_by_field_name("left");
                    match left {
                        Some(l)
                            if l.kind() == "identifier" && node_text(l, source) == name =>
                        {
                            n.child_by_field_name("right")
                        }
                        _ => None,
                    }
                }
                _ => None,
            };
            if let Some(v) = value {
                if n.start_byte() < usage.start_byte()
                    && best.map(|b| n.start_byte() > b.start_byte()).unwrap_or(true)
                {
                    best = Some(v);
                }
            }
        });
        if let Some(v) = best {
            return Some(v);
        }
    }

    final_field_initializer(name, usage, source)
}

fn final_field_initializer<'a>(name: &str, usage: Node<'a>, source: &str) -> Option<Node<'a>> {
    let class = enclosing_class(usage)?;
    let body = class.child_by_field_name("body")?;
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() != "field_declaration" {
            continue;
        }
        let is_final = {
            let mut mc = member.walk();
            let found = member
                .children(&mut mc)
                .any(|c| c.kind() == "modifiers" && node_text(c, source).contains("final"));
            found
        };
        if !is_final {
            continue;
        }
        let mut dc = member.walk();
        for decl in member.named_children(&mut dc) {
            if decl.kind() != "variable_declarator" {
                continue;
            }
            let matches_name = decl
                .child_by_field_name("name")
                .map(|n| node_text(n, source) == name)
                .unwrap_or(false);
            if matches_name {
                if let Some(value) = decl.child_by_field_name("value") {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Declared type of `name` at `usage`: locals and parameters of the
/// enclosing method first, then fields of the enclosing class.
pub fn declared_type(name: &str, usage: Node, source: &str) -> Option<String> {
    if let Some(scope) = enclosing_scope(usage) {
        let mut found: Option<String> = None;
        walk(scope, &mut |n| {
            if found.is_some() {
                return;
            }
            match n.kind() {
                "local_variable_declaration" if n.start_byte() < usage.start_byte() => {
                    if declares(n, name, source) {
                        found = type_of(n, source);
                    }
                }
                "formal_parameter" => {
                    let param_name = n.child_by_field_name("name");
                    if param_name.map(|p| node_text(p, source) == name).unwrap_or(false) {
                        found = type_of(n, source);
                    }
                }
                _ => {}
            }
        });
        if found.is_some() {
            return found;
        }
    }
    field_type(name, usage, source)
}

/// Declared type of a field of the enclosing class.
pub fn field_type(name: &str, usage: Node, source: &str) -> Option<String> {
    let class = enclosing_class(usage)?;
    let body = class.child_by_field_name("body")?;
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() == "field_declaration" && declares(member, name, source) {
            return type_of(member, source);
        }
    }
    None
}

fn declares(decl: Node, name: &str, source: &str) -> bool {
    let mut cursor = decl.walk();
    let found = decl.named_children(&mut cursor).any(|c| {
        c.kind() == "variable_declarator"
            && c.child_by_field_name("name")
                .map(|n| node_text(n, source) == name)
                .unwrap_or(false)
    });
    found
}

fn type_of(decl: Node, source: &str) -> Option<String> {
    decl.child_by_field_name("type")
        .map(|t| simple_type_name(node_text(t, source)).to_string())
}

/// Strip generics and package qualifiers from a type name.
pub fn simple_type_name(type_text: &str) -> &str {
    let base = type_text.split('<').next().unwrap_or(type_text).trim();
    base.rsplit('.').next().unwrap_or(base)
}

/// Whether a class named `class_name` is `target` or extends it, through
/// the SDK table and same-file `extends` chains.
pub fn class_extends(class_name: &str, target: &str, root: Node, source: &str) -> bool {
    let mut current = class_name.to_string();
    for _ in 0..MAX_EXTENDS_DEPTH {
        if current == target || sdk::extends(&current, target) {
            return true;
        }
        match superclass_in_file(&current, root, source) {
            Some(s) => current = s,
            None => return false,
        }
    }
    false
}

fn superclass_in_file(class_name: &str, root: Node, source: &str) -> Option<String> {
    let mut result: Option<String> = None;
    walk(root, &mut |n| {
        if result.is_some() || n.kind() != "class_declaration" {
            return;
        }
        let name_matches = n
            .child_by_field_name("name")
            .map(|c| node_text(c, source) == class_name)
            .unwrap_or(false);
        if !name_matches {
            return;
        }
        if let Some(sup) = n.child_by_field_name("superclass") {
            // The superclass node spells "extends Foo"; the type is its
            // only named child.
            if let Some(ty) = sup.named_child(0) {
                result = Some(simple_type_name(node_text(ty, source)).to_string());
            }
        }
    });
    result
}

/// Whether the receiver of a method invocation is (a subtype of) `target`.
///
/// Handles `this`/implicit receivers via the enclosing class, identifiers
/// via their declared type (falling back to treating the text as a class
/// name, which covers static calls like `Binder.getCallingPid()`),
/// constructor results, and `this.field` accesses. Every other receiver
/// shape is unresolvable and does not match.
pub fn receiver_extends(call: Node, source: &str, target: &str) -> bool {
    let root = file_root(call);
    let Some(object) = call.child_by_field_name("object") else {
        return enclosing_class_name(call, source)
            .map(|c| class_extends(c, target, root, source))
            .unwrap_or(false);
    };

    match object.kind() {
        "this" => enclosing_class_name(call, source)
            .map(|c| class_extends(c, target, root, source))
            .unwrap_or(false),
        "identifier" => {
            let name = node_text(object, source);
            let class = declared_type(name, object, source)
                .unwrap_or_else(|| name.to_string());
            class_extends(&class, target, root, source)
        }
        "object_creation_expression" => object
            .child_by_field_name("type")
            .map(|t| class_extends(simple_type_name(node_text(t, source)), target, root, source))
            .unwrap_or(false),
        "field_access" => {
            let is_this = object
                .child_by_field_name("object")
                .map(|o| o.kind() == "this")
                .unwrap_or(false);
            if !is_this {
                return false;
            }
            let field = object.child_by_field_name("field");
            match field {
                Some(f) => field_type(node_text(f, source), call, source)
                    .map(|t| class_extends(&t, target, root, source))
                    .unwrap_or(false),
                None => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{Parser, Tree};

    fn parse(source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn find_call<'a>(root: Node<'a>, source: &str, name: &str) -> Node<'a> {
        let mut found = None;
        walk(root, &mut |n| {
            if found.is_none()
                && n.kind() == "method_invocation"
                && call_name(n, source) == Some(name)
            {
                found = Some(n);
            }
        });
        found.expect("call not found")
    }

    #[test]
    fn test_resolve_string_literal_and_concat() {
        let source = r#"class A { void m() { f("M" + "D5"); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "f");
        let args = call_args(call);
        assert_eq!(resolve_string(args[0], source), Some("MD5".to_string()));
    }

    #[test]
    fn test_resolve_string_back_reference() {
        let source = r#"class A { void m() { String alg = "MD5"; f(alg); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "f");
        let args = call_args(call);
        assert_eq!(resolve_string(args[0], source), Some("MD5".to_string()));
    }

    #[test]
    fn test_last_assignment_wins() {
        let source = r#"class A { void m() { String a = "x"; a = "y"; f(a); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "f");
        let args = call_args(call);
        assert_eq!(resolve_string(args[0], source), Some("y".to_string()));
    }

    #[test]
    fn test_final_field_initializer() {
        let source = r#"class A { private final String ALG = "MD5"; void m() { f(ALG); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "f");
        let args = call_args(call);
        assert_eq!(resolve_string(args[0], source), Some("MD5".to_string()));
    }

    #[test]
    fn test_unresolvable_is_none() {
        let source = r#"class A { void m(String alg) { f(alg); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "f");
        let args = call_args(call);
        assert_eq!(resolve_string(args[0], source), None);
    }

    #[test]
    fn test_resolve_int() {
        let source = r#"class A { void m() { int bits = 1024; g(bits); g(-1); g(2_048); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "g");
        let args = call_args(call);
        assert_eq!(resolve_int(args[0], source), Some(1024));
    }

    #[test]
    fn test_declared_type_of_parameter() {
        let source = r#"class A { void m(WebView view) { view.loadUrl("x"); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "loadUrl");
        assert!(receiver_extends(call, source, "WebView"));
        assert!(!receiver_extends(call, source, "Context"));
    }

    #[test]
    fn test_implicit_receiver_via_enclosing_class() {
        let source = r#"class MyService extends Service {
            void m() { sendStickyBroadcast(null); }
        }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "sendStickyBroadcast");
        assert!(receiver_extends(call, source, "Context"));
    }

    #[test]
    fn test_static_receiver_by_class_name() {
        let source = r#"class A { void m() { int pid = Binder.getCallingPid(); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "getCallingPid");
        assert!(receiver_extends(call, source, "Binder"));
    }

    #[test]
    fn test_same_file_extends_chain() {
        let source = r#"
        class Base extends Activity {}
        class Leaf extends Base { void m() { startActivity(null); } }
        "#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "startActivity");
        assert!(receiver_extends(call, source, "Context"));
    }

    #[test]
    fn test_anonymous_class_receiver() {
        let source = r#"class A { void m() {
            new WebViewClient() { void h() { proceed(); } };
        } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "proceed");
        assert!(receiver_extends(call, source, "WebViewClient"));
    }

    #[test]
    fn test_is_null() {
        let source = r#"class A { void m() { String p = null; f(p); f(null); f("x"); } }"#;
        let tree = parse(source);
        let call = find_call(tree.root_node(), source, "f");
        let args = call_args(call);
        assert!(is_null(args[0], source));
    }
}
