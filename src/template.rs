//! `{{ }}` interpolations inside script template literals.
//!
//! This is a narrow grammar for what rules inspect: property paths, `??`
//! fallbacks, bare identifiers and string literals. It has no notion of
//! precedence, calls or indexing, and it never fails: anything it does not
//! recognise becomes an identifier node holding the raw text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

/// Operators that rule out the property-path reading of an expression.
const OPERATORS: &[&str] = &["??", "?", ":", "&&", "||", "+", "-", "*", "/"];

/// One interpolation expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Identifier { name: String },
    /// Quotes stripped.
    StringLiteral { value: String },
    /// `object.property`; the rightmost segment is the outermost node.
    PropertyAccess { object: Box<Expr>, property: String },
    NullCoalescing { left: Box<Expr>, right: Box<Expr> },
}

impl Expr {
    pub fn identifier(name: &str) -> Self {
        Expr::Identifier {
            name: name.to_string(),
        }
    }

    pub fn string(value: &str) -> Self {
        Expr::StringLiteral {
            value: value.to_string(),
        }
    }

    pub fn access(object: Expr, property: &str) -> Self {
        Expr::PropertyAccess {
            object: Box::new(object),
            property: property.to_string(),
        }
    }

    pub fn coalesce(left: Expr, right: Expr) -> Self {
        Expr::NullCoalescing {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Leftmost identifier of a property path, or the identifier itself.
    pub fn root_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier { name } => Some(name.as_str()),
            Expr::PropertyAccess { object, .. } => object.root_identifier(),
            _ => None,
        }
    }

    /// Root identifiers of every variable reference in the expression.
    pub fn identifiers(&self) -> Vec<&str> {
        match self {
            Expr::NullCoalescing { left, right } => {
                let mut names = left.identifiers();
                names.extend(right.identifiers());
                names
            }
            Expr::StringLiteral { .. } => Vec::new(),
            other => other.root_identifier().into_iter().collect(),
        }
    }
}

/// One node of a parsed template literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TemplateNode {
    Text { value: String },
    Interpolation { expr: Expr },
}

impl TemplateNode {
    pub fn text(value: &str) -> Self {
        TemplateNode::Text {
            value: value.to_string(),
        }
    }

    pub fn interpolation(expr: Expr) -> Self {
        TemplateNode::Interpolation { expr }
    }
}

/// Parse one template token, backticks included.
pub fn parse_template(token: &str) -> Vec<TemplateNode> {
    let body = strip_backticks(token);
    let mut nodes = Vec::new();
    let mut rest = body;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        push_text(&mut nodes, &rest[..open]);
        nodes.push(TemplateNode::interpolation(parse_expression(&after_open[..close])));
        rest = &after_open[close + 2..];
    }
    push_text(&mut nodes, rest);

    nodes
}

fn strip_backticks(token: &str) -> &str {
    let token = token.strip_prefix('`').unwrap_or(token);
    token.strip_suffix('`').unwrap_or(token)
}

fn push_text(nodes: &mut Vec<TemplateNode>, text: &str) {
    if !text.is_empty() {
        nodes.push(TemplateNode::text(text));
    }
}

/// Parse the text between `{{` and `}}`.
pub fn parse_expression(source: &str) -> Expr {
    let expr = source.trim();

    if let Some(path) = parse_property_path(expr) {
        return path;
    }

    if let Some(idx) = expr.find("??") {
        let left = parse_expression(&expr[..idx]);
        let right = parse_expression(&expr[idx + 2..]);
        return Expr::coalesce(left, right);
    }

    if is_identifier(expr) {
        return Expr::identifier(expr);
    }

    if let Some(value) = parse_string_literal(expr) {
        return Expr::string(value);
    }

    Expr::identifier(expr)
}

fn parse_property_path(expr: &str) -> Option<Expr> {
    if !expr.contains('.') || OPERATORS.iter().any(|op| expr.contains(op)) {
        return None;
    }

    let segments: Vec<&str> = expr.split('.').map(str::trim).collect();
    if !segments.iter().all(|s| is_identifier(s)) {
        return None;
    }

    let mut iter = segments.into_iter();
    let mut node = Expr::identifier(iter.next()?);
    for segment in iter {
        node = Expr::access(node, segment);
    }
    Some(node)
}

/// Whether `s` is a plain JavaScript identifier.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

fn parse_string_literal(expr: &str) -> Option<&str> {
    let bytes = expr.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let quote = bytes[0];
    if (quote == b'\'' || quote == b'"') && bytes[bytes.len() - 1] == quote {
        Some(&expr[1..expr.len() - 1])
    } else {
        None
    }
}
