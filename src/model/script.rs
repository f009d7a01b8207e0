//! Script documents tokenized with tree-sitter.
//!
//! Scripts are never executed or fully analysed. The grammar is used to
//! reject files that do not tokenize and to locate template literals, whose
//! `{{ }}` interpolations are parsed by [`crate::template`].

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::template::{parse_template, TemplateNode};

/// Tree-sitter query for template literal tokens.
const TEMPLATE_QUERY: &str = "(template_string) @template";

/// One template literal found in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLiteral {
    /// 1-based line where the literal starts.
    pub line: usize,
    /// Token text, backticks included.
    pub raw: String,
    pub nodes: Vec<TemplateNode>,
}

/// A script file: its text plus its parsed template literals.
#[derive(Debug, Clone)]
pub struct ScriptDocument {
    pub path: String,
    pub source: String,
    pub templates: Vec<TemplateLiteral>,
}

impl ScriptDocument {
    /// Tokenize a script and parse its template literals.
    pub fn parse(path: &str, source: &str) -> anyhow::Result<Self> {
        let language: Language = tree_sitter_javascript::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language)?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to tokenize script"))?;

        let root = tree.root_node();
        if root.has_error() {
            let (row, column) = first_error(root)
                .map(|n| (n.start_position().row, n.start_position().column))
                .unwrap_or((0, 0));
            anyhow::bail!("syntax error at line {}, column {}", row + 1, column + 1);
        }

        let templates = extract_templates(&language, root, source)?;

        Ok(Self {
            path: path.to_string(),
            source: source.to_string(),
            templates,
        })
    }

    /// Source lines paired with their 1-based line numbers.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.source.lines().enumerate().map(|(i, l)| (i + 1, l))
    }
}

fn extract_templates(
    language: &Language,
    root: Node,
    source: &str,
) -> anyhow::Result<Vec<TemplateLiteral>> {
    let query = Query::new(language, TEMPLATE_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, source.as_bytes());

    let mut templates = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let raw = capture.node.utf8_text(source.as_bytes()).unwrap_or("");
            templates.push(TemplateLiteral {
                line: capture.node.start_position().row + 1,
                raw: raw.to_string(),
                nodes: parse_template(raw),
            });
        }
    }

    Ok(templates)
}

/// The first ERROR or MISSING node in document order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}
