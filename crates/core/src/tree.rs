//! Parse-tree nodes and their tagged-text rendering.

use crate::grammar::Rule;
use crate::lexer::{Token, TokenKind};
use serde::Serialize;
use std::fmt::{self, Write};

const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Terminal { kind: TokenKind, text: String },
    NonTerminal { rule: Rule, children: Vec<Node> },
}

impl Node {
    pub fn terminal(token: Token) -> Self {
        Node::Terminal {
            kind: token.kind,
            text: token.text,
        }
    }

    /// Tag used in the rendering: the token kind or the rule name.
    pub fn tag(&self) -> &'static str {
        match self {
            Node::Terminal { kind, .. } => kind.tag(),
            Node::NonTerminal { rule, .. } => rule.tag(),
        }
    }

    pub fn rule(&self) -> Option<Rule> {
        match self {
            Node::NonTerminal { rule, .. } => Some(*rule),
            Node::Terminal { .. } => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::NonTerminal { children, .. } => children,
            Node::Terminal { .. } => &[],
        }
    }

    /// All descendants (and self) produced by `rule`, in document order.
    pub fn find_all(&self, rule: Rule) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect(rule, &mut found);
        found
    }

    fn collect<'n>(&'n self, rule: Rule, out: &mut Vec<&'n Node>) {
        if self.rule() == Some(rule) {
            out.push(self);
        }
        for child in self.children() {
            child.collect(rule, out);
        }
    }

    /// Terminal texts in source order.
    pub fn leaf_texts(&self) -> Vec<&str> {
        match self {
            Node::Terminal { text, .. } => vec![text.as_str()],
            Node::NonTerminal { children, .. } => {
                children.iter().flat_map(|c| c.leaf_texts()).collect()
            }
        }
    }

    fn write_xml(&self, out: &mut String, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        match self {
            Node::Terminal { kind, text } => {
                writeln!(out, "<{0}> {1} </{0}>", kind.tag(), escape(text))
            }
            Node::NonTerminal { rule, children } => {
                writeln!(out, "<{}>", rule.tag())?;
                for child in children {
                    child.write_xml(out, depth + 1)?;
                }
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                writeln!(out, "</{}>", rule.tag())
            }
        }
    }

    /// Render as indented tagged text, one element per line.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_xml(&mut out, 0);
        out
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

/// Render a token listing wrapped in `<tokens>`.
pub fn tokens_to_xml(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for t in tokens {
        let _ = writeln!(out, "<{0}> {1} </{0}>", t.kind.tag(), escape(&t.text));
    }
    out.push_str("</tokens>\n");
    out
}

/// Escape the characters that would break the tagged-text form.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape`]. Unknown entities are left as-is.
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
