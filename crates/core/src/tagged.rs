//! Reader for the tagged-text form, and structural comparison.
//!
//! Reads both parse-tree files and `<tokens>` listings into a generic
//! [`Element`] tree. Whitespace between tags is not significant; a leaf's
//! text loses the single space the writer puts on each side.

use crate::grammar::Rule;
use crate::lexer::TokenKind;
use crate::tree::{unescape, Node};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaggedError {
    #[error("line {line}: unexpected closing tag </{found}>, expected </{expected}>")]
    Mismatched {
        line: u32,
        expected: String,
        found: String,
    },
    #[error("line {line}: closing tag </{tag}> without opening tag")]
    Unopened { line: u32, tag: String },
    #[error("line {line}: element <{tag}> is never closed")]
    Unclosed { line: u32, tag: String },
    #[error("line {line}: malformed tag")]
    Malformed { line: u32 },
    #[error("line {line}: text outside of any element")]
    StrayText { line: u32 },
    #[error("more than one top-level element")]
    MultipleRoots,
    #[error("no element found")]
    Empty,
    #[error("unknown tag <{0}>")]
    UnknownTag(String),
    #[error("terminal <{0}> cannot have children")]
    TerminalWithChildren(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub text: String,
    pub children: Vec<Element>,
}

struct Open {
    element: Element,
    line: u32,
}

/// Strip the one space of padding the writer emits around leaf text.
fn leaf_text(raw: &str) -> String {
    let s = raw.strip_prefix(' ').unwrap_or(raw);
    let s = s.strip_suffix(' ').unwrap_or(s);
    unescape(s)
}

fn close(mut open: Open) -> Element {
    let raw = std::mem::take(&mut open.element.text);
    // Leaves are written on a single line.
    open.element.text = if open.element.children.is_empty() && !raw.contains('\n') {
        leaf_text(&raw)
    } else {
        unescape(raw.trim())
    };
    open.element
}

pub fn parse(input: &str) -> Result<Element, TaggedError> {
    let mut stack: Vec<Open> = Vec::new();
    let mut root: Option<Element> = None;
    let mut line: u32 = 1;
    let mut rest = input;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            // trailing text
            if !rest.trim().is_empty() {
                return Err(TaggedError::StrayText { line });
            }
            break;
        };
        let (text, after) = rest.split_at(lt);
        match stack.last_mut() {
            Some(open) => open.element.text.push_str(text),
            None if !text.trim().is_empty() => return Err(TaggedError::StrayText { line }),
            None => {}
        }
        line += text.matches('\n').count() as u32;

        let gt = after.find('>').ok_or(TaggedError::Malformed { line })?;
        let inner = &after[1..gt];
        rest = &after[gt + 1..];

        if let Some(name) = inner.strip_prefix('/') {
            let name = name.trim();
            let open = stack.pop().ok_or_else(|| TaggedError::Unopened {
                line,
                tag: name.to_owned(),
            })?;
            if open.element.tag != name {
                return Err(TaggedError::Mismatched {
                    line,
                    expected: open.element.tag,
                    found: name.to_owned(),
                });
            }
            let element = close(open);
            match stack.last_mut() {
                Some(parent) => parent.element.children.push(element),
                None if root.is_some() => return Err(TaggedError::MultipleRoots),
                None => root = Some(element),
            }
        } else if inner.starts_with('?') || inner.starts_with('!') {
            // declarations and comments
            line += inner.matches('\n').count() as u32;
        } else {
            let name = inner.trim();
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(TaggedError::Malformed { line });
            }
            stack.push(Open {
                element: Element {
                    tag: name.to_owned(),
                    ..Element::default()
                },
                line,
            });
        }
    }

    if let Some(open) = stack.pop() {
        return Err(TaggedError::Unclosed {
            line: open.line,
            tag: open.element.tag,
        });
    }
    root.ok_or(TaggedError::Empty)
}

impl From<&Node> for Element {
    fn from(node: &Node) -> Self {
        match node {
            Node::Terminal { kind, text } => Element {
                tag: kind.tag().to_owned(),
                text: text.clone(),
                children: Vec::new(),
            },
            Node::NonTerminal { rule, children } => Element {
                tag: rule.tag().to_owned(),
                text: String::new(),
                children: children.iter().map(Element::from).collect(),
            },
        }
    }
}

impl TryFrom<&Element> for Node {
    type Error = TaggedError;

    fn try_from(element: &Element) -> Result<Self, Self::Error> {
        if let Some(kind) = TokenKind::from_tag(&element.tag) {
            if !element.children.is_empty() {
                return Err(TaggedError::TerminalWithChildren(element.tag.clone()));
            }
            return Ok(Node::Terminal {
                kind,
                text: element.text.clone(),
            });
        }
        let rule =
            Rule::from_tag(&element.tag).ok_or_else(|| TaggedError::UnknownTag(element.tag.clone()))?;
        let children = element
            .children
            .iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Node::NonTerminal { rule, children })
    }
}

/// First place where two element trees disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// XPath-like location, e.g. `/class[0]/subroutineDec[3]`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Compare tags, trimmed text and child order. `None` when equal.
pub fn first_difference(actual: &Element, expected: &Element) -> Option<Difference> {
    diff_at(actual, expected, format!("/{}[0]", expected.tag))
}

fn diff_at(actual: &Element, expected: &Element, path: String) -> Option<Difference> {
    if actual.tag != expected.tag {
        return Some(Difference {
            path,
            message: format!("expected <{}>, found <{}>", expected.tag, actual.tag),
        });
    }
    if actual.text.trim() != expected.text.trim() {
        return Some(Difference {
            path,
            message: format!(
                "expected text {:?}, found {:?}",
                expected.text.trim(),
                actual.text.trim()
            ),
        });
    }
    for (i, (a, e)) in actual.children.iter().zip(&expected.children).enumerate() {
        if let Some(d) = diff_at(a, e, format!("{}/{}[{}]", path, e.tag, i)) {
            return Some(d);
        }
    }
    if actual.children.len() != expected.children.len() {
        return Some(Difference {
            path,
            message: format!(
                "expected {} children, found {}",
                expected.children.len(),
                actual.children.len()
            ),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_elements_and_leaf_text() {
        let doc = "<term>\n  <stringConstant> a b </stringConstant>\n  <symbol> &lt; </symbol>\n</term>\n";
        let el = parse(doc).unwrap();
        assert_eq!(el.tag, "term");
        assert_eq!(el.text, "");
        assert_eq!(el.children.len(), 2);
        assert_eq!(el.children[0].text, "a b");
        assert_eq!(el.children[1].text, "<");
    }

    #[test]
    fn crlf_and_declarations_are_tolerated() {
        let doc = "<?xml version=\"1.0\"?>\r\n<tokens>\r\n<keyword> class </keyword>\r\n</tokens>\r\n";
        let el = parse(doc).unwrap();
        assert_eq!(el.tag, "tokens");
        assert_eq!(el.children[0].text, "class");
    }

    #[test]
    fn empty_element_spread_over_two_lines() {
        let el = parse("<parameterList>\n</parameterList>\n").unwrap();
        assert!(el.children.is_empty());
        assert_eq!(el.text, "");
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            parse("<a>\n</b>"),
            Err(TaggedError::Mismatched { line: 2, .. })
        ));
        assert!(matches!(parse("<a>"), Err(TaggedError::Unclosed { .. })));
        assert!(matches!(parse("</a>"), Err(TaggedError::Unopened { .. })));
        assert!(matches!(parse("<a></a><b></b>"), Err(TaggedError::MultipleRoots)));
        assert!(matches!(parse("  \n"), Err(TaggedError::Empty)));
        assert!(matches!(parse("x<a></a>"), Err(TaggedError::StrayText { .. })));
    }

    #[test]
    fn node_conversion_round_trips() {
        let node = Node::NonTerminal {
            rule: Rule::Term,
            children: vec![Node::Terminal {
                kind: TokenKind::StringConstant,
                text: " padded ".into(),
            }],
        };
        let el = parse(&node.to_xml()).unwrap();
        assert_eq!(Node::try_from(&el).unwrap(), node);
        assert_eq!(Element::from(&node), el);
    }

    #[test]
    fn unknown_tags_are_rejected_as_nodes() {
        let el = parse("<tokens>\n</tokens>").unwrap();
        assert_eq!(
            Node::try_from(&el),
            Err(TaggedError::UnknownTag("tokens".into()))
        );
    }

    #[test]
    fn first_difference_reports_path() {
        let expected = parse(
            "<class>\n<keyword> class </keyword>\n<identifier> Main </identifier>\n</class>",
        )
        .unwrap();
        let actual = parse(
            "<class>\n<keyword> class </keyword>\n<identifier> Mian </identifier>\n</class>",
        )
        .unwrap();
        assert_eq!(first_difference(&expected, &expected), None);
        let d = first_difference(&actual, &expected).unwrap();
        assert_eq!(d.path, "/class[0]/identifier[1]");
        assert!(d.message.contains("Main"));
    }

    #[test]
    fn missing_children_are_reported_on_parent() {
        let expected = parse("<statements>\n<x> 1 </x>\n<y> 2 </y>\n</statements>").unwrap();
        let actual = parse("<statements>\n<x> 1 </x>\n</statements>").unwrap();
        let d = first_difference(&actual, &expected).unwrap();
        assert_eq!(d.path, "/statements[0]");
        assert_eq!(d.message, "expected 2 children, found 1");
    }
}
