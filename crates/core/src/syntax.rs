//! Syntax-element combinators and the resolver that runs them.
//!
//! A [`Syntax`] value describes a piece of grammar. The [`Parser`] can ask
//! whether an element `matches` at some lookahead offset (peeking only), or
//! `resolve` it, consuming exactly its tokens and producing parse-tree nodes.
//! There is no backtracking: alternations commit to the first option whose
//! `matches` succeeds.

use crate::error::JackError;
use crate::grammar::{Grammar, Rule};
use crate::lexer::{Token, TokenKind};
use crate::registry::TypeRegistry;
use crate::stream::TokenStream;
use crate::tree::Node;

/// Deepest allowed nesting of rules. Each level of parentheses in an
/// expression costs two (`expression` and `term`).
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syntax {
    Keyword(&'static str),
    Symbol(char),
    /// Any identifier.
    Identifier,
    /// An identifier present in the type registry.
    TypeName,
    IntegerConstant,
    StringConstant,
    /// A named non-terminal; resolves to one node.
    Rule(Rule),
    /// All items in order. `matches` checks the first `1 + lookahead`
    /// items at consecutive offsets.
    Seq { items: Vec<Syntax>, lookahead: usize },
    /// First option that matches wins.
    OneOf {
        name: &'static str,
        options: Vec<Syntax>,
    },
    /// Resolved only when the first item matches.
    Optional(Vec<Syntax>),
    /// Zero or more, while the first item matches.
    Repeat(Vec<Syntax>),
    /// Subroutine call: qualified when the token after the head is `.`.
    Call {
        plain: Box<Syntax>,
        qualified: Box<Syntax>,
    },
}

impl Syntax {
    /// Human-readable name used in error candidate lists.
    pub fn describe(&self) -> String {
        match self {
            Syntax::Keyword(k) => format!("keyword `{}`", k),
            Syntax::Symbol(c) => format!("symbol `{}`", c),
            Syntax::Identifier => "identifier".to_owned(),
            Syntax::TypeName => "className".to_owned(),
            Syntax::IntegerConstant => "integerConstant".to_owned(),
            Syntax::StringConstant => "stringConstant".to_owned(),
            Syntax::Rule(r) => r.tag().to_owned(),
            Syntax::OneOf { name, .. } => (*name).to_owned(),
            Syntax::Seq { items, lookahead } if *lookahead > 0 => items
                .iter()
                .take(lookahead + 1)
                .map(Syntax::describe)
                .collect::<Vec<_>>()
                .join(" "),
            Syntax::Seq { items, .. } | Syntax::Optional(items) | Syntax::Repeat(items) => items
                .first()
                .map(Syntax::describe)
                .unwrap_or_else(|| "nothing".to_owned()),
            Syntax::Call { .. } => "subroutineCall".to_owned(),
        }
    }
}

/// Resolution context for one compilation unit.
pub struct Parser<'a> {
    grammar: &'a Grammar,
    registry: &'a TypeRegistry,
    stream: TokenStream<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(grammar: &'a Grammar, registry: &'a TypeRegistry, stream: TokenStream<'a>) -> Self {
        Parser {
            grammar,
            registry,
            stream,
            depth: 0,
        }
    }

    fn terminal_matches(&self, syntax: &Syntax, token: &Token) -> bool {
        match syntax {
            Syntax::Keyword(k) => token.is_keyword(k),
            Syntax::Symbol(c) => token.is_symbol(*c),
            Syntax::Identifier => token.kind == TokenKind::Identifier,
            Syntax::TypeName => {
                token.kind == TokenKind::Identifier && self.registry.is_registered(&token.text)
            }
            Syntax::IntegerConstant => token.kind == TokenKind::IntegerConstant,
            Syntax::StringConstant => token.kind == TokenKind::StringConstant,
            _ => false,
        }
    }

    /// Whether the token at `offset` ahead starts `syntax`. Never consumes.
    pub fn matches(&mut self, syntax: &Syntax, offset: usize) -> Result<bool, JackError> {
        let grammar = self.grammar;
        match syntax {
            Syntax::Rule(r) => self.matches(grammar.body(*r), offset),
            Syntax::Seq { items, lookahead } => {
                for (i, item) in items.iter().take(lookahead + 1).enumerate() {
                    if !self.matches(item, offset + i)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Syntax::OneOf { options, .. } => {
                for option in options {
                    if self.matches(option, offset)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Syntax::Optional(items) | Syntax::Repeat(items) => match items.first() {
                Some(first) => self.matches(first, offset),
                None => Ok(false),
            },
            Syntax::Call { plain, qualified } => {
                if self.stream.peek(offset)?.kind != TokenKind::Identifier {
                    return Ok(false);
                }
                if self.stream.peek(offset + 1)?.is_symbol('.') {
                    self.matches(qualified, offset)
                } else {
                    self.matches(plain, offset)
                }
            }
            terminal => {
                let token = self.stream.peek(offset)?.clone();
                Ok(self.terminal_matches(terminal, &token))
            }
        }
    }

    fn mismatch(&mut self, expected: Vec<String>) -> JackError {
        let file = self.stream.filename().to_owned();
        match self.stream.peek(0) {
            Ok(token) => JackError::Syntax {
                file,
                line: token.line,
                expected,
                found: token.to_string(),
            },
            Err(e) => e,
        }
    }

    fn too_deep(&mut self) -> JackError {
        let file = self.stream.filename().to_owned();
        match self.stream.peek(0) {
            Ok(token) => JackError::TooDeep {
                file,
                line: token.line,
                limit: MAX_NESTING,
            },
            Err(e) => e,
        }
    }

    fn resolve_all(&mut self, items: &[Syntax]) -> Result<Vec<Node>, JackError> {
        let mut nodes = Vec::new();
        for item in items {
            nodes.extend(self.resolve(item)?);
        }
        Ok(nodes)
    }

    /// Consume the tokens of `syntax` and return the nodes it produces.
    pub fn resolve(&mut self, syntax: &Syntax) -> Result<Vec<Node>, JackError> {
        let grammar = self.grammar;
        match syntax {
            Syntax::Rule(r) => {
                if self.depth >= MAX_NESTING {
                    return Err(self.too_deep());
                }
                self.depth += 1;
                let children = self.resolve(grammar.body(*r));
                self.depth -= 1;
                Ok(vec![Node::NonTerminal {
                    rule: *r,
                    children: children?,
                }])
            }
            Syntax::Seq { items, .. } => self.resolve_all(items),
            Syntax::OneOf { options, .. } => {
                for option in options {
                    if self.matches(option, 0)? {
                        return self.resolve(option);
                    }
                }
                let expected = options.iter().map(Syntax::describe).collect();
                Err(self.mismatch(expected))
            }
            Syntax::Optional(items) => {
                if let Some(first) = items.first() {
                    if self.matches(first, 0)? {
                        return self.resolve_all(items);
                    }
                }
                Ok(Vec::new())
            }
            Syntax::Repeat(items) => {
                let mut nodes = Vec::new();
                if let Some(first) = items.first() {
                    while self.matches(first, 0)? {
                        nodes.extend(self.resolve_all(items)?);
                    }
                }
                Ok(nodes)
            }
            Syntax::Call { plain, qualified } => {
                if self.stream.peek(1)?.is_symbol('.') {
                    self.resolve(qualified)
                } else {
                    self.resolve(plain)
                }
            }
            terminal => {
                if self.matches(terminal, 0)? {
                    Ok(vec![Node::terminal(self.stream.next()?)])
                } else {
                    Err(self.mismatch(vec![terminal.describe()]))
                }
            }
        }
    }

    /// Parse one class and require the input to end right after it.
    pub fn parse_class(mut self) -> Result<Node, JackError> {
        let mut nodes = self.resolve(&Syntax::Rule(Rule::Class))?;
        if !self.stream.at_end()? {
            return Err(self.mismatch(vec!["end of input".to_owned()]));
        }
        nodes.pop().ok_or_else(|| JackError::UnexpectedEof {
            file: self.stream.filename().to_owned(),
            line: 1,
        })
    }
}

/// Tokenize and parse a whole in-memory source.
pub fn parse_source(
    grammar: &Grammar,
    registry: &TypeRegistry,
    src: &str,
    filename: &str,
) -> Result<Node, JackError> {
    let stream = TokenStream::from_reader(src.as_bytes(), filename);
    Parser::new(grammar, registry, stream).parse_class()
}
