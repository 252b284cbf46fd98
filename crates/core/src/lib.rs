#![allow(clippy::result_large_err)]
//! jack-core: Jack front end.
//!
//! Turns Jack source into a concrete parse tree that mirrors the Jack
//! grammar, and renders it in the tagged-text form.
//!
//! # Public API
//!
//! - [`Lexer`] / [`lex`] -- streaming tokenizer
//! - [`TokenStream`] -- lookahead buffer over the lexer
//! - [`Syntax`] / [`Parser`] -- grammar combinators and their resolver
//! - [`Grammar`] / [`Rule`] -- the Jack grammar table
//! - [`Node`] -- parse tree, with [`Node::to_xml`]
//! - [`TypeRegistry`] -- names valid in `className` positions
//! - [`compile_batch`] and friends -- pre-pass plus parse over a batch
//! - [`tagged`] -- reader and structural comparison for tagged text

pub mod compile;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod registry;
pub mod source;
pub mod stream;
pub mod syntax;
pub mod tagged;
pub mod tree;

pub use compile::{
    build_registry, compile_batch, declared_class_name, load_path, load_units, parse_unit,
    tokenize_unit, Unit,
};
pub use error::{JackError, LexErrorKind};
pub use grammar::{Grammar, Rule};
pub use lexer::{lex, Lexer, Token, TokenKind};
pub use registry::TypeRegistry;
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
pub use stream::TokenStream;
pub use syntax::{parse_source, Parser, Syntax};
pub use tree::{tokens_to_xml, Node};
