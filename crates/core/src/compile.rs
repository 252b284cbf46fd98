//! Batch driver: load units, run the type-name pre-pass, parse each unit.
//!
//! A batch is a single `.jack` file or every `.jack` file of one directory.
//! All class names are registered before any unit is parsed, so units may
//! refer to each other's types regardless of file order.

use crate::error::JackError;
use crate::grammar::Grammar;
use crate::lexer::{self, Lexer, Token, TokenKind};
use crate::registry::TypeRegistry;
use crate::source::{is_jack_file, FileSystemProvider, SourceProvider};
use crate::stream::TokenStream;
use crate::syntax::Parser;
use crate::tree::Node;
use std::path::{Path, PathBuf};

/// One compilation unit: a `.jack` file and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub path: PathBuf,
    pub source: String,
}

impl Unit {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Unit {
            path: path.into(),
            source: source.into(),
        }
    }

    /// File name without extension, e.g. `Main`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// File name used to label diagnostics, e.g. `Main.jack`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// Class name registered by the pre-pass.
    pub fn class_name(&self) -> String {
        declared_class_name(&self.source).unwrap_or_else(|| self.stem())
    }
}

/// Identifier following the first `class` keyword, if the header lexes.
pub fn declared_class_name(source: &str) -> Option<String> {
    let mut tokens = Lexer::new(source.as_bytes(), "").map_while(Result::ok);
    tokens.find(|t| t.is_keyword("class"))?;
    tokens
        .next()
        .filter(|t| t.kind == TokenKind::Identifier)
        .map(|t| t.text)
}

/// Load the units named by `path` using the filesystem.
pub fn load_path(path: &Path) -> Result<Vec<Unit>, JackError> {
    load_units(path, &FileSystemProvider)
}

/// A `.jack` file yields one unit; a directory yields each `.jack` file in it,
/// sorted by name. Anything else is an error.
pub fn load_units(path: &Path, provider: &dyn SourceProvider) -> Result<Vec<Unit>, JackError> {
    let label = path.to_string_lossy();
    let paths = if provider.is_dir(path) {
        provider
            .list_units(path)
            .map_err(|e| JackError::io(&label, &e))?
    } else if is_jack_file(path) {
        vec![path.to_path_buf()]
    } else {
        return Err(JackError::Io {
            file: label.to_string(),
            message: "not a .jack file or a directory".to_owned(),
        });
    };

    paths
        .into_iter()
        .map(|p| {
            let source = provider
                .read_source(&p)
                .map_err(|e| JackError::io(&p.to_string_lossy(), &e))?;
            Ok(Unit::new(p, source))
        })
        .collect()
}

/// Pre-pass: the built-in types plus every unit's class name.
pub fn build_registry(units: &[Unit]) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for unit in units {
        registry.register(unit.class_name());
    }
    registry
}

pub fn tokenize_unit(unit: &Unit) -> Result<Vec<Token>, JackError> {
    lexer::lex(&unit.source, &unit.file_name())
}

pub fn parse_unit(
    grammar: &Grammar,
    registry: &TypeRegistry,
    unit: &Unit,
) -> Result<Node, JackError> {
    let file = unit.file_name();
    let stream = TokenStream::from_reader(unit.source.as_bytes(), &file);
    Parser::new(grammar, registry, stream).parse_class()
}

/// Pre-pass, then parse every unit. One result per unit, in order; a failed
/// unit does not stop the others.
pub fn compile_batch(units: &[Unit]) -> Vec<Result<Node, JackError>> {
    let grammar = Grammar::new();
    let registry = build_registry(units);
    units
        .iter()
        .map(|unit| parse_unit(&grammar, &registry, unit))
        .collect()
}
