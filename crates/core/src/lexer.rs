//! Character-level tokenizer for Jack source.
//!
//! The lexer reads its input one line at a time from a forward-only
//! [`BufRead`] and walks each line character by character through a small
//! state machine (normal / line comment / block comment / string). Words are
//! accumulated in a pending buffer and classified when a symbol, whitespace,
//! comment start or string start ends them.

use crate::error::{JackError, LexErrorKind};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::io::BufRead;

pub const KEYWORDS: [&str; 21] = [
    "class",
    "constructor",
    "function",
    "method",
    "field",
    "static",
    "var",
    "int",
    "char",
    "boolean",
    "void",
    "true",
    "false",
    "null",
    "this",
    "let",
    "do",
    "if",
    "else",
    "while",
    "return",
];

pub const SYMBOLS: [char; 19] = [
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

/// Largest value an integer constant may take.
pub const MAX_INTEGER: u32 = 32767;

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_symbol(c: char) -> bool {
    SYMBOLS.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Keyword,
    Symbol,
    IntegerConstant,
    StringConstant,
    Identifier,
}

impl TokenKind {
    pub const ALL: [TokenKind; 5] = [
        TokenKind::Keyword,
        TokenKind::Symbol,
        TokenKind::IntegerConstant,
        TokenKind::StringConstant,
        TokenKind::Identifier,
    ];

    /// Tag used in the tagged-text output.
    pub fn tag(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Symbol => "symbol",
            TokenKind::IntegerConstant => "integerConstant",
            TokenKind::StringConstant => "stringConstant",
            TokenKind::Identifier => "identifier",
        }
    }

    pub fn from_tag(tag: &str) -> Option<TokenKind> {
        TokenKind::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    pub fn is_symbol(&self, c: char) -> bool {
        self.kind == TokenKind::Symbol && self.text.len() == 1 && self.text.starts_with(c)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    LineComment,
    BlockComment,
    InString,
}

/// Streaming tokenizer. Yields tokens lazily; after the first error it
/// yields nothing more.
pub struct Lexer<R> {
    reader: R,
    filename: String,
    line: u32,
    chars: Vec<char>,
    pos: usize,
    /// Characters to skip (second half of `//`, `/*`, `*/`).
    skip: usize,
    state: State,
    pending: String,
    ready: VecDeque<Token>,
    done: bool,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R, filename: &str) -> Self {
        Lexer {
            reader,
            filename: filename.to_owned(),
            line: 0,
            chars: Vec::new(),
            pos: 0,
            skip: 0,
            state: State::Normal,
            pending: String::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// Load the next input line. Returns false at end of input.
    fn fill_line(&mut self) -> Result<bool, JackError> {
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| JackError::io(&self.filename, &e))?;
        if read == 0 {
            return Ok(false);
        }
        self.line += 1;
        self.chars = buf.chars().collect();
        self.pos = 0;
        Ok(true)
    }

    fn at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pair: [char; 2]) -> bool {
        self.at(0) == Some(pair[0]) && self.at(1) == Some(pair[1])
    }

    /// Classify and queue the pending word, if any.
    fn flush(&mut self) -> Result<(), JackError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let word = std::mem::take(&mut self.pending);
        let token = classify(word, self.line, &self.filename)?;
        self.ready.push_back(token);
        Ok(())
    }

    fn flush_string(&mut self) {
        let text = std::mem::take(&mut self.pending);
        self.ready
            .push_back(Token::new(TokenKind::StringConstant, text, self.line));
    }

    /// Feed the character under the cursor through the state machine.
    fn step(&mut self, c: char) -> Result<(), JackError> {
        match self.state {
            State::LineComment => {
                if c == '\n' {
                    self.state = State::Normal;
                }
            }
            State::BlockComment => {
                if self.starts_with(['*', '/']) {
                    self.state = State::Normal;
                    self.skip = 1;
                }
            }
            State::InString => {
                if c == '"' || c == '\n' {
                    if c == '\n' && self.pending.ends_with('\r') {
                        self.pending.pop();
                    }
                    self.state = State::Normal;
                    self.flush_string();
                } else {
                    self.pending.push(c);
                }
            }
            State::Normal => {
                if self.starts_with(['/', '*']) {
                    self.state = State::BlockComment;
                    self.skip = 1;
                    self.flush()?;
                } else if self.starts_with(['/', '/']) {
                    self.state = State::LineComment;
                    self.skip = 1;
                    self.flush()?;
                } else if c == '"' {
                    self.flush()?;
                    self.state = State::InString;
                } else if is_symbol(c) {
                    self.flush()?;
                    self.ready
                        .push_back(Token::new(TokenKind::Symbol, c, self.line));
                } else if c.is_whitespace() {
                    self.flush()?;
                } else {
                    self.pending.push(c);
                }
            }
        }
        Ok(())
    }

    /// Advance until at least one token is queued or input is exhausted.
    fn advance(&mut self) -> Result<(), JackError> {
        while self.ready.is_empty() {
            if self.pos >= self.chars.len() && !self.fill_line()? {
                match self.state {
                    State::InString => self.flush_string(),
                    State::Normal => self.flush()?,
                    State::LineComment | State::BlockComment => {}
                }
                self.state = State::Normal;
                self.done = true;
                return Ok(());
            }
            let c = self.chars[self.pos];
            if self.skip > 0 {
                self.skip -= 1;
            } else {
                self.step(c)?;
            }
            self.pos += 1;
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for Lexer<R> {
    type Item = Result<Token, JackError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.ready.pop_front() {
            return Some(Ok(token));
        }
        if self.done {
            return None;
        }
        if let Err(e) = self.advance() {
            self.done = true;
            self.ready.clear();
            return Some(Err(e));
        }
        self.ready.pop_front().map(Ok)
    }
}

fn classify(word: String, line: u32, filename: &str) -> Result<Token, JackError> {
    let lex_error = |word: String, kind| JackError::Lex {
        file: filename.to_owned(),
        line,
        word,
        kind,
    };

    if is_keyword(&word) {
        return Ok(Token::new(TokenKind::Keyword, word, line));
    }
    if word.starts_with(|c: char| c.is_ascii_digit()) {
        if !word.chars().all(|c| c.is_ascii_digit()) {
            return Err(lex_error(word, LexErrorKind::LeadingDigit));
        }
        return match word.parse::<u32>() {
            Ok(n) if n <= MAX_INTEGER => Ok(Token::new(TokenKind::IntegerConstant, word, line)),
            _ => Err(lex_error(word, LexErrorKind::IntegerOutOfRange)),
        };
    }
    if word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(Token::new(TokenKind::Identifier, word, line));
    }
    Err(lex_error(word, LexErrorKind::InvalidIdentifier))
}

/// Tokenize a whole in-memory source.
pub fn lex(src: &str, filename: &str) -> Result<Vec<Token>, JackError> {
    Lexer::new(src.as_bytes(), filename).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_texts(src: &str) -> Vec<(TokenKind, String)> {
        lex(src, "Test.jack")
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn lex_err(src: &str) -> JackError {
        lex(src, "Test.jack").unwrap_err()
    }

    #[test]
    fn keywords_symbols_and_identifiers() {
        let tokens = kinds_and_texts("class Main { field int x; }");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "class".into()),
                (TokenKind::Identifier, "Main".into()),
                (TokenKind::Symbol, "{".into()),
                (TokenKind::Keyword, "field".into()),
                (TokenKind::Keyword, "int".into()),
                (TokenKind::Identifier, "x".into()),
                (TokenKind::Symbol, ";".into()),
                (TokenKind::Symbol, "}".into()),
            ]
        );
    }

    #[test]
    fn symbol_flushes_pending_word_first() {
        let tokens = kinds_and_texts("a[i]");
        let texts: Vec<_> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "[", "i", "]"]);
    }

    #[test]
    fn integer_range_boundaries() {
        assert_eq!(
            kinds_and_texts("0 32767"),
            vec![
                (TokenKind::IntegerConstant, "0".into()),
                (TokenKind::IntegerConstant, "32767".into()),
            ]
        );
        assert!(matches!(
            lex_err("32768"),
            JackError::Lex {
                kind: LexErrorKind::IntegerOutOfRange,
                ..
            }
        ));
        assert!(matches!(
            lex_err("99999999999999999999"),
            JackError::Lex {
                kind: LexErrorKind::IntegerOutOfRange,
                ..
            }
        ));
    }

    #[test]
    fn unary_minus_is_a_separate_symbol() {
        assert_eq!(
            kinds_and_texts("-1"),
            vec![
                (TokenKind::Symbol, "-".into()),
                (TokenKind::IntegerConstant, "1".into()),
            ]
        );
    }

    #[test]
    fn identifier_shapes() {
        for ok in ["_a1", "a_1", "A"] {
            assert_eq!(kinds_and_texts(ok), vec![(TokenKind::Identifier, ok.into())]);
        }
        assert!(matches!(
            lex_err("1a"),
            JackError::Lex {
                kind: LexErrorKind::LeadingDigit,
                ..
            }
        ));
        match lex_err("a!") {
            JackError::Lex { kind, word, .. } => {
                assert_eq!(kind, LexErrorKind::InvalidIdentifier);
                assert_eq!(word, "a!");
            }
            other => panic!("expected lex error, got {:?}", other),
        }
    }

    #[test]
    fn comments_do_not_join_or_split_tokens() {
        let texts: Vec<_> = kinds_and_texts("a/*c*/b // trailing\nc /** doc\n * more */ d")
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn division_is_not_a_comment() {
        let texts: Vec<_> = kinds_and_texts("x/y")
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        assert_eq!(texts, vec!["x", "/", "y"]);
    }

    #[test]
    fn string_constants() {
        assert_eq!(
            kinds_and_texts("\"hello\""),
            vec![(TokenKind::StringConstant, "hello".into())]
        );
        assert_eq!(
            kinds_and_texts("\"a // not a comment\""),
            vec![(TokenKind::StringConstant, "a // not a comment".into())]
        );
    }

    #[test]
    fn unterminated_string_ends_at_newline() {
        assert_eq!(
            kinds_and_texts("\"abc\nx"),
            vec![
                (TokenKind::StringConstant, "abc".into()),
                (TokenKind::Identifier, "x".into()),
            ]
        );
    }

    #[test]
    fn crlf_line_ending_does_not_leak_into_cut_string() {
        assert_eq!(
            kinds_and_texts("\"abc\r\nx"),
            vec![
                (TokenKind::StringConstant, "abc".into()),
                (TokenKind::Identifier, "x".into()),
            ]
        );
    }

    #[test]
    fn pending_word_flushed_at_end_of_input() {
        assert_eq!(
            kinds_and_texts("return x"),
            vec![
                (TokenKind::Keyword, "return".into()),
                (TokenKind::Identifier, "x".into()),
            ]
        );
    }

    #[test]
    fn tokens_carry_line_numbers() {
        let tokens = lex("class\n\n  Main\n{", "Test.jack").unwrap();
        let lines: Vec<u32> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
    }

    #[test]
    fn error_reports_line_and_stops_the_stream() {
        let mut lexer = Lexer::new("let x = 1;\nlet y = 2a;\nlet z = 3;".as_bytes(), "T.jack");
        let mut seen = Vec::new();
        let err = loop {
            match lexer.next() {
                Some(Ok(t)) => seen.push(t.text),
                Some(Err(e)) => break e,
                None => panic!("lexer ended without error"),
            }
        };
        assert_eq!(err.line(), 2);
        assert_eq!(seen.last().map(String::as_str), Some("="));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn token_display_names_kind_and_text() {
        let t = Token::new(TokenKind::IntegerConstant, "5", 1);
        assert_eq!(t.to_string(), "integerConstant `5`");
    }
}
