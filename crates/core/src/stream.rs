//! Lookahead adapter over the lexer.
//!
//! Tokens pulled for peeking are kept in a queue so the first token peeked is
//! always the first consumed.

use crate::error::JackError;
use crate::lexer::{Lexer, Token};
use std::collections::VecDeque;
use std::io::BufRead;

pub struct TokenStream<'a> {
    source: Box<dyn Iterator<Item = Result<Token, JackError>> + 'a>,
    buffer: VecDeque<Token>,
    filename: String,
    /// Line of the last token seen, for end-of-input diagnostics.
    last_line: u32,
}

impl<'a> TokenStream<'a> {
    pub fn new<I>(tokens: I, filename: &str) -> Self
    where
        I: Iterator<Item = Result<Token, JackError>> + 'a,
    {
        TokenStream {
            source: Box::new(tokens),
            buffer: VecDeque::new(),
            filename: filename.to_owned(),
            last_line: 1,
        }
    }

    pub fn from_reader<R: BufRead + 'a>(reader: R, filename: &str) -> Self {
        Self::new(Lexer::new(reader, filename), filename)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    fn pull(&mut self) -> Result<Option<Token>, JackError> {
        match self.source.next() {
            Some(Ok(token)) => {
                self.last_line = token.line;
                Ok(Some(token))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn eof(&self) -> JackError {
        JackError::UnexpectedEof {
            file: self.filename.clone(),
            line: self.last_line,
        }
    }

    /// Look at the token `offset` positions ahead without consuming it.
    pub fn peek(&mut self, offset: usize) -> Result<&Token, JackError> {
        while self.buffer.len() <= offset {
            match self.pull()? {
                Some(token) => self.buffer.push_back(token),
                None => return Err(self.eof()),
            }
        }
        Ok(&self.buffer[offset])
    }

    /// Consume the head token.
    pub fn next(&mut self) -> Result<Token, JackError> {
        if let Some(token) = self.buffer.pop_front() {
            return Ok(token);
        }
        match self.pull()? {
            Some(token) => Ok(token),
            None => Err(self.eof()),
        }
    }

    /// True when no tokens remain. Lexical errors still surface.
    pub fn at_end(&mut self) -> Result<bool, JackError> {
        match self.peek(0) {
            Ok(_) => Ok(false),
            Err(JackError::UnexpectedEof { .. }) => Ok(true),
            Err(e) => Err(e),
        }
    }
}
