use serde::Serialize;

/// Why a word could not be classified as a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum LexErrorKind {
    #[error("integer out of range 0...32767")]
    IntegerOutOfRange,
    #[error("identifier cannot start with a digit")]
    LeadingDigit,
    #[error("invalid identifier characters")]
    InvalidIdentifier,
}

/// A front-end error. Every variant names the compilation unit it came from;
/// all but `Io` carry the 1-based source line.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JackError {
    /// Malformed integer constant or identifier. Fatal to the unit.
    #[error("{file} Line {line}: {kind} `{word}`")]
    Lex {
        file: String,
        line: u32,
        word: String,
        #[serde(rename = "reason")]
        kind: LexErrorKind,
    },

    /// A terminal did not match, or no alternative of an alternation did.
    /// `expected` holds one description per candidate.
    #[error("{file} Line {line}: {}", syntax_message(.expected, .found))]
    Syntax {
        file: String,
        line: u32,
        expected: Vec<String>,
        found: String,
    },

    /// The token stream ran out while a rule was still incomplete.
    #[error("{file} Line {line}: unfinished program, reached end of input")]
    UnexpectedEof { file: String, line: u32 },

    /// Rules nested deeper than `limit`, e.g. a long run of parentheses.
    #[error("{file} Line {line}: constructs nested deeper than {limit} rules")]
    TooDeep { file: String, line: u32, limit: usize },

    #[error("{file}: {message}")]
    Io { file: String, message: String },
}

fn syntax_message(expected: &[String], found: &str) -> String {
    match expected {
        [single] => format!("Expected {}, got {}", single, found),
        many => format!(
            "Must be one of the following: {}. Instead found {}",
            many.join(", "),
            found
        ),
    }
}

impl JackError {
    pub fn io(file: &str, err: &std::io::Error) -> Self {
        JackError::Io {
            file: file.to_owned(),
            message: err.to_string(),
        }
    }

    pub fn file(&self) -> &str {
        match self {
            JackError::Lex { file, .. }
            | JackError::Syntax { file, .. }
            | JackError::UnexpectedEof { file, .. }
            | JackError::TooDeep { file, .. }
            | JackError::Io { file, .. } => file,
        }
    }

    /// Source line, or 0 for errors not tied to a line.
    pub fn line(&self) -> u32 {
        match self {
            JackError::Lex { line, .. }
            | JackError::Syntax { line, .. }
            | JackError::UnexpectedEof { line, .. }
            | JackError::TooDeep { line, .. } => *line,
            JackError::Io { .. } => 0,
        }
    }

    /// Stable name of the variant, as used in the JSON rendering.
    pub fn kind_name(&self) -> &'static str {
        match self {
            JackError::Lex { .. } => "lex",
            JackError::Syntax { .. } => "syntax",
            JackError::UnexpectedEof { .. } => "unexpected_eof",
            JackError::TooDeep { .. } => "too_deep",
            JackError::Io { .. } => "io",
        }
    }

    /// Serialize to the JSON shape used by `--output json` and by
    /// `.error.json` fixtures. Always carries `file`, `kind`, `line` and
    /// `message`.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "file":    self.file(),
            "kind":    self.kind_name(),
            "line":    self.line(),
            "message": self.to_string(),
        })
    }
}
