//! Structural diff of two tagged-text files (trees or token listings).

use jack_core::tagged::{self, Difference, TaggedError};
use serde_json::{json, Value};
use std::path::Path;

#[derive(Debug)]
pub struct FileDiff {
    pub difference: Option<Difference>,
}

impl FileDiff {
    pub fn is_empty(&self) -> bool {
        self.difference.is_none()
    }

    pub fn to_text(&self) -> String {
        match &self.difference {
            None => "no differences".to_owned(),
            Some(d) => format!("first difference at {}", d),
        }
    }

    pub fn to_json(&self) -> Value {
        match &self.difference {
            None => json!({ "equal": true }),
            Some(d) => json!({
                "equal": false,
                "path": d.path,
                "message": d.message,
            }),
        }
    }
}

/// Compare two documents given as text.
pub fn diff_texts(actual: &str, expected: &str) -> Result<FileDiff, TaggedError> {
    let actual = tagged::parse(actual)?;
    let expected = tagged::parse(expected)?;
    Ok(FileDiff {
        difference: tagged::first_difference(&actual, &expected),
    })
}

pub fn diff_files(actual: &Path, expected: &Path) -> Result<FileDiff, String> {
    let read = |p: &Path| {
        std::fs::read_to_string(p).map_err(|e| format!("error reading '{}': {}", p.display(), e))
    };
    let actual_src = read(actual)?;
    let expected_src = read(expected)?;
    diff_texts(&actual_src, &expected_src).map_err(|e| format!("malformed tagged text: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: &str = "<tokens>\n<keyword> class </keyword>\n<identifier> Main </identifier>\n</tokens>\n";

    #[test]
    fn whitespace_and_line_endings_do_not_matter() {
        let actual = "<tokens>\r\n    <keyword> class </keyword>\r\n<identifier>  Main  </identifier></tokens>";
        let d = diff_texts(actual, EXPECTED).unwrap();
        assert!(d.is_empty());
        assert_eq!(d.to_text(), "no differences");
        assert_eq!(d.to_json()["equal"], true);
    }

    #[test]
    fn reports_first_difference() {
        let actual = "<tokens>\n<keyword> class </keyword>\n<symbol> { </symbol>\n</tokens>\n";
        let d = diff_texts(actual, EXPECTED).unwrap();
        assert!(!d.is_empty());
        let json = d.to_json();
        assert_eq!(json["path"], "/tokens[0]/identifier[1]");
        assert!(d.to_text().starts_with("first difference at /tokens[0]/identifier[1]"));
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(diff_texts("<tokens>", EXPECTED).is_err());
    }
}
