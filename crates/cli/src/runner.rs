//! Golden-fixture runner.
//!
//! Convention: every subdirectory of the suite holding `.jack` files is one
//! batch (the pre-pass sees all of its units). For each unit `<Stem>.jack`:
//!   <Stem>.xml         -- expected parse tree
//!   <Stem>T.xml        -- expected token listing
//!   <Stem>.error.json  -- expected failure: `kind` and `line` must match

use crate::tap::TapReport;
use jack_core::{compile, tagged, tokens_to_xml, Grammar, JackError, Unit};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct RunResult {
    pub failed: usize,
}

pub fn run_suite(suite_dir: &Path) -> RunResult {
    let tap = collect(suite_dir);
    let failed = tap.failed();
    print!("{}", tap);
    RunResult { failed }
}

/// Run every batch and return the report without printing it.
pub fn collect(suite_dir: &Path) -> TapReport {
    let mut tap = TapReport::new();
    for batch in batch_dirs(suite_dir) {
        run_batch(&batch, &mut tap);
    }
    tap
}

fn run_batch(dir: &Path, tap: &mut TapReport) {
    let batch = file_name(dir);
    let units = match compile::load_path(dir) {
        Ok(units) => units,
        Err(e) => {
            tap.fail(&batch, format!("cannot load batch: {}", e));
            return;
        }
    };
    let grammar = Grammar::new();
    let registry = compile::build_registry(&units);

    for unit in &units {
        let stem = unit.stem();
        let name = format!("{}/{}", batch, stem);
        let error_path = dir.join(format!("{}.error.json", stem));
        let tree_path = dir.join(format!("{}.xml", stem));
        let tokens_path = dir.join(format!("{}T.xml", stem));

        let parsed = compile::parse_unit(&grammar, &registry, unit);
        if error_path.exists() {
            check_error(&name, parsed, &error_path, tap);
        } else if tree_path.exists() {
            check_tree(&name, parsed, &tree_path, tap);
        } else if !tokens_path.exists() {
            tap.fail(&name, "no expected output (.xml, T.xml or .error.json)");
        }

        if tokens_path.exists() {
            check_tokens(&format!("{}T", name), unit, &tokens_path, tap);
        }
    }
}

fn check_tree(
    name: &str,
    parsed: Result<jack_core::Node, JackError>,
    expected_path: &Path,
    tap: &mut TapReport,
) {
    let tree = match parsed {
        Ok(tree) => tree,
        Err(e) => {
            tap.fail(name, format!("unexpected error: {}", e));
            return;
        }
    };
    compare_tagged(name, &tree.to_xml(), expected_path, tap);
}

fn check_tokens(name: &str, unit: &Unit, expected_path: &Path, tap: &mut TapReport) {
    match compile::tokenize_unit(unit) {
        Ok(tokens) => compare_tagged(name, &tokens_to_xml(&tokens), expected_path, tap),
        Err(e) => tap.fail(name, format!("unexpected error: {}", e)),
    }
}

fn compare_tagged(name: &str, actual: &str, expected_path: &Path, tap: &mut TapReport) {
    let expected = match std::fs::read_to_string(expected_path) {
        Ok(s) => s,
        Err(e) => {
            tap.fail(name, format!("cannot read {}: {}", expected_path.display(), e));
            return;
        }
    };
    let parsed = tagged::parse(actual).and_then(|a| tagged::parse(&expected).map(|e| (a, e)));
    match parsed {
        Ok((actual, expected)) => match tagged::first_difference(&actual, &expected) {
            None => tap.pass(name),
            Some(d) => tap.fail(name, format!("output mismatch at {}", d)),
        },
        Err(e) => tap.fail(
            name,
            format!("malformed tagged text in {}: {}", expected_path.display(), e),
        ),
    }
}

fn check_error(
    name: &str,
    parsed: Result<jack_core::Node, JackError>,
    expected_path: &Path,
    tap: &mut TapReport,
) {
    let expected = match read_json(expected_path) {
        Ok(v) => v,
        Err(e) => {
            tap.fail(name, format!("failed to read expected-error file: {}", e));
            return;
        }
    };
    let got = match parsed {
        Ok(_) => {
            tap.fail(name, "expected an error but the unit parsed");
            return;
        }
        Err(e) => e.to_json_value(),
    };
    let fields = ["kind", "line"];
    let mismatched: Vec<String> = fields
        .into_iter()
        .filter(|f| expected.get(*f) != got.get(*f))
        .map(|f| format!("{}: expected {}, got {}", f, expected[f], got[f]))
        .collect();
    if mismatched.is_empty() {
        tap.pass(name);
    } else {
        tap.fail(
            name,
            format!("error mismatch:\n{}\nmessage: {}", mismatched.join("\n"), got["message"]),
        );
    }
}

// -- Helpers --

/// Subdirectories holding at least one `.jack` file, sorted by name.
fn batch_dirs(suite_dir: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(entries) = std::fs::read_dir(suite_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && has_jack_files(&path) {
                dirs.push(path);
            }
        }
    }
    dirs.sort();
    dirs
}

fn has_jack_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| jack_core::source::is_jack_file(&e.path()))
        })
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn read_json(path: &Path) -> Result<Value, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&src).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}
