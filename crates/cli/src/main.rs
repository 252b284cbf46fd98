mod diff;
mod runner;
mod tap;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use jack_core::{compile, tokens_to_xml, Grammar, JackError, Node, Unit};

/// Output format for CLI diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Rendering of a parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TreeFormat {
    Xml,
    Json,
}

impl TreeFormat {
    fn default_suffix(self) -> &'static str {
        match self {
            TreeFormat::Xml => ".my.xml",
            TreeFormat::Json => ".my.json",
        }
    }
}

const TOKENS_SUFFIX: &str = "T.my.xml";

/// Jack language front end.
#[derive(Parser)]
#[command(name = "jack", version, about = "Jack tokenizer and syntax analyzer")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the token listing of each unit
    Tokenize {
        /// A .jack file or a directory of .jack files
        path: PathBuf,
        /// Print to stdout instead of writing <Stem>T.my.xml files
        #[arg(long)]
        stdout: bool,
    },

    /// Write the parse tree of each unit
    Parse {
        /// A .jack file or a directory of .jack files
        path: PathBuf,
        /// Tree rendering
        #[arg(long, default_value = "xml", value_enum)]
        format: TreeFormat,
        /// Print to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
        /// Output file suffix (default: .my.xml, or .my.json with --format json)
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Parse without writing anything; report each unit
    Check {
        /// A .jack file or a directory of .jack files
        path: PathBuf,
    },

    /// Compare two tagged-text files structurally
    Diff {
        /// Produced file
        actual: PathBuf,
        /// Reference file
        expected: PathBuf,
    },

    /// Run a golden-fixture suite
    Test {
        /// Directory whose subdirectories are fixture batches
        #[arg(default_value = "conformance")]
        suite_dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tokenize { path, stdout } => {
            cmd_tokenize(&path, stdout, cli.output, cli.quiet);
        }
        Commands::Parse {
            path,
            format,
            stdout,
            suffix,
        } => {
            let suffix = suffix.unwrap_or_else(|| format.default_suffix().to_owned());
            cmd_parse(&path, format, stdout, &suffix, cli.output, cli.quiet);
        }
        Commands::Check { path } => {
            cmd_check(&path, cli.output, cli.quiet);
        }
        Commands::Diff { actual, expected } => {
            cmd_diff(&actual, &expected, cli.output, cli.quiet);
        }
        Commands::Test { suite_dir } => {
            cmd_test(&suite_dir);
        }
    }
}

fn load_or_exit(path: &Path, output: OutputFormat, quiet: bool) -> Vec<Unit> {
    match compile::load_path(path) {
        Ok(units) if units.is_empty() => {
            let msg = format!("no .jack files in '{}'", path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
        Ok(units) => units,
        Err(e) => {
            report_jack_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

fn output_path(unit: &Unit, suffix: &str) -> PathBuf {
    unit.path.with_file_name(format!("{}{}", unit.stem(), suffix))
}

/// Print `content` or write it next to the unit. Returns false on failure.
fn emit(content: &str, target: Option<PathBuf>, output: OutputFormat, quiet: bool) -> bool {
    let Some(target) = target else {
        print!("{}", content);
        return true;
    };
    match std::fs::write(&target, content) {
        Ok(()) => {
            if !quiet && output == OutputFormat::Text {
                eprintln!("wrote {}", target.display());
            }
            true
        }
        Err(e) => {
            let err = JackError::io(&target.to_string_lossy(), &e);
            report_jack_error(&err, output, quiet);
            false
        }
    }
}

fn cmd_tokenize(path: &Path, stdout: bool, output: OutputFormat, quiet: bool) {
    let units = load_or_exit(path, output, quiet);
    let mut failed = 0usize;
    for unit in &units {
        let ok = match compile::tokenize_unit(unit) {
            Ok(tokens) => {
                let target = (!stdout).then(|| output_path(unit, TOKENS_SUFFIX));
                emit(&tokens_to_xml(&tokens), target, output, quiet)
            }
            Err(e) => {
                report_jack_error(&e, output, quiet);
                false
            }
        };
        if !ok {
            failed += 1;
        }
    }
    if failed > 0 {
        process::exit(1);
    }
}

fn render_tree(tree: &Node, format: TreeFormat) -> String {
    match format {
        TreeFormat::Xml => tree.to_xml(),
        TreeFormat::Json => {
            let mut s = serde_json::to_string_pretty(tree)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            s.push('\n');
            s
        }
    }
}

fn cmd_parse(
    path: &Path,
    format: TreeFormat,
    stdout: bool,
    suffix: &str,
    output: OutputFormat,
    quiet: bool,
) {
    let units = load_or_exit(path, output, quiet);
    let results = compile::compile_batch(&units);
    let mut failed = 0usize;
    for (unit, result) in units.iter().zip(results) {
        let ok = match result {
            Ok(tree) => {
                let target = (!stdout).then(|| output_path(unit, suffix));
                emit(&render_tree(&tree, format), target, output, quiet)
            }
            Err(e) => {
                report_jack_error(&e, output, quiet);
                false
            }
        };
        if !ok {
            failed += 1;
        }
    }
    if failed > 0 {
        process::exit(1);
    }
}

fn cmd_check(path: &Path, output: OutputFormat, quiet: bool) {
    let units = load_or_exit(path, output, quiet);
    let grammar = Grammar::new();
    let registry = compile::build_registry(&units);
    let mut failed = 0usize;
    let mut report = Vec::new();

    for unit in &units {
        let result = compile::parse_unit(&grammar, &registry, unit);
        match output {
            OutputFormat::Json => {
                let entry = match &result {
                    Ok(_) => serde_json::json!({ "file": unit.file_name(), "ok": true }),
                    Err(e) => serde_json::json!({
                        "file": unit.file_name(),
                        "ok": false,
                        "error": e.to_json_value(),
                    }),
                };
                report.push(entry);
            }
            OutputFormat::Text => {
                if !quiet {
                    match &result {
                        Ok(_) => println!("ok {}", unit.file_name()),
                        Err(e) => println!("FAILED {}\n  {}", unit.file_name(), e),
                    }
                }
            }
        }
        if result.is_err() {
            failed += 1;
        }
    }

    if output == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
    } else if !quiet {
        println!("{} unit(s), {} failed", units.len(), failed);
    }
    if failed > 0 {
        process::exit(1);
    }
}

fn cmd_diff(actual: &Path, expected: &Path, output: OutputFormat, quiet: bool) {
    let file_diff = match diff::diff_files(actual, expected) {
        Ok(d) => d,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    if !quiet {
        match output {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&file_diff.to_json()).unwrap_or_default()
                );
            }
            OutputFormat::Text => {
                println!("{}", file_diff.to_text());
            }
        }
    }
    if !file_diff.is_empty() {
        process::exit(1);
    }
}

fn cmd_test(suite_dir: &Path) {
    if !suite_dir.is_dir() {
        eprintln!(
            "error: fixture suite directory not found: {}",
            suite_dir.display()
        );
        process::exit(1);
    }

    let result = runner::run_suite(suite_dir);
    if result.failed > 0 {
        process::exit(1);
    }
}

/// Report a front-end error: the JSON shape with `--output json`, the
/// one-line rendering otherwise.
fn report_jack_error(err: &JackError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&err.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", err));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("{}", err);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
