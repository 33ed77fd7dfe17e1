//! Runs the JSON fixture cases under `fixtures/` against the library.
//!
//! Each fixture file is a list of cases:
//!
//! ```json
//! [{ "name": "...", "schema": {...} | [...], "value": ..., "expect": "pass" | "fail", "kind": "TypeMismatch" }]
//! ```
//!
//! `"undefined": true` / `"nan": true` stand in for values JSON cannot spell.
//! `"entry": "handle"` routes the case through the alternatives entry point
//! instead of the full rule chain.
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use json_typecheck::{load::from_str_with_path, Schema, Validator, Value};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Expect {
    Pass,
    Fail,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Entry {
    #[default]
    Core,
    Handle,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    schema: Schema,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    undefined: bool,
    #[serde(default)]
    nan: bool,
    #[serde(default)]
    entry: Entry,
    expect: Expect,
    /// Expected `FailureKind`, by its Debug name.
    kind: Option<String>,
}

impl Case {
    fn value(&self) -> Value {
        if self.undefined {
            Value::Undefined
        } else if self.nan {
            Value::Number(f64::NAN)
        } else {
            Value::from(&self.value)
        }
    }

    /// `None` when the case holds, otherwise why not.
    fn run(&self, validator: &Validator) -> Option<String> {
        let value = self.value();
        let result = match self.entry {
            Entry::Core => validator.check_one_of(&value, &self.schema),
            Entry::Handle => validator.check_type_handle(&value, &self.schema),
        };
        match (&self.expect, result) {
            (Expect::Pass, Ok(())) => None,
            (Expect::Pass, Err(failure)) => Some(format!("expected pass, got {:?}: {}", failure.kind, failure.message)),
            (Expect::Fail, Ok(())) => Some("expected failure, got pass".to_string()),
            (Expect::Fail, Err(failure)) => match &self.kind {
                Some(kind) if *kind != format!("{:?}", failure.kind) => {
                    Some(format!("expected {kind}, got {:?}", failure.kind))
                }
                _ => None,
            },
        }
    }
}

fn fixtures_dir() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../fixtures"))
}

fn main() -> ExitCode {
    let pattern = fixtures_dir().join("*.json");
    let paths = match glob::glob(&pattern.to_string_lossy()) {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("bad fixture pattern: {error}");
            return ExitCode::from(2);
        }
    };

    let validator = Validator::default();
    let (mut total, mut failed) = (0usize, 0usize);
    for path in paths.flatten() {
        let source = match std::fs::read_to_string(&path) {
            Ok(x) => x,
            Err(error) => {
                eprintln!("failed to read {}: {error}", path.display());
                return ExitCode::from(2);
            }
        };
        let cases = match from_str_with_path::<Vec<Case>>(&source) {
            Ok(x) => x,
            Err(error) => {
                eprintln!("failed to parse {}: {error}", path.display());
                return ExitCode::from(2);
            }
        };
        eprintln!("—— {} ——", path.display());
        for case in &cases {
            total += 1;
            match case.run(&validator) {
                None => eprintln!("{} {}", "✔".green(), case.name),
                Some(why) => {
                    failed += 1;
                    eprintln!("{} {}: {why}", "✘".red(), case.name);
                }
            }
        }
    }

    eprintln!("{total} cases, {failed} failed");
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::from(1) }
}
