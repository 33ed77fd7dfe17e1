//! Minimal CLI: check documents against a schema, or lint a schema.
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;

use json_typecheck::{
    load_guard_schema, load_schema, ConfigIssue, Failure, UnknownKindPolicy, Validator,
    ValidatorOptions, Value, DEFAULT_MAX_DEPTH,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON/NDJSON documents against hand-written type configs
#[derive(Parser, Debug)]
#[command(name = "json-typecheck")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate every input document against a schema (or list of alternatives)
    Check(CheckOut),
    /// report authoring problems in a schema file without looking at data
    Lint(LintOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is checked separately.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// schema file: one type config or a list of alternatives
    #[arg(long, short)]
    schema: PathBuf,

    /// run the full rule chain (emptiness, nullable, type) on the document root too
    #[arg(long, default_value_t = false)]
    full: bool,

    /// fail values whose kind has no structural checker instead of warning
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// maximum schema nesting followed per document
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// output report file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct LintOut {
    /// schema file to lint
    #[arg(long, short)]
    schema: PathBuf,

    /// the file is a guard schema (`{ props, return }`)
    #[arg(long, default_value_t = false)]
    guard: bool,
}

struct Document {
    source: String,
    value: serde_json::Value,
}

struct Outcome {
    source: String,
    result: Result<(), Failure>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut docs = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;

            let mut raw = Vec::new();
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let value = serde_json::from_str::<serde_json::Value>(line).with_context(|| {
                        format!("failed to parse NDJSON line {} of {source_path_str}", line_no + 1)
                    })?;
                    raw.push((format!("{source_path_str}:{}", line_no + 1), value));
                }
            } else {
                let value = serde_json::from_str::<serde_json::Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file {source_path_str}"))?;
                raw.push((source_path_str.clone(), value));
            }

            for (label, value) in raw {
                self.select(label, value, &mut docs)?;
            }
        }
        Ok(docs)
    }

    fn select(&self, label: String, value: serde_json::Value, docs: &mut Vec<Document>) -> Result<()> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(ptr) => match value.pointer(ptr) {
                Some(found) => found.clone(),
                None => bail!("JSON pointer {ptr} does not resolve in {label}"),
            },
        };
        match self.jq_expr.as_ref() {
            None => docs.push(Document { source: label, value }),
            Some(jq_expr) => {
                let outputs = crate::jq_exec::run_jaq(jq_expr, &value)
                    .with_context(|| format!("failed to apply jq expression to {label}"))?;
                for (i, value) in outputs.into_iter().enumerate() {
                    docs.push(Document { source: format!("{label}#{i}"), value });
                }
            }
        }
        Ok(())
    }
}

impl CheckOut {
    fn options(&self) -> ValidatorOptions {
        ValidatorOptions {
            unknown_kind: if self.strict { UnknownKindPolicy::Fail } else { UnknownKindPolicy::Pass },
            max_depth: self.max_depth,
        }
    }

    fn run(&self) -> Result<bool> {
        let schema = load_schema(&self.schema)
            .with_context(|| format!("failed to load schema {}", self.schema.display()))?;
        let validator = Validator::new(self.options());
        let docs = self.input_settings.load_documents()?;
        tracing::debug!(documents = docs.len(), "loaded inputs");

        let outcomes: Vec<Outcome> = docs
            .into_par_iter()
            .map(|doc| {
                let value = Value::from(doc.value);
                let result = if self.full {
                    validator.check_one_of(&value, &schema)
                } else {
                    validator.check_type_handle(&value, &schema)
                };
                Outcome { source: doc.source, result }
            })
            .collect();

        let report = match self.format {
            ReportFormat::Text => render_text(&outcomes),
            ReportFormat::Json => serde_json::to_string_pretty(&render_json(&outcomes))?,
        };
        write_output(self.out.as_ref(), &report)?;
        Ok(outcomes.iter().all(|o| o.result.is_ok()))
    }
}

impl LintOut {
    fn run(&self) -> Result<bool> {
        let issues: Vec<ConfigIssue> = if self.guard {
            load_guard_schema(&self.schema)?.lint()
        } else {
            load_schema(&self.schema)?.lint()
        };
        let label = self.schema.display().to_string();
        if issues.is_empty() {
            println!("{} {label}", "✔".green());
        } else {
            for issue in &issues {
                println!("{} {label}: {issue}", "✘".red());
            }
        }
        Ok(issues.is_empty())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    /// `Ok(true)` when every document (or the linted schema) is clean.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Check(target) => target.run(),
            Command::Lint(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn render_text(outcomes: &[Outcome]) -> String {
    let mut out = String::new();
    let mut failed = 0usize;
    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => out.push_str(&format!("{} {}\n", "✔".green(), outcome.source)),
            Err(failure) => {
                failed += 1;
                out.push_str(&format!("{} {} ({:?})\n", "✘".red(), outcome.source.bold(), failure.kind));
                for line in failure.message.lines() {
                    out.push_str(&format!("    {line}\n"));
                }
            }
        }
    }
    out.push_str(&format!("{} checked, {} failed\n", outcomes.len(), failed));
    out
}

fn render_json(outcomes: &[Outcome]) -> serde_json::Value {
    use serde_json::json;
    serde_json::Value::Array(
        outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(()) => json!({ "source": outcome.source, "ok": true }),
                Err(failure) => json!({
                    "source": outcome.source,
                    "ok": false,
                    "kind": format!("{:?}", failure.kind),
                    "message": failure.message,
                    "value": failure.value.to_json(),
                    "config": failure.config,
                }),
            })
            .collect(),
    )
}

fn write_output(out: Option<&PathBuf>, report: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, report).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            if !report.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
