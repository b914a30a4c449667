//! Implementation of the `tmo render` command.

use std::path::PathBuf;

use clap::Args;
use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use tmo::interpreter::DEFAULT_MAX_DEPTH;
use tmo::{Arguments, Engine, FilterRegistry, GetTextOptions, JsonFile, Value};

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template id to render (may carry an explicit `#variant`)
    pub id: String,

    /// JSON file mapping template ids to templates
    #[arg(long, env = "TMO_TEMPLATES")]
    pub templates: PathBuf,

    /// Named parameters in name=value format (repeatable). Values are read
    /// as JSON when they parse, e.g. `-p color='["red","blue"]'`
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Positional parameters for `{}` and `{0}` fields (repeatable)
    #[arg(short = 'a', long = "arg")]
    pub positional: Vec<String>,

    /// Connector word for fields without an explicit join
    #[arg(long)]
    pub connector_word: Option<String>,

    /// Separator for fields without an explicit join
    #[arg(long)]
    pub separator_char: Option<String>,

    /// Maximum depth of fields nested in format specs
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for render results.
#[derive(Serialize)]
struct RenderResult<'a> {
    id: &'a str,
    result: String,
}

/// Parse a key=value parameter string.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter format '{s}': expected name=value"))?;
    if key.is_empty() {
        return Err(format!("invalid parameter format '{s}': empty name"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Read a parameter as JSON, falling back to the raw string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw).map_or_else(|_| Value::from(raw), Value::from)
}

/// Run the render command.
pub fn run_render(args: RenderArgs) -> Result<i32> {
    let mut engine = Engine::builder()
        .filters(FilterRegistry::builtin())
        .max_depth(args.max_depth)
        .build();
    engine
        .load_templates(&JsonFile::new(&args.templates))
        .map_err(|e| miette!("Failed to load templates: {}", e))?;

    let mut arguments = Arguments::from_positional(args.positional.iter().map(String::as_str).map(parse_value));
    for (name, raw) in &args.params {
        arguments.insert(name.as_str(), parse_value(raw));
    }

    let options = GetTextOptions::builder()
        .maybe_connector_word(args.connector_word)
        .maybe_separator_char(args.separator_char)
        .build();

    match engine.gettext(&args.id, &options, &arguments) {
        Ok(result) => {
            if args.json {
                let output = RenderResult {
                    id: &args.id,
                    result,
                };
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                println!("{result}");
            }
            Ok(exitcode::OK)
        }
        Err(e) => {
            if args.json {
                let output = serde_json::json!({
                    "id": args.id,
                    "error": e.to_string(),
                });
                eprintln!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                eprintln!("Render error: {e}");
            }
            Ok(exitcode::DATAERR)
        }
    }
}
