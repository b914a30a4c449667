//! Implementation of the `tmo check` command.

use std::path::{Path, PathBuf};

use clap::Args;
use miette::{IntoDiagnostic, Report, Result};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tmo::interpreter::validate_templates;
use tmo::{FilterRegistry, TemplateRegistry, TemplateWarning};

use super::load_registry;
use crate::output::TemplateDiagnostic;

/// Arguments for the check command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Template files to check (.json)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Exit with a non-zero code if any warning is found
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for one warning.
#[derive(Debug, Serialize)]
struct WarningJson {
    file: String,
    id: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let filters = FilterRegistry::builtin();
    let mut load_failed = false;
    let mut templates_checked = 0;
    let mut report = Vec::new();

    for path in &args.files {
        let registry = match load_registry(path) {
            Ok(registry) => registry,
            Err(e) => {
                load_failed = true;
                eprintln!("{}: {}: {e}", path.display(), "error".if_supports_color(Stream::Stderr, |t| t.red()));
                continue;
            }
        };
        templates_checked += registry.len();

        let warnings = validate_templates(&registry, &filters);
        if !args.json {
            print_warnings(path, &registry, &warnings);
        }
        report.extend(warnings.iter().map(|warning| to_json(path, warning)));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        let summary = format!(
            "checked {templates_checked} template(s) in {} file(s): {} warning(s)",
            args.files.len(),
            report.len()
        );
        if report.is_empty() {
            println!("{}", summary.if_supports_color(Stream::Stdout, |t| t.green()));
        } else {
            println!("{}", summary.if_supports_color(Stream::Stdout, |t| t.yellow()));
        }
    }

    if load_failed || (args.strict && !report.is_empty()) {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}

fn print_warnings(path: &Path, registry: &TemplateRegistry, warnings: &[TemplateWarning]) {
    for warning in warnings {
        match warning {
            TemplateWarning::Syntax { id, error } => {
                let template = registry.get(id.as_str()).unwrap_or_default();
                let diagnostic = TemplateDiagnostic::from_parse_error(path, id, template, error);
                eprintln!("{:?}", Report::new(diagnostic));
            }
            other => eprintln!(
                "{}: {}: {other}",
                path.display(),
                "warning".if_supports_color(Stream::Stderr, |t| t.yellow())
            ),
        }
    }
}

fn to_json(path: &Path, warning: &TemplateWarning) -> WarningJson {
    let position = match warning {
        TemplateWarning::Syntax { error, .. } => Some(error.position()),
        _ => None,
    };
    WarningJson {
        file: path.display().to_string(),
        id: warning.id().to_string(),
        message: warning.to_string(),
        line: position.map(|(line, _)| line),
        column: position.map(|(_, column)| column),
    }
}
