//! Implementation of the `tmo list` command.

use std::path::PathBuf;

use clap::Args;
use miette::{IntoDiagnostic, Result};
use tmo::parser::{parse_template, Segment};

use super::load_registry;
use crate::output::table::{format_template_table, TemplateRow};

/// Arguments for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// JSON file mapping template ids to templates
    #[arg(long, env = "TMO_TEMPLATES")]
    pub templates: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the list command.
pub fn run_list(args: ListArgs) -> Result<i32> {
    let registry = load_registry(&args.templates)?;

    let rows: Vec<TemplateRow> = registry
        .iter()
        .map(|(id, raw)| TemplateRow {
            id: id.to_string(),
            base: id.base().to_string(),
            variant: id.variant().map(str::to_string),
            fields: count_fields(raw),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
    } else {
        println!("{}", format_template_table(&rows));
    }

    Ok(exitcode::OK)
}

/// Number of fields in a template, or `None` if it does not parse.
fn count_fields(template: &str) -> Option<usize> {
    let segments = parse_template(template).collect::<Result<Vec<_>, _>>().ok()?;
    Some(count_in(&segments))
}

fn count_in(segments: &[Segment]) -> usize {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(_) => 0,
            Segment::Field(field) => 1 + count_in(&field.spec),
        })
        .sum()
}
