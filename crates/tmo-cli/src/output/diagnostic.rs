//! Miette diagnostic wrapper for template syntax errors.
//!
//! Note: This module has an exception for `unused_assignments` because miette
//! derive macros read struct fields in generated code that rustc cannot track.
#![allow(unused_assignments)]

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use tmo::{ParseError, TemplateId};

/// A miette-compatible diagnostic for a template that does not parse.
///
/// The source shown is the template text itself, named after the file and
/// the template id, since positions are relative to the template.
#[derive(Debug, Error, Diagnostic)]
#[error("syntax error: {message}")]
#[diagnostic(code(tmo::syntax))]
pub struct TemplateDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl TemplateDiagnostic {
    /// Create a diagnostic from a ParseError with the template as context.
    pub fn from_parse_error(path: &Path, id: &TemplateId, template: &str, err: &ParseError) -> Self {
        let (line, column) = err.position();
        let message = match err {
            ParseError::Syntax { message, .. } => message.clone(),
            ParseError::UnexpectedEof { .. } => "unexpected end of template".into(),
        };
        let help = message
            .contains("'}}'")
            .then(|| "write '}}' for a literal '}' and '{{' for a literal '{'".to_string());

        // Line and column count characters; miette wants a byte offset.
        let line_start = template
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum::<usize>();
        let rest = template.get(line_start..).unwrap_or_default();
        let column_offset = rest
            .char_indices()
            .nth(column.saturating_sub(1))
            .map_or(rest.len(), |(offset, _)| offset);

        // Clamp offset to content length to avoid miette panic on out-of-bounds
        let offset = (line_start + column_offset).min(template.len());

        TemplateDiagnostic {
            src: NamedSource::new(format!("{} [{}]", path.display(), id), template.to_string()),
            span: (offset, 1).into(),
            message,
            help,
        }
    }
}
