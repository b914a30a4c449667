//! Error types for template loading and formatting.

use std::io;
use std::path::PathBuf;

use strsim::levenshtein;
use thiserror::Error;

use crate::parser::ParseError;

/// Errors that occur while loading templates or registering filters.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error when reading a template file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The template source is not valid JSON or not a JSON object.
    #[error("{origin}: invalid template JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A template entry whose value is not a string.
    #[error("template '{id}' must be a string")]
    NotAString { id: String },

    /// A template id containing the reserved filter separator.
    #[error("invalid template id '{id}': '@' is reserved for filters")]
    InvalidTemplateId { id: String },

    /// A filter name that is not a plain identifier.
    #[error("invalid filter name '{name}': expected letters, digits and '_'")]
    InvalidFilterName { name: String },
}

/// An error raised by a filter function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Wrong number of arguments in the template's filter call.
    #[error("'{filter}' expects {expected} argument(s), got {got}")]
    ArgumentCount {
        filter: String,
        expected: &'static str,
        got: usize,
    },

    /// An argument of the wrong type.
    #[error("'{filter}' argument {position}: {message}")]
    InvalidArgument {
        filter: String,
        position: usize,
        message: String,
    },

    /// The filter cannot handle the value it was given.
    #[error("'{filter}' cannot be applied to {kind} '{value}'")]
    InvalidValue {
        filter: String,
        kind: &'static str,
        value: String,
    },

    /// Failure reported by a host-supplied filter.
    #[error("{0}")]
    Custom(String),
}

/// Why a single field could not be resolved or rendered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// No named argument with this name.
    #[error("no argument named '{name}'")]
    MissingArgument { name: String },

    /// No positional argument at this index.
    #[error("no positional argument at index {index}")]
    MissingPositional { index: usize },

    /// A map has no such attribute.
    #[error("no attribute '{attribute}' on map")]
    MissingAttribute { attribute: String },

    /// A position past the end of a list or string.
    #[error("index {index} out of range for {kind} of length {len}")]
    IndexOutOfRange {
        index: usize,
        len: usize,
        kind: &'static str,
    },

    /// Attribute or index access on a value that does not support it.
    #[error("cannot access '{accessor}' on {kind}")]
    NotIndexable {
        accessor: String,
        kind: &'static str,
    },

    /// The format spec is malformed or does not suit the value.
    #[error("invalid format spec '{spec}': {message}")]
    InvalidFormatSpec { spec: String, message: String },

    /// A filter failed while processing the value.
    #[error("filter '{filter}' failed: {source}")]
    Filter {
        filter: String,
        #[source]
        source: FilterError,
    },
}

/// An error that occurred while selecting or formatting a template.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Neither the id nor its base id is registered.
    #[error("template not found: '{id}'{}", format_suggestions(suggestions))]
    TemplateNotFound {
        id: String,
        suggestions: Vec<String>,
    },

    /// No templates have been loaded into the engine.
    #[error("templates are not initialized")]
    TemplatesNotInitialized,

    /// The engine has no filter registry.
    #[error("formatter is not configured: no filter registry")]
    FormatterNotConfigured,

    /// A filter name that is not in the registry.
    #[error("unknown filter '@{name}'{}", format_suggestions(suggestions))]
    UnknownFilter {
        name: String,
        suggestions: Vec<String>,
    },

    /// A field key whose filter suffix does not parse.
    #[error("malformed filter chain in '{key}': {message}")]
    MalformedFilter { key: String, message: String },

    /// A field could not be resolved, or a filter failed on it.
    #[error("cannot resolve field '{field}': {source}")]
    FieldResolution {
        field: String,
        #[source]
        source: FieldError,
    },

    /// A template uses both `{}` and `{0}` style fields.
    #[error("cannot switch between automatic and manual field numbering")]
    ArgumentIndexingConflict,

    /// Format specs nest fields deeper than allowed.
    #[error("format spec recursion exceeds the maximum depth of {max_depth}")]
    RecursionLimitExceeded { max_depth: usize },

    /// The template text does not parse.
    #[error("template syntax: {0}")]
    Parse(#[from] ParseError),
}

/// Format suggestions as a " (did you mean: ...?)" suffix.
pub(crate) fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// Compute typo suggestions for a name from a list of available names.
///
/// Uses Levenshtein distance:
/// - For names of length <= 3, max distance is 1
/// - For longer names, max distance is 2
/// - At most 3 suggestions, closest first
pub fn compute_suggestions<'a>(
    name: &str,
    available: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let max_distance = if name.chars().count() <= 3 { 1 } else { 2 };
    let mut suggestions: Vec<(usize, &str)> = available
        .into_iter()
        .filter_map(|candidate| {
            let dist = levenshtein(name, candidate);
            (dist > 0 && dist <= max_distance).then_some((dist, candidate))
        })
        .collect();

    suggestions.sort();
    suggestions
        .into_iter()
        .take(3)
        .map(|(_, s)| s.to_string())
        .collect()
}
