//! Static checks over a template set.
//!
//! Parses every template without evaluating it and reports problems that
//! would otherwise only surface when the template is formatted with the
//! right arguments.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::interpreter::error::{compute_suggestions, format_suggestions};
use crate::interpreter::filters::FilterRegistry;
use crate::interpreter::registry::TemplateRegistry;
use crate::parser::{Field, KeyRoot, ParseError, Segment, parse_filter_suffix, parse_template};
use crate::types::TemplateId;

/// A problem found in a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateWarning {
    /// The template does not parse.
    #[error("template '{id}': {error}")]
    Syntax { id: TemplateId, error: ParseError },

    /// A field whose filter suffix does not parse.
    #[error("template '{id}': malformed filter chain in '{key}': {message}")]
    MalformedFilter {
        id: TemplateId,
        key: String,
        message: String,
    },

    /// A filter name that is not registered.
    #[error("template '{id}': unknown filter '@{name}'{}", format_suggestions(suggestions))]
    UnknownFilter {
        id: TemplateId,
        name: String,
        suggestions: Vec<String>,
    },

    /// The template uses both `{}` and `{0}` style fields.
    #[error("template '{id}': mixes automatic and manual field numbering")]
    MixedIndexing { id: TemplateId },

    /// A variant whose base template is missing, so it never falls back.
    #[error("template '{id}': variant has no base template '{base}'")]
    OrphanVariant { id: TemplateId, base: String },
}

impl TemplateWarning {
    /// The template the warning is about.
    pub fn id(&self) -> &TemplateId {
        match self {
            TemplateWarning::Syntax { id, .. }
            | TemplateWarning::MalformedFilter { id, .. }
            | TemplateWarning::UnknownFilter { id, .. }
            | TemplateWarning::MixedIndexing { id }
            | TemplateWarning::OrphanVariant { id, .. } => id,
        }
    }
}

/// Check every template in the registry against the filter registry.
///
/// Warnings are ordered by template id.
///
/// # Example
///
/// ```
/// use tmo::{FilterRegistry, TemplateRegistry};
/// use tmo::interpreter::validate_templates;
///
/// let templates = TemplateRegistry::from_mapping([("shout", "{word@uper}")]).unwrap();
/// let warnings = validate_templates(&templates, &FilterRegistry::builtin());
/// assert_eq!(
///     warnings[0].to_string(),
///     "template 'shout': unknown filter '@uper' (did you mean: upper?)"
/// );
/// ```
pub fn validate_templates(
    templates: &TemplateRegistry,
    filters: &FilterRegistry,
) -> Vec<TemplateWarning> {
    let mut warnings = Vec::new();
    for (id, raw) in templates.iter() {
        lint_orphan_variant(id, templates, &mut warnings);
        lint_template(id, raw, filters, &mut warnings);
    }
    warnings
}

fn lint_orphan_variant(
    id: &TemplateId,
    templates: &TemplateRegistry,
    warnings: &mut Vec<TemplateWarning>,
) {
    if id.has_variant() && !templates.contains(id.base()) {
        warnings.push(TemplateWarning::OrphanVariant {
            id: id.clone(),
            base: id.base().to_string(),
        });
    }
}

fn lint_template(
    id: &TemplateId,
    raw: &str,
    filters: &FilterRegistry,
    warnings: &mut Vec<TemplateWarning>,
) {
    let segments = match parse_template(raw).collect::<Result<Vec<_>, _>>() {
        Ok(segments) => segments,
        Err(error) => {
            warnings.push(TemplateWarning::Syntax {
                id: id.clone(),
                error,
            });
            return;
        }
    };

    let mut fields = Vec::new();
    collect_fields(&segments, &mut fields);

    let mut uses_auto = false;
    let mut uses_manual = false;
    let mut unknown = BTreeSet::new();
    for field in fields {
        let (key, chain) = match parse_filter_suffix(&field.key) {
            Ok(parsed) => parsed,
            Err(error) => {
                warnings.push(TemplateWarning::MalformedFilter {
                    id: id.clone(),
                    key: field.key.clone(),
                    message: error.to_string(),
                });
                continue;
            }
        };

        match key.root {
            KeyRoot::Auto => uses_auto = true,
            KeyRoot::Index(_) => uses_manual = true,
            KeyRoot::Name(_) => {}
        }
        unknown.extend(chain.names().filter(|name| !filters.contains(name)).map(str::to_string));
    }

    if uses_auto && uses_manual {
        warnings.push(TemplateWarning::MixedIndexing { id: id.clone() });
    }
    for name in unknown {
        warnings.push(TemplateWarning::UnknownFilter {
            id: id.clone(),
            suggestions: compute_suggestions(&name, filters.names()),
            name,
        });
    }
}

/// Fields in template order, including fields nested in format specs.
fn collect_fields<'s>(segments: &'s [Segment], fields: &mut Vec<&'s Field>) {
    for segment in segments {
        if let Segment::Field(field) = segment {
            fields.push(field);
            collect_fields(&field.spec, fields);
        }
    }
}
