//! Template interpreter.
//!
//! This module takes raw templates and produces formatted strings. It picks
//! the plural variant of a template from the shape of the arguments,
//! resolves it against the registry, and evaluates every field: key lookup,
//! format spec, filter chain and the final join.

mod context;
mod engine;
mod error;
mod evaluator;
mod filters;
mod format_spec;
mod lint;
mod plural;
mod registry;
mod source;

pub use context::{DEFAULT_MAX_DEPTH, EvalContext};
pub use engine::{Engine, GetTextOptions};
pub use error::{FieldError, FilterError, FormatError, LoadError, compute_suggestions};
pub use evaluator::format_template;
pub use filters::{DEFAULT_CONNECTOR, DEFAULT_SEPARATOR, FilterFn, FilterRegistry, join, join_words};
pub use format_spec::FormatSpec;
pub use lint::{TemplateWarning, validate_templates};
pub use plural::select_template_id;
pub use registry::TemplateRegistry;
pub use source::{JsonFile, JsonStr, TemplateSource};
