//! Plural variant selection.
//!
//! A template id gets one variant suffix per named argument holding two or
//! more values: the argument name with an `s` appended. Suffixes are sorted,
//! so `msg` called with `car = [..]` and `color = [..]` selects
//! `msg#cars#colors`. The registry falls back to the base id when the
//! variant is not registered, so a missing plural form is never an error.
//!
//! This is a shape rule, not a language rule: no CLDR categories are
//! involved.

use crate::types::{Arguments, TemplateId};

/// Compute the template id to request for the given arguments.
///
/// An id that already carries a variant suffix is returned unchanged.
///
/// # Example
///
/// ```
/// use tmo::{Arguments, TemplateId};
/// use tmo::interpreter::select_template_id;
///
/// let args = Arguments::new().named("color", vec!["red", "blue"]).named("name", "John");
/// let id = select_template_id(&TemplateId::new("fav_color"), &args);
/// assert_eq!(id.as_str(), "fav_color#colors");
///
/// let single = Arguments::new().named("color", vec!["red"]);
/// let id = select_template_id(&TemplateId::new("fav_color"), &single);
/// assert_eq!(id.as_str(), "fav_color");
/// ```
pub fn select_template_id(base: &TemplateId, args: &Arguments) -> TemplateId {
    if base.has_variant() {
        return base.clone();
    }

    let mut suffixes: Vec<String> = args
        .named_values()
        .filter(|(_, value)| value.list_len().is_some_and(|len| len >= 2))
        .map(|(name, _)| pluralize(name))
        .collect();
    suffixes.sort_unstable();

    TemplateId::with_variants(base.as_str(), suffixes.iter().map(String::as_str))
}

/// Plural form of an argument name.
fn pluralize(name: &str) -> String {
    format!("{name}s")
}
