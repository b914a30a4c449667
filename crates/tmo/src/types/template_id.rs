use std::borrow::Borrow;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Separates a base template id from its variant suffix (`fav_color#colors`).
pub const VARIANT_SEPARATOR: char = '#';

/// Introduces a filter on a field key (`{number@round(2)}`).
///
/// Template ids may not contain it; filter names never do.
pub const FILTER_SEPARATOR: char = '@';

/// Identifier of a template in a [`TemplateRegistry`](crate::TemplateRegistry).
///
/// An id is an opaque string that may carry an explicit variant suffix after
/// [`VARIANT_SEPARATOR`]. Plural variants are formed by appending one
/// pluralized argument name per list-valued argument, e.g.
/// `fav_color#colors`.
///
/// # Example
///
/// ```
/// use tmo::TemplateId;
///
/// let id = TemplateId::new("fav_color#colors");
/// assert_eq!(id.base(), "fav_color");
/// assert_eq!(id.variant(), Some("colors"));
/// assert!(id.has_variant());
///
/// let plain = TemplateId::new("fav_car");
/// assert_eq!(plain.base(), "fav_car");
/// assert_eq!(plain.variant(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Create a template id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from a base and variant suffixes joined by the separator.
    ///
    /// With no suffixes the base is returned unchanged.
    pub fn with_variants<'a>(base: &str, suffixes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut id = base.to_string();
        for suffix in suffixes {
            id.push(VARIANT_SEPARATOR);
            id.push_str(suffix);
        }
        Self(id)
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the first variant separator.
    pub fn base(&self) -> &str {
        match self.0.split_once(VARIANT_SEPARATOR) {
            Some((base, _)) => base,
            None => &self.0,
        }
    }

    /// Everything after the first variant separator, if present.
    pub fn variant(&self) -> Option<&str> {
        self.0.split_once(VARIANT_SEPARATOR).map(|(_, variant)| variant)
    }

    /// Whether the id names an explicit variant.
    pub fn has_variant(&self) -> bool {
        self.0.contains(VARIANT_SEPARATOR)
    }
}

impl Display for TemplateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TemplateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
