//! Template registry for storing and resolving raw templates by id.

use std::collections::BTreeMap;

use tracing::debug;

use crate::interpreter::error::compute_suggestions;
use crate::interpreter::{FormatError, LoadError};
use crate::types::{FILTER_SEPARATOR, TemplateId};

/// A registry mapping template ids to raw template text.
///
/// The registry is populated during setup and only read while formatting, so
/// a populated registry can be shared between threads freely.
///
/// Resolution tries the exact id first. If that misses and the id carries a
/// variant suffix, everything from the first separator on is stripped and
/// the base id is tried once. There is no further fallback.
///
/// # Example
///
/// ```
/// use tmo::TemplateRegistry;
///
/// let mut registry = TemplateRegistry::new();
/// registry.insert("fav_car", "My favourite car is {car}.").unwrap();
///
/// let (id, raw) = registry.resolve("fav_car#cars").unwrap();
/// assert_eq!(id.as_str(), "fav_car");
/// assert_eq!(raw, "My favourite car is {car}.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<TemplateId, String>,
}

impl TemplateRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from an id-to-template mapping.
    pub fn from_mapping<K, V>(mapping: impl IntoIterator<Item = (K, V)>) -> Result<Self, LoadError>
    where
        K: Into<TemplateId>,
        V: Into<String>,
    {
        let mut registry = Self::new();
        registry.register(mapping)?;
        Ok(registry)
    }

    /// Add every entry of a mapping, replacing templates with the same id.
    ///
    /// Returns the number of entries added. Ids containing the filter
    /// separator are rejected; entries before the offending one stay added.
    pub fn register<K, V>(&mut self, mapping: impl IntoIterator<Item = (K, V)>) -> Result<usize, LoadError>
    where
        K: Into<TemplateId>,
        V: Into<String>,
    {
        let mut count = 0;
        for (id, raw) in mapping {
            self.insert(id, raw)?;
            count += 1;
        }
        Ok(count)
    }

    /// Add or replace a single template.
    pub fn insert(&mut self, id: impl Into<TemplateId>, raw: impl Into<String>) -> Result<(), LoadError> {
        let id = id.into();
        if id.as_str().is_empty() || id.as_str().contains(FILTER_SEPARATOR) {
            return Err(LoadError::InvalidTemplateId { id: id.to_string() });
        }
        self.templates.insert(id, raw.into());
        Ok(())
    }

    /// Get the raw template registered under exactly this id.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.templates.get(id).map(String::as_str)
    }

    /// Whether a template is registered under exactly this id.
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Resolve an id to the matching registered id and its raw template.
    ///
    /// Fails with [`FormatError::TemplateNotFound`] when neither the id nor
    /// (for variant ids) its base id is registered.
    pub fn resolve(&self, id: &str) -> Result<(&TemplateId, &str), FormatError> {
        if let Some((found, raw)) = self.templates.get_key_value(id) {
            return Ok((found, raw));
        }

        let requested = TemplateId::new(id);
        if requested.has_variant() {
            let base = requested.base();
            if let Some((found, raw)) = self.templates.get_key_value(base) {
                debug!(requested = id, fallback = base, "variant not registered, using base template");
                return Ok((found, raw));
            }
        }

        Err(FormatError::TemplateNotFound {
            id: id.to_string(),
            suggestions: compute_suggestions(requested.base(), self.ids().map(TemplateId::as_str)),
        })
    }

    /// All registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &TemplateId> {
        self.templates.keys()
    }

    /// All entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&TemplateId, &str)> {
        self.templates.iter().map(|(id, raw)| (id, raw.as_str()))
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
