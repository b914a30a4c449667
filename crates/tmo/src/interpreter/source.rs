//! Template sources: where the id-to-template mapping comes from.
//!
//! The conventional format is a flat JSON object:
//!
//! ```json
//! { "fav_color": "My favourite color is {color}.",
//!   "fav_color#colors": "My favourite colors are {color}." }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};

use crate::interpreter::LoadError;

/// Anything that can produce a template mapping.
pub trait TemplateSource {
    /// Load the full mapping from template id to raw template.
    fn load(&self) -> Result<BTreeMap<String, String>, LoadError>;
}

/// A flat JSON object stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSource for JsonFile {
    fn load(&self) -> Result<BTreeMap<String, String>, LoadError> {
        let content = fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_json(&content, &self.path.display().to_string())
    }
}

/// A flat JSON object held in memory.
///
/// ```
/// use tmo::{JsonStr, TemplateSource};
///
/// let templates = JsonStr::new(r#"{"greeting": "Hi {name}"}"#).load().unwrap();
/// assert_eq!(templates["greeting"], "Hi {name}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStr {
    text: String,
}

impl JsonStr {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TemplateSource for JsonStr {
    fn load(&self) -> Result<BTreeMap<String, String>, LoadError> {
        parse_json(&self.text, "<string>")
    }
}

impl TemplateSource for BTreeMap<String, String> {
    fn load(&self) -> Result<BTreeMap<String, String>, LoadError> {
        Ok(self.clone())
    }
}

impl TemplateSource for HashMap<String, String> {
    fn load(&self) -> Result<BTreeMap<String, String>, LoadError> {
        Ok(self
            .iter()
            .map(|(id, raw)| (id.clone(), raw.clone()))
            .collect())
    }
}

fn parse_json(text: &str, origin: &str) -> Result<BTreeMap<String, String>, LoadError> {
    let object: Map<String, JsonValue> =
        serde_json::from_str(text).map_err(|source| LoadError::Json {
            origin: origin.to_string(),
            source,
        })?;

    object
        .into_iter()
        .map(|(id, value)| match value {
            JsonValue::String(raw) => Ok((id, raw)),
            _ => Err(LoadError::NotAString { id }),
        })
        .collect()
}
