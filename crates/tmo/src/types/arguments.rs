use std::collections::HashMap;

use super::Value;

/// The argument set of a single formatting call.
///
/// Named values are addressed by `{name}`; positional values by `{0}` or, in
/// order of appearance, by `{}`. The set is built fresh for each call and is
/// never retained by the engine.
///
/// # Example
///
/// ```
/// use tmo::{Arguments, Value};
///
/// let args = Arguments::new()
///     .arg("first")
///     .named("color", vec!["red", "blue"]);
///
/// assert_eq!(args.positional(0), Some(&Value::from("first")));
/// assert_eq!(args.get("color").and_then(Value::list_len), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    named: HashMap<String, Value>,
}

impl Arguments {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an argument set from positional values only.
    pub fn from_positional(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: HashMap::new(),
        }
    }

    /// Append a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add or replace a named value.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a named value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.named.insert(name.into(), value.into());
    }

    /// Look up a named value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// Look up a positional value.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Number of positional values.
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    /// Iterate over the named values in arbitrary order.
    pub fn named_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.named.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl From<HashMap<String, Value>> for Arguments {
    fn from(named: HashMap<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            named,
        }
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: HashMap::new(),
        }
    }
}
