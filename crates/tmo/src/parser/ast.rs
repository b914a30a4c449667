//! Public AST types for templates, field keys and filter chains.
//!
//! These types are public to enable external tooling (linters, listings, etc.).

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A segment of a template, yielded by [`parse_template`](super::parse_template).
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text, with `{{`/`}}` escapes already collapsed.
    Literal(String),
    /// A `{...}` field reference.
    Field(Field),
}

/// A field reference: `{key!conversion:spec}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Raw key text including any filter suffix (`number@round(2)`).
    ///
    /// Split into a [`FieldKey`] and a [`FilterChain`] by
    /// [`parse_filter_suffix`](super::parse_filter_suffix).
    pub key: String,
    /// Optional `!s`, `!r` or `!a` marker.
    pub conversion: Option<Conversion>,
    /// The format spec after `:`, itself a template fragment.
    ///
    /// Empty when the field has no spec.
    pub spec: Vec<Segment>,
}

impl Field {
    /// Whether the format spec contains nested field references.
    pub fn has_nested_fields(&self) -> bool {
        self.spec.iter().any(|s| matches!(s, Segment::Field(_)))
    }
}

/// Conversion applied to a value before its format spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `!s`: the display form.
    Str,
    /// `!r`: strings single-quoted with escapes (`'it\'s\n'`), other
    /// values as displayed.
    Repr,
    /// `!a`: like `!r`, with every non-ASCII character escaped as `\xhh`,
    /// `\uhhhh` or `\Uhhhhhhhh`.
    Ascii,
}

/// A field key with the filter suffix removed: root plus accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldKey {
    pub root: KeyRoot,
    pub accessors: Vec<Accessor>,
}

/// The first part of a field key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyRoot {
    /// `{}`: the next positional argument.
    Auto,
    /// `{0}`: an explicit positional argument.
    Index(usize),
    /// `{name}`: a named argument.
    Name(String),
}

/// Attribute or item access following the root (`user.name`, `items[0]`).
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// `.name` or `.0`
    Attribute(String),
    /// `[name]` or `[0]`
    Item(String),
}

impl Accessor {
    /// The text used for lookup, regardless of syntax.
    pub fn name(&self) -> &str {
        match self {
            Accessor::Attribute(name) | Accessor::Item(name) => name,
        }
    }
}

/// One filter invocation: `name` or `name(arg, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<FilterArg>,
}

impl FilterCall {
    /// A call without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

/// A literal filter argument. Arguments are never evaluated as code.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FilterArg {
    /// Numeric view of the argument, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterArg::Int(n) => Some(*n as f64),
            FilterArg::Float(f) => Some(*f),
            FilterArg::Str(_) | FilterArg::Bool(_) => None,
        }
    }

    /// Integer view of the argument, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FilterArg::Int(n) => Some(*n),
            FilterArg::Float(_) | FilterArg::Str(_) | FilterArg::Bool(_) => None,
        }
    }
}

impl Display for FilterArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FilterArg::Str(s) => f.write_str(s),
            FilterArg::Int(n) => write!(f, "{n}"),
            FilterArg::Float(n) => write!(f, "{n}"),
            FilterArg::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Name of the filter that reduces a list of rendered elements to one string.
pub const JOIN_FILTER: &str = "join";

/// The filters attached to a field key.
///
/// `steps` run per element in written order. The join step always runs last,
/// on the whole list, wherever it was written. `join` is `None` when the key
/// has no explicit join, in which case the engine supplies the default one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    pub steps: Vec<FilterCall>,
    pub join: Option<FilterCall>,
}

impl FilterChain {
    /// True if the key carries no filters at all.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.join.is_none()
    }

    /// Names of every filter in the chain, join last.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .chain(self.join.iter())
            .map(|call| call.name.as_str())
    }
}
