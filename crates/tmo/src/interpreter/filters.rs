//! Filter registry and the built-in filters.
//!
//! Filters transform a field's value (`{name@upper}`, `{price@round(2)}`).
//! They are looked up by name in a registry supplied by the host; an
//! unknown name is an error, never evaluated as code.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::interpreter::{FilterError, LoadError};
use crate::parser::{FilterArg, JOIN_FILTER};
use crate::types::Value;

/// Connector placed between the last two elements by the default join.
pub const DEFAULT_CONNECTOR: &str = " and ";

/// Separator placed between the other elements by the default join.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Filter function signature.
///
/// Takes:
/// - `value`: The value to transform
/// - `args`: The literal arguments written in the template
///
/// The join filter receives a `Value::List` of already rendered strings.
pub type FilterFn = Arc<dyn Fn(Value, &[FilterArg]) -> Result<Value, FilterError> + Send + Sync>;

/// Registry for filter functions.
///
/// The registry is a plain lookup table: the host registers every filter
/// templates may use, and the engine resolves names against it.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    /// Create a new empty registry.
    ///
    /// Templates formatted against an empty registry fail as soon as any
    /// field is rendered, since even the implicit join must be registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in filters:
    /// `join`, `art`, `round`, `upper`, `lower` and `cap`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, fn(Value, &[FilterArg]) -> Result<Value, FilterError>); 6] = [
            (JOIN_FILTER, join),
            ("art", art),
            ("round", round),
            ("upper", upper),
            ("lower", lower),
            ("cap", cap),
        ];
        for (name, f) in builtins {
            registry.filters.insert(name.to_string(), Arc::new(f));
        }
        registry
    }

    /// Register a filter, replacing any filter with the same name.
    ///
    /// Names must be identifiers so they can never contain the reserved
    /// separators.
    pub fn register<F>(&mut self, name: &str, filter: F) -> Result<(), LoadError>
    where
        F: Fn(Value, &[FilterArg]) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        if !is_identifier(name) {
            return Err(LoadError::InvalidFilterName {
                name: name.to_string(),
            });
        }
        self.filters.insert(name.to_string(), Arc::new(filter));
        Ok(())
    }

    /// Get a filter by name.
    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    /// Check if a filter exists.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filter names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Debug for FilterRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Join rendered elements: `a, b and c`.
///
/// Arguments: connector word (default `" and "`) and separator (default
/// `", "`); an empty argument also selects the default. Lists of any length
/// are accepted; a scalar is returned as text.
pub fn join(value: Value, args: &[FilterArg]) -> Result<Value, FilterError> {
    check_arg_count(JOIN_FILTER, args, 0, 2, "0 to 2")?;
    let connector = text_arg_or(args.first(), DEFAULT_CONNECTOR);
    let separator = text_arg_or(args.get(1), DEFAULT_SEPARATOR);

    let items: Vec<String> = match value {
        Value::List(items) => items.iter().map(ToString::to_string).collect(),
        other => vec![other.to_string()],
    };
    Ok(Value::String(join_words(&items, &connector, &separator)))
}

/// The join algorithm on plain strings.
///
/// All elements but the last two are joined with `separator`, the last two
/// with `connector`, and the two parts with `separator`.
///
/// ```
/// use tmo::interpreter::join_words;
///
/// let words = ["a", "b", "c"].map(String::from);
/// assert_eq!(join_words(&words, " and ", ", "), "a, b and c");
/// assert_eq!(join_words(&words[..2], " or ", ", "), "a or b");
/// assert_eq!(join_words(&words[..1], " and ", ", "), "a");
/// assert_eq!(join_words(&[], " and ", ", "), "");
/// ```
pub fn join_words(items: &[String], connector: &str, separator: &str) -> String {
    let split = items.len().saturating_sub(2);
    let (head, tail) = items.split_at(split);
    let mut parts: Vec<String> = head.to_vec();
    parts.push(tail.join(connector));
    parts.join(separator)
}

/// Prefix the value with an article or other word: `art('the')`.
fn art(value: Value, args: &[FilterArg]) -> Result<Value, FilterError> {
    check_arg_count("art", args, 1, 1, "1")?;
    Ok(Value::String(format!("{} {value}", args[0])))
}

/// Round a number: `round` yields an integer, `round(2)` two decimals.
///
/// Ties go to the even neighbour. Integers stay integers, and negative
/// digit counts round to tens, hundreds and so on. Numeric strings are
/// parsed first, so `round` also works after a format spec has rendered
/// the value.
fn round(value: Value, args: &[FilterArg]) -> Result<Value, FilterError> {
    check_arg_count("round", args, 0, 1, "0 or 1")?;
    let digits = args
        .first()
        .map(|arg| {
            arg.as_i64().ok_or_else(|| FilterError::InvalidArgument {
                filter: "round".to_string(),
                position: 1,
                message: format!("expected an integer, got '{arg}'"),
            })
        })
        .transpose()?;

    let rounded = match Numeric::from_value(&value) {
        Some(Numeric::Int(n)) => Some(Value::Number(round_int(n, digits.unwrap_or(0)))),
        Some(Numeric::Float(f)) => round_float(f, digits),
        None => None,
    };
    rounded.ok_or_else(|| FilterError::InvalidValue {
        filter: "round".to_string(),
        kind: value.kind(),
        value: value.to_string(),
    })
}

/// Largest digit count worth scaling by; `10^308` is the largest finite power.
const MAX_ROUND_DIGITS: i64 = 308;

/// Floats at or beyond this magnitude have no fractional part.
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0;

/// `2^63`, the first float outside the `i64` range.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Numeric::Int(*n)),
            Value::Float(f) => Some(Numeric::Float(*f)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(Numeric::Int)
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(Numeric::Float))
            }
            Value::Bool(_) | Value::List(_) | Value::Map(_) => None,
        }
    }
}

fn round_int(n: i64, digits: i64) -> i64 {
    if digits >= 0 {
        return n;
    }
    let Some(factor) = u32::try_from(digits.unsigned_abs())
        .ok()
        .and_then(|exp| 10i64.checked_pow(exp))
    else {
        return 0;
    };
    let quotient = n.div_euclid(factor);
    let remainder = n.rem_euclid(factor);
    let round_up = match (remainder * 2).cmp(&factor) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => quotient.rem_euclid(2) == 1,
    };
    let quotient = if round_up { quotient + 1 } else { quotient };
    quotient.saturating_mul(factor)
}

/// `None` only when an integer result is asked of NaN or infinity.
fn round_float(number: f64, digits: Option<i64>) -> Option<Value> {
    let Some(digits) = digits else {
        if !number.is_finite() {
            return None;
        }
        let rounded = number.round_ties_even();
        return Some(if rounded.abs() < I64_LIMIT {
            Value::Number(rounded as i64)
        } else {
            Value::Float(rounded)
        });
    };

    let digits = i32::try_from(digits.clamp(-MAX_ROUND_DIGITS, MAX_ROUND_DIGITS)).unwrap_or(0);
    let factor = 10f64.powi(digits);
    let scaled = number * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return Some(Value::Float(number));
    }
    Some(Value::Float(scaled.round_ties_even() / factor))
}

fn upper(value: Value, args: &[FilterArg]) -> Result<Value, FilterError> {
    check_arg_count("upper", args, 0, 0, "0")?;
    Ok(Value::String(value.to_string().to_uppercase()))
}

fn lower(value: Value, args: &[FilterArg]) -> Result<Value, FilterError> {
    check_arg_count("lower", args, 0, 0, "0")?;
    Ok(Value::String(value.to_string().to_lowercase()))
}

/// Uppercase the first grapheme cluster.
fn cap(value: Value, args: &[FilterArg]) -> Result<Value, FilterError> {
    check_arg_count("cap", args, 0, 0, "0")?;
    let text = value.to_string();
    let mut graphemes = text.graphemes(true);
    let Some(first) = graphemes.next() else {
        return Ok(Value::String(text));
    };
    let mut result = first.to_uppercase();
    result.extend(graphemes);
    Ok(Value::String(result))
}

fn text_arg_or(arg: Option<&FilterArg>, default: &str) -> String {
    match arg.map(ToString::to_string) {
        Some(text) if !text.is_empty() => text,
        _ => default.to_string(),
    }
}

fn check_arg_count(
    filter: &str,
    args: &[FilterArg],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<(), FilterError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(FilterError::ArgumentCount {
            filter: filter.to_string(),
            expected,
            got: args.len(),
        })
    }
}
