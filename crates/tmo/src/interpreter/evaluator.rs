//! Template evaluation engine.
//!
//! This module drives the parser over a raw template and renders each field:
//! the filter suffix is split off, the key is resolved against the call's
//! arguments, the format spec is rendered (recursively, with bounded depth),
//! every element of the value goes through conversion, format spec and
//! filters, and the join filter reduces the rendered elements to one string.

use std::borrow::Cow;
use std::slice;

use tracing::trace;

use crate::interpreter::error::compute_suggestions;
use crate::interpreter::filters::{FilterFn, FilterRegistry};
use crate::interpreter::format_spec::FormatSpec;
use crate::interpreter::{EvalContext, FieldError, FormatError};
use crate::parser::{
    Accessor, Conversion, Field, FieldKey, FilterArg, FilterCall, FilterChain, JOIN_FILTER,
    KeyRoot, Segment, parse_filter_suffix, parse_template,
};
use crate::types::Value;

/// Evaluate a raw template, producing a formatted string.
///
/// Literal segments are copied directly to output; fields are rendered in
/// template order. Parsing is lazy, so an error in a later field is reported
/// only after the earlier fields were evaluated.
///
/// # Errors
///
/// Returns an error if:
/// - The template does not parse
/// - A filter chain is malformed or names an unknown filter
/// - A key cannot be resolved, or a filter fails on its value
/// - Automatic and manual positional fields are mixed
/// - Format specs nest fields beyond the context's maximum depth
pub fn format_template(
    template: &str,
    ctx: &mut EvalContext<'_>,
    filters: &FilterRegistry,
) -> Result<String, FormatError> {
    let mut output = String::new();
    for segment in parse_template(template) {
        eval_segment(&segment?, ctx, filters, &mut output)?;
    }
    Ok(output)
}

fn eval_segments(
    segments: &[Segment],
    ctx: &mut EvalContext<'_>,
    filters: &FilterRegistry,
) -> Result<String, FormatError> {
    let mut output = String::new();
    for segment in segments {
        eval_segment(segment, ctx, filters, &mut output)?;
    }
    Ok(output)
}

fn eval_segment(
    segment: &Segment,
    ctx: &mut EvalContext<'_>,
    filters: &FilterRegistry,
    output: &mut String,
) -> Result<(), FormatError> {
    match segment {
        Segment::Literal(text) => output.push_str(text),
        Segment::Field(field) => output.push_str(&eval_field(field, ctx, filters)?),
    }
    Ok(())
}

/// Render one field.
fn eval_field(
    field: &Field,
    ctx: &mut EvalContext<'_>,
    filters: &FilterRegistry,
) -> Result<String, FormatError> {
    trace!(field = %field.key, depth = ctx.depth(), "rendering field");

    // 1. Split the key from its filters and resolve every filter by name
    let (key, chain) =
        parse_filter_suffix(&field.key).map_err(|e| FormatError::MalformedFilter {
            key: field.key.clone(),
            message: e.to_string(),
        })?;
    let steps = chain
        .steps
        .iter()
        .map(|call| lookup(filters, &call.name).map(|filter| (call, filter)))
        .collect::<Result<Vec<_>, _>>()?;
    let join = lookup(filters, JOIN_FILTER)?;
    let join_args = join_args(&chain, ctx);

    // 2. Resolve the value, then the spec (nested fields number after this one)
    let value = resolve_key(&key, &field.key, ctx)?;
    let spec_text = render_spec(field, ctx, filters)?;
    let spec = if spec_text.is_empty() {
        None
    } else {
        let parsed = FormatSpec::parse(&spec_text).map_err(|message| {
            field_error(
                field,
                FieldError::InvalidFormatSpec {
                    spec: spec_text.clone(),
                    message,
                },
            )
        })?;
        Some((spec_text.as_str(), parsed))
    };

    // 3. Render each element; a scalar is a list of one for this purpose
    let elements: &[Value] = match value.as_ref() {
        Value::List(items) => items,
        scalar => slice::from_ref(scalar),
    };
    let rendered = elements
        .iter()
        .map(|element| render_element(element, field, spec.as_ref(), &steps))
        .collect::<Result<Vec<_>, _>>()?;

    // 4. Join runs last, on the whole list
    let joined = (**join)(Value::List(rendered), &join_args).map_err(|source| {
        field_error(
            field,
            FieldError::Filter {
                filter: JOIN_FILTER.to_string(),
                source,
            },
        )
    })?;
    Ok(joined.to_string())
}

/// Apply conversion, format spec and per-element filters to one element.
fn render_element(
    element: &Value,
    field: &Field,
    spec: Option<&(&str, FormatSpec)>,
    steps: &[(&FilterCall, &FilterFn)],
) -> Result<Value, FormatError> {
    let converted = match field.conversion {
        Some(conversion) => Value::String(convert(element, conversion)),
        None => element.clone(),
    };

    let mut current = match spec {
        Some((text, spec)) => Value::String(spec.apply(&converted).map_err(|message| {
            field_error(
                field,
                FieldError::InvalidFormatSpec {
                    spec: (*text).to_string(),
                    message,
                },
            )
        })?),
        None => converted,
    };

    for &(call, filter) in steps {
        current = (**filter)(current, &call.args).map_err(|source| {
            field_error(
                field,
                FieldError::Filter {
                    filter: call.name.clone(),
                    source,
                },
            )
        })?;
    }

    Ok(Value::String(current.to_string()))
}

/// Resolve a field key against the call's arguments.
fn resolve_key<'a>(
    key: &FieldKey,
    raw: &str,
    ctx: &mut EvalContext<'a>,
) -> Result<Cow<'a, Value>, FormatError> {
    let unresolved = |source| FormatError::FieldResolution {
        field: raw.to_string(),
        source,
    };

    let root = match &key.root {
        KeyRoot::Auto => {
            let index = ctx.next_auto_index()?;
            ctx.get_positional(index)
                .ok_or_else(|| unresolved(FieldError::MissingPositional { index }))?
        }
        KeyRoot::Index(index) => {
            ctx.use_manual_index()?;
            ctx.get_positional(*index)
                .ok_or_else(|| unresolved(FieldError::MissingPositional { index: *index }))?
        }
        KeyRoot::Name(name) => ctx.get_named(name).ok_or_else(|| {
            unresolved(FieldError::MissingArgument { name: name.clone() })
        })?,
    };

    let mut value = Cow::Borrowed(root);
    for accessor in &key.accessors {
        value = match value {
            Cow::Borrowed(current) => access(current, accessor),
            Cow::Owned(current) => {
                access(&current, accessor).map(|item| Cow::Owned(item.into_owned()))
            }
        }
        .map_err(unresolved)?;
    }
    Ok(value)
}

/// Attribute access on maps; position access on lists and strings.
///
/// A string position yields the character at that position. `.0` and `[0]`
/// are interchangeable.
fn access<'v>(value: &'v Value, accessor: &Accessor) -> Result<Cow<'v, Value>, FieldError> {
    let name = accessor.name();
    let not_indexable = || FieldError::NotIndexable {
        accessor: name.to_string(),
        kind: value.kind(),
    };
    match value {
        Value::Map(map) => map
            .get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| FieldError::MissingAttribute {
                attribute: name.to_string(),
            }),
        Value::List(items) => {
            let index: usize = name.parse().map_err(|_| not_indexable())?;
            items
                .get(index)
                .map(Cow::Borrowed)
                .ok_or(FieldError::IndexOutOfRange {
                    index,
                    len: items.len(),
                    kind: value.kind(),
                })
        }
        Value::String(text) => {
            let index: usize = name.parse().map_err(|_| not_indexable())?;
            text.chars()
                .nth(index)
                .map(|c| Cow::Owned(Value::String(c.to_string())))
                .ok_or_else(|| FieldError::IndexOutOfRange {
                    index,
                    len: text.chars().count(),
                    kind: value.kind(),
                })
        }
        Value::Bool(_) | Value::Number(_) | Value::Float(_) => Err(not_indexable()),
    }
}

/// Render the format spec of a field to plain text.
///
/// Specs without nested fields are copied; specs with fields are evaluated
/// one level deeper.
fn render_spec(
    field: &Field,
    ctx: &mut EvalContext<'_>,
    filters: &FilterRegistry,
) -> Result<String, FormatError> {
    if !field.has_nested_fields() {
        return Ok(field
            .spec
            .iter()
            .filter_map(|segment| match segment {
                Segment::Literal(text) => Some(text.as_str()),
                Segment::Field(_) => None,
            })
            .collect());
    }

    ctx.push_spec()?;
    let result = eval_segments(&field.spec, ctx, filters);
    ctx.pop_spec();
    result
}

/// Join arguments: explicit ones first, then the call-level defaults.
fn join_args(chain: &FilterChain, ctx: &EvalContext<'_>) -> Vec<FilterArg> {
    let mut args = chain
        .join
        .as_ref()
        .map(|call| call.args.clone())
        .unwrap_or_default();
    if args.is_empty() {
        args.push(FilterArg::Str(ctx.connector_word().to_string()));
    }
    if args.len() == 1 {
        args.push(FilterArg::Str(ctx.separator_char().to_string()));
    }
    args
}

fn convert(value: &Value, conversion: Conversion) -> String {
    match (conversion, value) {
        (Conversion::Repr, Value::String(s)) => quote(s, false),
        (Conversion::Ascii, Value::String(s)) => quote(s, true),
        (Conversion::Str | Conversion::Repr | Conversion::Ascii, other) => other.to_string(),
    }
}

/// Quote a string as `'text'`, or `"text"` when it holds only single quotes.
///
/// Backslashes, the chosen quote, `\t`, `\n` and `\r` get backslash escapes.
/// Control characters and whitespace other than a space become `\xhh`,
/// `\uhhhh` or `\Uhhhhhhhh`, as does every non-ASCII character in ASCII mode.
fn quote(text: &str, ascii_only: bool) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(delimiter);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            ' ' => out.push(' '),
            c if c.is_control() || c.is_whitespace() || (ascii_only && !c.is_ascii()) => {
                let code = u32::from(c);
                let escaped = match code {
                    0..=0xff => format!("\\x{code:02x}"),
                    0x100..=0xffff => format!("\\u{code:04x}"),
                    _ => format!("\\U{code:08x}"),
                };
                out.push_str(&escaped);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

fn lookup<'r>(filters: &'r FilterRegistry, name: &str) -> Result<&'r FilterFn, FormatError> {
    filters.get(name).ok_or_else(|| FormatError::UnknownFilter {
        name: name.to_string(),
        suggestions: compute_suggestions(name, filters.names()),
    })
}

fn field_error(field: &Field, source: FieldError) -> FormatError {
    FormatError::FieldResolution {
        field: field.key.clone(),
        source,
    }
}
