//! Field key and filter chain parser using winnow.
//!
//! Parses a raw field key such as `items[0].name@art('the')@join(' or ')`:
//! - the root: empty (automatic index), all digits (manual index) or a name
//! - accessors: `.name`, `.0`, `[key]`
//! - filters after `@`: `name` or `name(literal, ...)`
//!
//! Filter arguments are literals only: quoted strings, integers, floats and
//! booleans.

use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use super::ast::{Accessor, FieldKey, FilterArg, FilterCall, FilterChain, JOIN_FILTER, KeyRoot};
use super::error::{ParseError, calculate_position};

/// Split a raw field key into the key proper and its filter chain.
///
/// An explicit `join` step is moved out of the per-element steps; a second
/// one is an error. Without one, [`FilterChain::join`] stays `None` and the
/// default join applies.
///
/// # Example
///
/// ```
/// use tmo::parser::{FilterArg, KeyRoot, parse_filter_suffix};
///
/// let (key, chain) = parse_filter_suffix("number@round(2)").unwrap();
/// assert_eq!(key.root, KeyRoot::Name("number".into()));
/// assert_eq!(chain.steps[0].name, "round");
/// assert_eq!(chain.steps[0].args, vec![FilterArg::Int(2)]);
/// assert!(chain.join.is_none());
/// ```
pub fn parse_filter_suffix(raw_key: &str) -> Result<(FieldKey, FilterChain), ParseError> {
    let mut remaining = raw_key;
    let result = (field_key, filter_calls).parse_next(&mut remaining);
    let error_at = |remaining: &str, message: String| {
        let (line, column) = calculate_position(raw_key, remaining);
        ParseError::Syntax {
            line,
            column,
            message,
        }
    };

    let (key, calls) = match result {
        Ok(parsed) if remaining.is_empty() => parsed,
        Ok(_) => {
            let next = remaining.chars().next().unwrap_or('?');
            return Err(error_at(
                remaining,
                format!("unexpected character '{next}' in field key"),
            ));
        }
        Err(e) => return Err(error_at(remaining, error_message(e))),
    };

    let mut chain = FilterChain::default();
    for call in calls {
        if call.name != JOIN_FILTER {
            chain.steps.push(call);
        } else if chain.join.is_none() {
            chain.join = Some(call);
        } else {
            return Err(error_at("", "more than one 'join' filter".to_string()));
        }
    }
    Ok((key, chain))
}

fn error_message(e: ErrMode<ContextError>) -> String {
    match e {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.to_string(),
        ErrMode::Incomplete(_) => "incomplete field key".to_string(),
    }
}

/// Parse the root and accessors.
fn field_key(input: &mut &str) -> ModalResult<FieldKey> {
    let root = key_root(input)?;
    let accessors: Vec<Accessor> = repeat(0.., accessor).parse_next(input)?;
    Ok(FieldKey { root, accessors })
}

/// Parse the root: nothing, digits, or a name.
fn key_root(input: &mut &str) -> ModalResult<KeyRoot> {
    let word: &str = take_while(0.., is_key_char).parse_next(input)?;
    if word.is_empty() {
        return Ok(KeyRoot::Auto);
    }
    if word.bytes().all(|b| b.is_ascii_digit()) {
        return word
            .parse::<usize>()
            .map(KeyRoot::Index)
            .map_err(|_| ErrMode::Cut(ContextError::new()));
    }
    Ok(KeyRoot::Name(word.to_string()))
}

/// Parse `.name` or `[key]`.
fn accessor(input: &mut &str) -> ModalResult<Accessor> {
    alt((
        preceded(
            '.',
            cut_err(take_while(1.., is_key_char))
                .context(StrContext::Label("attribute name")),
        )
        .map(|name: &str| Accessor::Attribute(name.to_string())),
        delimited(
            '[',
            cut_err(take_while(1.., |c: char| c != ']' && c != '['))
                .context(StrContext::Label("item key")),
            cut_err(']').context(StrContext::Expected(StrContextValue::CharLiteral(']'))),
        )
        .map(|name: &str| Accessor::Item(name.to_string())),
    ))
    .parse_next(input)
}

/// Parse zero or more `@filter` suffixes.
fn filter_calls(input: &mut &str) -> ModalResult<Vec<FilterCall>> {
    repeat(0.., preceded('@', cut_err(filter_call))).parse_next(input)
}

/// Parse `name` or `name(args)`.
fn filter_call(input: &mut &str) -> ModalResult<FilterCall> {
    let name = identifier
        .context(StrContext::Label("filter name"))
        .parse_next(input)?;
    let args = opt(filter_args).parse_next(input)?.unwrap_or_default();
    Ok(FilterCall {
        name: name.to_string(),
        args,
    })
}

/// Parse `(arg, arg, ...)`.
fn filter_args(input: &mut &str) -> ModalResult<Vec<FilterArg>> {
    delimited(
        ('(', ws),
        cut_err(separated(0.., filter_arg, (ws, ',', ws))),
        cut_err((ws, ')')).context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
    )
    .parse_next(input)
}

/// Parse a single literal argument.
fn filter_arg(input: &mut &str) -> ModalResult<FilterArg> {
    alt((
        quoted('\'').map(FilterArg::Str),
        quoted('"').map(FilterArg::Str),
        "true".value(FilterArg::Bool(true)),
        "false".value(FilterArg::Bool(false)),
        number,
    ))
    .context(StrContext::Label("filter argument"))
    .context(StrContext::Expected(StrContextValue::Description(
        "a quoted string, number or boolean",
    )))
    .parse_next(input)
}

/// Parse a string in the given quotes, honouring backslash escapes.
fn quoted<'i>(mut quote: char) -> impl Parser<&'i str, String, ErrMode<ContextError>> {
    move |input: &mut &'i str| -> ModalResult<String> {
        quote.parse_next(input)?;
        let mut out = String::new();
        loop {
            let c = cut_err(any)
                .context(StrContext::Expected(StrContextValue::CharLiteral(quote)))
                .parse_next(input)?;
            match c {
                '\\' => out.push(
                    cut_err(any)
                        .context(StrContext::Label("escape sequence"))
                        .parse_next(input)?,
                ),
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
    }
}

/// Parse an integer or a decimal float.
fn number(input: &mut &str) -> ModalResult<FilterArg> {
    let text: &str = (
        opt('-'),
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)?;
    if text.contains('.') {
        text.parse::<f64>()
            .map(FilterArg::Float)
            .map_err(|_| ErrMode::Cut(ContextError::new()))
    } else {
        text.parse::<i64>()
            .map(FilterArg::Int)
            .map_err(|_| ErrMode::Cut(ContextError::new()))
    }
}

/// Parse a filter name.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

/// Characters allowed in a key root or attribute name.
fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
