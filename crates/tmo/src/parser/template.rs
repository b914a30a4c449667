//! Template parser using winnow.
//!
//! Splits a raw template into segments, one segment per `next()` call:
//! - Literal text, with `{{` and `}}` collapsed to single braces
//! - Fields `{key!conversion:spec}`, where the spec may itself contain fields
//!
//! The raw key is handed over untouched; the filter suffix is split off
//! later by the filter parser.

use winnow::combinator::{alt, cut_err, fail, opt, preceded, repeat};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::none_of;

use super::ast::{Conversion, Field, Segment};
use super::error::{ParseError, calculate_position};

/// Deepest field nesting accepted inside format specs.
///
/// The evaluator enforces its own, much smaller, limit.
const MAX_NESTING: usize = 64;

/// Parse a template lazily.
///
/// The returned iterator parses one segment per call and stops after the
/// first error. Parsing has no side effects, so calling this again on the
/// same text yields the same sequence.
///
/// # Example
///
/// ```
/// use tmo::parser::{Segment, parse_template};
///
/// let segments: Vec<Segment> = parse_template("Hi {name}!")
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(segments.len(), 3);
/// ```
pub fn parse_template(input: &str) -> Segments<'_> {
    Segments {
        original: input,
        remaining: input,
        finished: false,
    }
}

/// Single-pass iterator over the segments of a template.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    original: &'a str,
    remaining: &'a str,
    finished: bool,
}

impl Iterator for Segments<'_> {
    type Item = Result<Segment, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining.is_empty() {
            return None;
        }
        match segment(&mut self.remaining) {
            Ok(segment) => Some(Ok(segment)),
            Err(e) => {
                self.finished = true;
                Some(Err(self.error(e)))
            }
        }
    }
}

impl Segments<'_> {
    fn error(&self, e: ErrMode<ContextError>) -> ParseError {
        let (line, column) = calculate_position(self.original, self.remaining);
        if self.remaining.is_empty() {
            return ParseError::UnexpectedEof { line, column };
        }
        let message = match e {
            ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.to_string(),
            ErrMode::Incomplete(_) => "incomplete input".to_string(),
        };
        ParseError::Syntax {
            line,
            column,
            message,
        }
    }
}

/// Parse a top-level segment: literal run, field, or a stray `}`.
fn segment(input: &mut &str) -> ModalResult<Segment> {
    alt((
        literal.map(Segment::Literal),
        (|i: &mut &str| field(i, 0)).map(Segment::Field),
        cut_err(fail.context(StrContext::Expected(StrContextValue::Description(
            "'}}' to escape a single '}'",
        )))),
    ))
    .parse_next(input)
}

/// Parse a run of literal text: escapes and any character but braces.
fn literal(input: &mut &str) -> ModalResult<String> {
    repeat(
        1..,
        alt(("{{".value('{'), "}}".value('}'), none_of(['{', '}']))),
    )
    .parse_next(input)
}

/// Literal text inside a format spec. A `}` always closes the field there.
fn spec_literal(input: &mut &str) -> ModalResult<String> {
    repeat(1.., alt(("{{".value('{'), none_of(['{', '}'])))).parse_next(input)
}

/// Parse a field: `{` raw-key [`!` conversion] [`:` spec] `}`.
fn field(input: &mut &str, depth: usize) -> ModalResult<Field> {
    '{'.parse_next(input)?;
    if depth > MAX_NESTING {
        return syntax_error(input, "field: format specs are nested too deeply");
    }
    let key = raw_key(input)?;
    let conversion = opt(preceded('!', cut_err(conversion))).parse_next(input)?;
    let spec = match opt(':').parse_next(input)? {
        Some(_) => spec(input, depth + 1)?,
        None => Vec::new(),
    };
    cut_err('}')
        .context(StrContext::Expected(StrContextValue::CharLiteral('}')))
        .parse_next(input)?;

    Ok(Field {
        key: key.to_string(),
        conversion,
        spec,
    })
}

/// Parse a conversion marker character.
fn conversion(input: &mut &str) -> ModalResult<Conversion> {
    alt((
        's'.value(Conversion::Str),
        'r'.value(Conversion::Repr),
        'a'.value(Conversion::Ascii),
    ))
    .context(StrContext::Label("conversion"))
    .context(StrContext::Expected(StrContextValue::Description(
        "'s', 'r' or 'a'",
    )))
    .parse_next(input)
}

/// Parse a format spec up to (not including) the closing `}`.
fn spec(input: &mut &str, depth: usize) -> ModalResult<Vec<Segment>> {
    repeat(
        0..,
        alt((
            spec_literal.map(Segment::Literal),
            (move |i: &mut &str| field(i, depth)).map(Segment::Field),
        )),
    )
    .parse_next(input)
}

/// Take the raw key: everything up to the first `!`, `:` or `}` that sits
/// outside filter-call parentheses and quoted filter arguments.
fn raw_key<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let text: &'i str = input;
    let mut parens = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' if parens > 0 => quote = Some(c),
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            '{' => {
                *input = &text[i..];
                return syntax_error(input, "field name: '{' is not allowed in a key");
            }
            ':' | '!' | '}' if parens == 0 => {
                let (key, rest) = text.split_at(i);
                *input = rest;
                return Ok(key);
            }
            _ => {}
        }
    }

    // Ran off the end of the template inside the field.
    *input = &text[text.len()..];
    cut_err(fail.context(StrContext::Expected(StrContextValue::CharLiteral('}'))))
        .parse_next(input)
}

/// Fail without backtracking, labelling the error with `message`.
fn syntax_error<O>(input: &mut &str, message: &'static str) -> ModalResult<O> {
    cut_err(fail.context(StrContext::Label(message))).parse_next(input)
}
