//! Format-spec mini-language applied to each element of a field.
//!
//! Grammar: `[[fill]align][sign][#][0][width][grouping][.precision][type]`
//! - align: `<` left, `>` right, `^` center, `=` pad after the sign
//! - sign: `+`, `-`, or space
//! - grouping: `,` or `_` every three integer digits
//! - type: `s` for strings; `d`, `b`, `o`, `x`, `X` for integers;
//!   `e`, `E`, `f`, `F`, `%` for any number
//!
//! Without a type, floats given a precision render in fixed-point.

use crate::types::Value;

/// A parsed format spec.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    sign: Sign,
    alternate: bool,
    zero: bool,
    width: Option<usize>,
    grouping: Option<char>,
    precision: Option<usize>,
    kind: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

const TYPES: &[char] = &['s', 'd', 'b', 'o', 'x', 'X', 'e', 'E', 'f', 'F', '%'];

impl FormatSpec {
    /// Parse a rendered spec string.
    ///
    /// Returns a message describing the problem for malformed specs.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;
        let mut parsed = FormatSpec {
            fill: None,
            align: None,
            sign: Sign::Minus,
            alternate: false,
            zero: false,
            width: None,
            grouping: None,
            precision: None,
            kind: None,
        };

        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            parsed.fill = Some(chars[0]);
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            parsed.align = Some(align);
            i = 1;
        }

        match chars.get(i) {
            Some('+') => {
                parsed.sign = Sign::Plus;
                i += 1;
            }
            Some(' ') => {
                parsed.sign = Sign::Space;
                i += 1;
            }
            Some('-') => i += 1,
            _ => {}
        }

        if chars.get(i) == Some(&'#') {
            parsed.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            parsed.zero = true;
            i += 1;
        }

        let (width, next) = take_digits(&chars, i);
        parsed.width = width;
        i = next;

        if let Some(&c @ (',' | '_')) = chars.get(i) {
            parsed.grouping = Some(c);
            i += 1;
        }

        if chars.get(i) == Some(&'.') {
            let (precision, next) = take_digits(&chars, i + 1);
            if precision.is_none() {
                return Err("format specifier missing precision".to_string());
            }
            parsed.precision = precision;
            i = next;
        }

        if let Some(&c) = chars.get(i) {
            if !TYPES.contains(&c) {
                return Err(format!("unknown format code '{c}'"));
            }
            parsed.kind = Some(c);
            i += 1;
        }

        if i != chars.len() {
            return Err("invalid format specifier".to_string());
        }
        Ok(parsed)
    }

    /// Render a value according to this spec.
    pub fn apply(&self, value: &Value) -> Result<String, String> {
        match value {
            Value::Number(n) => self.format_integer(*n),
            Value::Float(f) => self.format_float(*f),
            Value::Bool(b) if self.kind.is_some_and(|k| k != 's') => {
                self.format_integer(i64::from(*b))
            }
            Value::Bool(_) | Value::String(_) | Value::List(_) | Value::Map(_) => {
                self.format_text(&value.to_string(), value.kind())
            }
        }
    }

    fn format_text(&self, text: &str, kind: &str) -> Result<String, String> {
        if let Some(code) = self.kind.filter(|&k| k != 's') {
            return Err(format!("unknown format code '{code}' for {kind}"));
        }
        if self.sign != Sign::Minus {
            return Err(format!("sign not allowed with {kind}"));
        }
        if self.alternate || self.grouping.is_some() {
            return Err(format!("alternate form and grouping not allowed with {kind}"));
        }
        if self.align == Some(Align::AfterSign) {
            return Err(format!("'=' alignment not allowed with {kind}"));
        }
        let body: String = match self.precision {
            Some(p) => text.chars().take(p).collect(),
            None => text.to_string(),
        };
        Ok(self.pad("", &body, Align::Left))
    }

    fn format_integer(&self, n: i64) -> Result<String, String> {
        let kind = self.kind.unwrap_or('d');
        let magnitude = n.unsigned_abs();
        let (prefix, digits) = match kind {
            'd' => ("", magnitude.to_string()),
            'b' => ("0b", format!("{magnitude:b}")),
            'o' => ("0o", format!("{magnitude:o}")),
            'x' => ("0x", format!("{magnitude:x}")),
            'X' => ("0X", format!("{magnitude:X}")),
            'e' | 'E' | 'f' | 'F' | '%' => return self.format_float(n as f64),
            _ => return Err(format!("unknown format code '{kind}' for integer")),
        };
        if self.precision.is_some() {
            return Err("precision not allowed in integer format specifier".to_string());
        }
        let digits = match self.grouping {
            Some(_) if kind != 'd' => {
                return Err(format!("grouping not allowed with format code '{kind}'"));
            }
            Some(sep) => group_digits(&digits, sep),
            None => digits,
        };
        let prefix = if self.alternate { prefix } else { "" };
        let lead = format!("{}{prefix}", self.sign_str(n < 0));
        Ok(self.pad(&lead, &digits, Align::Right))
    }

    fn format_float(&self, f: f64) -> Result<String, String> {
        let kind = self.kind.unwrap_or('g');
        let magnitude = f.abs();
        let upper = matches!(kind, 'E' | 'F');

        let body = if f.is_nan() {
            "nan".to_string()
        } else if f.is_infinite() {
            "inf".to_string()
        } else {
            match kind {
                'f' | 'F' => format!("{:.*}", self.precision.unwrap_or(6), magnitude),
                '%' => format!("{:.*}%", self.precision.unwrap_or(6), magnitude * 100.0),
                'e' | 'E' => exponent(magnitude, self.precision.unwrap_or(6)),
                'g' => match self.precision {
                    Some(p) => format!("{magnitude:.p$}"),
                    None => Value::Float(magnitude).to_string(),
                },
                _ => return Err(format!("unknown format code '{kind}' for float")),
            }
        };
        let body = if upper { body.to_uppercase() } else { body };
        let body = match self.grouping {
            Some(sep) => group_integer_part(&body, sep),
            None => body,
        };
        Ok(self.pad(self.sign_str(f.is_sign_negative() && !f.is_nan()), &body, Align::Right))
    }

    fn sign_str(&self, negative: bool) -> &'static str {
        match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        }
    }

    /// Pad `lead` (sign and prefix) plus `body` to the configured width.
    fn pad(&self, lead: &str, body: &str, default_align: Align) -> String {
        let len = lead.chars().count() + body.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return format!("{lead}{body}");
        }

        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
        let align = match self.align {
            Some(align) => align,
            None if self.zero && default_align == Align::Right => Align::AfterSign,
            None => default_align,
        };
        let count = width - len;
        let padding = |n: usize| fill.to_string().repeat(n);

        match align {
            Align::Left => format!("{lead}{body}{}", padding(count)),
            Align::Right => format!("{}{lead}{body}", padding(count)),
            Align::Center => {
                let left = count.div_euclid(2);
                format!("{}{lead}{body}{}", padding(left), padding(count - left))
            }
            Align::AfterSign => format!("{lead}{}{body}", padding(count)),
        }
    }
}

/// Read a run of ASCII digits starting at `start`.
fn take_digits(chars: &[char], start: usize) -> (Option<usize>, usize) {
    let end = chars[start.min(chars.len())..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |offset| start + offset);
    if end <= start {
        return (None, start);
    }
    let digits: String = chars[start..end].iter().collect();
    (digits.parse().ok(), end)
}

/// Insert `sep` between every three digits, counting from the right.
fn group_digits(digits: &str, sep: char) -> String {
    let len = digits.chars().count();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Group only the digits before the decimal point or exponent.
fn group_integer_part(body: &str, sep: char) -> String {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (integer, rest) = body.split_at(split);
    format!("{}{rest}", group_digits(integer, sep))
}

/// Scientific notation with a signed, two-digit exponent: `1.50e+03`.
fn exponent(magnitude: f64, precision: usize) -> String {
    let raw = format!("{magnitude:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(spec: &str, value: impl Into<Value>) -> String {
        FormatSpec::parse(spec).unwrap().apply(&value.into()).unwrap()
    }

    #[test]
    fn test_width_and_alignment() {
        assert_eq!(render("5", "ab"), "ab   ");
        assert_eq!(render(">5", "ab"), "   ab");
        assert_eq!(render("^6", "ab"), "  ab  ");
        assert_eq!(render("*^7", "ab"), "**ab***");
        assert_eq!(render("5", 42), "   42");
        assert_eq!(render("<5", 42), "42   ");
    }

    #[test]
    fn test_zero_padding_is_sign_aware() {
        assert_eq!(render("05", -42), "-0042");
        assert_eq!(render("+06.1f", 3.14159), "+003.1");
    }

    #[test]
    fn test_fixed_point_and_percent() {
        assert_eq!(render(".2f", 1.21513), "1.22");
        assert_eq!(render("f", 2), "2.000000");
        assert_eq!(render(".1%", 0.256), "25.6%");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(render(",", 1234567), "1,234,567");
        assert_eq!(render("_d", -1000), "-1_000");
        assert_eq!(render(",.2f", 1234.5), "1,234.50");
    }

    #[test]
    fn test_radix_with_alternate_form() {
        assert_eq!(render("x", 255), "ff");
        assert_eq!(render("#X", 255), "0XFF");
        assert_eq!(render("#b", 5), "0b101");
        assert_eq!(render("o", 8), "10");
    }

    #[test]
    fn test_exponent() {
        assert_eq!(render(".2e", 1500.0), "1.50e+03");
        assert_eq!(render("E", 0.00012), "1.200000E-04");
    }

    #[test]
    fn test_string_precision_truncates() {
        assert_eq!(render(".3", "abcdef"), "abc");
        assert_eq!(render("s", "abc"), "abc");
    }

    #[test]
    fn test_incompatible_type_is_rejected() {
        let spec = FormatSpec::parse("d").unwrap();
        assert!(spec.apply(&Value::from("abc")).is_err());
        let spec = FormatSpec::parse("+").unwrap();
        assert!(spec.apply(&Value::from("abc")).is_err());
        let spec = FormatSpec::parse(".2").unwrap();
        assert!(spec.apply(&Value::from(3)).is_err());
    }

    #[test]
    fn test_malformed_specs() {
        assert!(FormatSpec::parse("z").is_err());
        assert!(FormatSpec::parse(".f").is_err());
        assert!(FormatSpec::parse("5x5").is_err());
    }
}
