//! Scalar typing: the implicit resolution table for plain scalars and the
//! explicit `!!bool`/`!!int`/`!!float`/`!!null` grammars.

use alloc::string::String;

use crate::{CoreTag, ScalarValue, TagType, ValueType};

/// Type a plain (unquoted, untagged) scalar.
pub fn resolve_plain_scalar(text: &str) -> (ScalarValue, ValueType) {
    if is_null(text) {
        (ScalarValue::Null, ValueType::Null)
    } else if let Some(value) = parse_bool(text) {
        (ScalarValue::Bool(value), ValueType::Bool)
    } else if let Some(value) = parse_int(text) {
        (ScalarValue::Int(value), ValueType::Int)
    } else if let Some(value) = parse_float(text) {
        (ScalarValue::Float(value), ValueType::Float)
    } else {
        (ScalarValue::String(String::from(text)), ValueType::String)
    }
}

/// Type a scalar carrying an explicit tag.
///
/// Returns `None` when `text` does not match the grammar the tag demands.
/// Tags outside the core schema keep the text as a string and travel on
/// [`ValueType::Tagged`].
pub fn resolve_tagged_scalar(tag: &TagType, text: &str) -> Option<(ScalarValue, ValueType)> {
    let resolved = match tag {
        TagType::NonSpecific | TagType::Core(CoreTag::Str) => {
            (ScalarValue::String(String::from(text)), ValueType::String)
        }
        TagType::Core(CoreTag::Null) => {
            if !is_null(text) {
                return None;
            }
            (ScalarValue::Null, ValueType::Null)
        }
        TagType::Core(CoreTag::Bool) => (ScalarValue::Bool(parse_bool(text)?), ValueType::Bool),
        TagType::Core(CoreTag::Int) => (ScalarValue::Int(parse_int(text)?), ValueType::Int),
        TagType::Core(CoreTag::Float) => {
            let value = match parse_float(text) {
                Some(value) => value,
                None => parse_int(text)? as f64,
            };
            (ScalarValue::Float(value), ValueType::Float)
        }
        other => (
            ScalarValue::String(String::from(text)),
            ValueType::Tagged(other.clone()),
        ),
    };
    Some(resolved)
}

fn is_null(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Some(true),
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => Some(false),
        _ => None,
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

/// Digits in `radix`, allowing `_` separators but requiring one digit.
fn digits(text: &str, radix: u32) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '_' => {}
            _ if ch.is_digit(radix) => out.push(ch),
            _ => return None,
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, body) = split_sign(text);
    let magnitude = if let Some(rest) = body.strip_prefix("0b") {
        i64::from_str_radix(&digits(rest, 2)?, 2).ok()?
    } else if let Some(rest) = body.strip_prefix("0o") {
        i64::from_str_radix(&digits(rest, 8)?, 8).ok()?
    } else if let Some(rest) = body.strip_prefix("0x") {
        i64::from_str_radix(&digits(rest, 16)?, 16).ok()?
    } else if body.contains(':') {
        sexagesimal_int(body)?
    } else {
        if !body.starts_with(|ch: char| ch.is_ascii_digit()) {
            return None;
        }
        digits(body, 10)?.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// `h:mm:ss` style base 60 integers, e.g. `190:20:30`.
fn sexagesimal_int(body: &str) -> Option<i64> {
    let mut parts = body.split(':');
    let head = parts.next()?;
    if !head.starts_with(|ch: char| ('1'..='9').contains(&ch)) {
        return None;
    }
    let mut value = digits(head, 10)?.parse::<i64>().ok()?;
    for part in parts {
        value = value.checked_mul(60)?.checked_add(sexagesimal_digit(part)?)?;
    }
    Some(value)
}

fn sexagesimal_digit(part: &str) -> Option<i64> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = part.parse::<i64>().ok()?;
    (value < 60).then_some(value)
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }
    let (negative, body) = split_sign(text);
    let magnitude = if body.contains(':') {
        sexagesimal_float(body)?
    } else {
        decimal_float(body)?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// `[0-9][0-9_]*` with an optional fraction and exponent; at least one of
/// the two must be present so that plain integers stay integers.
fn decimal_float(body: &str) -> Option<f64> {
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    if fraction.is_none() && exponent.is_none() {
        return None;
    }
    let mut normalized = String::new();
    if !whole.is_empty() {
        if !whole.starts_with(|ch: char| ch.is_ascii_digit()) {
            return None;
        }
        normalized.push_str(&digits(whole, 10)?);
    }
    if let Some(fraction) = fraction {
        normalized.push('.');
        if !fraction.is_empty() {
            normalized.push_str(&digits(fraction, 10)?);
        }
    }
    if !normalized.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(exponent) = exponent {
        let (exp_negative, exp_digits) = split_sign(exponent);
        if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        normalized.push('e');
        if exp_negative {
            normalized.push('-');
        }
        normalized.push_str(exp_digits);
    }
    normalized.parse::<f64>().ok()
}

/// `190:20:30.15`
fn sexagesimal_float(body: &str) -> Option<f64> {
    let (base, fraction) = body.rsplit_once('.')?;
    let whole = sexagesimal_int(base)? as f64;
    let fraction = if fraction.is_empty() {
        0.0
    } else {
        format!("0.{}", digits(fraction, 10)?).parse::<f64>().ok()?
    };
    Some(whole + fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> ScalarValue {
        resolve_plain_scalar(text).0
    }

    #[test]
    fn implicit_typing() {
        assert_eq!(plain("42"), ScalarValue::Int(42));
        assert_eq!(plain("true"), ScalarValue::Bool(true));
        assert_eq!(plain("Off"), ScalarValue::Bool(false));
        assert_eq!(plain("~"), ScalarValue::Null);
        assert_eq!(plain("null"), ScalarValue::Null);
        assert_eq!(plain("3.14"), ScalarValue::Float(3.14));
        assert_eq!(plain("hello"), ScalarValue::String("hello".into()));
    }

    #[test]
    fn integer_bases() {
        assert_eq!(plain("0b1010"), ScalarValue::Int(10));
        assert_eq!(plain("0o17"), ScalarValue::Int(15));
        assert_eq!(plain("0xFF"), ScalarValue::Int(255));
        assert_eq!(plain("-0x10"), ScalarValue::Int(-16));
        assert_eq!(plain("1_000_000"), ScalarValue::Int(1_000_000));
        assert_eq!(plain("190:20:30"), ScalarValue::Int(685_230));
        assert_eq!(plain("0x"), ScalarValue::String("0x".into()));
        assert_eq!(plain("12:75"), ScalarValue::String("12:75".into()));
    }

    #[test]
    fn floats() {
        assert_eq!(plain("1_000.5"), ScalarValue::Float(1000.5));
        assert_eq!(plain("-.5"), ScalarValue::Float(-0.5));
        assert_eq!(plain("6.8523015e+5"), ScalarValue::Float(685_230.15));
        assert_eq!(plain("1e3"), ScalarValue::Float(1000.0));
        assert_eq!(plain("190:20:30.15"), ScalarValue::Float(685_230.15));
        assert_eq!(plain(".inf"), ScalarValue::Float(f64::INFINITY));
        assert_eq!(plain("-.Inf"), ScalarValue::Float(f64::NEG_INFINITY));
        assert!(matches!(plain(".nan"), ScalarValue::Float(value) if value.is_nan()));
        assert_eq!(plain("."), ScalarValue::String(".".into()));
        assert_eq!(plain("1.2.3"), ScalarValue::String("1.2.3".into()));
    }

    #[test]
    fn explicit_tags_force_interpretation() {
        let str_tag = TagType::Core(CoreTag::Str);
        assert_eq!(
            resolve_tagged_scalar(&str_tag, "42"),
            Some((ScalarValue::String("42".into()), ValueType::String))
        );
        let float_tag = TagType::Core(CoreTag::Float);
        assert_eq!(
            resolve_tagged_scalar(&float_tag, "1"),
            Some((ScalarValue::Float(1.0), ValueType::Float))
        );
        assert_eq!(resolve_tagged_scalar(&TagType::Core(CoreTag::Int), "4.5"), None);
        assert_eq!(resolve_tagged_scalar(&TagType::Core(CoreTag::Bool), "maybe"), None);
        assert_eq!(resolve_tagged_scalar(&TagType::Core(CoreTag::Null), "0"), None);
    }

    #[test]
    fn custom_tags_pass_text_through() {
        let tag = TagType::Resolved("Point".into());
        assert_eq!(
            resolve_tagged_scalar(&tag, "1,2"),
            Some((ScalarValue::String("1,2".into()), ValueType::Tagged(tag.clone())))
        );
    }
}
