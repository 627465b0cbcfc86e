//! Global functions and value properties

use super::arg;
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::object::Property;
use crate::value::{JsValue, to_int32};

pub(crate) fn install(evaluator: &mut Evaluator) {
    let constants = [
        ("NaN", JsValue::Number(f64::NAN)),
        ("Infinity", JsValue::Number(f64::INFINITY)),
        ("undefined", JsValue::Undefined),
    ];
    for (name, value) in constants {
        let key = evaluator.key(name);
        evaluator
            .global_ordinary()
            .define_property(key, Property::with_attributes(value, false, false, false));
    }

    evaluator.define_native("eval", 1, global_eval);
    evaluator.define_native("parseInt", 2, global_parse_int);
    evaluator.define_native("parseFloat", 1, global_parse_float);
    evaluator.define_native("isNaN", 1, global_is_nan);
    evaluator.define_native("isFinite", 1, global_is_finite);
}

/// `eval(x)`: strings run as code in the caller's scope, anything else is
/// returned unchanged.
pub fn global_eval(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    match arg(args, 0) {
        JsValue::String(source) => evaluator.eval_code(source.as_str()),
        other => Ok(other),
    }
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

pub fn global_parse_int(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let input = evaluator.to_string(&arg(args, 0))?;
    let radix = to_int32(evaluator.to_number(&arg(args, 1))?);
    Ok(JsValue::Number(parse_int(input.as_str(), radix)))
}

/// The digits of `text` in `radix` (0 picks 10, or 16 for a `0x` prefix),
/// up to the first character that is not one.
fn parse_int(text: &str, radix: i32) -> f64 {
    let text = text.trim_start_matches(is_space);
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let hex_prefixed = text.starts_with("0x") || text.starts_with("0X");
    let (radix, text) = match radix {
        0 if hex_prefixed => (16, text.get(2..).unwrap_or_default()),
        0 => (10, text),
        16 if hex_prefixed => (16, text.get(2..).unwrap_or_default()),
        2..=36 => (radix as u32, text),
        _ => return f64::NAN,
    };

    let mut value = 0.0_f64;
    let mut digits = 0;
    for c in text.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        value = value * f64::from(radix) + f64::from(digit);
        digits += 1;
    }
    if digits == 0 {
        return f64::NAN;
    }
    if negative { -value } else { value }
}

pub fn global_parse_float(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let input = evaluator.to_string(&arg(args, 0))?;
    Ok(JsValue::Number(parse_float(input.as_str())))
}

/// The longest prefix of `text` (after leading white space) that reads as
/// a decimal literal.
fn parse_float(text: &str) -> f64 {
    let text = text.trim_start_matches(is_space);
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text.get(end..).is_some_and(|rest| rest.starts_with("Infinity")) {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let count_digits = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let integer_digits = count_digits(end);
    end += integer_digits;
    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(end + 1);
        if integer_digits + fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }
    if integer_digits + fraction_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exponent_digits = count_digits(exp_end);
        if exponent_digits > 0 {
            end = exp_end + exponent_digits;
        }
    }

    text.get(..end)
        .and_then(|literal| literal.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

pub fn global_is_nan(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(evaluator.to_number(&arg(args, 0))?.is_nan()))
}

pub fn global_is_finite(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(evaluator.to_number(&arg(args, 0))?.is_finite()))
}
