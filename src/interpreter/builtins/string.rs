//! String constructor and String.prototype methods
//!
//! Positions and lengths count UTF-16 code units.

use super::{arg, this_ordinary};
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::object::{ExoticObject, ObjectRef, Ordinary};
use crate::value::{CheapClone, JsString, JsValue, to_integer, to_uint32};

pub(crate) fn install(evaluator: &mut Evaluator) {
    let proto = evaluator.protos.string.cheap_clone();
    let ctor = evaluator.register_constructor("String", string_call, string_construct, 1, &proto);
    evaluator.register_method(&ctor, "fromCharCode", string_from_char_code, 1);

    evaluator.register_method(&proto, "toString", string_value_of, 0);
    evaluator.register_method(&proto, "valueOf", string_value_of, 0);
    evaluator.register_method(&proto, "charAt", string_char_at, 1);
    evaluator.register_method(&proto, "charCodeAt", string_char_code_at, 1);
    evaluator.register_method(&proto, "indexOf", string_index_of, 1);
    evaluator.register_method(&proto, "lastIndexOf", string_last_index_of, 1);
    evaluator.register_method(&proto, "substring", string_substring, 2);
    evaluator.register_method(&proto, "toLowerCase", string_to_lower_case, 0);
    evaluator.register_method(&proto, "toUpperCase", string_to_upper_case, 0);
    evaluator.register_method(&proto, "split", string_split, 2);
}

/// `String(value)`
pub fn string_call(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    match args.first() {
        Some(value) => Ok(JsValue::String(evaluator.to_string(value)?)),
        None => Ok(JsValue::from("")),
    }
}

/// `new String(value)`
pub fn string_construct(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = match args.first() {
        Some(value) => evaluator.to_string(value)?,
        None => JsString::from(""),
    };
    let wrapper: ObjectRef = Ordinary::new(
        Some(evaluator.protos.string.cheap_clone() as ObjectRef),
        ExoticObject::String(value),
    );
    Ok(JsValue::Object(wrapper))
}

pub fn string_from_char_code(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let mut units = Vec::with_capacity(args.len());
    for value in args {
        units.push(to_uint32(evaluator.to_number(value)?) as u16);
    }
    Ok(JsValue::String(JsString::from_utf16(&units)))
}

/// `toString`/`valueOf` only accept strings and String wrappers.
pub fn string_value_of(
    _evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    if let JsValue::String(s) = &this {
        return Ok(JsValue::String(s.cheap_clone()));
    }
    let wrapper = this_ordinary(&this, "String.prototype.valueOf", |exotic| {
        matches!(exotic, ExoticObject::String(_))
    })?;
    match wrapper.exotic() {
        ExoticObject::String(s) => Ok(JsValue::String(s.cheap_clone())),
        _ => Ok(JsValue::from("")),
    }
}

/// `this` converted to a string, as the generic methods read it.
fn this_units(evaluator: &mut Evaluator, this: &JsValue) -> Result<Vec<u16>, JsError> {
    Ok(evaluator.to_string(this)?.to_utf16())
}

fn integer_arg(evaluator: &mut Evaluator, args: &[JsValue], index: usize) -> Result<f64, JsError> {
    Ok(to_integer(evaluator.to_number(&arg(args, index))?))
}

pub fn string_char_at(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let units = this_units(evaluator, &this)?;
    let pos = integer_arg(evaluator, args, 0)?;
    let unit = (pos >= 0.0)
        .then(|| units.get(pos as usize))
        .flatten()
        .map(|unit| JsString::from_utf16(&[*unit]))
        .unwrap_or_else(|| JsString::from(""));
    Ok(JsValue::String(unit))
}

pub fn string_char_code_at(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let units = this_units(evaluator, &this)?;
    let pos = integer_arg(evaluator, args, 0)?;
    let code = (pos >= 0.0)
        .then(|| units.get(pos as usize))
        .flatten()
        .map_or(f64::NAN, |unit| f64::from(*unit));
    Ok(JsValue::Number(code))
}

/// Position of `needle` in `haystack` at or after `from`.
fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    (from..=haystack.len().checked_sub(needle.len())?)
        .find(|&i| haystack.get(i..i + needle.len()) == Some(needle))
}

/// Last position of `needle` in `haystack` at or before `from`.
fn rfind_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    let last = haystack.len().checked_sub(needle.len())?;
    (0..=from.min(last))
        .rev()
        .find(|&i| haystack.get(i..i + needle.len()) == Some(needle))
}

pub fn string_index_of(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let units = this_units(evaluator, &this)?;
    let needle = evaluator.to_string(&arg(args, 0))?.to_utf16();
    let from = integer_arg(evaluator, args, 1)?.clamp(0.0, units.len() as f64) as usize;
    Ok(JsValue::Number(
        find_units(&units, &needle, from).map_or(-1.0, |i| i as f64),
    ))
}

pub fn string_last_index_of(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let units = this_units(evaluator, &this)?;
    let needle = evaluator.to_string(&arg(args, 0))?.to_utf16();
    let position = evaluator.to_number(&arg(args, 1))?;
    let from = if position.is_nan() {
        units.len()
    } else {
        to_integer(position).clamp(0.0, units.len() as f64) as usize
    };
    Ok(JsValue::Number(
        rfind_units(&units, &needle, from).map_or(-1.0, |i| i as f64),
    ))
}

pub fn string_substring(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let units = this_units(evaluator, &this)?;
    let length = units.len() as f64;
    let start = integer_arg(evaluator, args, 0)?.clamp(0.0, length) as usize;
    let end = match arg(args, 1) {
        JsValue::Undefined => units.len(),
        end => to_integer(evaluator.to_number(&end)?).clamp(0.0, length) as usize,
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    let slice = units.get(from..to).unwrap_or_default();
    Ok(JsValue::String(JsString::from_utf16(slice)))
}

pub fn string_to_lower_case(
    evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = evaluator.to_string(&this)?;
    Ok(JsValue::from(s.as_str().to_lowercase()))
}

pub fn string_to_upper_case(
    evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = evaluator.to_string(&this)?;
    Ok(JsValue::from(s.as_str().to_uppercase()))
}

/// `split(separator, limit)` with a string separator. An empty separator
/// splits into code units; a missing one yields the whole string.
pub fn string_split(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let units = this_units(evaluator, &this)?;
    let limit = match arg(args, 1) {
        JsValue::Undefined => u32::MAX,
        limit => to_uint32(evaluator.to_number(&limit)?),
    } as usize;

    let parts: Vec<JsValue> = match arg(args, 0) {
        JsValue::Undefined => vec![JsValue::String(JsString::from_utf16(&units))],
        separator => {
            let separator = evaluator.to_string(&separator)?.to_utf16();
            if separator.is_empty() {
                units
                    .iter()
                    .map(|unit| JsValue::String(JsString::from_utf16(&[*unit])))
                    .collect()
            } else {
                let mut parts = Vec::new();
                let mut start = 0;
                while let Some(found) = find_units(&units, &separator, start) {
                    let part = units.get(start..found).unwrap_or_default();
                    parts.push(JsValue::String(JsString::from_utf16(part)));
                    start = found + separator.len();
                }
                let rest = units.get(start..).unwrap_or_default();
                parts.push(JsValue::String(JsString::from_utf16(rest)));
                parts
            }
        }
    };

    let parts = parts.into_iter().take(limit).collect();
    Ok(JsValue::Object(evaluator.new_array(parts)))
}
