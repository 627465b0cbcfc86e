//! Array constructor and Array.prototype methods
//!
//! The prototype methods are generic: they read `length` and indices from
//! whatever object `this` is.

use super::{arg, index_key, length_of};
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::object::JsObject;
use crate::value::{CheapClone, JsValue, to_integer, to_uint32};

pub(crate) fn install(evaluator: &mut Evaluator) {
    let proto = evaluator.protos.array.cheap_clone();
    evaluator.register_constructor("Array", array_constructor, array_constructor, 1, &proto);

    evaluator.register_method(&proto, "toString", array_to_string, 0);
    evaluator.register_method(&proto, "join", array_join, 1);
    evaluator.register_method(&proto, "push", array_push, 1);
    evaluator.register_method(&proto, "pop", array_pop, 0);
    evaluator.register_method(&proto, "reverse", array_reverse, 0);
    evaluator.register_method(&proto, "slice", array_slice, 2);
    evaluator.register_method(&proto, "concat", array_concat, 1);
}

/// `Array(len)` or `Array(e0, e1, ...)`, with or without `new`
pub fn array_constructor(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    if let [JsValue::Number(n)] = args {
        let length = to_uint32(*n);
        if length as f64 != *n {
            return Err(JsError::range_error("Invalid array length"));
        }
        let array = evaluator.new_array(Vec::new());
        array.put_property(&evaluator.keys.length, JsValue::from(length));
        return Ok(JsValue::Object(array));
    }
    Ok(JsValue::Object(evaluator.new_array(args.to_vec())))
}

pub fn array_to_string(
    evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    array_join(evaluator, this, &[])
}

pub fn array_join(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let length = length_of(evaluator, &*object)?;
    let separator = match arg(args, 0) {
        JsValue::Undefined => ",".to_string(),
        sep => evaluator.to_string(&sep)?.to_string(),
    };

    let mut result = String::new();
    for i in 0..length {
        if i > 0 {
            result.push_str(&separator);
        }
        let element = object.get_property(&index_key(i));
        if !element.is_null_or_undefined() {
            result.push_str(evaluator.to_string(&element)?.as_str());
        }
    }
    Ok(JsValue::from(result))
}

pub fn array_push(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let mut length = length_of(evaluator, &*object)?;
    for value in args {
        object.put_property(&index_key(length), value.cheap_clone());
        length = length.wrapping_add(1);
    }
    let length = JsValue::from(length);
    object.put_property(&evaluator.keys.length, length.cheap_clone());
    Ok(length)
}

pub fn array_pop(
    evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let length = length_of(evaluator, &*object)?;
    if length == 0 {
        object.put_property(&evaluator.keys.length, JsValue::from(0));
        return Ok(JsValue::Undefined);
    }
    let key = index_key(length - 1);
    let value = object.get_property(&key);
    object.delete_property(&key);
    object.put_property(&evaluator.keys.length, JsValue::from(length - 1));
    Ok(value)
}

pub fn array_reverse(
    evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let length = length_of(evaluator, &*object)?;
    let (mut lower, mut upper) = (0, length);
    while lower + 1 < upper {
        upper -= 1;
        let (lower_key, upper_key) = (index_key(lower), index_key(upper));
        let lower_present = object.has_property(&lower_key);
        let upper_present = object.has_property(&upper_key);
        let lower_value = object.get_property(&lower_key);
        let upper_value = object.get_property(&upper_key);

        if upper_present {
            object.put_property(&lower_key, upper_value);
        } else {
            object.delete_property(&lower_key);
        }
        if lower_present {
            object.put_property(&upper_key, lower_value);
        } else {
            object.delete_property(&upper_key);
        }
        lower += 1;
    }
    Ok(JsValue::Object(object))
}

/// Resolve a relative `slice` bound against `length`.
fn relative_index(value: f64, length: u32) -> u32 {
    let length = f64::from(length);
    let index = if value < 0.0 {
        (length + value).max(0.0)
    } else {
        value.min(length)
    };
    index as u32
}

pub fn array_slice(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let length = length_of(evaluator, &*object)?;
    let start = to_integer(evaluator.to_number(&arg(args, 0))?);
    let end = match arg(args, 1) {
        JsValue::Undefined => f64::from(length),
        end => to_integer(evaluator.to_number(&end)?),
    };
    let (start, end) = (relative_index(start, length), relative_index(end, length));

    let result = evaluator.new_array(Vec::new());
    for (n, i) in (start..end.max(start)).enumerate() {
        let key = index_key(i);
        if object.has_property(&key) {
            result.put_property(&index_key(n as u32), object.get_property(&key));
        }
    }
    result.put_property(&evaluator.keys.length, JsValue::from(end.saturating_sub(start)));
    Ok(JsValue::Object(result))
}

pub fn array_concat(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let result = evaluator.new_array(Vec::new());
    let mut n: u32 = 0;

    let first = JsValue::Object(evaluator.to_object(&this)?);
    for item in std::iter::once(&first).chain(args) {
        let spread = item
            .as_object()
            .filter(|object| object.class_name() == "Array")
            .map(|object| object.cheap_clone());
        match spread {
            Some(array) => {
                let length = length_of(evaluator, &*array)?;
                for i in 0..length {
                    let key = index_key(i);
                    if array.has_property(&key) {
                        result.put_property(&index_key(n), array.get_property(&key));
                    }
                    n = n.wrapping_add(1);
                }
            }
            None => {
                result.put_property(&index_key(n), item.cheap_clone());
                n = n.wrapping_add(1);
            }
        }
    }
    result.put_property(&evaluator.keys.length, JsValue::from(n));
    Ok(JsValue::Object(result))
}
