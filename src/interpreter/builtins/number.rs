//! Number constructor and Number.prototype methods

use super::{arg, this_ordinary};
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::object::{ExoticObject, ObjectRef, Ordinary, Property};
use crate::value::{CheapClone, JsValue, number_to_radix_string, number_to_string, to_integer};

pub(crate) fn install(evaluator: &mut Evaluator) {
    let proto = evaluator.protos.number.cheap_clone();
    let ctor = evaluator.register_constructor("Number", number_call, number_construct, 1, &proto);

    let constants = [
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("NaN", f64::NAN),
        ("POSITIVE_INFINITY", f64::INFINITY),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
    ];
    for (name, value) in constants {
        let key = evaluator.key(name);
        ctor.define_property(
            key,
            Property::with_attributes(JsValue::Number(value), false, false, false),
        );
    }

    evaluator.register_method(&proto, "toString", number_to_string_method, 1);
    evaluator.register_method(&proto, "toLocaleString", number_to_string_method, 0);
    evaluator.register_method(&proto, "valueOf", number_value_of, 0);
}

/// `Number(value)`
pub fn number_call(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    match args.first() {
        Some(value) => Ok(JsValue::Number(evaluator.to_number(value)?)),
        None => Ok(JsValue::Number(0.0)),
    }
}

/// `new Number(value)`
pub fn number_construct(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = match args.first() {
        Some(value) => evaluator.to_number(value)?,
        None => 0.0,
    };
    let wrapper: ObjectRef = Ordinary::new(
        Some(evaluator.protos.number.cheap_clone() as ObjectRef),
        ExoticObject::Number(value),
    );
    Ok(JsValue::Object(wrapper))
}

fn this_number(this: &JsValue, method: &str) -> Result<f64, JsError> {
    if let JsValue::Number(n) = this {
        return Ok(*n);
    }
    let wrapper = this_ordinary(this, method, |exotic| matches!(exotic, ExoticObject::Number(_)))?;
    match wrapper.exotic() {
        ExoticObject::Number(n) => Ok(*n),
        _ => Ok(f64::NAN),
    }
}

/// `toString(radix)`, radix 2 to 36
pub fn number_to_string_method(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let n = this_number(&this, "Number.prototype.toString")?;
    let radix = match arg(args, 0) {
        JsValue::Undefined => 10.0,
        radix => to_integer(evaluator.to_number(&radix)?),
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(JsError::range_error("toString() radix must be between 2 and 36"));
    }
    let text = if radix == 10.0 {
        number_to_string(n)
    } else {
        number_to_radix_string(n, radix as u32)
    };
    Ok(JsValue::from(text))
}

pub fn number_value_of(
    _evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(this_number(&this, "Number.prototype.valueOf")?))
}
