//! Boolean constructor and Boolean.prototype methods

use super::{arg, this_ordinary};
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::object::{ExoticObject, ObjectRef, Ordinary};
use crate::value::{CheapClone, JsValue};

pub(crate) fn install(evaluator: &mut Evaluator) {
    let proto = evaluator.protos.boolean.cheap_clone();
    evaluator.register_constructor("Boolean", boolean_call, boolean_construct, 1, &proto);

    evaluator.register_method(&proto, "toString", boolean_to_string, 0);
    evaluator.register_method(&proto, "valueOf", boolean_value_of, 0);
}

pub fn boolean_call(
    _evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(arg(args, 0).to_boolean()))
}

pub fn boolean_construct(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let wrapper: ObjectRef = Ordinary::new(
        Some(evaluator.protos.boolean.cheap_clone() as ObjectRef),
        ExoticObject::Boolean(arg(args, 0).to_boolean()),
    );
    Ok(JsValue::Object(wrapper))
}

fn this_boolean(this: &JsValue, method: &str) -> Result<bool, JsError> {
    if let JsValue::Boolean(b) = this {
        return Ok(*b);
    }
    let wrapper = this_ordinary(this, method, |exotic| matches!(exotic, ExoticObject::Boolean(_)))?;
    Ok(matches!(wrapper.exotic(), ExoticObject::Boolean(true)))
}

pub fn boolean_to_string(
    _evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let b = this_boolean(&this, "Boolean.prototype.toString")?;
    Ok(JsValue::from(if b { "true" } else { "false" }))
}

pub fn boolean_value_of(
    _evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(this_boolean(&this, "Boolean.prototype.valueOf")?))
}
