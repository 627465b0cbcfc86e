//! Object constructor and Object.prototype methods

use super::arg;
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::value::{CheapClone, JsValue, same_object};

pub(crate) fn install(evaluator: &mut Evaluator) {
    let proto = evaluator.protos.object.cheap_clone();
    evaluator.register_constructor("Object", object_constructor, object_constructor, 1, &proto);

    evaluator.register_method(&proto, "toString", object_to_string, 0);
    evaluator.register_method(&proto, "toLocaleString", object_to_string, 0);
    evaluator.register_method(&proto, "valueOf", object_value_of, 0);
    evaluator.register_method(&proto, "hasOwnProperty", object_has_own_property, 1);
    evaluator.register_method(&proto, "propertyIsEnumerable", object_property_is_enumerable, 1);
    evaluator.register_method(&proto, "isPrototypeOf", object_is_prototype_of, 1);
}

/// `Object(value)` / `new Object(value)`
pub fn object_constructor(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = arg(args, 0);
    if value.is_null_or_undefined() {
        return Ok(JsValue::Object(evaluator.new_object()));
    }
    Ok(JsValue::Object(evaluator.to_object(&value)?))
}

pub fn object_to_string(
    evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    Ok(JsValue::from(format!("[object {}]", object.class_name())))
}

pub fn object_value_of(
    evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Object(evaluator.to_object(&this)?))
}

pub fn object_has_own_property(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let key = evaluator.to_property_key(&arg(args, 0))?;
    let own = match object.as_ordinary() {
        Some(ordinary) => ordinary.has_own_property(&key),
        // Host objects only answer the combined question
        None => object.has_property(&key),
    };
    Ok(JsValue::Boolean(own))
}

pub fn object_property_is_enumerable(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let key = evaluator.to_property_key(&arg(args, 0))?;
    let enumerable = match object.as_ordinary() {
        Some(ordinary) => ordinary
            .get_own_property(&key)
            .is_some_and(|prop| prop.enumerable),
        None => object.enumerate().contains(&key),
    };
    Ok(JsValue::Boolean(enumerable))
}

pub fn object_is_prototype_of(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let JsValue::Object(value) = arg(args, 0) else {
        return Ok(JsValue::Boolean(false));
    };
    let object = evaluator.to_object(&this)?;

    let mut current = value.as_ordinary().and_then(|o| o.prototype());
    while let Some(proto) = current {
        if same_object(&proto, &object) {
            return Ok(JsValue::Boolean(true));
        }
        current = proto.as_ordinary().and_then(|o| o.prototype());
    }
    Ok(JsValue::Boolean(false))
}
