//! Error constructors and Error.prototype methods

use std::rc::Rc;

use super::arg;
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::object::{ExoticObject, NativeFn, ObjectRef, Ordinary, Property};
use crate::value::{CheapClone, JsValue};

/// Native error constructors, each inheriting from `Error.prototype`
const NATIVE_ERRORS: [(&str, NativeFn); 5] = [
    ("TypeError", type_error_constructor),
    ("ReferenceError", reference_error_constructor),
    ("RangeError", range_error_constructor),
    ("SyntaxError", syntax_error_constructor),
    ("EvalError", eval_error_constructor),
];

pub(crate) fn install(evaluator: &mut Evaluator) {
    let proto = evaluator.protos.error.cheap_clone();
    evaluator.register_constructor("Error", error_constructor, error_constructor, 1, &proto);
    define_name_and_message(evaluator, &proto, "Error");
    evaluator.register_method(&proto, "toString", error_to_string, 0);

    for (name, ctor) in NATIVE_ERRORS {
        let native_proto = Ordinary::new(Some(proto.cheap_clone() as ObjectRef), ExoticObject::Ordinary);
        evaluator.register_constructor(name, ctor, ctor, 1, &native_proto);
        define_name_and_message(evaluator, &native_proto, name);
        evaluator.protos.native_errors.insert(name, native_proto);
    }
}

fn define_name_and_message(evaluator: &Evaluator, proto: &Rc<Ordinary>, name: &str) {
    proto.define_property(
        evaluator.keys.name.cheap_clone(),
        Property::hidden(JsValue::from(name)),
    );
    proto.define_property(
        evaluator.keys.message.cheap_clone(),
        Property::hidden(JsValue::from("")),
    );
}

/// A new error object of constructor `name` (e.g. `"TypeError"`). Names
/// without a constructor of their own get `Error.prototype`.
pub fn create_error(evaluator: &Evaluator, name: &str, message: &str) -> ObjectRef {
    let proto = evaluator
        .protos
        .native_errors
        .get(name)
        .unwrap_or(&evaluator.protos.error)
        .cheap_clone();
    let error = Ordinary::new(Some(proto as ObjectRef), ExoticObject::Error);
    error.define_property(
        evaluator.keys.message.cheap_clone(),
        Property::hidden(JsValue::from(message)),
    );
    error
}

fn construct_error(evaluator: &mut Evaluator, name: &str, args: &[JsValue]) -> Result<JsValue, JsError> {
    let error = create_error(evaluator, name, "");
    let message = arg(args, 0);
    if !message.is_undefined() {
        let message = evaluator.to_string(&message)?;
        error.put_property(&evaluator.keys.message, JsValue::String(message));
    }
    Ok(JsValue::Object(error))
}

/// `Error(message)`, with or without `new`
pub fn error_constructor(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    construct_error(evaluator, "Error", args)
}

pub fn type_error_constructor(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    construct_error(evaluator, "TypeError", args)
}

pub fn reference_error_constructor(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    construct_error(evaluator, "ReferenceError", args)
}

pub fn range_error_constructor(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    construct_error(evaluator, "RangeError", args)
}

pub fn syntax_error_constructor(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    construct_error(evaluator, "SyntaxError", args)
}

pub fn eval_error_constructor(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    construct_error(evaluator, "EvalError", args)
}

/// `name: message`, or just `name` when the message is empty
pub fn error_to_string(evaluator: &mut Evaluator, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let object = evaluator.to_object(&this)?;
    let name = match object.get_property(&evaluator.keys.name) {
        JsValue::Undefined => "Error".into(),
        name => evaluator.to_string(&name)?,
    };
    let message = match object.get_property(&evaluator.keys.message) {
        JsValue::Undefined => "".into(),
        message => evaluator.to_string(&message)?,
    };
    if message.is_empty() {
        return Ok(JsValue::String(name));
    }
    Ok(JsValue::from(format!("{}: {}", name, message)))
}
