//! Built-in objects installed into every evaluator

pub mod array;
pub mod boolean;
pub mod error;
pub mod function;
pub mod global;
pub mod math;
pub mod number;
pub mod object;
pub mod string;

use super::Evaluator;
use crate::error::JsError;
use crate::object::{ExoticObject, JsObject, Ordinary};
use crate::value::{JsValue, PropertyKey, to_uint32};

/// Install every built-in constructor, prototype method and global.
pub(crate) fn install(evaluator: &mut Evaluator) {
    object::install(evaluator);
    function::install(evaluator);
    array::install(evaluator);
    string::install(evaluator);
    number::install(evaluator);
    boolean::install(evaluator);
    error::install(evaluator);
    math::install(evaluator);
    global::install(evaluator);
}

/// The argument at `index`, `undefined` when the caller passed fewer.
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or_default()
}

/// `this` as a built-in object of the expected exotic kind.
pub(crate) fn this_ordinary<'a>(
    this: &'a JsValue,
    method: &str,
    accepts: fn(&ExoticObject) -> bool,
) -> Result<&'a Ordinary, JsError> {
    this.as_object()
        .and_then(|object| object.as_ordinary())
        .filter(|ordinary| accepts(ordinary.exotic()))
        .ok_or_else(|| JsError::type_error(format!("{} called on incompatible receiver", method)))
}

/// ToUint32 of `object.length`, as the generic array methods read it.
pub(crate) fn length_of(evaluator: &mut Evaluator, object: &dyn JsObject) -> Result<u32, JsError> {
    let length = object.get_property(&evaluator.keys.length);
    Ok(to_uint32(evaluator.to_number(&length)?))
}

pub(crate) fn index_key(index: u32) -> PropertyKey {
    PropertyKey::from(index)
}
