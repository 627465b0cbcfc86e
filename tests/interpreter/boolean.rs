//! Boolean values and wrappers

use super::{eval, s};
use eswalk::JsValue;

#[test]
fn test_boolean_function() {
    assert_eq!(eval("Boolean(1)"), JsValue::Boolean(true));
    assert_eq!(eval("Boolean('')"), JsValue::Boolean(false));
    assert_eq!(eval("Boolean(NaN)"), JsValue::Boolean(false));
    assert_eq!(eval("Boolean({})"), JsValue::Boolean(true));
    assert_eq!(eval("Boolean()"), JsValue::Boolean(false));
}

#[test]
fn test_boolean_wrapper_is_truthy() {
    assert_eq!(eval("var b = new Boolean(false); b ? 'yes' : 'no'"), s("yes"));
    assert_eq!(eval("new Boolean(false).valueOf()"), JsValue::Boolean(false));
    assert_eq!(eval("typeof new Boolean(true)"), s("object"));
}

#[test]
fn test_boolean_to_string() {
    assert_eq!(eval("true.toString()"), s("true"));
    assert_eq!(eval("new Boolean(false).toString()"), s("false"));
    assert_eq!(eval("false + ''"), s("false"));
}
