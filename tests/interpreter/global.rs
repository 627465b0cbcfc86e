//! Global functions and value properties

use super::{eval, s};
use eswalk::JsValue;

#[test]
fn test_global_constants() {
    assert!(matches!(eval("NaN"), JsValue::Number(n) if n.is_nan()));
    assert_eq!(eval("Infinity"), JsValue::Number(f64::INFINITY));
    assert_eq!(eval("typeof undefined"), s("undefined"));
}

#[test]
fn test_global_constants_are_read_only_and_permanent() {
    assert_eq!(eval("undefined = 1; typeof undefined"), s("undefined"));
    assert_eq!(eval("delete NaN"), JsValue::Boolean(false));
    assert_eq!(eval("var n = 0; for (var k in this) { if (k == 'NaN') n++; } n"), JsValue::Number(0.0));
}

#[test]
fn test_parse_int() {
    assert_eq!(eval("parseInt('42px')"), JsValue::Number(42.0));
    assert_eq!(eval("parseInt('0x1A')"), JsValue::Number(26.0));
    assert_eq!(eval("parseInt('ff', 16)"), JsValue::Number(255.0));
    assert_eq!(eval("parseInt('  -12')"), JsValue::Number(-12.0));
    assert!(matches!(eval("parseInt('px')"), JsValue::Number(n) if n.is_nan()));
}

#[test]
fn test_parse_float() {
    assert_eq!(eval("parseFloat('3.14abc')"), JsValue::Number(3.14));
    assert_eq!(eval("parseFloat('1e2')"), JsValue::Number(100.0));
    assert!(matches!(eval("parseFloat('x1')"), JsValue::Number(n) if n.is_nan()));
}

#[test]
fn test_is_nan_and_is_finite() {
    assert_eq!(eval("isNaN('abc')"), JsValue::Boolean(true));
    assert_eq!(eval("isNaN('12')"), JsValue::Boolean(false));
    assert_eq!(eval("isFinite(1 / 0)"), JsValue::Boolean(false));
    assert_eq!(eval("isFinite('5')"), JsValue::Boolean(true));
}

#[test]
fn test_global_object_holds_declarations() {
    assert_eq!(eval("var g = 1; this.g"), JsValue::Number(1.0));
    assert_eq!(eval("function h() {} typeof this.h"), s("function"));
    assert_eq!(eval("var n = 0; for (var k in this) { if (k == 'Math') n++; } n"), JsValue::Number(0.0));
}
