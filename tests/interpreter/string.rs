//! String values, wrappers and String.prototype

use super::{eval, eval_err, s};
use eswalk::{ErrorKind, JsValue};

#[test]
fn test_length_and_indexing() {
    assert_eq!(eval("'hello'.length"), JsValue::Number(5.0));
    assert_eq!(eval("'hello'[1]"), s("e"));
    assert_eq!(eval("'hello'[9]"), JsValue::Undefined);
    assert_eq!(eval("'\u{1F600}'.length"), JsValue::Number(2.0));
}

#[test]
fn test_string_function_and_wrapper() {
    assert_eq!(eval("String(12)"), s("12"));
    assert_eq!(eval("String()"), s(""));
    assert_eq!(eval("String(null) + String(undefined)"), s("nullundefined"));
    assert_eq!(eval("typeof new String('a')"), s("object"));
    assert_eq!(eval("new String('abc').length"), JsValue::Number(3.0));
    assert_eq!(eval("new String('abc') + 'd'"), s("abcd"));
}

#[test]
fn test_wrapper_length_is_read_only() {
    assert_eq!(eval("var w = new String('abc'); w.length = 1; w.length"), JsValue::Number(3.0));
}

#[test]
fn test_from_char_code() {
    assert_eq!(eval("String.fromCharCode(72, 105)"), s("Hi"));
}

#[test]
fn test_char_at_and_char_code_at() {
    assert_eq!(eval("'abc'.charAt(2)"), s("c"));
    assert_eq!(eval("'abc'.charAt(5)"), s(""));
    assert_eq!(eval("'abc'.charCodeAt(0)"), JsValue::Number(97.0));
    assert!(matches!(eval("'abc'.charCodeAt(-1)"), JsValue::Number(n) if n.is_nan()));
}

#[test]
fn test_index_of() {
    assert_eq!(eval("'banana'.indexOf('an')"), JsValue::Number(1.0));
    assert_eq!(eval("'banana'.indexOf('an', 2)"), JsValue::Number(3.0));
    assert_eq!(eval("'banana'.indexOf('x')"), JsValue::Number(-1.0));
    assert_eq!(eval("'banana'.lastIndexOf('an')"), JsValue::Number(3.0));
    assert_eq!(eval("'banana'.lastIndexOf('an', 2)"), JsValue::Number(1.0));
}

#[test]
fn test_substring() {
    assert_eq!(eval("'hello'.substring(1, 3)"), s("el"));
    assert_eq!(eval("'hello'.substring(3, 1)"), s("el"));
    assert_eq!(eval("'hello'.substring(2)"), s("llo"));
    assert_eq!(eval("'hello'.substring(-5, 2)"), s("he"));
}

#[test]
fn test_case_conversion() {
    assert_eq!(eval("'MiXeD'.toLowerCase()"), s("mixed"));
    assert_eq!(eval("'MiXeD'.toUpperCase()"), s("MIXED"));
}

#[test]
fn test_split() {
    assert_eq!(eval("'a,b,c'.split(',').length"), JsValue::Number(3.0));
    assert_eq!(eval("'a,b,c'.split(',')[2]"), s("c"));
    assert_eq!(eval("'abc'.split('').join('-')"), s("a-b-c"));
    assert_eq!(eval("'abc'.split().length"), JsValue::Number(1.0));
    assert_eq!(eval("'a,b,c'.split(',', 2).join()"), s("a,b"));
    assert_eq!(eval("',a,'.split(',').length"), JsValue::Number(3.0));
}

#[test]
fn test_to_string_rejects_other_receivers() {
    assert!(matches!(
        eval_err("String.prototype.toString.call({})").kind(),
        ErrorKind::Type(_)
    ));
}

#[test]
fn test_generic_string_methods() {
    assert_eq!(eval("String.prototype.charAt.call(12345, 1)"), s("2"));
}
