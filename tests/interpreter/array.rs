//! Array literals and Array.prototype

use super::{eval, eval_err, s};
use eswalk::{ErrorKind, JsValue};

#[test]
fn test_array_literal() {
    assert_eq!(eval("[1, 2, 3].length"), JsValue::Number(3.0));
    assert_eq!(eval("[1, 2, 3][1]"), JsValue::Number(2.0));
    assert_eq!(eval("[].length"), JsValue::Number(0.0));
}

#[test]
fn test_array_literal_holes() {
    assert_eq!(eval("[1, , 3].length"), JsValue::Number(3.0));
    assert_eq!(eval("[1, , 3][1]"), JsValue::Undefined);
    assert_eq!(eval("[1, ,].length"), JsValue::Number(2.0));
    assert_eq!(eval("1 in [1, , 3]"), JsValue::Boolean(false));
}

#[test]
fn test_length_tracks_writes() {
    assert_eq!(eval("var a = []; a[5] = 'x'; a.length"), JsValue::Number(6.0));
    assert_eq!(eval("var a = [1, 2, 3]; a.length = 1; a.join()"), s("1"));
    assert_eq!(eval("var a = [1, 2, 3]; a.length = 1; a[2]"), JsValue::Undefined);
}

#[test]
fn test_array_constructor() {
    assert_eq!(eval("new Array(3).length"), JsValue::Number(3.0));
    assert_eq!(eval("Array(1, 2).length"), JsValue::Number(2.0));
    assert_eq!(eval("new Array('3').length"), JsValue::Number(1.0));
    assert_eq!(eval("new Array().length"), JsValue::Number(0.0));
    assert!(matches!(eval_err("new Array(-1)").kind(), ErrorKind::Range(_)));
    assert!(matches!(eval_err("new Array(1.5)").kind(), ErrorKind::Range(_)));
}

#[test]
fn test_join_and_to_string() {
    assert_eq!(eval("[1, 2, 3].join('-')"), s("1-2-3"));
    assert_eq!(eval("[1, null, undefined, 4].join()"), s("1,,,4"));
    assert_eq!(eval("[1, [2, 3]].toString()"), s("1,2,3"));
    assert_eq!(eval("String([])"), s(""));
}

#[test]
fn test_push_and_pop() {
    assert_eq!(eval("var a = [1]; a.push(2, 3)"), JsValue::Number(3.0));
    assert_eq!(eval("var a = [1]; a.push(2, 3); a.join()"), s("1,2,3"));
    assert_eq!(eval("var a = [1, 2]; a.pop() + ':' + a.length"), s("2:1"));
    assert_eq!(eval("[].pop()"), JsValue::Undefined);
}

#[test]
fn test_reverse() {
    assert_eq!(eval("[1, 2, 3].reverse().join()"), s("3,2,1"));
    assert_eq!(eval("var a = [1, 2]; a.reverse() === a"), JsValue::Boolean(true));
}

#[test]
fn test_slice() {
    assert_eq!(eval("[1, 2, 3, 4].slice(1, 3).join()"), s("2,3"));
    assert_eq!(eval("[1, 2, 3, 4].slice(-2).join()"), s("3,4"));
    assert_eq!(eval("[1, 2, 3].slice(2, 1).length"), JsValue::Number(0.0));
    assert_eq!(eval("[1, 2, 3].slice().join()"), s("1,2,3"));
}

#[test]
fn test_concat() {
    assert_eq!(eval("[1].concat([2, 3], 4).join()"), s("1,2,3,4"));
    assert_eq!(eval("[1].concat([[2]]).length"), JsValue::Number(2.0));
}

#[test]
fn test_generic_methods_on_array_like() {
    assert_eq!(
        eval("var o = {length: 2, 0: 'a', 1: 'b'}; Array.prototype.join.call(o, '+')"),
        s("a+b")
    );
    assert_eq!(
        eval("function f() { return Array.prototype.slice.call(arguments, 1).join(); } f(1, 2, 3)"),
        s("2,3")
    );
    assert_eq!(
        eval("var o = {length: 0}; Array.prototype.push.call(o, 'x'); o.length + o[0]"),
        s("1x")
    );
}
