//! Object literals, property access and Object.prototype

use super::{eval, s};
use eswalk::JsValue;

#[test]
fn test_object_literal_and_access() {
    assert_eq!(eval("var o = {a: 1, 'b c': 2, 3: 'three'}; o.a + o['b c']"), JsValue::Number(3.0));
    assert_eq!(eval("var o = {1: 'one'}; o[1]"), s("one"));
    assert_eq!(eval("var o = {nested: {deep: 'x'}}; o.nested.deep"), s("x"));
}

#[test]
fn test_missing_property_is_undefined() {
    assert_eq!(eval("var o = {}; o.missing"), JsValue::Undefined);
    assert_eq!(eval("var o = {}; typeof o.missing"), s("undefined"));
}

#[test]
fn test_computed_property_names() {
    assert_eq!(eval("var o = {}; o['a' + 1] = 2; o.a1"), JsValue::Number(2.0));
    assert_eq!(eval("var o = {}; o[1.5] = 'x'; o['1.5']"), s("x"));
    assert_eq!(eval("var o = {}; var k = {toString: function() { return 'key'; }}; o[k] = 1; o.key"), JsValue::Number(1.0));
}

#[test]
fn test_reading_property_of_null_is_type_error() {
    assert_eq!(
        eval("try { var n = null; n.x; } catch (e) { e.name; }"),
        s("TypeError")
    );
}

#[test]
fn test_prototype_chain_lookup() {
    assert_eq!(
        eval(
            "function Base() {} Base.prototype.greet = function() { return 'base'; };
             function Derived() {} Derived.prototype = new Base();
             var d = new Derived(); d.greet()"
        ),
        s("base")
    );
}

#[test]
fn test_own_property_shadows_prototype() {
    assert_eq!(
        eval("function F() {} F.prototype.v = 'proto'; var f = new F(); f.v = 'own'; f.v + ':' + new F().v"),
        s("own:proto")
    );
}

#[test]
fn test_object_constructor() {
    assert_eq!(eval("typeof new Object()"), s("object"));
    assert_eq!(eval("typeof Object(1)"), s("object"));
    assert_eq!(eval("var o = {}; Object(o) === o"), JsValue::Boolean(true));
}

#[test]
fn test_object_to_string() {
    assert_eq!(eval("({}).toString()"), s("[object Object]"));
    assert_eq!(eval("Object.prototype.toString.call([])"), s("[object Array]"));
    assert_eq!(eval("Object.prototype.toString.call(function() {})"), s("[object Function]"));
    assert_eq!(eval("Object.prototype.toString.call('x')"), s("[object String]"));
}

#[test]
fn test_has_own_property() {
    assert_eq!(
        eval("var o = {a: 1}; o.hasOwnProperty('a') && !o.hasOwnProperty('toString')"),
        JsValue::Boolean(true)
    );
    assert_eq!(eval("[1].hasOwnProperty(0)"), JsValue::Boolean(true));
    assert_eq!(eval("'abc'.hasOwnProperty('length')"), JsValue::Boolean(true));
}

#[test]
fn test_property_is_enumerable() {
    assert_eq!(eval("[1].propertyIsEnumerable(0)"), JsValue::Boolean(true));
    assert_eq!(eval("[].propertyIsEnumerable('length')"), JsValue::Boolean(false));
    assert_eq!(eval("({}).propertyIsEnumerable('toString')"), JsValue::Boolean(false));
}

#[test]
fn test_is_prototype_of() {
    assert_eq!(
        eval("function A() {} var a = new A(); A.prototype.isPrototypeOf(a)"),
        JsValue::Boolean(true)
    );
    assert_eq!(eval("Object.prototype.isPrototypeOf([])"), JsValue::Boolean(true));
    assert_eq!(eval("Array.prototype.isPrototypeOf({})"), JsValue::Boolean(false));
    assert_eq!(eval("Object.prototype.isPrototypeOf(1)"), JsValue::Boolean(false));
}

#[test]
fn test_value_of_drives_numeric_conversion() {
    assert_eq!(eval("var o = { valueOf: function() { return 10; } }; o * 2"), JsValue::Number(20.0));
    assert_eq!(eval("var o = { valueOf: function() { return 10; } }; o > 9"), JsValue::Boolean(true));
}

#[test]
fn test_addition_converts_objects_through_to_string_first() {
    assert_eq!(
        eval("var o = { valueOf: function() { return 10; } }; o + 1"),
        s("[object Object]1")
    );
    assert_eq!(
        eval("var o = { toString: function() { return 'S'; } }; 'x' + o"),
        s("xS")
    );
}

#[test]
fn test_to_primitive_failure_is_type_error() {
    assert_eq!(
        eval(
            "var o = { toString: function() { return {}; }, valueOf: function() { return {}; } };
             try { o + 1; } catch (e) { e instanceof TypeError; }"
        ),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_builtin_prototype_extension() {
    assert_eq!(
        eval("Object.prototype.extra = function() { return 'ext'; }; var o = {}; o.extra()"),
        s("ext")
    );
    assert_eq!(
        eval("String.prototype.shout = function() { return this.toUpperCase() + '!'; }; 'hi'.shout()"),
        s("HI!")
    );
}
