//! Scope chain: closures, `with`, and name resolution

use super::{eval, s};
use eswalk::JsValue;

#[test]
fn test_with_reads_object_properties() {
    assert_eq!(eval("var o = {a: 1, b: 2}; with (o) { a + b; }"), JsValue::Number(3.0));
}

#[test]
fn test_with_assigns_to_object_not_global() {
    assert_eq!(eval("var o = {x: 0}; with (o) { x = 1; } o.x + ':' + typeof x"), s("1:undefined"));
}

#[test]
fn test_with_unresolved_assignment_goes_to_global() {
    assert_eq!(
        eval("var o = {}; with (o) { y = 5; } (o.y === undefined) + ':' + y"),
        s("true:5")
    );
}

#[test]
fn test_with_var_initializer_targets_object() {
    assert_eq!(
        eval("var o = {z: 1}; with (o) { var z = 2; } o.z + ':' + z"),
        s("2:undefined")
    );
}

#[test]
fn test_with_object_shadows_outer_variables() {
    assert_eq!(
        eval("var x = 'global'; var o = {x: 'obj'}; var r; with (o) { r = x; } r + ':' + x"),
        s("obj:global")
    );
}

#[test]
fn test_with_scope_is_removed_after_block() {
    assert_eq!(eval("var o = {v: 1}; with (o) {} typeof v"), s("undefined"));
}

#[test]
fn test_with_scope_is_removed_on_throw() {
    assert_eq!(
        eval("var o = {v: 1}; try { with (o) { throw 'e'; } } catch (e) {} typeof v"),
        s("undefined")
    );
}

#[test]
fn test_with_scope_is_removed_on_break() {
    assert_eq!(
        eval("var o = {v: 1}; while (true) { with (o) { break; } } typeof v"),
        s("undefined")
    );
}

#[test]
fn test_with_sees_properties_added_later() {
    assert_eq!(
        eval("var o = {}; var r; with (o) { o.late = 'seen'; r = late; } r"),
        s("seen")
    );
}

#[test]
fn test_with_on_primitive_boxes_it() {
    assert_eq!(eval("with ('abc') { length; }"), JsValue::Number(3.0));
}

#[test]
fn test_function_found_through_with_gets_global_this() {
    assert_eq!(
        eval(
            "var glob = this;
             var o = { f: function() { return this === glob; } };
             with (o) { f(); }"
        ),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_closure_captures_with_scope() {
    assert_eq!(
        eval("var o = {k: 'ok'}; var g; with (o) { g = function() { return k; }; } g()"),
        s("ok")
    );
}

#[test]
fn test_closure_keeps_counter_alive() {
    assert_eq!(
        eval(
            "function counter() { var c = 0; return function() { return ++c; }; }
             var f = counter(); f(); f(); f()"
        ),
        JsValue::Number(3.0)
    );
}

#[test]
fn test_closures_share_variable_object() {
    assert_eq!(
        eval(
            "var fs = [];
             for (var i = 0; i < 3; i++) { fs.push(function() { return i; }); }
             fs[0]() + fs[2]()"
        ),
        JsValue::Number(6.0)
    );
}

#[test]
fn test_local_variables_shadow_globals() {
    assert_eq!(
        eval("var x = 'g'; function f() { var x = 'l'; return x; } f() + x"),
        s("lg")
    );
}

#[test]
fn test_local_var_is_hoisted_over_global() {
    assert_eq!(
        eval("var x = 'g'; function f() { var r = x; var x = 'l'; return r; } typeof f()"),
        s("undefined")
    );
}

#[test]
fn test_nested_functions_see_outer_locals() {
    assert_eq!(
        eval("function outer() { var a = 1; function inner() { return a + 1; } return inner(); } outer()"),
        JsValue::Number(2.0)
    );
}

#[test]
fn test_this_at_top_level_is_global() {
    assert_eq!(eval("var v = 3; this.v"), JsValue::Number(3.0));
}

#[test]
fn test_inner_function_reads_enclosing_variable_object() {
    assert_eq!(
        eval("function outer() { var x = 1; function inner() { return x; } return inner(); } outer()"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_top_level_function_sees_only_globals_and_its_locals() {
    assert_eq!(
        eval(
            "var x = 'global';
             function reader() { return x; }
             function caller() { var x = 'caller'; return reader(); }
             caller()"
        ),
        s("global")
    );
}

#[test]
fn test_closure_layering_is_fixed_at_creation() {
    assert_eq!(
        eval(
            "function make() { var x = 'made'; return function() { return x; }; }
             function run(f) { var x = 'run'; return f(); }
             run(make())"
        ),
        s("made")
    );
}
