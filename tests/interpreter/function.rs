//! Function declarations, calls, `this`, `arguments` and constructors

use super::{eval, eval_err, s};
use eswalk::{ErrorKind, Evaluator, EvaluatorOptions, JsValue};

#[test]
fn test_function_declaration_and_call() {
    assert_eq!(eval("function add(a, b) { return a + b; } add(2, 3)"), JsValue::Number(5.0));
}

#[test]
fn test_function_without_return_yields_undefined() {
    assert_eq!(eval("function f() { 1; } f()"), JsValue::Undefined);
    assert_eq!(eval("function f() { return; } f()"), JsValue::Undefined);
}

#[test]
fn test_missing_arguments_are_undefined() {
    assert_eq!(eval("function f(a, b) { return typeof b; } f(1)"), s("undefined"));
}

#[test]
fn test_arguments_object() {
    assert_eq!(eval("function f() { return arguments.length; } f(1, 2, 3)"), JsValue::Number(3.0));
    assert_eq!(eval("function f(a) { return arguments[0] + a; } f(2)"), JsValue::Number(4.0));
    assert_eq!(
        eval("function f() { return arguments.callee === f; } f()"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_arguments_is_a_snapshot() {
    assert_eq!(
        eval("function f(a) { arguments[0] = 9; return a; } f(1)"),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_function_length() {
    assert_eq!(eval("function f(a, b, c) {} f.length"), JsValue::Number(3.0));
    assert_eq!(eval("function f(a) {} f.length = 5; f.length"), JsValue::Number(1.0));
}

#[test]
fn test_plain_call_this_is_global() {
    assert_eq!(
        eval("var self = this; function f() { return this === self; } f()"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_method_call_this_is_receiver() {
    assert_eq!(
        eval("var o = { v: 7, get: function() { return this.v; } }; o.get()"),
        JsValue::Number(7.0)
    );
    assert_eq!(
        eval("var o = { v: 7, get: function() { return this.v; } }; o['get']()"),
        JsValue::Number(7.0)
    );
}

#[test]
fn test_detached_method_this_is_global() {
    assert_eq!(
        eval("var v = 'global'; var o = { v: 'obj', get: function() { return this.v; } }; var g = o.get; g()"),
        s("global")
    );
}

#[test]
fn test_method_called_through_arguments_gets_global_this() {
    assert_eq!(
        eval(
            "var glob = this;
             function f() {
                 arguments.self = function() { return this; };
                 return arguments.self() === glob;
             }
             f()"
        ),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_primitive_this_is_boxed() {
    assert_eq!(
        eval("function f() { return typeof this; } f.call(5)"),
        s("object")
    );
}

#[test]
fn test_call_result_of_call() {
    assert_eq!(
        eval("function make() { return function(x) { return x * 2; }; } make()(21)"),
        JsValue::Number(42.0)
    );
}

#[test]
fn test_recursion() {
    assert_eq!(
        eval("function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); } fact(10)"),
        JsValue::Number(3628800.0)
    );
}

#[test]
fn test_named_function_expression_binds_its_name() {
    assert_eq!(
        eval("var f = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); }; f(5)"),
        JsValue::Number(120.0)
    );
    assert_eq!(eval("var f = function inner() {}; typeof inner"), s("undefined"));
}

#[test]
fn test_function_declarations_in_body_are_hoisted() {
    assert_eq!(
        eval("function f() { return g(); function g() { return 'g'; } } f()"),
        s("g")
    );
}

#[test]
fn test_later_function_declaration_wins() {
    assert_eq!(
        eval("function f() { return 1; } function f() { return 2; } f()"),
        JsValue::Number(2.0)
    );
}

#[test]
fn test_constructor_and_prototype() {
    assert_eq!(
        eval(
            "function P(x) { this.x = x; }
             P.prototype.get = function() { return this.x; };
             var p = new P(4);
             p.get()"
        ),
        JsValue::Number(4.0)
    );
}

#[test]
fn test_prototype_constructor_points_back() {
    assert_eq!(
        eval("function F() {} var f = new F(); f.constructor === F"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_constructor_returning_object_replaces_this() {
    assert_eq!(eval("function F() { this.a = 0; return {a: 1}; } var r = new F(); r.a"), JsValue::Number(1.0));
    assert_eq!(eval("function F() { this.a = 0; return 5; } var r = new F(); r.a"), JsValue::Number(0.0));
}

#[test]
fn test_new_without_arguments() {
    assert_eq!(eval("function F() { this.ok = true; } var f = new F; f.ok"), JsValue::Boolean(true));
}

#[test]
fn test_call_and_apply() {
    assert_eq!(
        eval(
            "function add(a, b) { return this.base + a + b; }
             var o = {base: 10};
             add.call(o, 1, 2) + add.apply(o, [3, 4])"
        ),
        JsValue::Number(30.0)
    );
}

#[test]
fn test_apply_with_arguments_object() {
    assert_eq!(
        eval(
            "function sum(a, b, c) { return a + b + c; }
             function relay() { return sum.apply(null, arguments); }
             relay(1, 2, 3)"
        ),
        JsValue::Number(6.0)
    );
}

#[test]
fn test_function_constructor() {
    assert_eq!(
        eval("var add = new Function('a', 'b', 'return a + b;'); add(2, 3)"),
        JsValue::Number(5.0)
    );
    assert_eq!(eval("Function('return 7')()"), JsValue::Number(7.0));
}

#[test]
fn test_function_constructor_runs_in_global_scope() {
    assert_eq!(
        eval("var v = 'global'; function f() { var v = 'local'; return Function('return v')(); } f()"),
        s("global")
    );
}

#[test]
fn test_calling_non_function_is_type_error() {
    assert!(matches!(eval_err("var x = 1; x()").kind(), ErrorKind::Type(_)));
    assert!(matches!(eval_err("var o = {}; o.missing()").kind(), ErrorKind::Type(_)));
    assert!(matches!(eval_err("undefined.f()").kind(), ErrorKind::Type(_)));
    assert!(matches!(eval_err("new 5").kind(), ErrorKind::Type(_)));
}

#[test]
fn test_calling_unresolved_name_is_reference_error() {
    assert!(matches!(eval_err("nope()").kind(), ErrorKind::Reference(_)));
}

#[test]
fn test_methods_on_primitives() {
    assert_eq!(eval("'abc'.charAt(1)"), s("b"));
    assert_eq!(eval("(5).toString()"), s("5"));
    assert_eq!(eval("true.toString()"), s("true"));
}

#[test]
fn test_recursion_depth_limit_is_range_error() {
    let mut evaluator = Evaluator::with_options(EvaluatorOptions {
        max_call_depth: 40,
        ..EvaluatorOptions::default()
    });
    let err = evaluator.eval("function r() { return r(); } r()").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Range(m) if m.contains("call stack")));

    let caught = evaluator
        .eval("try { r(); } catch (e) { e instanceof RangeError; }")
        .unwrap();
    assert_eq!(caught, JsValue::Boolean(true));
}

#[test]
fn test_depth_is_restored_after_error() {
    let mut evaluator = Evaluator::with_options(EvaluatorOptions {
        max_call_depth: 40,
        ..EvaluatorOptions::default()
    });
    evaluator
        .eval("function down(n) { return n == 0 ? 0 : 1 + down(n - 1); }")
        .unwrap();
    assert!(evaluator.eval("function r() { r(); } r()").is_err());
    assert_eq!(evaluator.eval("down(30)").unwrap(), JsValue::Number(30.0));
}

#[test]
fn test_function_to_string() {
    assert_eq!(
        eval("function named(a) { return a; } typeof named.toString()"),
        s("string")
    );
}

fn assert_range_error_with_defaults(source: &str) {
    let mut evaluator = Evaluator::new();
    let err = evaluator.eval(source).unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::Range(m) if m.contains("call stack")),
        "{:?}: {}",
        source,
        err
    );
}

#[test]
fn test_default_depth_limit_is_reached_before_the_stack_runs_out() {
    assert_range_error_with_defaults(
        "function f(n) { return n == 0 ? 0 : 1 + f(n - 1); } f(1000);",
    );
    assert_range_error_with_defaults(
        "var o = { m: function(n) { return n == 0 ? 0 : 1 + this.m(n - 1); } }; o.m(1000);",
    );
    assert_range_error_with_defaults(
        "function w(n) { with ({ k: n }) { return k == 0 ? 0 : 1 + w(k - 1); } } w(1000);",
    );
    assert_range_error_with_defaults(
        "function g(n) { for (var p in { a: 1 }) { return n == 0 ? 0 : 1 + g(n - 1); } } g(1000);",
    );
    assert_range_error_with_defaults(
        "function c(n) { return n == 0 ? 0 : 1 + c.call(null, n - 1); } c(1000);",
    );
}

#[test]
fn test_recursion_below_the_default_limit_succeeds() {
    let mut evaluator = Evaluator::new();
    let value = evaluator
        .eval("function f(n) { return n == 0 ? 0 : 1 + f(n - 1); } f(250);")
        .unwrap();
    assert_eq!(value, JsValue::Number(250.0));
}

#[test]
fn test_overflow_with_defaults_is_catchable() {
    let mut evaluator = Evaluator::new();
    let value = evaluator
        .eval(
            "function f(n) { return 1 + f(n + 1); }
             var caught;
             try { f(0); } catch (e) { caught = e instanceof RangeError; }
             caught",
        )
        .unwrap();
    assert_eq!(value, JsValue::Boolean(true));
}

#[test]
fn test_cyclic_join_hits_the_depth_limit() {
    assert_range_error_with_defaults("var a = []; a[0] = a; a.join();");
    assert_range_error_with_defaults("var a = [1]; a.push(a); String(a);");
}

#[test]
fn test_refused_call_adds_no_frame() {
    let mut evaluator = Evaluator::with_options(EvaluatorOptions {
        max_call_depth: 3,
        ..EvaluatorOptions::default()
    });
    let err = evaluator.eval("function r() {\n  return r();\n}\nr();").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Range(_)));
    let frames = err.frames();
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|frame| frame.line != 0), "{}", err);
    assert_eq!(frames[0].line, 2);
    assert!(frames[0].source.starts_with("function r in"));
    assert_eq!(frames[3].line, 4);
}
