//! Program results, literals and variables

use super::{eval, s};
use eswalk::JsValue;

#[test]
fn test_number_literals() {
    assert_eq!(eval("42"), JsValue::Number(42.0));
    assert_eq!(eval("3.5"), JsValue::Number(3.5));
    assert_eq!(eval("0x1F"), JsValue::Number(31.0));
    assert_eq!(eval("1e3"), JsValue::Number(1000.0));
    assert_eq!(eval(".5"), JsValue::Number(0.5));
}

#[test]
fn test_string_literals() {
    assert_eq!(eval("'single'"), s("single"));
    assert_eq!(eval("\"double\""), s("double"));
    assert_eq!(eval(r#""tab\there""#), s("tab\there"));
    assert_eq!(eval(r#""A\x42""#), s("AB"));
}

#[test]
fn test_other_literals() {
    assert_eq!(eval("true"), JsValue::Boolean(true));
    assert_eq!(eval("null"), JsValue::Null);
    assert_eq!(eval("undefined"), JsValue::Undefined);
}

#[test]
fn test_empty_program_is_undefined() {
    assert_eq!(eval(""), JsValue::Undefined);
    assert_eq!(eval(";;"), JsValue::Undefined);
}

#[test]
fn test_program_value_is_last_value_producing_statement() {
    assert_eq!(eval("1; var y = 2;"), JsValue::Number(1.0));
    assert_eq!(eval("'a'; function f() {}"), s("a"));
    assert_eq!(eval("var x; x"), JsValue::Undefined);
}

#[test]
fn test_scenario_function_reads_global() {
    assert_eq!(
        eval("var x = 2; function f(a){ return a*x; } f(5);"),
        JsValue::Number(10.0)
    );
}

#[test]
fn test_scenario_continue_in_for_loop() {
    assert_eq!(
        eval(r#"var s=""; for (var i=0;i<3;i++){ if (i==1) continue; s=s+i; } s;"#),
        s("02")
    );
}

#[test]
fn test_scenario_with_assignment() {
    assert_eq!(
        eval("var o={a:1}; with(o){ a = a + 1; } o.a;"),
        JsValue::Number(2.0)
    );
}

#[test]
fn test_var_hoisting() {
    assert_eq!(eval("var before = v; var v = 1; before"), JsValue::Undefined);
    assert_eq!(eval("f(); function f() { return 1; }"), JsValue::Number(1.0));
}

#[test]
fn test_multiple_declarators() {
    assert_eq!(eval("var a = 1, b = a + 1, c; a + b"), JsValue::Number(3.0));
}

#[test]
fn test_implicit_global_assignment() {
    assert_eq!(eval("function f() { g = 5; } f(); g"), JsValue::Number(5.0));
}

#[test]
fn test_automatic_semicolons() {
    assert_eq!(eval("var a = 1\nvar b = 2\na + b"), JsValue::Number(3.0));
    assert_eq!(
        eval("function f() { return\n1 } typeof f()"),
        s("undefined")
    );
}

#[test]
fn test_comments_are_ignored() {
    assert_eq!(eval("// line\n1 /* block */ + 2"), JsValue::Number(3.0));
}

#[test]
fn test_globals_persist_between_evaluations() {
    let mut evaluator = super::create_test_evaluator();
    evaluator.eval("var counter = 1;").unwrap();
    evaluator.eval("counter += 1;").unwrap();
    assert_eq!(evaluator.eval("counter").unwrap(), JsValue::Number(2.0));
}
