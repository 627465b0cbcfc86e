//! Error objects, error kinds and source frames

use super::{create_test_evaluator, eval, eval_err, eval_result, s};
use eswalk::{ErrorKind, JsValue};

#[test]
fn test_error_constructors() {
    assert_eq!(
        eval("var e = new TypeError('t'); e.name + '|' + e.message + '|' + e"),
        s("TypeError|t|TypeError: t")
    );
    assert_eq!(eval("String(new Error())"), s("Error"));
    assert_eq!(eval("Error('no new').message"), s("no new"));
}

#[test]
fn test_error_hierarchy() {
    assert_eq!(eval("new RangeError('r') instanceof Error"), JsValue::Boolean(true));
    assert_eq!(eval("new SyntaxError('s') instanceof TypeError"), JsValue::Boolean(false));
    assert_eq!(
        eval("Object.prototype.toString.call(new EvalError('e'))"),
        s("[object Error]")
    );
}

#[test]
fn test_error_message_is_not_enumerable() {
    assert_eq!(eval("var n = 0; for (var k in new Error('x')) n++; n"), JsValue::Number(0.0));
}

#[test]
fn test_reference_error_frame_line() {
    let err = eval_err("var a = 1;\nvar b = 2;\nmissing;");
    assert_eq!(err.message(), "ReferenceError: missing is not defined");
    assert_eq!(err.frames().len(), 1);
    assert_eq!(err.frames()[0].line, 3);
    assert!(err.frames()[0].source.starts_with("string \"var a = 1;"));
}

#[test]
fn test_function_error_has_frame_per_pass() {
    let err = eval_err("function f() {\n  return nope;\n}\nf();");
    let frames = err.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].line, 2);
    assert!(frames[0].source.starts_with("function f in string"));
    assert_eq!(frames[1].line, 4);
    assert!(frames[1].source.starts_with("string"));
}

#[test]
fn test_anonymous_function_frame() {
    let err = eval_err("var g = function() {\n  null.x;\n};\ng();");
    assert!(matches!(err.kind(), ErrorKind::Type(_)));
    assert!(err.frames()[0].source.starts_with("anonymous function in"));
}

#[test]
fn test_eval_error_has_eval_frame() {
    let err = eval_err("var x = 1;\neval('nope');");
    let frames = err.frames();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].source.starts_with("eval in string"));
    assert_eq!(frames[0].line, 1);
    assert_eq!(frames[1].line, 2);
}

#[test]
fn test_file_source_names_the_file() {
    let mut evaluator = create_test_evaluator();
    let err = evaluator.eval_file_source("lib/app.js", "\n\nundefinedThing;").unwrap_err();
    assert_eq!(err.frames()[0].source, "file lib/app.js");
    assert_eq!(err.frames()[0].line, 3);
}

#[test]
fn test_error_display_lists_frames() {
    let err = eval_err("function f() {\n  return nope;\n}\nf();");
    let rendered = err.to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "ReferenceError: nope is not defined");
    assert!(lines[1].starts_with("    at function f in string"));
    assert!(lines[1].ends_with("(line 2)"));
    assert!(lines[2].ends_with("(line 4)"));
}

#[test]
fn test_syntax_error() {
    let err = eval_err("var a = 1;\nvar = 2;");
    match err.kind() {
        ErrorKind::Syntax { line, .. } => assert_eq!(*line, 2),
        other => panic!("unexpected error kind: {:?}", other),
    }
    assert_eq!(err.frames().len(), 1);
    assert_eq!(err.frames()[0].line, 2);
}

#[test]
fn test_syntax_errors_reject_misplaced_jumps() {
    assert!(matches!(eval_err("break;").kind(), ErrorKind::Syntax { .. }));
    assert!(matches!(eval_err("while (1) { continue nowhere; }").kind(), ErrorKind::Syntax { .. }));
    assert!(matches!(eval_err("return 1;").kind(), ErrorKind::Syntax { .. }));
}

#[test]
fn test_syntax_error_in_eval_is_catchable() {
    assert_eq!(
        eval("try { eval('var = ;'); } catch (e) { e instanceof SyntaxError; }"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_uncaught_error_object() {
    let err = eval_err("throw new Error('bad');");
    assert!(err.message().starts_with("Uncaught Error: bad"));
    assert!(matches!(err.kind(), ErrorKind::Thrown { value: JsValue::Object(_), .. }));
}

#[test]
fn test_thrown_value_uses_script_to_string() {
    let err = eval_err("throw { toString: function() { return 'custom'; } };");
    assert_eq!(err.message(), "Uncaught custom");
}

#[test]
fn test_evaluator_errors_are_catchable() {
    let err = eval_result("undefinedVar").unwrap_err();
    assert!(err.is_catchable());
    assert_eq!(err.class_name(), "ReferenceError");
}

#[test]
fn test_deeply_nested_program_is_syntax_error() {
    let source = format!("{}1{}", "(".repeat(20000), ")".repeat(20000));
    match eval_err(&source).kind() {
        ErrorKind::Syntax { message, .. } => assert!(message.contains("nesting")),
        other => panic!("unexpected error kind: {:?}", other),
    }
}

#[test]
fn test_deeply_nested_eval_text_is_catchable() {
    assert_eq!(
        eval(
            "var text = '';
             for (var i = 0; i < 2000; i++) text = '[' + text + ']';
             var r;
             try { eval(text); } catch (e) { r = e instanceof SyntaxError; }
             r"
        ),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_nesting_within_the_limit_evaluates() {
    let source = format!("{}1{}", "(".repeat(300), ")".repeat(300));
    assert_eq!(eval(&source), JsValue::Number(1.0));
}
