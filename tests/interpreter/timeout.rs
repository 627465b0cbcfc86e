//! Timeout and cancellation

use std::thread;
use std::time::Duration;

use eswalk::{ErrorKind, Evaluator, EvaluatorOptions, JsValue};

#[test]
fn test_default_timeout_is_three_seconds() {
    let evaluator = Evaluator::new();
    assert_eq!(evaluator.timeout_ms(), 3000);
}

#[test]
fn test_set_timeout() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(1000);
    assert_eq!(evaluator.timeout_ms(), 1000);
}

#[test]
fn test_infinite_while_loop_times_out() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(50);

    let err = evaluator.eval("while (true) {}").unwrap_err();
    assert!(err.is_timeout());
    assert!(matches!(
        err.kind(),
        ErrorKind::Timeout { timeout_ms: 50, cancelled: false, .. }
    ));
}

#[test]
fn test_infinite_for_loop_times_out() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(50);
    assert!(evaluator.eval("for (;;) {}").unwrap_err().is_timeout());
}

#[test]
fn test_infinite_do_while_loop_times_out() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(50);
    assert!(evaluator.eval("do {} while (true);").unwrap_err().is_timeout());
}

#[test]
fn test_timeout_inside_function_call() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(50);
    let err = evaluator
        .eval("function spin() { while (true) {} } spin();")
        .unwrap_err();
    assert!(err.is_timeout());
}

#[test]
fn test_timeout_is_not_catchable_and_skips_finally() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(50);

    let err = evaluator
        .eval("var ran = false; try { for (;;) {} } catch (e) { ran = 'caught'; } finally { ran = true; }")
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(evaluator.get_global("ran"), JsValue::Boolean(false));
}

#[test]
fn test_timeout_disabled_with_zero() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(0);

    let result = evaluator
        .eval("var i = 0; while (i < 100000) { i++; } i")
        .unwrap();
    assert_eq!(result, JsValue::Number(100000.0));
}

#[test]
fn test_timeout_from_options() {
    let mut evaluator = Evaluator::with_options(EvaluatorOptions {
        timeout_ms: 30,
        ..EvaluatorOptions::default()
    });
    assert!(evaluator.eval("while (true) {}").unwrap_err().is_timeout());
}

#[test]
fn test_evaluator_usable_after_timeout() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(50);
    assert!(evaluator.eval("while (true) {}").is_err());
    assert_eq!(evaluator.eval("1 + 1").unwrap(), JsValue::Number(2.0));
}

#[test]
fn test_cancel_from_another_thread() {
    let mut evaluator = Evaluator::new();
    evaluator.set_timeout_ms(0);
    let token = evaluator.cancel_handle();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });

    let err = evaluator.eval("while (true) {}").unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err.kind(), ErrorKind::Timeout { cancelled: true, .. }));
}

#[test]
fn test_cancel_between_evaluations_does_not_affect_next() {
    let mut evaluator = Evaluator::new();
    evaluator.cancel_handle().cancel();
    assert_eq!(evaluator.eval("var n = 0; for (var i = 0; i < 10; i++) n++; n").unwrap(), JsValue::Number(10.0));
}
