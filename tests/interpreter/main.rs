//! Integration tests for the evaluator, organized by feature
//!
//! These tests exercise the evaluator through the public API only.

mod api;
mod array;
mod basics;
mod boolean;
mod error;
mod function;
mod global;
mod math;
mod object;
mod scope;
mod string;
mod timeout;

use eswalk::{Evaluator, EvaluatorOptions, JsError, JsValue};

/// Create an evaluator with a tight call depth so runaway recursion in a
/// test fails fast.
pub fn create_test_evaluator() -> Evaluator {
    Evaluator::with_options(EvaluatorOptions {
        max_call_depth: 64,
        ..EvaluatorOptions::default()
    })
}

/// Evaluate a program, panicking on error.
pub fn eval(source: &str) -> JsValue {
    match create_test_evaluator().eval(source) {
        Ok(value) => value,
        Err(err) => panic!("evaluation of {:?} failed: {}", source, err),
    }
}

/// Evaluate a program and return the result or the error.
pub fn eval_result(source: &str) -> Result<JsValue, JsError> {
    create_test_evaluator().eval(source)
}

/// Evaluate a program expected to fail.
pub fn eval_err(source: &str) -> JsError {
    match create_test_evaluator().eval(source) {
        Ok(value) => panic!("evaluation of {:?} succeeded with {:?}", source, value),
        Err(err) => err,
    }
}

/// Shorthand for string results.
pub fn s(text: &str) -> JsValue {
    JsValue::from(text)
}
