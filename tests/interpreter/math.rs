//! The Math object

use super::{eval, s};
use eswalk::JsValue;

fn num(source: &str) -> f64 {
    match eval(source) {
        JsValue::Number(n) => n,
        other => panic!("{:?} is not a number", other),
    }
}

#[test]
fn test_constants() {
    assert_eq!(num("Math.PI"), std::f64::consts::PI);
    assert_eq!(num("Math.E"), std::f64::consts::E);
    assert_eq!(num("Math.PI = 3; Math.PI"), std::f64::consts::PI);
}

#[test]
fn test_rounding() {
    assert_eq!(num("Math.floor(-1.5)"), -2.0);
    assert_eq!(num("Math.ceil(1.2)"), 2.0);
    assert_eq!(num("Math.round(2.5)"), 3.0);
    assert_eq!(num("Math.round(-2.5)"), -2.0);
    assert_eq!(num("Math.abs(-3)"), 3.0);
}

#[test]
fn test_min_max() {
    assert_eq!(num("Math.max(1, 5, 3)"), 5.0);
    assert_eq!(num("Math.min(1, 5, 3)"), 1.0);
    assert_eq!(num("Math.max()"), f64::NEG_INFINITY);
    assert_eq!(num("Math.min()"), f64::INFINITY);
    assert!(num("Math.max(1, NaN)").is_nan());
    assert_eq!(num("Math.max('7', 2)"), 7.0);
}

#[test]
fn test_pow_and_roots() {
    assert_eq!(num("Math.pow(2, 10)"), 1024.0);
    assert!(num("Math.pow(1, NaN)").is_nan());
    assert!(num("Math.pow(1, Infinity)").is_nan());
    assert_eq!(num("Math.pow(NaN, 0)"), 1.0);
    assert_eq!(num("Math.sqrt(16)"), 4.0);
    assert!(num("Math.sqrt(-1)").is_nan());
}

#[test]
fn test_transcendental() {
    assert_eq!(num("Math.exp(0)"), 1.0);
    assert_eq!(num("Math.log(1)"), 0.0);
    assert_eq!(num("Math.sin(0)"), 0.0);
    assert_eq!(num("Math.cos(0)"), 1.0);
    assert_eq!(num("Math.atan2(0, 1)"), 0.0);
}

#[test]
fn test_math_is_not_a_function() {
    assert_eq!(eval("typeof Math"), s("object"));
    assert_eq!(eval("Object.prototype.toString.call(Math)"), s("[object Object]"));
}
