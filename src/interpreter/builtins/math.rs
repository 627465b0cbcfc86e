//! Math built-in methods

use super::arg;
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::object::Property;
use crate::value::{CheapClone, JsValue};

/// Install the `Math` object with its constants and methods.
pub(crate) fn install(evaluator: &mut Evaluator) {
    let math = evaluator.new_object();

    let constants = [
        ("PI", std::f64::consts::PI),
        ("E", std::f64::consts::E),
        ("LN2", std::f64::consts::LN_2),
        ("LN10", std::f64::consts::LN_10),
        ("LOG2E", std::f64::consts::LOG2_E),
        ("LOG10E", std::f64::consts::LOG10_E),
        ("SQRT2", std::f64::consts::SQRT_2),
        ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
    ];
    for (name, value) in constants {
        let key = evaluator.key(name);
        math.define_property(
            key,
            Property::with_attributes(JsValue::Number(value), false, false, false),
        );
    }

    // Rounding
    evaluator.register_method(&math, "abs", math_abs, 1);
    evaluator.register_method(&math, "floor", math_floor, 1);
    evaluator.register_method(&math, "ceil", math_ceil, 1);
    evaluator.register_method(&math, "round", math_round, 1);

    // Min/max
    evaluator.register_method(&math, "min", math_min, 2);
    evaluator.register_method(&math, "max", math_max, 2);

    // Power, logarithm and exponential
    evaluator.register_method(&math, "pow", math_pow, 2);
    evaluator.register_method(&math, "sqrt", math_sqrt, 1);
    evaluator.register_method(&math, "exp", math_exp, 1);
    evaluator.register_method(&math, "log", math_log, 1);

    // Trigonometric
    evaluator.register_method(&math, "sin", math_sin, 1);
    evaluator.register_method(&math, "cos", math_cos, 1);
    evaluator.register_method(&math, "tan", math_tan, 1);
    evaluator.register_method(&math, "atan", math_atan, 1);
    evaluator.register_method(&math, "atan2", math_atan2, 2);

    let key = evaluator.key("Math");
    evaluator
        .global_ordinary()
        .define_property(key, Property::hidden(JsValue::Object(math.cheap_clone())));
}

fn number_arg(evaluator: &mut Evaluator, args: &[JsValue], index: usize) -> Result<f64, JsError> {
    evaluator.to_number(&arg(args, index))
}

/// Apply a one-argument numeric function to the first argument.
fn unary(
    evaluator: &mut Evaluator,
    args: &[JsValue],
    f: fn(f64) -> f64,
) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(f(number_arg(evaluator, args, 0)?)))
}

pub fn math_abs(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::abs)
}

pub fn math_floor(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::floor)
}

pub fn math_ceil(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::ceil)
}

/// Rounds half-way cases towards +Infinity, keeping the sign of zero.
fn round_half_up(n: f64) -> f64 {
    if !n.is_finite() || n == 0.0 {
        return n;
    }
    let floor = n.floor();
    let rounded = if n - floor >= 0.5 { floor + 1.0 } else { floor };
    if rounded == 0.0 && n < 0.0 { -0.0 } else { rounded }
}

pub fn math_round(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, round_half_up)
}

pub fn math_min(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let mut min = f64::INFINITY;
    for value in args {
        let n = evaluator.to_number(value)?;
        if n.is_nan() {
            return Ok(JsValue::Number(f64::NAN));
        }
        if n < min {
            min = n;
        }
    }
    Ok(JsValue::Number(min))
}

pub fn math_max(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let mut max = f64::NEG_INFINITY;
    for value in args {
        let n = evaluator.to_number(value)?;
        if n.is_nan() {
            return Ok(JsValue::Number(f64::NAN));
        }
        if n > max {
            max = n;
        }
    }
    Ok(JsValue::Number(max))
}

pub fn math_pow(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let base = number_arg(evaluator, args, 0)?;
    let exponent = number_arg(evaluator, args, 1)?;
    // 1 ** NaN and (+-1) ** +-Infinity are NaN here, unlike IEEE pow
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return Ok(JsValue::Number(f64::NAN));
    }
    Ok(JsValue::Number(base.powf(exponent)))
}

pub fn math_sqrt(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::sqrt)
}

pub fn math_exp(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::exp)
}

pub fn math_log(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::ln)
}

pub fn math_sin(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::sin)
}

pub fn math_cos(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::cos)
}

pub fn math_tan(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::tan)
}

pub fn math_atan(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(evaluator, args, f64::atan)
}

pub fn math_atan2(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let y = number_arg(evaluator, args, 0)?;
    let x = number_arg(evaluator, args, 1)?;
    Ok(JsValue::Number(y.atan2(x)))
}
