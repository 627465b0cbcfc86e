//! Conversions and operators
//!
//! Primitive-only conversions live on `JsValue`. The ones here may run
//! script code (`valueOf`/`toString`) and therefore need the evaluator.

use super::Evaluator;
use crate::ast::BinaryOp;
use crate::error::JsError;
use crate::object::{ExoticObject, Hint, ObjectRef, Ordinary};
use crate::value::{
    CheapClone, JsString, JsValue, PropertyKey, same_object, string_to_number, to_int32, to_uint32,
};

impl Evaluator {
    // ═══════════════════════════════════════════════════════════════
    // Conversions
    // ═══════════════════════════════════════════════════════════════

    /// ToPrimitive
    pub fn to_primitive(&mut self, value: &JsValue, hint: Hint) -> Result<JsValue, JsError> {
        match value {
            JsValue::Object(object) => {
                let object = object.cheap_clone();
                let result = object.default_value(self, &object, hint)?;
                if result.is_object() {
                    return Err(JsError::type_error("Cannot convert object to primitive value"));
                }
                Ok(result)
            }
            primitive => Ok(primitive.cheap_clone()),
        }
    }

    /// The default `[[DefaultValue]]`: `valueOf` then `toString` for a
    /// number hint, `toString` then `valueOf` otherwise.
    pub(crate) fn ordinary_to_primitive(
        &mut self,
        object: &ObjectRef,
        hint: Hint,
    ) -> Result<JsValue, JsError> {
        let order = match hint {
            Hint::Number => [self.keys.value_of.cheap_clone(), self.keys.to_string.cheap_clone()],
            Hint::String | Hint::None => {
                [self.keys.to_string.cheap_clone(), self.keys.value_of.cheap_clone()]
            }
        };
        for key in order {
            if let JsValue::Object(method) = object.get_property(&key) {
                if method.is_callable() {
                    let result = method.call(self, JsValue::Object(object.cheap_clone()), &[])?;
                    if !result.is_object() {
                        return Ok(result);
                    }
                }
            }
        }
        Err(JsError::type_error("Cannot convert object to primitive value"))
    }

    /// ToNumber
    pub fn to_number(&mut self, value: &JsValue) -> Result<f64, JsError> {
        match value {
            JsValue::Object(_) => Ok(self.to_primitive(value, Hint::Number)?.to_number()),
            primitive => Ok(primitive.to_number()),
        }
    }

    /// ToString
    pub fn to_string(&mut self, value: &JsValue) -> Result<JsString, JsError> {
        match value {
            JsValue::Object(_) => Ok(self.to_primitive(value, Hint::String)?.to_js_string()),
            primitive => Ok(primitive.to_js_string()),
        }
    }

    /// ToObject: primitives are boxed in a fresh wrapper.
    pub fn to_object(&self, value: &JsValue) -> Result<ObjectRef, JsError> {
        let (proto, exotic) = match value {
            JsValue::Object(object) => return Ok(object.cheap_clone()),
            JsValue::Undefined | JsValue::Null => {
                return Err(JsError::type_error(format!(
                    "Cannot convert {} to object",
                    value.to_js_string()
                )));
            }
            JsValue::Boolean(b) => (&self.protos.boolean, ExoticObject::Boolean(*b)),
            JsValue::Number(n) => (&self.protos.number, ExoticObject::Number(*n)),
            JsValue::String(s) => (&self.protos.string, ExoticObject::String(s.cheap_clone())),
        };
        let wrapper: ObjectRef = Ordinary::new(Some(proto.cheap_clone() as ObjectRef), exotic);
        Ok(wrapper)
    }

    /// The property name a computed member access uses.
    pub(crate) fn to_property_key(&mut self, value: &JsValue) -> Result<PropertyKey, JsError> {
        match value {
            JsValue::String(s) => Ok(PropertyKey::from(s.cheap_clone())),
            JsValue::Number(n) if *n >= 0.0 && *n < u32::MAX as f64 && n.fract() == 0.0 => {
                Ok(PropertyKey::from(*n as u32))
            }
            other => Ok(PropertyKey::from(self.to_string(other)?)),
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Operators
    // ═══════════════════════════════════════════════════════════════

    pub(crate) fn binary_op(
        &mut self,
        op: BinaryOp,
        left: JsValue,
        right: JsValue,
    ) -> Result<JsValue, JsError> {
        let value = match op {
            BinaryOp::Add => return self.add(&left, &right),
            BinaryOp::Sub => JsValue::Number(self.to_number(&left)? - self.to_number(&right)?),
            BinaryOp::Mul => JsValue::Number(self.to_number(&left)? * self.to_number(&right)?),
            BinaryOp::Div => JsValue::Number(self.to_number(&left)? / self.to_number(&right)?),
            // f64 `%` truncates like the language's remainder
            BinaryOp::Mod => JsValue::Number(self.to_number(&left)? % self.to_number(&right)?),

            BinaryOp::Eq => JsValue::Boolean(self.loose_equals(left, right)?),
            BinaryOp::NotEq => JsValue::Boolean(!self.loose_equals(left, right)?),
            BinaryOp::StrictEq => JsValue::Boolean(left.strict_equals(&right)),
            BinaryOp::StrictNotEq => JsValue::Boolean(!left.strict_equals(&right)),

            // NaN compares as "undefined", which every relational
            // operator turns into false
            BinaryOp::Lt => {
                let (l, r) = self.relational_operands(&left, &right)?;
                JsValue::Boolean(compare(&l, &r) == Some(true))
            }
            BinaryOp::Gt => {
                let (l, r) = self.relational_operands(&left, &right)?;
                JsValue::Boolean(compare(&r, &l) == Some(true))
            }
            BinaryOp::LtEq => {
                let (l, r) = self.relational_operands(&left, &right)?;
                JsValue::Boolean(compare(&r, &l) == Some(false))
            }
            BinaryOp::GtEq => {
                let (l, r) = self.relational_operands(&left, &right)?;
                JsValue::Boolean(compare(&l, &r) == Some(false))
            }

            BinaryOp::BitAnd => {
                let (l, r) = self.int32_operands(&left, &right)?;
                JsValue::Number(f64::from(l & r))
            }
            BinaryOp::BitOr => {
                let (l, r) = self.int32_operands(&left, &right)?;
                JsValue::Number(f64::from(l | r))
            }
            BinaryOp::BitXor => {
                let (l, r) = self.int32_operands(&left, &right)?;
                JsValue::Number(f64::from(l ^ r))
            }
            BinaryOp::LShift => {
                let l = to_int32(self.to_number(&left)?);
                let shift = to_uint32(self.to_number(&right)?) & 0x1F;
                JsValue::Number(f64::from(l.wrapping_shl(shift)))
            }
            BinaryOp::RShift => {
                let l = to_int32(self.to_number(&left)?);
                let shift = to_uint32(self.to_number(&right)?) & 0x1F;
                JsValue::Number(f64::from(l >> shift))
            }
            BinaryOp::URShift => {
                let l = to_uint32(self.to_number(&left)?);
                let shift = to_uint32(self.to_number(&right)?) & 0x1F;
                JsValue::Number(f64::from(l >> shift))
            }

            BinaryOp::In => {
                let JsValue::Object(object) = &right else {
                    return Err(JsError::type_error(
                        "Cannot use 'in' operator to search for a key in a non-object",
                    ));
                };
                let key = self.to_property_key(&left)?;
                JsValue::Boolean(object.has_property(&key))
            }
            BinaryOp::Instanceof => JsValue::Boolean(self.instance_of(&left, &right)?),
        };
        Ok(value)
    }

    /// `+`: decide between concatenation and addition on the primitive
    /// forms, then convert the original operands.
    fn add(&mut self, left: &JsValue, right: &JsValue) -> Result<JsValue, JsError> {
        let left_primitive = self.to_primitive(left, Hint::None)?;
        let right_primitive = self.to_primitive(right, Hint::None)?;

        if left_primitive.is_string() || right_primitive.is_string() {
            let l = self.to_string(left)?;
            let r = self.to_string(right)?;
            return Ok(JsValue::String(l.concat(r.as_str())));
        }
        Ok(JsValue::Number(self.to_number(left)? + self.to_number(right)?))
    }

    fn relational_operands(
        &mut self,
        left: &JsValue,
        right: &JsValue,
    ) -> Result<(JsValue, JsValue), JsError> {
        let l = self.to_primitive(left, Hint::Number)?;
        let r = self.to_primitive(right, Hint::Number)?;
        Ok((l, r))
    }

    fn int32_operands(&mut self, left: &JsValue, right: &JsValue) -> Result<(i32, i32), JsError> {
        let l = to_int32(self.to_number(left)?);
        let r = to_int32(self.to_number(right)?);
        Ok((l, r))
    }

    /// Abstract equality (`==`)
    pub fn loose_equals(&mut self, left: JsValue, right: JsValue) -> Result<bool, JsError> {
        let mut left = left;
        let mut right = right;
        loop {
            match (&left, &right) {
                (JsValue::Undefined | JsValue::Null, JsValue::Undefined | JsValue::Null) => {
                    return Ok(true);
                }
                (JsValue::Undefined | JsValue::Null, _) | (_, JsValue::Undefined | JsValue::Null) => {
                    return Ok(false);
                }
                (JsValue::Number(n), JsValue::String(s)) | (JsValue::String(s), JsValue::Number(n)) => {
                    return Ok(*n == string_to_number(s.as_str()));
                }
                (JsValue::Boolean(b), _) => left = JsValue::Number(if *b { 1.0 } else { 0.0 }),
                (_, JsValue::Boolean(b)) => right = JsValue::Number(if *b { 1.0 } else { 0.0 }),
                (JsValue::String(_) | JsValue::Number(_), JsValue::Object(_)) => {
                    right = self.to_primitive(&right, Hint::None)?;
                }
                (JsValue::Object(_), JsValue::String(_) | JsValue::Number(_)) => {
                    left = self.to_primitive(&left, Hint::None)?;
                }
                _ => return Ok(left.strict_equals(&right)),
            }
        }
    }

    /// `value instanceof ctor`: walk `value`'s prototype chain looking for
    /// `ctor.prototype`.
    fn instance_of(&mut self, value: &JsValue, ctor: &JsValue) -> Result<bool, JsError> {
        let ctor = match ctor {
            JsValue::Object(ctor) if ctor.is_callable() => ctor,
            _ => {
                return Err(JsError::type_error(
                    "Right-hand side of 'instanceof' is not callable",
                ));
            }
        };
        let JsValue::Object(object) = value else {
            return Ok(false);
        };
        let JsValue::Object(prototype) = ctor.get_property(&self.keys.prototype) else {
            return Err(JsError::type_error(
                "Function has non-object prototype in instanceof check",
            ));
        };

        let mut current = object.as_ordinary().and_then(|o| o.prototype());
        while let Some(proto) = current {
            if same_object(&proto, &prototype) {
                return Ok(true);
            }
            current = proto.as_ordinary().and_then(|o| o.prototype());
        }
        Ok(false)
    }
}

/// Abstract relational comparison `left < right` on primitives. `None`
/// stands for "undefined" (a NaN was involved).
fn compare(left: &JsValue, right: &JsValue) -> Option<bool> {
    if let (JsValue::String(l), JsValue::String(r)) = (left, right) {
        return Some(l.to_utf16() < r.to_utf16());
    }
    let l = left.to_number();
    let r = right.to_number();
    if l.is_nan() || r.is_nan() {
        return None;
    }
    Some(l < r)
}
