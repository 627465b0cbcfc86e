//! Expression evaluation
//!
//! Member and call chains such as `a.b.c(x).d` are walked left to right
//! without materializing a `Reference` per step: the walk carries the last
//! resolved value plus at most one pending property name, and fetches that
//! property only when the next step needs it. A call with a pending name is
//! dispatched through its base (`call_method`), so objects can resolve their
//! own methods.

use std::rc::Rc;

use super::{Evaluator, STACK_GROW_SIZE, STACK_RED_ZONE};
use super::scope::{Reference, ScopeChain};
use crate::ast::{
    AssignmentExpression, Expression, FunctionCode, LiteralValue, LogicalOp, MemberExpression,
    MemberProperty, UnaryExpression, UnaryOp, UpdateExpression, UpdateOp,
};
use crate::error::JsError;
use crate::object::{ExoticObject, JsObject, Ordinary, Property};
use crate::value::{CheapClone, JsString, JsValue, PropertyKey, to_int32};

/// State of a member/call chain walk
enum Chain {
    /// A bare identifier, resolved through the scope chain
    Name(PropertyKey),
    /// `base.key`, not yet fetched
    Property(JsValue, PropertyKey),
    /// A fully evaluated value with nothing pending
    Value(JsValue),
}

impl Evaluator {
    pub(crate) fn evaluate(&mut self, expr: &Expression) -> Result<JsValue, JsError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.evaluate_inner(expr)
                .map_err(|err| err.at_line(expr.line()))
        })
    }

    fn evaluate_inner(&mut self, expr: &Expression) -> Result<JsValue, JsError> {
        match expr {
            Expression::Literal(literal) => Ok(match &literal.value {
                LiteralValue::Null => JsValue::Null,
                LiteralValue::Boolean(b) => JsValue::Boolean(*b),
                LiteralValue::Number(n) => JsValue::Number(*n),
                LiteralValue::String(s) => JsValue::String(s.cheap_clone()),
            }),

            Expression::Identifier(id) => self.resolve_value(&id.name),

            Expression::This(_) => Ok(self.context.this.cheap_clone()),

            Expression::Array(array) => {
                let result = self.new_array(Vec::new());
                for (index, element) in array.elements.iter().enumerate() {
                    if let Some(element) = element {
                        let value = self.evaluate(element)?;
                        result.put_property(&PropertyKey::from(index as u32), value);
                    }
                }
                // Trailing holes still count towards the length
                result.put_property(&self.keys.length, JsValue::from(array.elements.len() as u32));
                Ok(JsValue::Object(result))
            }

            Expression::Object(object) => {
                let result = self.new_object();
                for property in &object.properties {
                    let value = self.evaluate(&property.value)?;
                    result.put_property(&property.key, value);
                }
                Ok(JsValue::Object(result))
            }

            Expression::Function(function) => Ok(self.function_expression(&function.code)),

            Expression::Unary(unary) => self.evaluate_unary(unary),

            Expression::Binary(binary) => {
                let left = self.evaluate(&binary.left)?;
                let right = self.evaluate(&binary.right)?;
                self.binary_op(binary.operator, left, right)
            }

            Expression::Logical(logical) => {
                let left = self.evaluate(&logical.left)?;
                let short_circuit = match logical.operator {
                    LogicalOp::And => !left.to_boolean(),
                    LogicalOp::Or => left.to_boolean(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(&logical.right)
                }
            }

            Expression::Conditional(cond) => {
                if self.evaluate(&cond.test)?.to_boolean() {
                    self.evaluate(&cond.consequent)
                } else {
                    self.evaluate(&cond.alternate)
                }
            }

            Expression::Assignment(assign) => self.evaluate_assignment(assign),

            Expression::Update(update) => self.evaluate_update(update),

            Expression::Sequence(seq) => {
                let mut value = JsValue::Undefined;
                for expr in &seq.expressions {
                    value = self.evaluate(expr)?;
                }
                Ok(value)
            }

            Expression::Member(_) | Expression::Call(_) => {
                let chain = self.evaluate_chain(expr)?;
                self.chain_value(chain)
            }

            Expression::New(new) => {
                let callee = self.evaluate(&new.callee)?;
                let args = self.evaluate_arguments(&new.arguments)?;
                self.construct_value(&callee, &args)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Member / call chains
    // ═══════════════════════════════════════════════════════════════

    fn evaluate_chain(&mut self, expr: &Expression) -> Result<Chain, JsError> {
        match expr {
            Expression::Identifier(id) => Ok(Chain::Name(id.name.cheap_clone())),
            Expression::Member(member) => {
                let (base, key) = self.member_parts(member)?;
                Ok(Chain::Property(base, key))
            }
            Expression::Call(call) => {
                let chain = self.evaluate_chain(&call.callee)?;
                let args = self.evaluate_arguments(&call.arguments)?;
                let value = self
                    .call_chain(chain, &args)
                    .map_err(|err| err.at_line(call.span.line))?;
                Ok(Chain::Value(value))
            }
            other => Ok(Chain::Value(self.evaluate(other)?)),
        }
    }

    /// Resolve whatever is pending and hand back a plain value.
    fn chain_value(&mut self, chain: Chain) -> Result<JsValue, JsError> {
        match chain {
            Chain::Name(key) => self.resolve_value(&key),
            Chain::Property(base, key) => self.get_member(&base, &key),
            Chain::Value(value) => Ok(value),
        }
    }

    /// The fetched base and the (not yet fetched) key of `base.key` or
    /// `base[expr]`.
    fn member_parts(&mut self, member: &MemberExpression) -> Result<(JsValue, PropertyKey), JsError> {
        let chain = self.evaluate_chain(&member.object)?;
        let base = self.chain_value(chain)?;
        let key = match &member.property {
            MemberProperty::Identifier(key) => key.cheap_clone(),
            MemberProperty::Expression(expr) => {
                let value = self.evaluate(expr)?;
                self.to_property_key(&value)?
            }
        };
        Ok((base, key))
    }

    fn call_chain(&mut self, chain: Chain, args: &[JsValue]) -> Result<JsValue, JsError> {
        match chain {
            Chain::Name(key) => self.call_by_name(&key, args),
            Chain::Property(base, key) => self.call_property(base, &key, args),
            Chain::Value(callee) => {
                let this = self.global_value();
                self.call_value(&callee, this, args)
            }
        }
    }

    /// `base.key(args)`, dispatched through the base object.
    fn call_property(
        &mut self,
        base: JsValue,
        key: &PropertyKey,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        match &base {
            JsValue::Object(object) => {
                if object.is_global() && !object.has_property(key) && self.options.strict_global_reads {
                    return Err(JsError::reference_error(key));
                }
                // Methods called through an arguments object see the
                // global object as `this`.
                let is_arguments = matches!(
                    object.as_ordinary().map(|o| o.exotic()),
                    Some(ExoticObject::Arguments)
                );
                let this = if is_arguments {
                    self.global_value()
                } else {
                    base.cheap_clone()
                };
                object.call_method(self, this, key, args)
            }
            JsValue::Undefined | JsValue::Null => Err(JsError::type_error(format!(
                "Cannot call method '{}' of {}",
                key,
                base.to_js_string()
            ))),
            _ => {
                let method = self.get_member(&base, key)?;
                if !method.is_callable() {
                    return Err(JsError::type_error(format!("{} is not a function", key)));
                }
                self.call_value(&method, base.cheap_clone(), args)
            }
        }
    }

    /// Read `key` from any value, boxing primitives through their
    /// prototypes.
    pub(crate) fn get_member(&mut self, base: &JsValue, key: &PropertyKey) -> Result<JsValue, JsError> {
        match base {
            JsValue::Object(object) => self.read_property(object, key),
            JsValue::String(s) => {
                if *key == self.keys.length {
                    return Ok(JsValue::from(s.utf16_len() as u32));
                }
                if let Some(index) = key.as_index() {
                    let units = s.to_utf16();
                    if let Some(unit) = units.get(index as usize) {
                        return Ok(JsValue::String(JsString::from_utf16(&[*unit])));
                    }
                }
                Ok(self.protos.string.get_property(key))
            }
            JsValue::Number(_) => Ok(self.protos.number.get_property(key)),
            JsValue::Boolean(_) => Ok(self.protos.boolean.get_property(key)),
            JsValue::Undefined | JsValue::Null => Err(JsError::type_error(format!(
                "Cannot read property '{}' of {}",
                key,
                base.to_js_string()
            ))),
        }
    }

    fn evaluate_arguments(&mut self, arguments: &[Expression]) -> Result<Vec<JsValue>, JsError> {
        arguments.iter().map(|arg| self.evaluate(arg)).collect()
    }

    // ═══════════════════════════════════════════════════════════════
    // References
    // ═══════════════════════════════════════════════════════════════

    /// Evaluate an expression as an assignment target.
    pub(crate) fn evaluate_reference(&mut self, expr: &Expression) -> Result<Reference, JsError> {
        let reference = match expr {
            Expression::Identifier(id) => Ok(self.resolve_reference(&id.name)),
            Expression::Member(member) => {
                let (base, key) = self.member_parts(member)?;
                let object = self.to_object(&base)?;
                Ok(Reference {
                    base: Some(object),
                    key,
                })
            }
            // The chain still runs, so a call in it happens before the error
            other => self.evaluate(other).and_then(|_| {
                Err(JsError::reference_error_with_message("Invalid assignment target"))
            }),
        };
        reference.map_err(|err| err.at_line(expr.line()))
    }

    fn evaluate_assignment(&mut self, assign: &AssignmentExpression) -> Result<JsValue, JsError> {
        let reference = self.evaluate_reference(&assign.target)?;
        let value = match assign.operator.binary_op() {
            None => self.evaluate(&assign.value)?,
            Some(op) => {
                let current = self.get_value(&reference)?;
                let operand = self.evaluate(&assign.value)?;
                self.binary_op(op, current, operand)?
            }
        };
        self.put_value(&reference, value.cheap_clone());
        Ok(value)
    }

    fn evaluate_update(&mut self, update: &UpdateExpression) -> Result<JsValue, JsError> {
        let reference = self.evaluate_reference(&update.argument)?;
        let current = self.get_value(&reference)?;
        let old = self.to_number(&current)?;
        let new = match update.operator {
            UpdateOp::Increment => old + 1.0,
            UpdateOp::Decrement => old - 1.0,
        };
        self.put_value(&reference, JsValue::Number(new));
        Ok(JsValue::Number(if update.prefix { new } else { old }))
    }

    fn evaluate_unary(&mut self, unary: &UnaryExpression) -> Result<JsValue, JsError> {
        match unary.operator {
            UnaryOp::Typeof => {
                let value = match &*unary.argument {
                    // An unbound name is "undefined", not an error
                    Expression::Identifier(id) => match self.context.scope.find(&id.name) {
                        Some(object) => object.get_property(&id.name),
                        None => JsValue::Undefined,
                    },
                    other => self.evaluate(other)?,
                };
                Ok(JsValue::from(value.type_of()))
            }
            UnaryOp::Delete => match &*unary.argument {
                target @ (Expression::Identifier(_) | Expression::Member(_)) => {
                    let reference = self.evaluate_reference(target)?;
                    let deleted = match &reference.base {
                        Some(object) => object.delete_property(&reference.key),
                        None => true,
                    };
                    Ok(JsValue::Boolean(deleted))
                }
                other => {
                    self.evaluate(other)?;
                    Ok(JsValue::Boolean(true))
                }
            },
            UnaryOp::Void => {
                self.evaluate(&unary.argument)?;
                Ok(JsValue::Undefined)
            }
            UnaryOp::Not => Ok(JsValue::Boolean(!self.evaluate(&unary.argument)?.to_boolean())),
            UnaryOp::Minus => {
                let value = self.evaluate(&unary.argument)?;
                Ok(JsValue::Number(-self.to_number(&value)?))
            }
            UnaryOp::Plus => {
                let value = self.evaluate(&unary.argument)?;
                Ok(JsValue::Number(self.to_number(&value)?))
            }
            UnaryOp::BitNot => {
                let value = self.evaluate(&unary.argument)?;
                let n = to_int32(self.to_number(&value)?);
                Ok(JsValue::Number(f64::from(!n)))
            }
        }
    }

    /// A function expression closes over the current scope. A named one
    /// also sees its own name, bound read-only in a scope of its own.
    fn function_expression(&mut self, code: &Rc<FunctionCode>) -> JsValue {
        match &code.name {
            Some(name) => {
                let holder = Ordinary::new(None, ExoticObject::Ordinary);
                let scope = ScopeChain::push(&self.context.scope, holder.cheap_clone());
                let function = JsValue::Object(self.create_function(code, scope));
                holder.define_property(
                    name.cheap_clone(),
                    Property::with_attributes(function.cheap_clone(), false, false, false),
                );
                function
            }
            None => {
                let scope = Rc::clone(&self.context.scope);
                JsValue::Object(self.create_function(code, scope))
            }
        }
    }
}
