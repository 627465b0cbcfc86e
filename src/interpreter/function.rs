//! Function objects, calls and `eval`

use std::rc::Rc;

use tracing::debug_span;

use super::{Completion, Evaluator, ExecutionContext, STACK_GROW_SIZE, STACK_RED_ZONE, ScopeChain};
use crate::ast::{Declarations, FunctionCode};
use crate::error::JsError;
use crate::object::{
    ExoticObject, InterpretedFunction, JsFunction, NativeFn, ObjectRef, Ordinary, Property,
};
use crate::source::{EvalSource, SourceKind};
use crate::value::{CheapClone, JsValue, PropertyKey};

impl Evaluator {
    /// Create a script function closing over `scope`.
    ///
    /// The function gets a read-only `length` and a fresh `prototype`
    /// object whose `constructor` points back at it. Both links form a
    /// reference cycle; it is only reclaimed with the evaluator's heap.
    pub(crate) fn create_function(&self, code: &Rc<FunctionCode>, scope: Rc<ScopeChain>) -> ObjectRef {
        let name = code.name.clone();
        let source = EvalSource::nested(
            &self.context.source,
            SourceKind::Function(name.as_ref().map(|n| n.to_string())),
        );
        let function = Ordinary::new(
            Some(self.protos.function.cheap_clone() as ObjectRef),
            ExoticObject::Function(JsFunction::Interpreted(InterpretedFunction {
                name,
                code: Rc::clone(code),
                scope,
                source,
            })),
        );

        function.define_property(
            self.keys.length.cheap_clone(),
            Property::with_attributes(JsValue::from(code.params.len() as u32), false, false, false),
        );
        let prototype = self.new_object();
        prototype.define_property(
            self.keys.constructor.cheap_clone(),
            Property::hidden(JsValue::Object(function.cheap_clone())),
        );
        function.define_property(
            self.keys.prototype.cheap_clone(),
            Property::with_attributes(JsValue::Object(prototype), true, false, false),
        );
        function
    }

    /// Call any callable value.
    pub(crate) fn call_value(
        &mut self,
        callee: &JsValue,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        match callee {
            JsValue::Object(function) if function.is_callable() => function.call(self, this, args),
            other => Err(JsError::type_error(format!(
                "{} is not a function",
                other.to_js_string()
            ))),
        }
    }

    /// `new callee(...args)`
    pub(crate) fn construct_value(
        &mut self,
        callee: &JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        match callee {
            JsValue::Object(ctor) => ctor.construct(self, args),
            other => Err(JsError::type_error(format!(
                "{} is not a constructor",
                other.to_js_string()
            ))),
        }
    }

    /// Run a native function in the caller's context.
    pub(crate) fn call_native(
        &mut self,
        func: NativeFn,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            let mut guard = self.enter_native_call()?;
            func(&mut guard, this, args)
        })
    }

    /// Run a script function: build its activation object, enter a scope
    /// chain of `[captured scope..., activation]` and execute the body.
    pub(crate) fn call_interpreted(
        &mut self,
        callee: &ObjectRef,
        func: &InterpretedFunction,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_interpreted_inner(callee, func, this, args)
        })
    }

    fn call_interpreted_inner(
        &mut self,
        callee: &ObjectRef,
        func: &InterpretedFunction,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        self.checkpoint()?;
        // Refused before any frame exists for this call
        self.check_call_depth()?;
        let _span = debug_span!(
            "function",
            name = func.name.as_ref().map_or("anonymous", |n| n.as_str())
        )
        .entered();

        let this = if this.is_null_or_undefined() {
            self.global_value()
        } else if this.is_object() {
            this
        } else {
            JsValue::Object(self.to_object(&this)?)
        };

        let activation = Ordinary::new(None, ExoticObject::Ordinary);
        let arguments = self.create_arguments(callee, args);
        activation.define_property(
            self.keys.arguments.cheap_clone(),
            Property::with_attributes(JsValue::Object(arguments), true, false, false),
        );
        // A repeated parameter name binds the later argument
        for (index, param) in func.code.params.iter().enumerate() {
            let value = args.get(index).cloned().unwrap_or_default();
            activation.define_property(
                param.cheap_clone(),
                Property::with_attributes(value, true, true, false),
            );
        }

        let variables: ObjectRef = activation;
        let context = ExecutionContext {
            scope: ScopeChain::push(&func.scope, variables.cheap_clone()),
            this,
            variables,
            source: Rc::clone(&func.source),
        };

        self.run_function_body(context, &func.code)
            .map_err(|mut err| {
                err.push_frame(&func.source);
                err
            })
    }

    fn run_function_body(
        &mut self,
        context: ExecutionContext,
        code: &FunctionCode,
    ) -> Result<JsValue, JsError> {
        let mut guard = self.enter_call(context)?;
        guard.declare(&code.declarations, false);
        match guard.execute_statements(&code.body)? {
            Completion::Normal(_) => Ok(JsValue::Undefined),
            Completion::Return(value) => Ok(value),
            Completion::Break(_) | Completion::Continue(_) => {
                Err(JsError::internal("break or continue escaped a function body"))
            }
        }
    }

    /// `arguments`: the actual arguments by index, plus `length` and
    /// `callee`. It is a snapshot; writing to it does not rebind the
    /// parameters.
    fn create_arguments(&self, callee: &ObjectRef, args: &[JsValue]) -> ObjectRef {
        let arguments = Ordinary::new(
            Some(self.protos.object.cheap_clone() as ObjectRef),
            ExoticObject::Arguments,
        );
        for (index, arg) in args.iter().enumerate() {
            arguments.define_property(
                PropertyKey::from(index as u32),
                Property::hidden(arg.cheap_clone()),
            );
        }
        arguments.define_property(
            self.keys.length.cheap_clone(),
            Property::hidden(JsValue::from(args.len() as u32)),
        );
        arguments.define_property(
            self.keys.callee.cheap_clone(),
            Property::hidden(JsValue::Object(callee.cheap_clone())),
        );
        arguments
    }

    /// `new f(...)` for a script function: a fresh object inheriting from
    /// `f.prototype` is `this`; an object returned by the body replaces it.
    pub(crate) fn construct_interpreted(
        &mut self,
        callee: &ObjectRef,
        func: &InterpretedFunction,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let prototype = match callee.get_property(&self.keys.prototype) {
            JsValue::Object(prototype) => prototype,
            _ => self.protos.object.cheap_clone(),
        };
        let object: ObjectRef = Ordinary::new(Some(prototype), ExoticObject::Ordinary);
        let result = self.call_interpreted(callee, func, JsValue::Object(object.cheap_clone()), args)?;
        if result.is_object() {
            Ok(result)
        } else {
            Ok(JsValue::Object(object))
        }
    }

    /// Instantiate hoisted declarations in the current variable object.
    /// Function declarations replace existing bindings; `var` names only
    /// create missing ones. Only eval code creates deletable bindings.
    pub(crate) fn declare(&mut self, declarations: &Declarations, deletable: bool) {
        let variables = self.context.variables.cheap_clone();
        let define = |key: &PropertyKey, value: JsValue| match variables.as_ordinary() {
            Some(target) => target.define_property(
                key.cheap_clone(),
                Property::with_attributes(value, true, true, deletable),
            ),
            None => variables.put_property(key, value),
        };

        for code in &declarations.functions {
            let Some(name) = &code.name else {
                continue;
            };
            let function = self.create_function(code, Rc::clone(&self.context.scope));
            define(name, JsValue::Object(function));
        }

        for name in &declarations.vars {
            let exists = match variables.as_ordinary() {
                Some(target) => target.has_own_property(name),
                None => variables.has_property(name),
            };
            if !exists {
                define(name, JsValue::Undefined);
            }
        }
    }

    /// `eval(text)`: run `text` in the caller's scope chain, `this` and
    /// variable object. Errors carry an extra frame for the eval source.
    pub(crate) fn eval_code(&mut self, text: &str) -> Result<JsValue, JsError> {
        let source = EvalSource::nested(&self.context.source, SourceKind::Eval);
        let _span = debug_span!("eval", source = %source).entered();

        let result = self.parse(text).and_then(|program| {
            let context = ExecutionContext {
                source: Rc::clone(&source),
                ..self.context.clone()
            };
            let mut guard = self.enter(context);
            guard.declare(&program.declarations, true);
            guard
                .execute_statements(&program.body)
                .and_then(Completion::into_program_value)
        });
        result.map_err(|mut err| {
            err.push_frame(&source);
            err
        })
    }
}
