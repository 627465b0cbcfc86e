//! The evaluator
//!
//! A tree-walking evaluator over the AST produced by `parser`. One
//! `Evaluator` owns a global object, the built-in prototypes, the active
//! execution context and the loaded extensions. Public entry points take
//! `&mut self`, so a single evaluator can only run one evaluation at a
//! time; nested passes (`eval`, callbacks from native functions) re-enter
//! on the same call stack.

pub mod builtins;
mod expr;
mod function;
mod ops;
pub mod scope;
mod stmt;

use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, trace};

use crate::ast::Program;
use crate::config::EvaluatorOptions;
use crate::error::JsError;
use crate::object::{ExoticObject, JsObject, NativeFn, ObjectRef, Ordinary, Property};
use crate::parser::Parser;
use crate::source::EvalSource;
use crate::string_dict::StringDict;
use crate::value::{CheapClone, JsValue, PropertyKey};

pub use scope::ScopeChain;
pub(crate) use stmt::Completion;

/// Remaining stack below which a recursion point switches to a fresh
/// segment, and the size of that segment.
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024;
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

// ═══════════════════════════════════════════════════════════════
// Execution context
// ═══════════════════════════════════════════════════════════════

/// Where the code currently running resolves names, what `this` is, where
/// `var` declarations land and which source it came from.
#[derive(Clone)]
pub(crate) struct ExecutionContext {
    pub(crate) scope: Rc<ScopeChain>,
    pub(crate) this: JsValue,
    pub(crate) variables: ObjectRef,
    pub(crate) source: Rc<EvalSource>,
}

/// Restores the previous execution context when dropped, so every scope a
/// construct enters is left again on every exit path, errors included.
pub(crate) struct ContextGuard<'a> {
    evaluator: &'a mut Evaluator,
    saved: Option<ExecutionContext>,
    counts_call: bool,
}

impl Deref for ContextGuard<'_> {
    type Target = Evaluator;

    fn deref(&self) -> &Evaluator {
        self.evaluator
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Evaluator {
        self.evaluator
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            trace!(depth = saved.scope.depth(), "restore scope");
            self.evaluator.context = saved;
        }
        if self.counts_call {
            self.evaluator.call_depth -= 1;
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Cancellation
// ═══════════════════════════════════════════════════════════════

/// Cooperative cancellation handle.
///
/// Each top-level evaluation records the token's generation when it starts.
/// Bumping the generation from any thread makes the next loop iteration or
/// function entry of that evaluation fail with a timeout error.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    generation: Arc<AtomicU64>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon whatever evaluation currently owns this token.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

// ═══════════════════════════════════════════════════════════════
// Extensions
// ═══════════════════════════════════════════════════════════════

/// A bundle of host functionality installed into an evaluator's globals.
pub trait Extension {
    fn name(&self) -> &str;

    fn load(&mut self, evaluator: &mut Evaluator) -> Result<(), JsError>;
}

// ═══════════════════════════════════════════════════════════════
// Evaluator
// ═══════════════════════════════════════════════════════════════

/// Built-in prototype objects
pub(crate) struct Prototypes {
    pub(crate) object: Rc<Ordinary>,
    pub(crate) function: Rc<Ordinary>,
    pub(crate) array: Rc<Ordinary>,
    pub(crate) string: Rc<Ordinary>,
    pub(crate) number: Rc<Ordinary>,
    pub(crate) boolean: Rc<Ordinary>,
    pub(crate) error: Rc<Ordinary>,
    /// `TypeError.prototype` and friends, by constructor name
    pub(crate) native_errors: FxHashMap<&'static str, Rc<Ordinary>>,
}

/// Keys the evaluator itself reads and writes
pub(crate) struct WellKnownKeys {
    pub(crate) length: PropertyKey,
    pub(crate) prototype: PropertyKey,
    pub(crate) constructor: PropertyKey,
    pub(crate) to_string: PropertyKey,
    pub(crate) value_of: PropertyKey,
    pub(crate) arguments: PropertyKey,
    pub(crate) callee: PropertyKey,
    pub(crate) message: PropertyKey,
    pub(crate) name: PropertyKey,
}

impl WellKnownKeys {
    fn new(dict: &mut StringDict) -> Self {
        Self {
            length: dict.get_or_insert("length"),
            prototype: dict.get_or_insert("prototype"),
            constructor: dict.get_or_insert("constructor"),
            to_string: dict.get_or_insert("toString"),
            value_of: dict.get_or_insert("valueOf"),
            arguments: dict.get_or_insert("arguments"),
            callee: dict.get_or_insert("callee"),
            message: dict.get_or_insert("message"),
            name: dict.get_or_insert("name"),
        }
    }
}

/// The evaluator state
pub struct Evaluator {
    global: Rc<Ordinary>,
    pub(crate) protos: Prototypes,
    pub(crate) context: ExecutionContext,
    pub(crate) keys: WellKnownKeys,
    string_dict: StringDict,
    extensions: IndexMap<String, Box<dyn Extension>>,
    options: EvaluatorOptions,

    // Cancellation and budgets for the evaluation in flight
    cancel: CancelToken,
    owner: u64,
    started: Option<Instant>,
    active_passes: u32,
    pub(crate) call_depth: usize,
}

impl Evaluator {
    /// Create an evaluator with default options and all built-ins installed.
    pub fn new() -> Self {
        Self::with_options(EvaluatorOptions::default())
    }

    pub fn with_options(options: EvaluatorOptions) -> Self {
        let mut string_dict = StringDict::with_common_strings();
        let keys = WellKnownKeys::new(&mut string_dict);

        let object = Ordinary::new(None, ExoticObject::Ordinary);
        let proto_of = |o: &Rc<Ordinary>| Some(o.cheap_clone() as ObjectRef);
        let function = builtins::function::create_function_prototype(proto_of(&object));
        let protos = Prototypes {
            array: Ordinary::new(
                proto_of(&object),
                ExoticObject::Array {
                    length: Default::default(),
                },
            ),
            string: Ordinary::new(proto_of(&object), ExoticObject::String("".into())),
            number: Ordinary::new(proto_of(&object), ExoticObject::Number(0.0)),
            boolean: Ordinary::new(proto_of(&object), ExoticObject::Boolean(false)),
            error: Ordinary::new(proto_of(&object), ExoticObject::Ordinary),
            native_errors: FxHashMap::default(),
            function,
            object,
        };

        let global = Ordinary::new(proto_of(&protos.object), ExoticObject::Global);
        let global_ref: ObjectRef = global.cheap_clone();
        let context = ExecutionContext {
            scope: ScopeChain::global(global_ref.cheap_clone()),
            this: JsValue::Object(global_ref.cheap_clone()),
            variables: global_ref,
            source: EvalSource::string(""),
        };

        let cancel = CancelToken::new();
        let owner = cancel.generation();
        let mut evaluator = Self {
            global,
            protos,
            context,
            keys,
            string_dict,
            extensions: IndexMap::new(),
            options,
            cancel,
            owner,
            started: None,
            active_passes: 0,
            call_depth: 0,
        };
        builtins::install(&mut evaluator);
        evaluator
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Set the execution timeout in milliseconds
    ///
    /// Default is 3000ms (3 seconds). Set to 0 to disable timeout.
    pub fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.options.timeout_ms = timeout_ms;
    }

    pub fn timeout_ms(&self) -> u64 {
        self.options.timeout_ms
    }

    /// A handle another thread can use to cancel evaluations of this
    /// evaluator.
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn global(&self) -> ObjectRef {
        self.global.cheap_clone()
    }

    pub(crate) fn global_ordinary(&self) -> &Rc<Ordinary> {
        &self.global
    }

    pub(crate) fn global_value(&self) -> JsValue {
        JsValue::Object(self.global.cheap_clone())
    }

    pub fn object_prototype(&self) -> ObjectRef {
        self.protos.object.cheap_clone()
    }

    pub fn function_prototype(&self) -> ObjectRef {
        self.protos.function.cheap_clone()
    }

    /// Intern a property name.
    pub fn key(&mut self, name: &str) -> PropertyKey {
        self.string_dict.get_or_insert(name)
    }

    pub fn get_global(&mut self, name: &str) -> JsValue {
        let key = self.key(name);
        self.global.get_property(&key)
    }

    pub fn set_global(&mut self, name: &str, value: impl Into<JsValue>) {
        let key = self.key(name);
        self.global.put_property(&key, value.into());
    }

    /// Define a global native function.
    pub fn define_native(&mut self, name: &str, arity: u32, func: NativeFn) -> ObjectRef {
        let global = self.global.cheap_clone();
        self.register_method(&global, name, func, arity)
    }

    /// Create a plain object inheriting from `Object.prototype`.
    pub fn new_object(&self) -> Rc<Ordinary> {
        Ordinary::new(
            Some(self.protos.object.cheap_clone() as ObjectRef),
            ExoticObject::Ordinary,
        )
    }

    /// Create an array holding `elements`.
    pub fn new_array(&self, elements: Vec<JsValue>) -> Rc<Ordinary> {
        let array = Ordinary::new(
            Some(self.protos.array.cheap_clone() as ObjectRef),
            ExoticObject::Array {
                length: Default::default(),
            },
        );
        for (i, element) in elements.into_iter().enumerate() {
            array.put_property(&PropertyKey::from(i as u32), element);
        }
        array
    }

    /// Load an extension unless one with the same name is already loaded.
    pub fn add_extension(&mut self, mut extension: Box<dyn Extension>) -> Result<(), JsError> {
        let name = extension.name().to_string();
        if self.extensions.contains_key(&name) {
            return Ok(());
        }
        extension.load(self)?;
        debug!(extension = %name, "extension loaded");
        self.extensions.insert(name, extension);
        Ok(())
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Names of loaded extensions in load order
    pub fn extension_names(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }

    // ═══════════════════════════════════════════════════════════════
    // Entry points
    // ═══════════════════════════════════════════════════════════════

    /// Parse source text into a program.
    pub fn parse(&mut self, source: &str) -> Result<Program, JsError> {
        Parser::new(source, &mut self.string_dict).parse_program()
    }

    /// Parse and evaluate a program given as a string.
    pub fn eval(&mut self, source: &str) -> Result<JsValue, JsError> {
        let origin = EvalSource::string(source);
        self.eval_source(source, origin)
    }

    /// Parse and evaluate a program read from `path`; frames name the file.
    pub fn eval_file_source(&mut self, path: impl AsRef<Path>, text: &str) -> Result<JsValue, JsError> {
        let origin = EvalSource::file(path.as_ref());
        self.eval_source(text, origin)
    }

    /// Parse and evaluate `text`, attributing it to `origin`.
    pub fn eval_source(&mut self, text: &str, origin: Rc<EvalSource>) -> Result<JsValue, JsError> {
        let program = match self.parse(text) {
            Ok(program) => program,
            Err(mut err) => {
                err.push_frame(&origin);
                return Err(err);
            }
        };
        self.evaluate_program(&program, origin)
    }

    /// Evaluate a program in the global scope: hoist its declarations, run
    /// its statements and return the value of the last one that produced
    /// a value.
    pub fn evaluate_program(
        &mut self,
        program: &Program,
        source: Rc<EvalSource>,
    ) -> Result<JsValue, JsError> {
        let _span = debug_span!("program", source = %source).entered();
        let global: ObjectRef = self.global.cheap_clone();
        let context = ExecutionContext {
            scope: ScopeChain::global(global.cheap_clone()),
            this: JsValue::Object(global.cheap_clone()),
            variables: global,
            source: Rc::clone(&source),
        };

        self.run_pass(|evaluator| {
            let mut guard = evaluator.enter(context);
            guard.declare(&program.declarations, false);
            let completion = guard.execute_statements(&program.body)?;
            Completion::into_program_value(completion)
        })
        .map_err(|mut err| {
            err.push_frame(&source);
            err
        })
    }

    /// Evaluate a program's statements with `object` as an extra innermost
    /// scope, as a `with (object)` block around it would.
    pub fn evaluate_with(
        &mut self,
        object: &ObjectRef,
        program: &Program,
        source: Rc<EvalSource>,
    ) -> Result<JsValue, JsError> {
        let _span = debug_span!("with", source = %source).entered();
        let global: ObjectRef = self.global.cheap_clone();
        let root = ScopeChain::global(global.cheap_clone());
        let context = ExecutionContext {
            scope: ScopeChain::push(&root, object.cheap_clone()),
            this: JsValue::Object(global.cheap_clone()),
            variables: global,
            source: Rc::clone(&source),
        };

        self.run_pass(|evaluator| {
            let mut guard = evaluator.enter(context);
            guard.declare(&program.declarations, false);
            let completion = guard.execute_statements(&program.body)?;
            Completion::into_program_value(completion)
        })
        .map_err(|mut err| {
            err.push_frame(&source);
            err
        })
    }

    /// Call a function value from the host.
    pub fn call_function(
        &mut self,
        function: &JsValue,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        self.run_pass(|evaluator| evaluator.call_value(function, this, args))
    }

    /// Call a function object from the host.
    pub fn evaluate_function(
        &mut self,
        function: &ObjectRef,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        self.run_pass(|evaluator| function.call(evaluator, this, args))
    }

    /// `new ctor(...args)` from the host.
    pub fn construct(&mut self, ctor: &JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
        self.run_pass(|evaluator| evaluator.construct_value(ctor, args))
    }

    /// Run one evaluation pass. The outermost pass claims the cancel token
    /// and starts the clock; nested passes share them.
    fn run_pass<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, JsError>,
    ) -> Result<T, JsError> {
        if self.active_passes == 0 {
            self.owner = self.cancel.generation();
            self.started = Some(Instant::now());
        }
        self.active_passes += 1;
        let result = f(self);
        self.active_passes -= 1;
        if self.active_passes == 0 {
            self.started = None;
        }
        result
    }

    /// The cooperative preemption point, reached at every loop iteration
    /// and function entry.
    pub(crate) fn checkpoint(&self) -> Result<(), JsError> {
        let elapsed_ms = || {
            self.started
                .map(|started| started.elapsed().as_millis() as u64)
                .unwrap_or(0)
        };

        if self.cancel.generation() != self.owner {
            let elapsed = elapsed_ms();
            debug!(elapsed_ms = elapsed, "evaluation cancelled");
            return Err(JsError::timeout(self.options.timeout_ms, elapsed, true));
        }

        if self.options.timeout_ms > 0 {
            let elapsed = elapsed_ms();
            if elapsed > self.options.timeout_ms {
                debug!(elapsed_ms = elapsed, "evaluation timed out");
                return Err(JsError::timeout(self.options.timeout_ms, elapsed, false));
            }
        }
        Ok(())
    }

    /// Switch to `context` until the guard is dropped.
    pub(crate) fn enter(&mut self, context: ExecutionContext) -> ContextGuard<'_> {
        let saved = std::mem::replace(&mut self.context, context);
        ContextGuard {
            evaluator: self,
            saved: Some(saved),
            counts_call: false,
        }
    }

    pub(crate) fn check_call_depth(&self) -> Result<(), JsError> {
        if self.call_depth >= self.options.max_call_depth {
            return Err(JsError::range_error("Maximum call stack size exceeded"));
        }
        Ok(())
    }

    /// Like `enter`, also counting one level of function-call depth.
    pub(crate) fn enter_call(
        &mut self,
        context: ExecutionContext,
    ) -> Result<ContextGuard<'_>, JsError> {
        self.check_call_depth()?;
        self.call_depth += 1;
        let mut guard = self.enter(context);
        guard.counts_call = true;
        Ok(guard)
    }

    /// Count one level of call depth for a native function, which runs in
    /// its caller's context.
    pub(crate) fn enter_native_call(&mut self) -> Result<ContextGuard<'_>, JsError> {
        self.check_call_depth()?;
        self.call_depth += 1;
        Ok(ContextGuard {
            evaluator: self,
            saved: None,
            counts_call: true,
        })
    }

    /// Push `object` as the innermost scope until the guard is dropped.
    pub(crate) fn push_scope(&mut self, object: ObjectRef) -> ContextGuard<'_> {
        let context = ExecutionContext {
            scope: ScopeChain::push(&self.context.scope, object),
            ..self.context.clone()
        };
        self.enter(context)
    }

    /// Create a native function object.
    pub fn create_native_function(
        &self,
        name: &str,
        func: NativeFn,
        arity: u32,
        construct: Option<NativeFn>,
    ) -> Rc<Ordinary> {
        let function = Ordinary::new(
            Some(self.protos.function.cheap_clone() as ObjectRef),
            ExoticObject::Function(crate::object::JsFunction::Native(
                crate::object::NativeFunction {
                    name: name.into(),
                    arity,
                    func,
                    construct,
                },
            )),
        );
        function.define_property(
            self.keys.length.cheap_clone(),
            Property::with_attributes(JsValue::from(arity), false, false, false),
        );
        function
    }

    /// Define a native method on `target`, hidden from `for-in`.
    pub fn register_method(
        &mut self,
        target: &Rc<Ordinary>,
        name: &str,
        func: NativeFn,
        arity: u32,
    ) -> ObjectRef {
        let function: ObjectRef = self.create_native_function(name, func, arity, None);
        let key = self.key(name);
        target.define_property(key, Property::hidden(JsValue::Object(function.cheap_clone())));
        function
    }

    /// Define a native constructor on the global object and link it with
    /// its prototype.
    pub(crate) fn register_constructor(
        &mut self,
        name: &str,
        call: NativeFn,
        construct: NativeFn,
        arity: u32,
        prototype: &Rc<Ordinary>,
    ) -> Rc<Ordinary> {
        let ctor = self.create_native_function(name, call, arity, Some(construct));
        ctor.define_property(
            self.keys.prototype.cheap_clone(),
            Property::with_attributes(
                JsValue::Object(prototype.cheap_clone()),
                false,
                false,
                false,
            ),
        );
        prototype.define_property(
            self.keys.constructor.cheap_clone(),
            Property::hidden(JsValue::Object(ctor.cheap_clone())),
        );
        let key = self.key(name);
        self.global
            .define_property(key, Property::hidden(JsValue::Object(ctor.cheap_clone())));
        ctor
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
