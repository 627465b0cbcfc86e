//! The object capability
//!
//! Every `JsValue::Object` is a handle to something implementing `JsObject`:
//! a property bag that may also be callable. The evaluator never looks
//! inside an object except through this trait, so hosts can expose their
//! own objects next to the built-in `Ordinary` ones.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

use crate::ast::FunctionCode;
use crate::error::JsError;
use crate::interpreter::Evaluator;
use crate::interpreter::scope::ScopeChain;
use crate::source::EvalSource;
use crate::value::{CheapClone, JsString, JsValue, PropertyKey, to_uint32};

/// Shared handle to an object
pub type ObjectRef = Rc<dyn JsObject>;

/// Preferred result type of a ToPrimitive conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    None,
    Number,
    String,
}

/// Native function signature: `(evaluator, this, arguments)`
pub type NativeFn = fn(&mut Evaluator, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// The capability every object value exposes to the evaluator.
///
/// Property reads never fail: a missing property reads as `undefined`.
/// The scope chain decides separately whether an unresolved name is an
/// error.
pub trait JsObject {
    /// Internal class, as shown by `Object.prototype.toString`
    fn class_name(&self) -> &str;

    /// Own or inherited property test
    fn has_property(&self, key: &PropertyKey) -> bool;

    fn get_property(&self, key: &PropertyKey) -> JsValue;

    fn put_property(&self, key: &PropertyKey, value: JsValue);

    /// Returns `false` if the property exists and may not be deleted.
    fn delete_property(&self, key: &PropertyKey) -> bool;

    /// Enumerable property names in enumeration order, own then inherited.
    fn enumerate(&self) -> Vec<PropertyKey>;

    fn is_callable(&self) -> bool {
        false
    }

    fn call(
        &self,
        _evaluator: &mut Evaluator,
        _this: JsValue,
        _args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        Err(JsError::type_error(format!(
            "{} is not a function",
            self.class_name()
        )))
    }

    fn construct(&self, _evaluator: &mut Evaluator, _args: &[JsValue]) -> Result<JsValue, JsError> {
        Err(JsError::type_error(format!(
            "{} is not a constructor",
            self.class_name()
        )))
    }

    /// Call the method stored under `key`. Objects that resolve methods
    /// themselves override this instead of materializing a function value.
    fn call_method(
        &self,
        evaluator: &mut Evaluator,
        this: JsValue,
        key: &PropertyKey,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        match self.get_property(key) {
            JsValue::Object(method) if method.is_callable() => method.call(evaluator, this, args),
            _ => Err(JsError::type_error(format!("{} is not a function", key))),
        }
    }

    /// ToPrimitive for this object. `this` is the handle the call came
    /// through, so `valueOf`/`toString` can receive it.
    fn default_value(
        &self,
        evaluator: &mut Evaluator,
        this: &ObjectRef,
        hint: Hint,
    ) -> Result<JsValue, JsError> {
        evaluator.ordinary_to_primitive(this, hint)
    }

    fn as_ordinary(&self) -> Option<&Ordinary> {
        None
    }

    /// The global object is special for unresolved value reads.
    fn is_global(&self) -> bool {
        false
    }
}

/// Object property with its attributes
#[derive(Clone)]
pub struct Property {
    pub value: JsValue,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    pub fn data(value: JsValue) -> Self {
        Self {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Writable and deletable, but skipped by `for-in` (built-in methods)
    pub fn hidden(value: JsValue) -> Self {
        Self {
            value,
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    pub fn with_attributes(
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            value,
            writable,
            enumerable,
            configurable,
        }
    }
}

/// Code and captured scope of a function written in script
pub struct InterpretedFunction {
    pub name: Option<PropertyKey>,
    pub code: Rc<FunctionCode>,
    pub scope: Rc<ScopeChain>,
    /// Where the function body came from, for error frames
    pub source: Rc<EvalSource>,
}

pub struct NativeFunction {
    pub name: JsString,
    pub arity: u32,
    pub func: NativeFn,
    /// Behaviour under `new`; `None` makes the function a non-constructor
    pub construct: Option<NativeFn>,
}

pub enum JsFunction {
    Interpreted(InterpretedFunction),
    Native(NativeFunction),
}

impl JsFunction {
    pub fn name(&self) -> Option<&str> {
        match self {
            JsFunction::Interpreted(f) => f.name.as_ref().map(|n| n.as_str()),
            JsFunction::Native(f) => Some(f.name.as_str()),
        }
    }
}

/// Exotic object behavior
pub enum ExoticObject {
    Ordinary,
    /// The global object
    Global,
    /// `length` tracks the largest index written
    Array { length: Cell<u32> },
    Function(JsFunction),
    Arguments,
    Boolean(bool),
    Number(f64),
    /// String wrapper: read-only `length` and index properties
    String(JsString),
    Error,
}

type PropertyMap = IndexMap<PropertyKey, Property, FxBuildHasher>;

/// The built-in object implementation: an insertion-ordered property table
/// plus a prototype link.
pub struct Ordinary {
    this_ref: Weak<Ordinary>,
    prototype: RefCell<Option<ObjectRef>>,
    properties: RefCell<PropertyMap>,
    exotic: ExoticObject,
}

impl Ordinary {
    pub fn new(prototype: Option<ObjectRef>, exotic: ExoticObject) -> Rc<Ordinary> {
        Rc::new_cyclic(|this_ref| Ordinary {
            this_ref: this_ref.clone(),
            prototype: RefCell::new(prototype),
            properties: RefCell::new(PropertyMap::default()),
            exotic,
        })
    }

    /// A strong handle to this object
    pub fn handle(&self) -> Option<ObjectRef> {
        self.this_ref.upgrade().map(|rc| rc as ObjectRef)
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.prototype.borrow().clone()
    }

    pub fn set_prototype(&self, prototype: Option<ObjectRef>) {
        *self.prototype.borrow_mut() = prototype;
    }

    pub fn exotic(&self) -> &ExoticObject {
        &self.exotic
    }

    pub fn function(&self) -> Option<&JsFunction> {
        match &self.exotic {
            ExoticObject::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Define or replace an own property, ignoring attributes.
    pub fn define_property(&self, key: PropertyKey, property: Property) {
        self.properties.borrow_mut().insert(key, property);
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.exotic_own(key).is_some() || self.properties.borrow().contains_key(key)
    }

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<Property> {
        if let Some(value) = self.exotic_own(key) {
            let enumerable = key.as_index().is_some();
            return Some(Property::with_attributes(value, false, enumerable, false));
        }
        self.properties.borrow().get(key).cloned()
    }

    /// Own property names, enumerable or not, in insertion order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let mut keys = self.exotic_keys();
        keys.extend(self.properties.borrow().keys().cloned());
        keys
    }

    /// Array length, for array objects
    pub fn array_length(&self) -> Option<u32> {
        match &self.exotic {
            ExoticObject::Array { length } => Some(length.get()),
            _ => None,
        }
    }

    /// Own properties backed by the exotic state rather than the table.
    fn exotic_own(&self, key: &PropertyKey) -> Option<JsValue> {
        match &self.exotic {
            ExoticObject::Array { length } if key.as_str() == "length" => {
                Some(JsValue::from(length.get()))
            }
            ExoticObject::String(s) => {
                if key.as_str() == "length" {
                    return Some(JsValue::Number(s.utf16_len() as f64));
                }
                let index = key.as_index()? as usize;
                let units = s.to_utf16();
                units
                    .get(index)
                    .map(|unit| JsValue::String(JsString::from_utf16(&[*unit])))
            }
            _ => None,
        }
    }

    fn exotic_keys(&self) -> Vec<PropertyKey> {
        match &self.exotic {
            ExoticObject::String(s) => (0..s.utf16_len() as u32).map(PropertyKey::from).collect(),
            _ => Vec::new(),
        }
    }

    fn set_array_length(&self, length: &Cell<u32>, new_length: u32) {
        if new_length < length.get() {
            self.properties
                .borrow_mut()
                .retain(|key, _| key.as_index().is_none_or(|idx| idx < new_length));
        }
        length.set(new_length);
    }
}

impl JsObject for Ordinary {
    fn class_name(&self) -> &str {
        match &self.exotic {
            ExoticObject::Ordinary => "Object",
            ExoticObject::Global => "global",
            ExoticObject::Array { .. } => "Array",
            ExoticObject::Function(_) => "Function",
            ExoticObject::Arguments => "Arguments",
            ExoticObject::Boolean(_) => "Boolean",
            ExoticObject::Number(_) => "Number",
            ExoticObject::String(_) => "String",
            ExoticObject::Error => "Error",
        }
    }

    fn has_property(&self, key: &PropertyKey) -> bool {
        if self.has_own_property(key) {
            return true;
        }
        match self.prototype() {
            Some(proto) => proto.has_property(key),
            None => false,
        }
    }

    fn get_property(&self, key: &PropertyKey) -> JsValue {
        if let Some(value) = self.exotic_own(key) {
            return value;
        }
        if let Some(prop) = self.properties.borrow().get(key) {
            return prop.value.cheap_clone();
        }
        match self.prototype() {
            Some(proto) => proto.get_property(key),
            None => JsValue::Undefined,
        }
    }

    fn put_property(&self, key: &PropertyKey, value: JsValue) {
        match &self.exotic {
            ExoticObject::String(_) if self.exotic_own(key).is_some() => return,
            ExoticObject::Array { length } => {
                if key.as_str() == "length" {
                    let n = value.to_number();
                    let new_length = to_uint32(n);
                    if new_length as f64 == n {
                        self.set_array_length(length, new_length);
                    }
                    return;
                }
                if let Some(idx) = key.as_index() {
                    if idx >= length.get() {
                        length.set(idx + 1);
                    }
                }
            }
            _ => {}
        }

        let mut properties = self.properties.borrow_mut();
        if let Some(prop) = properties.get_mut(key) {
            if prop.writable {
                prop.value = value;
            }
        } else {
            properties.insert(key.cheap_clone(), Property::data(value));
        }
    }

    fn delete_property(&self, key: &PropertyKey) -> bool {
        if self.exotic_own(key).is_some() {
            return false;
        }
        let mut properties = self.properties.borrow_mut();
        match properties.get(key) {
            Some(prop) if !prop.configurable => false,
            Some(_) => {
                properties.shift_remove(key);
                true
            }
            None => true,
        }
    }

    fn enumerate(&self) -> Vec<PropertyKey> {
        let mut seen: IndexSet<PropertyKey, FxBuildHasher> = IndexSet::default();
        let mut keys = Vec::new();

        for key in self.exotic_keys() {
            seen.insert(key.cheap_clone());
            keys.push(key);
        }
        for (key, prop) in self.properties.borrow().iter() {
            seen.insert(key.cheap_clone());
            if prop.enumerable {
                keys.push(key.cheap_clone());
            }
        }

        // Inherited names not shadowed by an own property
        if let Some(proto) = self.prototype() {
            for key in proto.enumerate() {
                if seen.insert(key.cheap_clone()) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    fn call(
        &self,
        evaluator: &mut Evaluator,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        match &self.exotic {
            ExoticObject::Function(JsFunction::Interpreted(func)) => {
                let callee = self
                    .handle()
                    .ok_or_else(|| JsError::internal("function called after release"))?;
                evaluator.call_interpreted(&callee, func, this, args)
            }
            ExoticObject::Function(JsFunction::Native(native)) => evaluator.call_native(native.func, this, args),
            _ => Err(JsError::type_error(format!(
                "{} is not a function",
                self.class_name()
            ))),
        }
    }

    fn construct(&self, evaluator: &mut Evaluator, args: &[JsValue]) -> Result<JsValue, JsError> {
        match &self.exotic {
            ExoticObject::Function(JsFunction::Interpreted(func)) => {
                let callee = self
                    .handle()
                    .ok_or_else(|| JsError::internal("function called after release"))?;
                evaluator.construct_interpreted(&callee, func, args)
            }
            ExoticObject::Function(JsFunction::Native(NativeFunction {
                construct: Some(construct),
                ..
            })) => evaluator.call_native(*construct, JsValue::Undefined, args),
            ExoticObject::Function(f) => Err(JsError::type_error(format!(
                "{} is not a constructor",
                f.name().unwrap_or("anonymous")
            ))),
            _ => Err(JsError::type_error(format!(
                "{} is not a constructor",
                self.class_name()
            ))),
        }
    }

    fn as_ordinary(&self) -> Option<&Ordinary> {
        Some(self)
    }

    fn is_global(&self) -> bool {
        matches!(self.exotic, ExoticObject::Global)
    }
}
