//! Scope chain and references
//!
//! A scope chain is a linked list of objects searched innermost first; the
//! outermost link is always the global object. Identifier lookup asks each
//! object's `has_property` in turn. A name no scope knows resolves to a
//! `Reference` with no base, which is an error to read but a valid target
//! for assignment, `typeof` and `delete`.

use std::rc::Rc;

use tracing::trace;

use super::Evaluator;
use crate::error::JsError;
use crate::object::{JsObject, ObjectRef};
use crate::value::{CheapClone, JsValue, PropertyKey};

/// One link of a scope chain
pub struct ScopeChain {
    object: ObjectRef,
    parent: Option<Rc<ScopeChain>>,
}

impl ScopeChain {
    /// The outermost chain, holding only the global object.
    pub(crate) fn global(global: ObjectRef) -> Rc<Self> {
        Rc::new(Self {
            object: global,
            parent: None,
        })
    }

    /// A chain with `object` searched before everything in `parent`.
    pub(crate) fn push(parent: &Rc<ScopeChain>, object: ObjectRef) -> Rc<Self> {
        trace!(class = object.class_name(), "push scope");
        Rc::new(Self {
            object,
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn parent(&self) -> Option<&Rc<ScopeChain>> {
        self.parent.as_ref()
    }

    /// Iterate scope objects from innermost to outermost.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        std::iter::successors(Some(self), |link| link.parent.as_deref()).map(|link| &link.object)
    }

    /// The innermost scope object that has `key`.
    pub fn find(&self, key: &PropertyKey) -> Option<&ObjectRef> {
        self.objects().find(|object| object.has_property(key))
    }

    pub fn depth(&self) -> usize {
        self.objects().count()
    }
}

/// An unresolved `base.key` pair: the target of assignment, `delete`,
/// `typeof` and `++`/`--`. A missing base means no scope had the name.
pub(crate) struct Reference {
    pub(crate) base: Option<ObjectRef>,
    pub(crate) key: PropertyKey,
}

impl Evaluator {
    pub(crate) fn resolve_reference(&self, key: &PropertyKey) -> Reference {
        Reference {
            base: self.context.scope.find(key).map(CheapClone::cheap_clone),
            key: key.cheap_clone(),
        }
    }

    /// Read a name through the scope chain.
    pub(crate) fn resolve_value(&self, key: &PropertyKey) -> Result<JsValue, JsError> {
        match self.context.scope.find(key) {
            Some(object) => Ok(object.get_property(key)),
            None => self.unresolved(key),
        }
    }

    fn unresolved(&self, key: &PropertyKey) -> Result<JsValue, JsError> {
        if self.options.strict_global_reads {
            Err(JsError::reference_error(key))
        } else {
            Ok(JsValue::Undefined)
        }
    }

    /// Read `key` from an object, applying the global object's strict
    /// lookup rule.
    pub(crate) fn read_property(
        &self,
        object: &ObjectRef,
        key: &PropertyKey,
    ) -> Result<JsValue, JsError> {
        if object.is_global() && !object.has_property(key) {
            return self.unresolved(key);
        }
        Ok(object.get_property(key))
    }

    pub(crate) fn get_value(&self, reference: &Reference) -> Result<JsValue, JsError> {
        match &reference.base {
            Some(object) => self.read_property(object, &reference.key),
            None => self.unresolved(&reference.key),
        }
    }

    /// Assign through a reference. Unresolved names become properties of
    /// the global object.
    pub(crate) fn put_value(&self, reference: &Reference, value: JsValue) {
        match &reference.base {
            Some(object) => object.put_property(&reference.key, value),
            None => self.global.put_property(&reference.key, value),
        }
    }

    /// Call the function named `key`, found by walking the scope chain,
    /// without materializing a reference. `this` is the global object
    /// whichever scope supplied the function.
    pub(crate) fn call_by_name(
        &mut self,
        key: &PropertyKey,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let scope = Rc::clone(&self.context.scope);
        match scope.find(key) {
            Some(object) => {
                let this = self.global_value();
                object.call_method(self, this, key, args)
            }
            None if self.options.strict_global_reads => Err(JsError::reference_error(key)),
            None => Err(JsError::type_error(format!("{} is not a function", key))),
        }
    }
}
