//! Function constructor and Function.prototype methods

use std::rc::Rc;

use super::{arg, index_key, length_of};
use crate::error::JsError;
use crate::interpreter::{Evaluator, ScopeChain};
use crate::object::{ExoticObject, JsFunction, NativeFunction, ObjectRef, Ordinary};
use crate::value::{CheapClone, JsValue};

/// `Function.prototype` is itself a function that accepts anything and
/// returns `undefined`.
pub(crate) fn create_function_prototype(object_prototype: Option<ObjectRef>) -> Rc<Ordinary> {
    Ordinary::new(
        object_prototype,
        ExoticObject::Function(JsFunction::Native(NativeFunction {
            name: "".into(),
            arity: 0,
            func: function_prototype_call,
            construct: None,
        })),
    )
}

pub(crate) fn install(evaluator: &mut Evaluator) {
    let proto = evaluator.protos.function.cheap_clone();
    evaluator.register_constructor(
        "Function",
        function_constructor,
        function_constructor,
        1,
        &proto,
    );

    evaluator.register_method(&proto, "call", function_call, 1);
    evaluator.register_method(&proto, "apply", function_apply, 2);
    evaluator.register_method(&proto, "toString", function_to_string, 0);
}

fn function_prototype_call(
    _evaluator: &mut Evaluator,
    _this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Undefined)
}

/// `Function(p1, ..., pn, body)`: compile a function in the global scope.
pub fn function_constructor(
    evaluator: &mut Evaluator,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let (body, params) = match args.split_last() {
        Some((body, params)) => (evaluator.to_string(body)?.to_string(), params),
        None => (String::new(), args),
    };
    let mut names = Vec::with_capacity(params.len());
    for param in params {
        names.push(evaluator.to_string(param)?.to_string());
    }

    let text = format!("function anonymous({}) {{\n{}\n}}", names.join(","), body);
    let program = evaluator.parse(&text)?;
    let Some(code) = program.declarations.functions.first() else {
        return Err(JsError::internal("function source did not declare a function"));
    };
    let scope = ScopeChain::global(evaluator.global());
    Ok(JsValue::Object(evaluator.create_function(code, scope)))
}

/// `f.call(thisArg, ...args)`
pub fn function_call(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let this_arg = arg(args, 0);
    let rest = args.get(1..).unwrap_or_default();
    evaluator.call_value(&this, this_arg, rest)
}

/// `f.apply(thisArg, argArray)`
pub fn function_apply(
    evaluator: &mut Evaluator,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let this_arg = arg(args, 0);
    let call_args = match arg(args, 1) {
        JsValue::Undefined | JsValue::Null => Vec::new(),
        JsValue::Object(list) => {
            let length = length_of(evaluator, &*list)?;
            (0..length)
                .map(|i| list.get_property(&index_key(i)))
                .collect()
        }
        _ => {
            return Err(JsError::type_error(
                "second argument to Function.prototype.apply must be an array",
            ));
        }
    };
    evaluator.call_value(&this, this_arg, &call_args)
}

pub fn function_to_string(
    _evaluator: &mut Evaluator,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let function = this
        .as_object()
        .and_then(|object| object.as_ordinary())
        .and_then(|ordinary| ordinary.function())
        .ok_or_else(|| JsError::type_error("Function.prototype.toString called on non-function"))?;

    let text = match function {
        JsFunction::Interpreted(f) => {
            let params: Vec<&str> = f.code.params.iter().map(|p| p.as_str()).collect();
            format!(
                "function {}({}) {{ [script code] }}",
                function.name().unwrap_or("anonymous"),
                params.join(", ")
            )
        }
        JsFunction::Native(f) => format!("function {}() {{ [native code] }}", f.name),
    };
    Ok(JsValue::from(text))
}
