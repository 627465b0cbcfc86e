//! Host-facing API: natives, globals, host calls, extensions and options

use std::cell::RefCell;
use std::rc::Rc;

use eswalk::{
    EvalSource, Evaluator, EvaluatorOptions, Extension, JsError, JsObject, JsValue, ObjectRef,
    Property, PropertyKey,
};

fn double(evaluator: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let n = evaluator.to_number(args.first().unwrap_or(&JsValue::Undefined))?;
    Ok(JsValue::Number(n * 2.0))
}

fn fail(_evaluator: &mut Evaluator, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Err(JsError::type_error("host refused"))
}

fn receiver_kind(_evaluator: &mut Evaluator, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::from(this.type_of()))
}

#[test]
fn test_define_native() {
    let mut evaluator = Evaluator::new();
    evaluator.define_native("double", 1, double);
    assert_eq!(evaluator.eval("double(21)").unwrap(), JsValue::Number(42.0));
    assert_eq!(evaluator.eval("double.length").unwrap(), JsValue::Number(1.0));
    assert_eq!(evaluator.eval("typeof double").unwrap(), JsValue::from("function"));
}

#[test]
fn test_native_errors_are_catchable() {
    let mut evaluator = Evaluator::new();
    evaluator.define_native("fail", 0, fail);
    assert_eq!(
        evaluator
            .eval("try { fail(); } catch (e) { e.name + ': ' + e.message; }")
            .unwrap(),
        JsValue::from("TypeError: host refused")
    );
}

#[test]
fn test_register_method_on_host_object() {
    let mut evaluator = Evaluator::new();
    let host = evaluator.new_object();
    evaluator.register_method(&host, "kind", receiver_kind, 0);
    let key = evaluator.key("host");
    evaluator.global().put_property(&key, JsValue::Object(host));
    assert_eq!(evaluator.eval("host.kind()").unwrap(), JsValue::from("object"));
    assert_eq!(
        evaluator.eval("var n = 0; for (var k in host) n++; n").unwrap(),
        JsValue::Number(0.0)
    );
}

#[test]
fn test_set_and_get_global() {
    let mut evaluator = Evaluator::new();
    evaluator.set_global("answer", 42);
    evaluator.set_global("greeting", "hi");
    assert_eq!(evaluator.eval("greeting + answer").unwrap(), JsValue::from("hi42"));

    evaluator.eval("var fromScript = [1, 2, 3];").unwrap();
    let value = evaluator.get_global("fromScript");
    let array = value.as_object().unwrap();
    assert_eq!(array.class_name(), "Array");
    assert_eq!(array.get_property(&"length".into()), JsValue::Number(3.0));
}

#[test]
fn test_host_arrays_and_objects() {
    let mut evaluator = Evaluator::new();
    let array = evaluator.new_array(vec![JsValue::from(1), JsValue::from("two")]);
    let object = evaluator.new_object();
    object.define_property("fixed".into(), Property::with_attributes(JsValue::from(1), false, true, false));
    evaluator.set_global("list", JsValue::Object(array));
    evaluator.set_global("config", JsValue::Object(object));

    assert_eq!(evaluator.eval("list.join('-')").unwrap(), JsValue::from("1-two"));
    assert_eq!(
        evaluator.eval("config.fixed = 2; config.fixed").unwrap(),
        JsValue::Number(1.0)
    );
}

#[test]
fn test_call_function_from_host() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval("function greet(name) { return 'hello ' + name + this.suffix; } var suffix = '!';")
        .unwrap();
    let greet = evaluator.get_global("greet");
    let result = evaluator
        .call_function(&greet, JsValue::Undefined, &[JsValue::from("host")])
        .unwrap();
    assert_eq!(result, JsValue::from("hello host!"));
}

#[test]
fn test_evaluate_function_with_receiver() {
    let mut evaluator = Evaluator::new();
    evaluator.eval("function getX() { return this.x; }").unwrap();
    let receiver = evaluator.new_object();
    receiver.put_property(&"x".into(), JsValue::from(7));

    let function = evaluator.get_global("getX");
    let function = function.as_object().unwrap();
    let result = evaluator
        .evaluate_function(function, JsValue::Object(receiver), &[])
        .unwrap();
    assert_eq!(result, JsValue::Number(7.0));
}

#[test]
fn test_call_non_function_from_host_fails() {
    let mut evaluator = Evaluator::new();
    let err = evaluator
        .call_function(&JsValue::from(1), JsValue::Undefined, &[])
        .unwrap_err();
    assert_eq!(err.class_name(), "TypeError");
}

#[test]
fn test_construct_from_host() {
    let mut evaluator = Evaluator::new();
    evaluator.eval("function Point(x, y) { this.x = x; this.y = y; }").unwrap();
    let ctor = evaluator.get_global("Point");
    let point = evaluator
        .construct(&ctor, &[JsValue::from(3), JsValue::from(4)])
        .unwrap();
    evaluator.set_global("p", point);
    assert_eq!(
        evaluator.eval("p.x * p.y + ':' + (p instanceof Point)").unwrap(),
        JsValue::from("12:true")
    );
}

#[test]
fn test_parse_then_evaluate_program() {
    let mut evaluator = Evaluator::new();
    let program = evaluator.parse("var hits = (typeof hits == 'number' ? hits : 0) + 1; hits").unwrap();
    let source = EvalSource::file("counter.js");
    evaluator.evaluate_program(&program, Rc::clone(&source)).unwrap();
    let second = evaluator.evaluate_program(&program, source).unwrap();
    assert_eq!(second, JsValue::Number(2.0));
}

#[test]
fn test_evaluate_with_object_scope() {
    let mut evaluator = Evaluator::new();
    let scope = evaluator.new_object();
    scope.put_property(&"user".into(), JsValue::from("ada"));
    let scope_ref: ObjectRef = scope.clone();

    let program = evaluator.parse("user = user.toUpperCase(); user").unwrap();
    let result = evaluator
        .evaluate_with(&scope_ref, &program, EvalSource::string("template"))
        .unwrap();
    assert_eq!(result, JsValue::from("ADA"));
    assert_eq!(scope.get_property(&"user".into()), JsValue::from("ADA"));
    assert_eq!(evaluator.eval("typeof user").unwrap(), JsValue::from("undefined"));
}

struct Greeter {
    loads: Rc<std::cell::Cell<u32>>,
}

fn greet(_evaluator: &mut Evaluator, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::from("hello"))
}

impl Extension for Greeter {
    fn name(&self) -> &str {
        "greeter"
    }

    fn load(&mut self, evaluator: &mut Evaluator) -> Result<(), JsError> {
        self.loads.set(self.loads.get() + 1);
        evaluator.define_native("greet", 0, greet);
        Ok(())
    }
}

#[test]
fn test_extension_loads_once() {
    let loads = Rc::new(std::cell::Cell::new(0));
    let mut evaluator = Evaluator::new();
    evaluator
        .add_extension(Box::new(Greeter { loads: Rc::clone(&loads) }))
        .unwrap();
    evaluator
        .add_extension(Box::new(Greeter { loads: Rc::clone(&loads) }))
        .unwrap();

    assert_eq!(loads.get(), 1);
    assert!(evaluator.has_extension("greeter"));
    assert_eq!(evaluator.extension_names().collect::<Vec<_>>(), vec!["greeter"]);
    assert_eq!(evaluator.eval("greet()").unwrap(), JsValue::from("hello"));
}

#[test]
fn test_lenient_global_reads() {
    let mut evaluator = Evaluator::with_options(EvaluatorOptions {
        strict_global_reads: false,
        ..EvaluatorOptions::default()
    });
    assert_eq!(evaluator.eval("missing").unwrap(), JsValue::Undefined);
    assert_eq!(evaluator.eval("this.missing").unwrap(), JsValue::Undefined);
}

#[test]
fn test_strict_global_reads_through_this() {
    let mut evaluator = Evaluator::new();
    let err = evaluator.eval("this.missing").unwrap_err();
    assert_eq!(err.class_name(), "ReferenceError");
}

#[test]
fn test_options_from_json() {
    let options: EvaluatorOptions =
        serde_json::from_str(r#"{ "timeout_ms": 500, "max_call_depth": 32 }"#).unwrap();
    assert_eq!(options.timeout_ms, 500);
    assert_eq!(options.max_call_depth, 32);
    assert!(options.strict_global_reads);

    let evaluator = Evaluator::with_options(options.clone());
    assert_eq!(evaluator.options(), &options);
}

#[test]
fn test_options_reject_unknown_fields() {
    let result: Result<EvaluatorOptions, _> = serde_json::from_str(r#"{ "timeout": 5 }"#);
    assert!(result.is_err());
}

/// A host object whose class name collides with the `arguments` class.
struct ArgumentsLookalike {
    properties: RefCell<Vec<(PropertyKey, JsValue)>>,
}

impl JsObject for ArgumentsLookalike {
    fn class_name(&self) -> &str {
        "Arguments"
    }

    fn has_property(&self, key: &PropertyKey) -> bool {
        self.properties.borrow().iter().any(|(k, _)| k == key)
    }

    fn get_property(&self, key: &PropertyKey) -> JsValue {
        self.properties
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    fn put_property(&self, key: &PropertyKey, value: JsValue) {
        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => properties.push((key.clone(), value)),
        }
    }

    fn delete_property(&self, key: &PropertyKey) -> bool {
        self.properties.borrow_mut().retain(|(k, _)| k != key);
        true
    }

    fn enumerate(&self) -> Vec<PropertyKey> {
        self.properties.borrow().iter().map(|(k, _)| k.clone()).collect()
    }
}

#[test]
fn test_host_object_named_arguments_keeps_its_receiver() {
    let mut evaluator = Evaluator::new();
    let host: ObjectRef = Rc::new(ArgumentsLookalike {
        properties: Default::default(),
    });
    evaluator.set_global("lookalike", JsValue::Object(host));
    let value = evaluator
        .eval(
            "lookalike.self = function() { return this; };
             lookalike.self() === lookalike",
        )
        .unwrap();
    assert_eq!(value, JsValue::Boolean(true));
    assert_eq!(
        evaluator.eval("Object.prototype.toString.call(lookalike)").unwrap(),
        JsValue::from("[object Arguments]")
    );
}
