//! An embeddable tree-walking evaluator for an ECMAScript-like language
//!
//! # Example
//!
//! ```
//! use eswalk::{Evaluator, JsValue};
//!
//! let mut evaluator = Evaluator::new();
//! let result = evaluator.eval("var x = 2; function f(a) { return a * x; } f(5);").unwrap();
//! assert_eq!(result, JsValue::Number(10.0));
//! ```
//!
//! Hosts extend the global environment with native functions:
//!
//! ```
//! use eswalk::{Evaluator, JsError, JsValue};
//!
//! fn double(ev: &mut Evaluator, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
//!     let n = ev.to_number(args.first().unwrap_or(&JsValue::Undefined))?;
//!     Ok(JsValue::Number(n * 2.0))
//! }
//!
//! let mut evaluator = Evaluator::new();
//! evaluator.define_native("double", 1, double);
//! assert_eq!(evaluator.eval("double(21)").unwrap(), JsValue::Number(42.0));
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod source;
pub mod string_dict;
pub mod value;

pub use ast::Program;
pub use config::EvaluatorOptions;
pub use error::{ErrorKind, Frame, JsError};
pub use interpreter::{CancelToken, Evaluator, Extension};
pub use object::{Hint, JsObject, NativeFn, ObjectRef, Ordinary, Property};
pub use source::{EvalSource, SourceKind};
pub use value::{CheapClone, JsString, JsValue, PropertyKey};
