//! Error types for the evaluator
//!
//! Every failure is a `JsError`: an `ErrorKind` plus the chain of
//! source-location frames appended as the failure unwinds through nested
//! program, function and eval passes.

use std::fmt;

use thiserror::Error;

use crate::source::EvalSource;
use crate::value::JsValue;

/// One entry of the evaluation backtrace
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub line: u32,
    pub source: String,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    at {} (line {})", self.source, self.line)
    }
}

/// What went wrong
#[derive(Debug, Clone, Error)]
pub enum ErrorKind {
    #[error("TypeError: {0}")]
    Type(String),

    #[error("ReferenceError: {0}")]
    Reference(String),

    #[error("RangeError: {0}")]
    Range(String),

    #[error("SyntaxError: {message} at {line}:{column}")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("EvalError: {0}")]
    Eval(String),

    /// A value raised by a `throw` statement. `message` is the value's
    /// string form captured when it was thrown.
    #[error("Uncaught {message}")]
    Thrown { value: JsValue, message: String },

    /// The evaluation was cancelled or ran past its time budget.
    #[error("Timeout: evaluation {} after {elapsed_ms}ms", timeout_verb(.cancelled))]
    Timeout {
        timeout_ms: u64,
        elapsed_ms: u64,
        cancelled: bool,
    },

    /// An invariant of the evaluator or of the tree it was handed was broken.
    #[error("InternalError: {0}")]
    Internal(String),
}

/// Main error type for the evaluator
#[derive(Debug, Clone, Error)]
#[error("{kind}{}", format_frames(.frames))]
pub struct JsError {
    kind: ErrorKind,
    frames: Vec<Frame>,
    /// Line of the innermost node that saw this error in the current pass,
    /// consumed when the pass appends its frame.
    pending_line: Option<u32>,
}

fn timeout_verb(cancelled: &bool) -> &'static str {
    if *cancelled { "cancelled" } else { "timed out" }
}

fn format_frames(frames: &[Frame]) -> String {
    frames.iter().map(|frame| format!("\n{}", frame)).collect()
}

impl From<ErrorKind> for JsError {
    fn from(kind: ErrorKind) -> Self {
        JsError {
            kind,
            frames: Vec::new(),
            pending_line: None,
        }
    }
}

impl JsError {
    pub fn type_error(message: impl Into<String>) -> Self {
        ErrorKind::Type(message.into()).into()
    }

    /// `name is not defined`
    pub fn reference_error(name: impl fmt::Display) -> Self {
        ErrorKind::Reference(format!("{} is not defined", name)).into()
    }

    pub fn reference_error_with_message(message: impl Into<String>) -> Self {
        ErrorKind::Reference(message.into()).into()
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        ErrorKind::Range(message.into()).into()
    }

    pub fn eval_error(message: impl Into<String>) -> Self {
        ErrorKind::Eval(message.into()).into()
    }

    /// A parse failure; the first frame attached to it reports `line`.
    pub fn syntax_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        let mut err = JsError::from(ErrorKind::Syntax {
            message: message.into(),
            line,
            column,
        });
        err.pending_line = Some(line);
        err
    }

    pub fn thrown(value: JsValue, message: impl Into<String>) -> Self {
        ErrorKind::Thrown {
            value,
            message: message.into(),
        }
        .into()
    }

    pub fn timeout(timeout_ms: u64, elapsed_ms: u64, cancelled: bool) -> Self {
        ErrorKind::Timeout {
            timeout_ms,
            elapsed_ms,
            cancelled,
        }
        .into()
    }

    /// Create an internal error for states a well-formed tree never reaches
    pub fn internal(message: impl Into<String>) -> Self {
        ErrorKind::Internal(message.into()).into()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The error text without the frame chain.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Whether a `try`/`catch` in the evaluated program may intercept this
    /// error. Cancellation and internal failures always abort the pass.
    pub fn is_catchable(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::Timeout { .. } | ErrorKind::Internal(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout { .. })
    }

    /// Record the originating line unless an inner node already did.
    pub(crate) fn at_line(mut self, line: u32) -> Self {
        if self.pending_line.is_none() {
            self.pending_line = Some(line);
        }
        self
    }

    /// Close the current pass: append one frame for `source` at the
    /// recorded line.
    pub(crate) fn push_frame(&mut self, source: &EvalSource) {
        let line = self.pending_line.take().unwrap_or(0);
        self.frames.push(Frame {
            line,
            source: source.to_string(),
        });
    }

    /// Short name of the error class, as the script-visible `name` property.
    pub fn class_name(&self) -> &'static str {
        match self.kind {
            ErrorKind::Type(_) => "TypeError",
            ErrorKind::Reference(_) => "ReferenceError",
            ErrorKind::Range(_) => "RangeError",
            ErrorKind::Syntax { .. } => "SyntaxError",
            ErrorKind::Eval(_) => "EvalError",
            ErrorKind::Thrown { .. } => "Error",
            ErrorKind::Timeout { .. } => "TimeoutError",
            ErrorKind::Internal(_) => "InternalError",
        }
    }

    /// The bare message as exposed to scripts through `e.message`.
    pub fn script_message(&self) -> String {
        match &self.kind {
            ErrorKind::Type(m)
            | ErrorKind::Reference(m)
            | ErrorKind::Range(m)
            | ErrorKind::Eval(m)
            | ErrorKind::Internal(m) => m.clone(),
            ErrorKind::Syntax { message, .. } => message.clone(),
            ErrorKind::Thrown { message, .. } => message.clone(),
            ErrorKind::Timeout { .. } => self.kind.to_string(),
        }
    }
}
