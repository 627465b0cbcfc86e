//! Evaluator configuration

use serde::Deserialize;

/// Tunables for one `Evaluator`.
///
/// Deserializable so hosts can keep them next to their own settings:
///
/// ```
/// # use eswalk::EvaluatorOptions;
/// let opts: EvaluatorOptions = EvaluatorOptions {
///     timeout_ms: 0,
///     ..EvaluatorOptions::default()
/// };
/// assert_eq!(opts.max_call_depth, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorOptions {
    /// Wall-clock budget of one top-level evaluation in milliseconds,
    /// checked at loop iterations and function entry. `0` disables it.
    pub timeout_ms: u64,
    /// Nested script function calls allowed before a RangeError.
    pub max_call_depth: usize,
    /// Whether reading an unresolved global name is a ReferenceError
    /// (`true`) or yields `undefined` (`false`).
    pub strict_global_reads: bool,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            max_call_depth: 256,
            strict_global_reads: true,
        }
    }
}
