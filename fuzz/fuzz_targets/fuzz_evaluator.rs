#![no_main]

use eswalk::{Evaluator, EvaluatorOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Evaluation costs far more per byte than parsing
    if source.len() > 10_000 {
        return;
    }

    let mut evaluator = Evaluator::with_options(EvaluatorOptions {
        timeout_ms: 200,
        max_call_depth: 64,
        ..EvaluatorOptions::default()
    });

    // Script errors and timeouts are expected; panics are not
    let _ = evaluator.eval(source);
});
