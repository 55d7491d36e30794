//! Load-time check: one measured execution of the caller's load callback.
//!
//! Single-shot by contract: the orchestrator runs this after every
//! other check has finished, so the measured duration is not polluted
//! by concurrent work inside the gate itself.

use crate::result::ValidationCheckResult;
use crate::thresholds::ValidationThresholds;
use std::time::{Duration, Instant};

/// Error type the load callback may surface.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

pub fn validate(
    load: impl FnOnce() -> Result<(), LoadError>,
    thresholds: &ValidationThresholds,
) -> ValidationCheckResult {
    let mut result = ValidationCheckResult::passing();
    let budget = Duration::from_millis(thresholds.max_load_time_ms);

    let started = Instant::now();
    let outcome = load();
    let elapsed = started.elapsed();

    result.record("elapsed_ms", elapsed.as_millis() as u64);
    result.record("budget_ms", thresholds.max_load_time_ms);

    if let Err(e) = outcome {
        result.fail(format!("load callback failed: {e}"));
        return result;
    }

    if elapsed > budget {
        result.fail(format!(
            "load took {}ms, over the {}ms budget",
            elapsed.as_millis(),
            thresholds.max_load_time_ms
        ));
    } else if elapsed >= budget.mul_f64(thresholds.load_warn_fraction) {
        result.warn(format!(
            "load took {}ms, within {:.0}% of the {}ms budget",
            elapsed.as_millis(),
            thresholds.load_warn_fraction * 100.0,
            thresholds.max_load_time_ms
        ));
    }

    result
}
