//! Feature compatibility: can the caller actually feed this model?
//!
//! Score = |required ∩ provided| / |required|. Anything below 1.0 means
//! missing required features and is a hard fail; extras on top of full
//! coverage are valid but warned.

use crate::result::ValidationCheckResult;
use std::collections::BTreeSet;

/// Compatibility arithmetic, separated from reporting for direct testing.
pub fn compatibility_score(
    required: &[String],
    provided: &[String],
) -> (f64, Vec<String>, Vec<String>) {
    let required_set: BTreeSet<&str> = required.iter().map(String::as_str).collect();
    let provided_set: BTreeSet<&str> = provided.iter().map(String::as_str).collect();

    let missing: Vec<String> = required_set
        .difference(&provided_set)
        .map(|s| s.to_string())
        .collect();
    let extra: Vec<String> = provided_set
        .difference(&required_set)
        .map(|s| s.to_string())
        .collect();

    let score = if required_set.is_empty() {
        1.0
    } else {
        (required_set.len() - missing.len()) as f64 / required_set.len() as f64
    };
    (score, missing, extra)
}

pub fn validate(required: &[String], provided: &[String]) -> ValidationCheckResult {
    let mut result = ValidationCheckResult::passing();
    let (score, missing, extra) = compatibility_score(required, provided);

    result.record("score", score);
    result.record("required_count", required.len());
    result.record("provided_count", provided.len());
    result.record("missing", &missing);
    result.record("extra", &extra);

    if required.is_empty() {
        result.warn("model declares no required features, nothing to check");
        return result;
    }

    if !missing.is_empty() {
        result.fail(format!(
            "missing required feature(s): {} (score {score:.2})",
            missing.join(", ")
        ));
    }
    if !extra.is_empty() {
        result.warn(format!(
            "{} provided feature(s) are unused by the model: {}",
            extra.len(),
            extra.join(", ")
        ));
    }
    if missing.is_empty() && required.len() != provided.len() {
        result.warn(format!(
            "count mismatch despite full coverage: {} required vs {} provided",
            required.len(),
            provided.len()
        ));
    }

    result
}
