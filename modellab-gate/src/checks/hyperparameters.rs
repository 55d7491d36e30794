//! Hyperparameter check: per-model-type schemas.
//!
//! Each model family carries its own rule table: required and optional
//! keys, numeric ranges, and allowed string values. Validation is one
//! dispatch on the type tag over a static table, with no per-type
//! code paths. Unknown keys are flagged but never fail: training tooling
//! may be newer than this crate.

use crate::config::ModelType;
use crate::result::ValidationCheckResult;
use serde_json::Value;
use std::collections::BTreeMap;

/// Value constraint for one hyperparameter key.
#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Text { allowed: &'static [&'static str] },
}

/// One schema rule.
#[derive(Debug, Clone, Copy)]
pub struct ParamRule {
    pub key: &'static str,
    pub required: bool,
    pub kind: ParamKind,
}

const fn int(key: &'static str, required: bool, min: i64, max: i64) -> ParamRule {
    ParamRule {
        key,
        required,
        kind: ParamKind::Int { min, max },
    }
}

const fn float(key: &'static str, required: bool, min: f64, max: f64) -> ParamRule {
    ParamRule {
        key,
        required,
        kind: ParamKind::Float { min, max },
    }
}

const fn text(key: &'static str, required: bool, allowed: &'static [&'static str]) -> ParamRule {
    ParamRule {
        key,
        required,
        kind: ParamKind::Text { allowed },
    }
}

const GRADIENT_BOOSTING: &[ParamRule] = &[
    int("num_leaves", true, 2, 256),
    float("learning_rate", true, 1e-6, 1.0),
    int("n_estimators", true, 1, 10_000),
    int("max_depth", false, -1, 64),
    float("feature_fraction", false, 0.1, 1.0),
    int("min_data_in_leaf", false, 1, 10_000),
    text("boosting_type", false, &["gbdt", "dart", "goss"]),
];

const RANDOM_FOREST: &[ParamRule] = &[
    int("n_estimators", true, 1, 5_000),
    int("max_depth", true, 1, 128),
    int("min_samples_split", false, 2, 1_000),
    int("min_samples_leaf", false, 1, 1_000),
    text("max_features", false, &["sqrt", "log2", "all"]),
];

const LSTM: &[ParamRule] = &[
    int("units", true, 1, 4_096),
    int("layers", true, 1, 16),
    float("dropout", true, 0.0, 0.9),
    float("learning_rate", true, 1e-6, 1.0),
    int("sequence_length", true, 2, 512),
    int("batch_size", false, 1, 4_096),
    int("epochs", false, 1, 1_000),
    text("optimizer", false, &["adam", "sgd", "rmsprop"]),
];

const ENSEMBLE: &[ParamRule] = &[
    text("method", true, &["average", "weighted", "stacking"]),
    int("n_members", true, 2, 32),
    float("vote_threshold", false, 0.0, 1.0),
];

/// The rule table for a model family.
pub fn schema_for(model_type: ModelType) -> &'static [ParamRule] {
    match model_type {
        ModelType::GradientBoosting => GRADIENT_BOOSTING,
        ModelType::RandomForest => RANDOM_FOREST,
        ModelType::Lstm => LSTM,
        ModelType::Ensemble => ENSEMBLE,
    }
}

pub fn validate(
    model_type: ModelType,
    params: &BTreeMap<String, Value>,
) -> ValidationCheckResult {
    let mut result = ValidationCheckResult::passing();
    result.record("model_type", model_type.as_str());

    let schema = schema_for(model_type);

    for rule in schema {
        match params.get(rule.key) {
            None if rule.required => {
                result.fail(format!(
                    "missing required hyperparameter '{}' for {model_type}",
                    rule.key
                ));
            }
            None => {}
            Some(value) => {
                result.record(rule.key, value);
                check_value(rule, value, &mut result);
            }
        }
    }

    for key in params.keys() {
        if !schema.iter().any(|rule| rule.key == key.as_str()) {
            result.warn(format!(
                "unknown hyperparameter '{key}' for {model_type} (ignored)"
            ));
        }
    }

    result
}

fn check_value(rule: &ParamRule, value: &Value, result: &mut ValidationCheckResult) {
    match rule.kind {
        ParamKind::Int { min, max } => match value.as_i64() {
            Some(v) if (min..=max).contains(&v) => {}
            Some(v) => result.fail(format!(
                "'{}' = {v} is out of range [{min}, {max}]",
                rule.key
            )),
            None => result.fail(format!(
                "'{}' must be an integer, got {value}",
                rule.key
            )),
        },
        ParamKind::Float { min, max } => match value.as_f64() {
            Some(v) if v >= min && v <= max => {}
            Some(v) => result.fail(format!(
                "'{}' = {v} is out of range [{min}, {max}]",
                rule.key
            )),
            None => result.fail(format!("'{}' must be a number, got {value}", rule.key)),
        },
        ParamKind::Text { allowed } => match value.as_str() {
            Some(v) if allowed.contains(&v) => {}
            Some(v) => result.fail(format!(
                "'{}' = '{v}' is not one of {allowed:?}",
                rule.key
            )),
            None => result.fail(format!("'{}' must be a string, got {value}", rule.key)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gb_params() -> BTreeMap<String, Value> {
        let mut params = BTreeMap::new();
        params.insert("num_leaves".into(), json!(64));
        params.insert("learning_rate".into(), json!(0.05));
        params.insert("n_estimators".into(), json!(500));
        params
    }

    #[test]
    fn valid_gradient_boosting_passes() {
        let result = validate(ModelType::GradientBoosting, &gb_params());
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn leaf_count_over_max_fails() {
        let mut params = gb_params();
        params.insert("num_leaves".into(), json!(300));
        let result = validate(ModelType::GradientBoosting, &params);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("num_leaves"));
        assert!(result.errors[0].contains("256"));
    }

    #[test]
    fn missing_required_key_fails_each_type() {
        for model_type in [
            ModelType::GradientBoosting,
            ModelType::RandomForest,
            ModelType::Lstm,
            ModelType::Ensemble,
        ] {
            let result = validate(model_type, &BTreeMap::new());
            assert!(!result.is_valid, "{model_type} accepted empty params");
            let required = schema_for(model_type)
                .iter()
                .filter(|r| r.required)
                .count();
            assert_eq!(result.errors.len(), required);
        }
    }

    #[test]
    fn unknown_key_warns_but_passes() {
        let mut params = gb_params();
        params.insert("exotic_knob".into(), json!(123));
        let result = validate(ModelType::GradientBoosting, &params);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("exotic_knob")));
    }

    #[test]
    fn wrong_value_type_fails() {
        let mut params = gb_params();
        params.insert("num_leaves".into(), json!("lots"));
        let result = validate(ModelType::GradientBoosting, &params);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("integer"));
    }

    #[test]
    fn disallowed_enum_value_fails() {
        let mut params = BTreeMap::new();
        params.insert("method".into(), json!("majority"));
        params.insert("n_members".into(), json!(5));
        let result = validate(ModelType::Ensemble, &params);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("method"));
    }

    #[test]
    fn float_given_for_int_rule_fails() {
        let mut params = gb_params();
        params.insert("num_leaves".into(), json!(64.5));
        let result = validate(ModelType::GradientBoosting, &params);
        assert!(!result.is_valid);
    }

    #[test]
    fn lstm_dropout_range() {
        let mut params = BTreeMap::new();
        params.insert("units".into(), json!(128));
        params.insert("layers".into(), json!(2));
        params.insert("dropout".into(), json!(0.95));
        params.insert("learning_rate".into(), json!(0.001));
        params.insert("sequence_length".into(), json!(30));
        let result = validate(ModelType::Lstm, &params);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("dropout"));
    }
}
