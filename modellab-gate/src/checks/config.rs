//! Config check: identity, version, timestamp ordering, feature list.

use crate::config::ModelConfig;
use crate::result::ValidationCheckResult;
use crate::thresholds::ValidationThresholds;

pub fn validate(config: &ModelConfig, thresholds: &ValidationThresholds) -> ValidationCheckResult {
    let mut result = ValidationCheckResult::passing();
    result.record("model_id", &config.model_id);
    result.record("version", &config.version);
    result.record("feature_count", config.features.len());

    // ── Identity ──
    if config.model_id.is_empty() {
        result.fail("model_id is empty");
    } else if !well_formed_id(&config.model_id) {
        result.fail(format!(
            "model_id '{}' is malformed (want 4-64 chars of [A-Za-z0-9_-])",
            config.model_id
        ));
    }

    // ── Version ──
    if !is_semver(&config.version) {
        result.warn(format!(
            "version '{}' is not semantic (expected MAJOR.MINOR.PATCH)",
            config.version
        ));
    }

    // ── Timestamp ordering ──
    if config.created_at > config.updated_at {
        result.fail(format!(
            "created_at {} is after updated_at {}",
            config.created_at, config.updated_at
        ));
    }
    if let Some(deployed_at) = config.deployed_at {
        if config.created_at > deployed_at {
            result.fail(format!(
                "created_at {} is after deployed_at {deployed_at}",
                config.created_at
            ));
        }
    }

    // ── Feature list ──
    if config.features.is_empty() {
        result.fail("feature list is empty");
    } else if config.features.len() < thresholds.min_feature_count {
        result.warn(format!(
            "only {} feature(s) declared (fewer than {})",
            config.features.len(),
            thresholds.min_feature_count
        ));
    }

    result
}

fn well_formed_id(id: &str) -> bool {
    (4..=64).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Plain MAJOR.MINOR.PATCH with numeric components.
fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelMetrics, ModelType};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn base_config() -> ModelConfig {
        ModelConfig {
            model_id: "mdl-spy-direction-004".into(),
            model_type: ModelType::GradientBoosting,
            version: "1.4.0".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
            deployed_at: None,
            features: vec!["mom_10d".into(), "rsi_14".into(), "vol_20d".into()],
            hyperparameters: BTreeMap::new(),
            metrics: ModelMetrics::default(),
        }
    }

    #[test]
    fn well_formed_config_passes_clean() {
        let result = validate(&base_config(), &ValidationThresholds::default());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn malformed_id_fails() {
        let mut config = base_config();
        config.model_id = "a b!".into();
        let result = validate(&config, &ValidationThresholds::default());
        assert!(!result.is_valid);
    }

    #[test]
    fn empty_features_fail() {
        let mut config = base_config();
        config.features.clear();
        let result = validate(&config, &ValidationThresholds::default());
        assert!(!result.is_valid);
    }

    #[test]
    fn inverted_timestamps_fail() {
        let mut config = base_config();
        config.updated_at = Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap();
        let result = validate(&config, &ValidationThresholds::default());
        assert!(!result.is_valid);
    }

    #[test]
    fn deployed_before_created_fails() {
        let mut config = base_config();
        config.deployed_at = Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        let result = validate(&config, &ValidationThresholds::default());
        assert!(!result.is_valid);
    }

    #[test]
    fn non_semver_version_warns_only() {
        let mut config = base_config();
        config.version = "v1.4".into();
        let result = validate(&config, &ValidationThresholds::default());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn low_feature_count_warns_only() {
        let mut config = base_config();
        config.features = vec!["mom_10d".into()];
        let result = validate(&config, &ValidationThresholds::default());
        assert!(result.is_valid);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn semver_recognizer() {
        assert!(is_semver("1.0.0"));
        assert!(is_semver("12.34.56"));
        assert!(!is_semver("1.0"));
        assert!(!is_semver("v1.0.0"));
        assert!(!is_semver("1.0.0-rc1"));
    }
}
