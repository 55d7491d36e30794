//! The deployment gate — seven checks, one all-or-nothing decision.
//!
//! The data-only checks and the two disk checks fan out concurrently;
//! the load-time check runs alone afterwards so its single-shot
//! measurement is not contended by the gate's own work. A model is
//! either fully cleared or not promoted at all: no partial or staged
//! promotion, and the gate never retries itself.

use crate::checks;
use crate::checks::load_time::LoadError;
use crate::config::{ModelConfig, ModelMetrics, ModelType};
use crate::result::{DecisionChecks, DeploymentDecision, ValidationCheckResult};
use crate::thresholds::ValidationThresholds;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub struct DeploymentGate {
    thresholds: ValidationThresholds,
}

impl Default for DeploymentGate {
    fn default() -> Self {
        Self::new(ValidationThresholds::default())
    }
}

impl DeploymentGate {
    pub fn new(thresholds: ValidationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ValidationThresholds {
        &self.thresholds
    }

    // ── Individual checks (public operations) ────────────────────────

    pub fn validate_model_config(&self, config: &ModelConfig) -> ValidationCheckResult {
        checks::config::validate(config, &self.thresholds)
    }

    pub fn validate_performance_metrics(&self, metrics: &ModelMetrics) -> ValidationCheckResult {
        checks::performance::validate(metrics, &self.thresholds)
    }

    pub fn validate_model_size(&self, artifact_path: &Path) -> ValidationCheckResult {
        checks::artifact::validate_size(artifact_path, &self.thresholds)
    }

    pub fn validate_artifact_integrity(
        &self,
        artifact_path: &Path,
        expected_checksum: Option<&str>,
    ) -> ValidationCheckResult {
        checks::artifact::validate_integrity(artifact_path, expected_checksum, &self.thresholds)
    }

    pub fn validate_feature_compatibility(
        &self,
        required: &[String],
        provided: &[String],
    ) -> ValidationCheckResult {
        checks::compatibility::validate(required, provided)
    }

    pub fn validate_hyperparameters(
        &self,
        model_type: ModelType,
        params: &BTreeMap<String, Value>,
    ) -> ValidationCheckResult {
        checks::hyperparameters::validate(model_type, params)
    }

    pub fn validate_loading_time(
        &self,
        load: impl FnOnce() -> Result<(), LoadError>,
    ) -> ValidationCheckResult {
        checks::load_time::validate(load, &self.thresholds)
    }

    // ── Orchestrator ─────────────────────────────────────────────────

    /// Run every check and aggregate the strict-AND decision.
    ///
    /// `provided_features` is what the caller's feature pipeline can
    /// actually supply; `expected_checksum` is optional (its absence
    /// downgrades integrity verification to a warning).
    pub fn validate_model_for_deployment(
        &self,
        config: &ModelConfig,
        artifact_path: &Path,
        load: impl FnOnce() -> Result<(), LoadError>,
        provided_features: &[String],
        expected_checksum: Option<&str>,
    ) -> DeploymentDecision {
        let ((config_check, performance, compatibility, hyperparameters), (size, integrity)) =
            rayon::join(
                || {
                    (
                        self.validate_model_config(config),
                        self.validate_performance_metrics(&config.metrics),
                        self.validate_feature_compatibility(&config.features, provided_features),
                        self.validate_hyperparameters(config.model_type, &config.hyperparameters),
                    )
                },
                || {
                    rayon::join(
                        || self.validate_model_size(artifact_path),
                        || self.validate_artifact_integrity(artifact_path, expected_checksum),
                    )
                },
            );

        // Measured last, alone: nothing else the gate started is still
        // running to contend with the timing.
        let load_time = self.validate_loading_time(load);

        let decision = DeploymentDecision::from_checks(DecisionChecks {
            config: config_check,
            performance,
            size,
            integrity,
            feature_compatibility: compatibility,
            hyperparameters,
            load_time,
        });

        if decision.is_valid {
            tracing::info!(
                model_id = %config.model_id,
                warnings = decision.warnings.len(),
                "deployment gate passed"
            );
        } else {
            tracing::warn!(
                model_id = %config.model_id,
                failing = ?decision.failing_checks(),
                "deployment gate rejected model"
            );
        }
        decision
    }
}
