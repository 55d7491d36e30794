//! Validation results — one per check, plus the aggregate decision.
//!
//! A `ValidationCheckResult` is never mutated after its check returns;
//! the decision is recomputed fresh on every promotion attempt and
//! never persisted here (callers own the status transition).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a single validation check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheckResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// What the check actually observed, for operator reporting.
    pub actual_values: BTreeMap<String, serde_json::Value>,
}

impl Default for ValidationCheckResult {
    fn default() -> Self {
        Self::passing()
    }
}

impl ValidationCheckResult {
    /// A result that starts valid; errors flip it.
    pub fn passing() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            actual_values: BTreeMap::new(),
        }
    }

    /// Record a hard failure.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    /// Record an advisory warning; does not affect validity.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record an observed value.
    pub fn record(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.actual_values.insert(key.into(), value);
    }
}

/// The seven per-check results, in gate order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionChecks {
    pub config: ValidationCheckResult,
    pub performance: ValidationCheckResult,
    pub size: ValidationCheckResult,
    pub integrity: ValidationCheckResult,
    pub feature_compatibility: ValidationCheckResult,
    pub hyperparameters: ValidationCheckResult,
    pub load_time: ValidationCheckResult,
}

/// Aggregate deployment decision: strict AND of every check.
///
/// Warnings are advisory and surfaced in full so an operator can fix
/// everything in one pass; they never block promotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentDecision {
    pub is_valid: bool,
    pub config_check: bool,
    pub performance_check: bool,
    pub size_check: bool,
    pub integrity_check: bool,
    pub feature_compatibility_check: bool,
    pub hyperparameter_check: bool,
    pub load_time_check: bool,
    pub checks: DecisionChecks,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl DeploymentDecision {
    pub fn from_checks(checks: DecisionChecks) -> Self {
        let flags = [
            checks.config.is_valid,
            checks.performance.is_valid,
            checks.size.is_valid,
            checks.integrity.is_valid,
            checks.feature_compatibility.is_valid,
            checks.hyperparameters.is_valid,
            checks.load_time.is_valid,
        ];

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for check in [
            &checks.config,
            &checks.performance,
            &checks.size,
            &checks.integrity,
            &checks.feature_compatibility,
            &checks.hyperparameters,
            &checks.load_time,
        ] {
            errors.extend(check.errors.iter().cloned());
            warnings.extend(check.warnings.iter().cloned());
        }

        Self {
            is_valid: flags.iter().all(|f| *f),
            config_check: flags[0],
            performance_check: flags[1],
            size_check: flags[2],
            integrity_check: flags[3],
            feature_compatibility_check: flags[4],
            hyperparameter_check: flags[5],
            load_time_check: flags[6],
            checks,
            errors,
            warnings,
        }
    }

    /// Names of the checks that failed, in gate order.
    pub fn failing_checks(&self) -> Vec<&'static str> {
        let named = [
            ("config", self.config_check),
            ("performance", self.performance_check),
            ("size", self.size_check),
            ("integrity", self.integrity_check),
            ("feature_compatibility", self.feature_compatibility_check),
            ("hyperparameters", self.hyperparameter_check),
            ("load_time", self.load_time_check),
        ];
        named
            .into_iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| name)
            .collect()
    }
}
