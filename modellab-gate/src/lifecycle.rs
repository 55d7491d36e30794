//! Model lifecycle: `Training → Validated → Deployed`.
//!
//! The gate computes decisions; callers own and persist the status.
//! A failed gate sends the model back to `Training` (re-train or
//! re-register; the gate never retries itself), and only an explicit
//! `promote` moves a validated model to `Deployed`.

use crate::result::DeploymentDecision;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Training,
    Validated,
    Deployed,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot apply a gate decision to a deployed model")]
    GateOnDeployed,

    #[error("cannot promote from {from:?}: only validated models deploy")]
    PromoteFromInvalidState { from: ModelStatus },
}

impl ModelStatus {
    /// Apply a gate outcome. Pass ⇒ `Validated`, fail ⇒ back to
    /// `Training`. Deployed models must be re-registered first.
    pub fn after_gate(self, decision: &DeploymentDecision) -> Result<ModelStatus, LifecycleError> {
        match self {
            ModelStatus::Training | ModelStatus::Validated => Ok(if decision.is_valid {
                ModelStatus::Validated
            } else {
                ModelStatus::Training
            }),
            ModelStatus::Deployed => Err(LifecycleError::GateOnDeployed),
        }
    }

    /// Explicit promotion of a validated model.
    pub fn promote(self) -> Result<ModelStatus, LifecycleError> {
        match self {
            ModelStatus::Validated => Ok(ModelStatus::Deployed),
            from => Err(LifecycleError::PromoteFromInvalidState { from }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{DecisionChecks, ValidationCheckResult};

    fn decision(pass: bool) -> DeploymentDecision {
        let mut checks = DecisionChecks {
            config: ValidationCheckResult::passing(),
            performance: ValidationCheckResult::passing(),
            size: ValidationCheckResult::passing(),
            integrity: ValidationCheckResult::passing(),
            feature_compatibility: ValidationCheckResult::passing(),
            hyperparameters: ValidationCheckResult::passing(),
            load_time: ValidationCheckResult::passing(),
        };
        if !pass {
            checks.performance.fail("accuracy below minimum");
        }
        DeploymentDecision::from_checks(checks)
    }

    #[test]
    fn training_passes_gate_to_validated() {
        let status = ModelStatus::Training.after_gate(&decision(true)).unwrap();
        assert_eq!(status, ModelStatus::Validated);
    }

    #[test]
    fn training_fails_gate_back_to_training() {
        let status = ModelStatus::Training.after_gate(&decision(false)).unwrap();
        assert_eq!(status, ModelStatus::Training);
    }

    #[test]
    fn revalidation_can_demote() {
        let status = ModelStatus::Validated.after_gate(&decision(false)).unwrap();
        assert_eq!(status, ModelStatus::Training);
    }

    #[test]
    fn promote_requires_validated() {
        assert_eq!(
            ModelStatus::Validated.promote().unwrap(),
            ModelStatus::Deployed
        );
        assert!(ModelStatus::Training.promote().is_err());
        assert!(ModelStatus::Deployed.promote().is_err());
    }

    #[test]
    fn gate_on_deployed_is_rejected() {
        assert!(ModelStatus::Deployed.after_gate(&decision(true)).is_err());
    }
}
