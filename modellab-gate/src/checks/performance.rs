//! Performance check: metric floors and the suspicion heuristics.
//!
//! Floors are hard failures. Anything that merely smells wrong (a
//! metric scraping past its floor, an outsized train/validation gap)
//! is a warning for the operator.

use crate::config::ModelMetrics;
use crate::result::ValidationCheckResult;
use crate::thresholds::ValidationThresholds;

pub fn validate(
    metrics: &ModelMetrics,
    thresholds: &ValidationThresholds,
) -> ValidationCheckResult {
    let mut result = ValidationCheckResult::passing();

    // ── Loss sanity ──
    if metrics.train_loss < 0.0 {
        result.fail(format!("train_loss is negative ({})", metrics.train_loss));
    }
    if metrics.val_loss < 0.0 {
        result.fail(format!("val_loss is negative ({})", metrics.val_loss));
    }

    // ── Floors ──
    let floors = [
        ("accuracy", metrics.accuracy, thresholds.min_accuracy),
        ("precision", metrics.precision, thresholds.min_precision),
        ("recall", metrics.recall, thresholds.min_recall),
        ("f1", metrics.f1, thresholds.min_f1),
        ("sharpe", metrics.sharpe, thresholds.min_sharpe),
    ];
    for (name, value, floor) in floors {
        result.record(name, value);
        if value < floor {
            result.fail(format!("{name} {value:.4} is below minimum {floor:.4}"));
        } else if value < floor + thresholds.metric_warn_margin {
            result.warn(format!(
                "{name} {value:.4} is within {:.4} of its minimum {floor:.4}",
                thresholds.metric_warn_margin
            ));
        }
    }

    // ── Overfitting signals ──
    let gap = metrics.train_accuracy - metrics.val_accuracy;
    if gap > thresholds.max_overfit_gap {
        result.warn(format!(
            "train/val accuracy gap {gap:.4} exceeds {:.4} (overfitting signal)",
            thresholds.max_overfit_gap
        ));
    }
    if metrics.train_loss > 0.0 && metrics.val_loss > thresholds.loss_ratio_warn * metrics.train_loss
    {
        result.warn(format!(
            "val_loss {:.4} is more than {:.1}x train_loss {:.4}",
            metrics.val_loss, thresholds.loss_ratio_warn, metrics.train_loss
        ));
    }
    if metrics.sharpe > thresholds.suspicious_sharpe {
        result.warn(format!(
            "sharpe {:.2} exceeds {:.2}, check for data leakage",
            metrics.sharpe, thresholds.suspicious_sharpe
        ));
    }

    result
}
