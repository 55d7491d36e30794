//! Artifact checks: byte size against the budget, and integrity via a
//! streamed blake3 digest.

use crate::result::ValidationCheckResult;
use crate::thresholds::ValidationThresholds;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Hex blake3 digest of a file, streamed in 64 KiB chunks.
pub fn artifact_checksum(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Size check: over budget (or missing) fails; near-budget and
/// implausibly small artifacts warn.
pub fn validate_size(path: &Path, thresholds: &ValidationThresholds) -> ValidationCheckResult {
    let mut result = ValidationCheckResult::passing();
    result.record("path", path.display().to_string());

    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            result.fail(format!("artifact missing or unreadable: {e}"));
            return result;
        }
    };
    result.record("size_bytes", size);
    result.record("max_bytes", thresholds.max_artifact_bytes);

    if size > thresholds.max_artifact_bytes {
        result.fail(format!(
            "artifact is {size} bytes, over the {} byte limit",
            thresholds.max_artifact_bytes
        ));
    } else {
        let warn_at =
            (thresholds.max_artifact_bytes as f64 * thresholds.size_warn_fraction) as u64;
        if size >= warn_at {
            result.warn(format!(
                "artifact is {size} bytes, at {:.0}% of the limit",
                size as f64 / thresholds.max_artifact_bytes as f64 * 100.0
            ));
        }
        if size < thresholds.min_plausible_bytes {
            result.warn(format!(
                "artifact is only {size} bytes, suspiciously small for a trained model"
            ));
        }
    }

    result
}

/// Integrity check: the artifact must exist, be non-empty and readable;
/// when an expected checksum is supplied the computed digest must match,
/// and when none is, the check passes with a cannot-verify warning.
pub fn validate_integrity(
    path: &Path,
    expected_checksum: Option<&str>,
    _thresholds: &ValidationThresholds,
) -> ValidationCheckResult {
    let mut result = ValidationCheckResult::passing();
    result.record("path", path.display().to_string());

    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            result.fail(format!("artifact missing or unreadable: {e}"));
            return result;
        }
    };
    if size == 0 {
        result.fail("artifact file is empty");
        return result;
    }

    let computed = match artifact_checksum(path) {
        Ok(digest) => digest,
        Err(e) => {
            result.fail(format!("failed to read artifact for checksum: {e}"));
            return result;
        }
    };
    result.record("checksum", &computed);

    match expected_checksum {
        Some(expected) if expected.eq_ignore_ascii_case(&computed) => {}
        Some(expected) => {
            result.fail(format!(
                "checksum mismatch: expected {expected}, computed {computed}"
            ));
        }
        None => {
            result.warn("no expected checksum supplied, integrity cannot be verified");
        }
    }

    result
}
