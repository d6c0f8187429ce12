//! Vector similarity.

use crate::error::{IntentError, Result};

/// Cosine similarity between two vectors of equal length.
///
/// Returns `dot(a, b) / (|a| * |b|)`.  A zero-norm vector yields `NaN`,
/// which [`pick_best`] never selects.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(IntentError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Index and score of the highest score.
///
/// Ties keep the earliest index (strict `>`), and `NaN` scores are skipped.
/// Returns `None` when no score is a number.
pub fn pick_best(scores: impl IntoIterator<Item = f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, score) in scores.into_iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best
}
