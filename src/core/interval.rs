// File: src/core/interval.rs
use crate::core::types::PredictionResult;

/// Historical RMSE of the shipped model, in rupiah. Fixed at evaluation time.
pub const MODEL_RMSE: i64 = 320_000;

/// Display range around a point estimate. The lower bound never goes below zero.
pub fn interval(point: i64, margin: i64) -> (i64, i64) {
    let lower = point.saturating_sub(margin).max(0);
    let upper = point.saturating_add(margin);
    (lower, upper)
}

pub fn prediction_result(point: i64, margin: i64) -> PredictionResult {
    let (lower_bound, upper_bound) = interval(point, margin);
    PredictionResult {
        point_estimate: point,
        lower_bound,
        upper_bound,
    }
}
