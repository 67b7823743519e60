// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod persistence;

pub use crate::config::EstimatorConfig;
pub use crate::core::engine::PriceEstimator;
pub use crate::core::types::{Amenities, District, Estimate, EstimateRequest, PredictionResult};
pub use crate::error::{EstimatorError, EstimatorResult};
