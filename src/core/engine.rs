// File: src/core/engine.rs
use crate::config::EstimatorConfig;
use crate::core::encoder::{district_matches, encode};
use crate::core::interval::prediction_result;
use crate::core::model::{ModelMetadata, Predictor};
use crate::core::types::{Estimate, EstimateRequest, FeatureSchema, FeatureVector};
use crate::error::{EstimatorError, EstimatorResult};
use crate::persistence::load_model;
use tracing::{debug, warn};

/// The loaded model, its schema and the margin, built once at startup.
///
/// Nothing here is mutated after construction, so one instance can be shared
/// across threads behind an `Arc`.
pub struct PriceEstimator {
    predictor: Box<dyn Predictor>,
    schema: FeatureSchema,
    metadata: ModelMetadata,
    margin: i64,
}

impl PriceEstimator {
    /// Wraps an already-loaded predictor. The caller vouches that `schema` matches it.
    pub fn new(predictor: Box<dyn Predictor>, schema: FeatureSchema, margin: i64) -> Self {
        Self {
            predictor,
            schema,
            metadata: ModelMetadata::default(),
            margin,
        }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Loads both artifacts named in `config`.
    pub fn from_config(config: &EstimatorConfig) -> EstimatorResult<Self> {
        config.validate()?;
        let bundle = load_model(config)?;
        Ok(Self::new(
            Box::new(bundle.artifact.model),
            bundle.schema,
            config.margin,
        )
        .with_metadata(bundle.artifact.metadata))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn margin(&self) -> i64 {
        self.margin
    }

    pub fn encode(&self, request: &EstimateRequest) -> FeatureVector {
        encode(
            &request.district,
            request.room_size,
            request.amenities,
            &self.schema,
        )
    }

    /// Runs the model and truncates its output toward zero, in rupiah.
    pub fn predict(&self, vector: &FeatureVector) -> EstimatorResult<i64> {
        let raw = self.predictor.predict_raw(vector.as_slice())?;
        if !raw.is_finite() {
            return Err(EstimatorError::prediction(format!(
                "model produced a non-finite value ({})",
                raw
            )));
        }
        Ok(raw.trunc() as i64)
    }

    /// Encode, predict and attach the display range.
    pub fn estimate(&self, request: &EstimateRequest) -> EstimatorResult<Estimate> {
        let district_matched = district_matches(&request.district, &self.schema);
        if !district_matched {
            warn!(
                district = %request.district,
                "no location column for district; estimating without location"
            );
        }

        let vector = self.encode(request);
        let point = self.predict(&vector)?;
        let result = prediction_result(point, self.margin);
        debug!(
            district = %request.district,
            room_size = request.room_size,
            point = result.point_estimate,
            "estimate computed"
        );

        Ok(Estimate {
            result,
            margin: self.margin,
            district_matched,
        })
    }
}

impl std::fmt::Debug for PriceEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceEstimator")
            .field("features", &self.predictor.n_features())
            .field("schema_len", &self.schema.len())
            .field("metadata", &self.metadata)
            .field("margin", &self.margin)
            .finish()
    }
}
