//! Fitted artifacts the prediction service depends on.
//!
//! Both are loaded once at startup and shared read-only. The service only
//! sees the two traits below, so tests can substitute mocks.

pub mod model;
pub mod pipeline;

pub use model::PriceModelArtifact;
pub use pipeline::FittedPipeline;

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::types::{CanonicalRecord, FeatureVector};

/// Turns a canonical specification record into model-ready features.
pub trait Preprocessor: Send + Sync {
    fn transform(&self, record: &CanonicalRecord) -> Result<FeatureVector>;

    /// Width of the produced feature vector.
    fn num_features(&self) -> usize;
}

/// Predicts price in log1p space.
pub trait PriceModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Short label for logs and the health endpoint.
    fn name(&self) -> &str;
}

/// Read and parse a JSON artifact, mapping every failure to `ArtifactLoad`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path).map_err(|e| AppError::ArtifactLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&data).map_err(|e| AppError::ArtifactLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// The model must consume exactly the features the pipeline produces.
pub fn check_compatible(pipeline: &FittedPipeline, model: &PriceModelArtifact) -> Result<()> {
    let produced = pipeline.num_features();
    let expected = model.num_features();
    if produced != expected {
        return Err(AppError::ArtifactLoad {
            path: "model".to_string(),
            reason: format!("model expects {expected} features, pipeline produces {produced}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::service::invert_log_price;
    use crate::types::{sample_spec, FuelType};

    const PIPELINE: &str = include_str!("../../artifacts/preprocessing_pipeline.json");
    const MODEL: &str = include_str!("../../artifacts/price_model.json");

    #[test]
    fn bundled_artifacts_agree_and_predict() {
        let pipeline = FittedPipeline::from_json_str(PIPELINE).unwrap();
        let model = PriceModelArtifact::from_json_str(MODEL).unwrap();
        check_compatible(&pipeline, &model).unwrap();

        let record = CanonicalRecord::from_spec(&sample_spec());
        let features = pipeline.transform(&record).unwrap();
        let price = invert_log_price(model.predict(&features).unwrap());
        assert!(price.is_finite() && price > 1_000.0 && price < 1_000_000.0, "price={price}");

        let mut fast = sample_spec();
        fast.horsepower = 700.0;
        fast.performance_0_100_km_h = 3.0;
        fast.fuel_types = FuelType::Petrol;
        let fast_price = invert_log_price(
            model
                .predict(&pipeline.transform(&CanonicalRecord::from_spec(&fast)).unwrap())
                .unwrap(),
        );
        assert!(fast_price > price);
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let pipeline = FittedPipeline::from_json_str(PIPELINE).unwrap();
        let model = PriceModelArtifact::from_json_str(
            r#"{ "kind": "linear", "intercept": 10.0, "weights": [1.0] }"#,
        )
        .unwrap();
        assert!(matches!(
            check_compatible(&pipeline, &model),
            Err(AppError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn missing_artifact_is_a_load_error() {
        let err = read_json::<serde_json::Value>(Path::new("does/not/exist.json")).unwrap_err();
        match err {
            AppError::ArtifactLoad { path, .. } => assert!(path.ends_with("exist.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
