pub mod service;

pub use service::{ConversionPolicy, PredictionOutcome, PredictionService};
