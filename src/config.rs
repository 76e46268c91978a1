use crate::error::{AppError, Result};

pub const PIPELINE_PATH: &str = "artifacts/preprocessing_pipeline.json";
pub const MODEL_PATH: &str = "artifacts/price_model.json";
pub const DATASET_PATH: &str = "data/cars_cleaned.csv";

/// Upper bound accepted for the manually entered USD exchange rate.
pub const EXCHANGE_RATE_MAX: f64 = 100_000.0;

/// Bin count for EDA histograms.
pub const HISTOGRAM_BINS: usize = 30;

/// Brands with fewer models than this are left out of brand metrics.
pub const BRAND_MIN_MODELS: usize = 3;

/// Row limits for the EDA ranking tables.
pub const TOP_COMPANIES: usize = 15;
pub const TOP_ENGINES: usize = 10;
pub const TOP_BRANDS: usize = 15;

/// Inclusive input ranges for the numeric specification fields.
pub mod field_ranges {
    use std::ops::RangeInclusive;

    pub const HORSEPOWER: RangeInclusive<f64> = 22.0..=1200.0;
    pub const TOTAL_SPEED: RangeInclusive<f64> = 60.0..=500.0;
    pub const PERFORMANCE_0_100: RangeInclusive<f64> = 1.5..=22.0;
    pub const SEATS: RangeInclusive<u32> = 1..=20;
    pub const TORQUE: RangeInclusive<f64> = 40.5..=1400.0;
    /// 0 for electric vehicles.
    pub const ENGINE_CC: RangeInclusive<f64> = 0.0..=9200.5;
    /// 0 for non-electric vehicles.
    pub const BATTERY_CAPACITY_KWH: RangeInclusive<f64> = 0.0..=215.0;
}

/// Values the prediction form starts with.
pub mod form_defaults {
    pub const HORSEPOWER: f64 = 100.0;
    pub const TOTAL_SPEED: f64 = 100.0;
    pub const PERFORMANCE_0_100: f64 = 10.0;
    pub const SEATS: u32 = 5;
    pub const TORQUE: f64 = 100.0;
    pub const ENGINE_CC: f64 = 0.0;
    pub const BATTERY_CAPACITY_KWH: f64 = 0.0;
    pub const EXCHANGE_RATE: f64 = 0.0;
}

/// Upper price bounds (USD, exclusive) for the EDA market segments.
pub mod price_segments {
    pub const BUDGET_MAX: f64 = 30_000.0;
    pub const MID_RANGE_MAX: f64 = 100_000.0;
    pub const PREMIUM_MAX: f64 = 300_000.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// JSON export of the fitted preprocessing pipeline (PIPELINE_PATH)
    pub pipeline_path: String,
    /// JSON export of the fitted price model (MODEL_PATH)
    pub model_path: String,
    /// Historical dataset backing the EDA endpoints (DATASET_PATH)
    pub dataset_path: String,
    /// Omit the converted price instead of reporting zero when a non-USD
    /// currency is requested without a rate (SUPPRESS_ZERO_RATE_CONVERSION)
    pub suppress_zero_rate_conversion: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            pipeline_path: std::env::var("PIPELINE_PATH")
                .unwrap_or_else(|_| PIPELINE_PATH.to_string()),
            model_path: std::env::var("MODEL_PATH").unwrap_or_else(|_| MODEL_PATH.to_string()),
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| DATASET_PATH.to_string()),
            suppress_zero_rate_conversion: parse_flag(
                "SUPPRESS_ZERO_RATE_CONVERSION",
                std::env::var("SUPPRESS_ZERO_RATE_CONVERSION").ok().as_deref(),
            )?,
        })
    }
}

fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" => Ok(false),
            "1" | "true" | "yes" => Ok(true),
            _ => Err(AppError::Config(format!("{name} must be true or false"))),
        },
    }
}
