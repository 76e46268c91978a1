use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::config::field_ranges;
use crate::error::{AppError, Result};

// ---------------------------------------------------------------------------
// Vehicle specification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    Alternative,
    #[serde(rename = "Other_Fuel")]
    OtherFuel,
}

impl FuelType {
    pub fn all() -> [FuelType; 6] {
        [
            FuelType::Petrol,
            FuelType::Diesel,
            FuelType::Electric,
            FuelType::Hybrid,
            FuelType::Alternative,
            FuelType::OtherFuel,
        ]
    }

    /// Label the preprocessing pipeline was fitted on.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Alternative => "Alternative",
            FuelType::OtherFuel => "Other_Fuel",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        FuelType::all()
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| AppError::Validation(format!("fuel_types: unknown fuel type '{s}'")))
    }
}

/// One car as entered on the prediction form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub company_names: String,
    pub cars_names: String,
    #[serde(default)]
    pub engines: String,
    pub horsepower: f64,
    pub total_speed: f64,
    #[serde(rename = "performance0__100_km_h")]
    pub performance_0_100_km_h: f64,
    pub fuel_types: FuelType,
    pub seats: u32,
    pub torque: f64,
    pub engine_cc: f64,
    pub battery_capacity_kwh: f64,
}

impl VehicleSpec {
    /// Enforce the input-surface contract: required text present, every
    /// numeric field finite and inside its inclusive range.
    pub fn validate(&self) -> Result<()> {
        require_text("company_names", &self.company_names)?;
        require_text("cars_names", &self.cars_names)?;
        check_range("horsepower", self.horsepower, &field_ranges::HORSEPOWER)?;
        check_range("total_speed", self.total_speed, &field_ranges::TOTAL_SPEED)?;
        check_range(
            "performance0__100_km_h",
            self.performance_0_100_km_h,
            &field_ranges::PERFORMANCE_0_100,
        )?;
        if !field_ranges::SEATS.contains(&self.seats) {
            return Err(AppError::Validation(format!(
                "seats: {} is outside {}..={}",
                self.seats,
                field_ranges::SEATS.start(),
                field_ranges::SEATS.end()
            )));
        }
        check_range("torque", self.torque, &field_ranges::TORQUE)?;
        check_range("engine_cc", self.engine_cc, &field_ranges::ENGINE_CC)?;
        check_range(
            "battery_capacity_kwh",
            self.battery_capacity_kwh,
            &field_ranges::BATTERY_CAPACITY_KWH,
        )?;
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn check_range(field: &str, value: f64, range: &RangeInclusive<f64>) -> Result<()> {
    if !value.is_finite() || !range.contains(&value) {
        return Err(AppError::Validation(format!(
            "{field}: {value} is outside {}..={}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Canonical record handed to the preprocessing pipeline
// ---------------------------------------------------------------------------

/// A single named value as the pipeline sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

/// Column order the pipeline is fitted on.
pub const RECORD_COLUMNS: [&str; 12] = [
    "company_names",
    "cars_names",
    "engines",
    "horsepower",
    "total_speed",
    "performance0__100_km_h",
    "fuel_types",
    "seats",
    "torque",
    "engine_cc",
    "battery_capacity_kwh",
    "cars_prices",
];

/// The specification plus the target placeholder, in fitted column order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    spec: VehicleSpec,
    cars_prices: f64,
}

impl CanonicalRecord {
    /// The target placeholder is always 0.
    pub fn from_spec(spec: &VehicleSpec) -> Self {
        Self {
            spec: spec.clone(),
            cars_prices: 0.0,
        }
    }

    pub fn columns(&self) -> [(&'static str, Cell<'_>); 12] {
        let s = &self.spec;
        [
            (RECORD_COLUMNS[0], Cell::Text(&s.company_names)),
            (RECORD_COLUMNS[1], Cell::Text(&s.cars_names)),
            (RECORD_COLUMNS[2], Cell::Text(&s.engines)),
            (RECORD_COLUMNS[3], Cell::Number(s.horsepower)),
            (RECORD_COLUMNS[4], Cell::Number(s.total_speed)),
            (RECORD_COLUMNS[5], Cell::Number(s.performance_0_100_km_h)),
            (RECORD_COLUMNS[6], Cell::Text(s.fuel_types.as_str())),
            (RECORD_COLUMNS[7], Cell::Number(f64::from(s.seats))),
            (RECORD_COLUMNS[8], Cell::Number(s.torque)),
            (RECORD_COLUMNS[9], Cell::Number(s.engine_cc)),
            (RECORD_COLUMNS[10], Cell::Number(s.battery_capacity_kwh)),
            (RECORD_COLUMNS[11], Cell::Number(self.cars_prices)),
        ]
    }
}

/// Model-ready numeric features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub Vec<f64>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Currency & prediction output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Idr,
    Eur,
    Jpy,
    #[serde(rename = "Other")]
    Other,
}

impl Currency {
    pub fn all() -> [Currency; 5] {
        [
            Currency::Usd,
            Currency::Idr,
            Currency::Eur,
            Currency::Jpy,
            Currency::Other,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Idr => "IDR",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Other => "Other",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Idr => "Rp",
            Currency::Eur => "€",
            Currency::Jpy => "¥",
            Currency::Other => "",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Currency::all()
            .into_iter()
            .find(|c| c.code() == s.trim())
            .ok_or_else(|| AppError::Validation(format!("currency: unsupported currency '{s}'")))
    }
}

/// Request-scoped result; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_price_usd: f64,
    /// `None` for USD, or when a zero rate is suppressed by policy.
    pub predicted_price_converted: Option<f64>,
    pub currency: Currency,
    pub exchange_rate: f64,
}

impl PredictionResult {
    /// True when the converted price is the one to headline.
    pub fn shows_conversion(&self) -> bool {
        self.currency != Currency::Usd && self.exchange_rate > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionWarning {
    /// Non-USD currency requested with a zero exchange rate.
    InvalidExchangeRate { currency: Currency },
}

impl std::fmt::Display for PredictionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionWarning::InvalidExchangeRate { currency } => write!(
                f,
                "Please enter a valid exchange rate for currency conversion to {currency}."
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Price segmentation (EDA)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceSegment {
    Budget,
    #[serde(rename = "Mid-range")]
    MidRange,
    Premium,
    Luxury,
}

impl PriceSegment {
    pub fn from_price(price: f64) -> Self {
        use crate::config::price_segments::*;
        if price < BUDGET_MAX {
            PriceSegment::Budget
        } else if price < MID_RANGE_MAX {
            PriceSegment::MidRange
        } else if price < PREMIUM_MAX {
            PriceSegment::Premium
        } else {
            PriceSegment::Luxury
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_spec() -> VehicleSpec {
    VehicleSpec {
        company_names: "Toyota".to_string(),
        cars_names: "Camry".to_string(),
        engines: "I4".to_string(),
        horsepower: 150.0,
        total_speed: 220.0,
        performance_0_100_km_h: 7.5,
        fuel_types: FuelType::Petrol,
        seats: 5,
        torque: 300.0,
        engine_cc: 2000.0,
        battery_capacity_kwh: 0.0,
    }
}
