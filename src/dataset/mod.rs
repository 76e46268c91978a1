//! Historical car dataset behind the EDA endpoints.

pub mod summary;

pub use summary::{DatasetSummary, Histogram};

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Numeric columns a histogram can be requested for.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "horsepower",
    "total_speed",
    "performance0__100_km_h",
    "cars_prices",
    "seats",
    "torque",
    "engine_cc",
    "battery_capacity_kwh",
];

#[derive(Debug, Clone, Deserialize)]
pub struct CarRow {
    pub company_names: String,
    #[serde(default)]
    pub engines: String,
    pub horsepower: f64,
    pub total_speed: f64,
    #[serde(rename = "performance0__100_km_h")]
    pub performance_0_100_km_h: f64,
    pub cars_prices: f64,
    pub fuel_types: String,
    pub seats: f64,
    pub torque: f64,
    pub engine_cc: f64,
    pub battery_capacity_kwh: f64,
}

impl CarRow {
    fn numeric(&self, column: &str) -> Option<f64> {
        let v = match column {
            "horsepower" => self.horsepower,
            "total_speed" => self.total_speed,
            "performance0__100_km_h" => self.performance_0_100_km_h,
            "cars_prices" => self.cars_prices,
            "seats" => self.seats,
            "torque" => self.torque,
            "engine_cc" => self.engine_cc,
            "battery_capacity_kwh" => self.battery_capacity_kwh,
            _ => return None,
        };
        Some(v)
    }
}

/// Cleaned dataset, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<CarRow>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        info!("Loaded {} dataset rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rows = rdr
            .deserialize::<CarRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CarRow] {
        &self.rows
    }

    /// Finite values of one numeric column, or `None` for an unknown column.
    pub fn column(&self, column: &str) -> Option<Vec<f64>> {
        if !NUMERIC_COLUMNS.contains(&column) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .filter_map(|r| r.numeric(column))
                .filter(|v| v.is_finite())
                .collect(),
        )
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_CSV: &str = "\
company_names,cars_names,engines,horsepower,total_speed,performance0__100_km_h,cars_prices,fuel_types,seats,torque,engine_cc,battery_capacity_kwh
Toyota,Corolla,I4,140,200,9.5,22000,Petrol,5,180,1800,0
Toyota,Camry,I4,200,220,8.0,28000,Hybrid,5,220,2500,1.6
Toyota,Supra,I6,380,250,4.1,55000,Petrol,2,500,3000,0
Ferrari,Roma,V8,612,320,3.4,240000,Petrol,4,760,3855,0
Ferrari,SF90,V8,986,340,2.5,520000,Hybrid,2,800,3990,7.9
Tesla,Model 3,Electric Motor,283,225,5.8,42000,Electric,5,420,0,60
Tesla,Model S,Electric Motor,670,250,3.2,90000,Electric,5,1020,0,100
Tesla,Model X,Electric Motor,670,250,3.9,100000,Electric,7,1020,0,100
";
