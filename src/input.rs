//! Raw form submission and its conversion into a typed request.

use serde::Deserialize;

use crate::config::{field_ranges, EXCHANGE_RATE_MAX};
use crate::error::{AppError, Result};
use crate::types::{check_range, Currency, FuelType, VehicleSpec};

/// Fields exactly as the HTML form posts them. Everything arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleForm {
    #[serde(default)]
    pub company_names: String,
    #[serde(default)]
    pub cars_names: String,
    #[serde(default)]
    pub engines: String,
    #[serde(default)]
    pub horsepower: String,
    #[serde(default)]
    pub total_speed: String,
    #[serde(default, rename = "performance0__100_km_h")]
    pub performance_0_100_km_h: String,
    #[serde(default)]
    pub fuel_types: String,
    #[serde(default)]
    pub seats: String,
    #[serde(default)]
    pub torque: String,
    #[serde(default)]
    pub engine_cc: String,
    #[serde(default)]
    pub battery_capacity_kwh: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub exchange_rate: String,
}

/// A validated prediction request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictRequest {
    pub record: VehicleSpec,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub exchange_rate: f64,
}

impl PredictRequest {
    pub fn validate(&self) -> Result<()> {
        self.record.validate()?;
        check_range("exchange_rate", self.exchange_rate, &(0.0..=EXCHANGE_RATE_MAX))
    }
}

impl VehicleForm {
    /// Blank text fields with the numeric defaults the form opens with.
    pub fn with_defaults() -> Self {
        use crate::config::form_defaults as d;
        Self {
            horsepower: d::HORSEPOWER.to_string(),
            total_speed: d::TOTAL_SPEED.to_string(),
            performance_0_100_km_h: d::PERFORMANCE_0_100.to_string(),
            fuel_types: FuelType::Petrol.to_string(),
            seats: d::SEATS.to_string(),
            torque: d::TORQUE.to_string(),
            engine_cc: d::ENGINE_CC.to_string(),
            battery_capacity_kwh: d::BATTERY_CAPACITY_KWH.to_string(),
            currency: Currency::Usd.to_string(),
            exchange_rate: d::EXCHANGE_RATE.to_string(),
            ..Self::default()
        }
    }

    pub fn parse(&self) -> Result<PredictRequest> {
        let seats_raw = self.seats.trim();
        let seats = seats_raw.parse::<u32>().map_err(|_| {
            AppError::Validation(format!("seats: expected a whole number, got '{seats_raw}'"))
        })?;

        let record = VehicleSpec {
            company_names: self.company_names.trim().to_string(),
            cars_names: self.cars_names.trim().to_string(),
            engines: self.engines.trim().to_string(),
            horsepower: number("horsepower", &self.horsepower)?,
            total_speed: number("total_speed", &self.total_speed)?,
            performance_0_100_km_h: number(
                "performance0__100_km_h",
                &self.performance_0_100_km_h,
            )?,
            fuel_types: self.fuel_types.parse::<FuelType>()?,
            seats,
            torque: number("torque", &self.torque)?,
            engine_cc: number("engine_cc", &self.engine_cc)?,
            battery_capacity_kwh: number("battery_capacity_kwh", &self.battery_capacity_kwh)?,
        };

        let currency = if self.currency.trim().is_empty() {
            Currency::Usd
        } else {
            self.currency.parse::<Currency>()?
        };
        let exchange_rate = if self.exchange_rate.trim().is_empty() {
            0.0
        } else {
            number("exchange_rate", &self.exchange_rate)?
        };

        let request = PredictRequest {
            record,
            currency,
            exchange_rate,
        };
        request.validate()?;
        Ok(request)
    }
}

fn number(field: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    let v = raw
        .parse::<f64>()
        .map_err(|_| AppError::Validation(format!("{field}: expected a number, got '{raw}'")))?;
    if !v.is_finite() {
        return Err(AppError::Validation(format!("{field}: expected a number, got '{raw}'")));
    }
    Ok(v)
}

/// Inclusive bounds rendered as `min`/`max` attributes on the form.
pub fn bounds(field: &str) -> Option<(f64, f64)> {
    let r = match field {
        "horsepower" => field_ranges::HORSEPOWER,
        "total_speed" => field_ranges::TOTAL_SPEED,
        "performance0__100_km_h" => field_ranges::PERFORMANCE_0_100,
        "torque" => field_ranges::TORQUE,
        "engine_cc" => field_ranges::ENGINE_CC,
        "battery_capacity_kwh" => field_ranges::BATTERY_CAPACITY_KWH,
        "seats" => {
            return Some((
                f64::from(*field_ranges::SEATS.start()),
                f64::from(*field_ranges::SEATS.end()),
            ))
        }
        "exchange_rate" => return Some((0.0, EXCHANGE_RATE_MAX)),
        _ => return None,
    };
    Some((*r.start(), *r.end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> VehicleForm {
        VehicleForm {
            company_names: "Toyota".into(),
            cars_names: "Camry".into(),
            engines: "I4".into(),
            horsepower: "150".into(),
            total_speed: "220".into(),
            performance_0_100_km_h: "7.5".into(),
            fuel_types: "Petrol".into(),
            seats: "5".into(),
            torque: "300".into(),
            engine_cc: "2000".into(),
            battery_capacity_kwh: "0".into(),
            currency: "IDR".into(),
            exchange_rate: "15000".into(),
        }
    }

    #[test]
    fn parses_a_complete_form() {
        let req = form().parse().unwrap();
        assert_eq!(req.record, crate::types::sample_spec());
        assert_eq!(req.currency, Currency::Idr);
        assert_eq!(req.exchange_rate, 15_000.0);
    }

    #[test]
    fn currency_and_rate_default_to_usd_and_zero() {
        let mut f = form();
        f.currency.clear();
        f.exchange_rate.clear();
        let req = f.parse().unwrap();
        assert_eq!(req.currency, Currency::Usd);
        assert_eq!(req.exchange_rate, 0.0);
    }

    #[test]
    fn horsepower_bounds_inclusive() {
        for ok in ["22", "22.0", "1200", "1200.0"] {
            let mut f = form();
            f.horsepower = ok.into();
            assert!(f.parse().is_ok(), "{ok} should be accepted");
        }
        for bad in ["21.9", "1200.5", "-5"] {
            let mut f = form();
            f.horsepower = bad.into();
            assert!(
                matches!(f.parse(), Err(AppError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn non_numeric_horsepower_is_rejected() {
        let mut f = form();
        f.horsepower = "fast".into();
        let err = f.parse().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: horsepower: expected a number, got 'fast'"
        );

        f.horsepower = "NaN".into();
        assert!(f.parse().is_err());
    }

    #[test]
    fn fractional_seats_are_rejected() {
        let mut f = form();
        f.seats = "4.5".into();
        assert!(f.parse().is_err());
    }

    #[test]
    fn unknown_fuel_and_currency_are_rejected() {
        let mut f = form();
        f.fuel_types = "Steam".into();
        assert!(f.parse().is_err());

        let mut f = form();
        f.currency = "GBP".into();
        assert!(f.parse().is_err());
    }

    #[test]
    fn exchange_rate_out_of_range_is_rejected() {
        let mut f = form();
        f.exchange_rate = "100001".into();
        assert!(f.parse().is_err());
        f.exchange_rate = "-1".into();
        assert!(f.parse().is_err());
    }

    #[test]
    fn missing_required_text_is_rejected() {
        let mut f = form();
        f.cars_names = "   ".into();
        assert!(f.parse().is_err());
    }

    #[test]
    fn defaults_only_lack_names() {
        let mut f = VehicleForm::with_defaults();
        assert!(f.parse().is_err());
        f.company_names = "Honda".into();
        f.cars_names = "Civic".into();
        let req = f.parse().unwrap();
        assert_eq!(req.record.horsepower, 100.0);
        assert_eq!(req.record.seats, 5);
        assert_eq!(req.currency, Currency::Usd);
    }

    #[test]
    fn bounds_cover_numeric_fields() {
        assert_eq!(bounds("horsepower"), Some((22.0, 1200.0)));
        assert_eq!(bounds("seats"), Some((1.0, 20.0)));
        assert_eq!(bounds("company_names"), None);
    }
}
