//! Display formatting for prices and echoed specification fields.

use serde::Serialize;

use crate::types::{Currency, PredictionResult, VehicleSpec};

/// Round to a whole number and group thousands with commas: `1234567.6` -> `1,234,568`.
pub fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value.is_sign_negative() && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

/// `$ 25,000`, `Rp 375,000,000`, or a bare number for currencies without a symbol.
pub fn format_money(currency: Currency, value: f64) -> String {
    let symbol = currency.symbol();
    if symbol.is_empty() {
        group_thousands(value)
    } else {
        format!("{symbol} {}", group_thousands(value))
    }
}

/// Exchange rate with grouped integer part and up to four decimals: `15,000`, `0.9215`.
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        return group_thousands(rate);
    }
    let fixed = format!("{:.4}", rate);
    let fixed = fixed.trim_end_matches('0').trim_end_matches('.');
    match fixed.split_once('.') {
        Some((whole, frac)) => {
            let whole: f64 = whole.parse().unwrap_or(0.0);
            format!("{}.{frac}", group_thousands(whole))
        }
        None => group_thousands(rate),
    }
}

/// Specification fields with unit suffixes, plus the formatted prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoedRecord {
    pub company_names: String,
    pub cars_names: String,
    pub engines: String,
    pub horsepower: String,
    pub total_speed: String,
    #[serde(rename = "performance0__100_km_h")]
    pub performance_0_100_km_h: String,
    pub fuel_types: String,
    pub seats: String,
    pub torque: String,
    pub engine_cc: String,
    pub battery_capacity_kwh: String,
    pub predicted_price_usd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_price_converted: Option<String>,
}

impl EchoedRecord {
    pub fn new(spec: &VehicleSpec, result: &PredictionResult) -> Self {
        Self {
            company_names: spec.company_names.clone(),
            cars_names: spec.cars_names.clone(),
            engines: spec.engines.clone(),
            horsepower: format!("{:.0} hp", spec.horsepower),
            total_speed: format!("{:.0} km/h", spec.total_speed),
            performance_0_100_km_h: format!("{:.1} sec", spec.performance_0_100_km_h),
            fuel_types: spec.fuel_types.to_string(),
            seats: spec.seats.to_string(),
            torque: format!("{:.0} Nm", spec.torque),
            engine_cc: format!("{:.0} cc", spec.engine_cc),
            battery_capacity_kwh: format!("{:.1} kWh", spec.battery_capacity_kwh),
            predicted_price_usd: format_money(Currency::Usd, result.predicted_price_usd),
            predicted_price_converted: result
                .predicted_price_converted
                .filter(|_| result.shows_conversion())
                .map(|v| format_money(result.currency, v)),
        }
    }

    /// Label/value rows in display order.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        let mut rows = vec![
            ("Company", self.company_names.as_str()),
            ("Model", self.cars_names.as_str()),
            ("Engine", self.engines.as_str()),
            ("Horsepower", self.horsepower.as_str()),
            ("Top Speed", self.total_speed.as_str()),
            ("0-100 km/h", self.performance_0_100_km_h.as_str()),
            ("Fuel Type", self.fuel_types.as_str()),
            ("Seats", self.seats.as_str()),
            ("Torque", self.torque.as_str()),
            ("Engine CC", self.engine_cc.as_str()),
            ("Battery Capacity", self.battery_capacity_kwh.as_str()),
            ("Predicted Price (USD)", self.predicted_price_usd.as_str()),
        ];
        if let Some(converted) = &self.predicted_price_converted {
            rows.push(("Predicted Price (Converted)", converted.as_str()));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_spec;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(1_234_567.6), "1,234,568");
        assert_eq!(group_thousands(-45_000.0), "-45,000");
        assert_eq!(group_thousands(-0.2), "0");
    }

    #[test]
    fn money_uses_currency_symbol() {
        assert_eq!(format_money(Currency::Usd, 25_000.0), "$ 25,000");
        assert_eq!(format_money(Currency::Idr, 375_000_000.0), "Rp 375,000,000");
        assert_eq!(format_money(Currency::Eur, 0.0), "€ 0");
        assert_eq!(format_money(Currency::Jpy, 1_500.0), "¥ 1,500");
        assert_eq!(format_money(Currency::Other, 1_500.0), "1,500");
    }

    #[test]
    fn rates_keep_significant_decimals() {
        assert_eq!(format_rate(15_000.0), "15,000");
        assert_eq!(format_rate(0.92), "0.92");
        assert_eq!(format_rate(16_250.125), "16,250.125");
        assert_eq!(format_rate(149.00001), "149");
    }

    #[test]
    fn echo_adds_unit_suffixes() {
        let result = PredictionResult {
            predicted_price_usd: 31_250.4,
            predicted_price_converted: None,
            currency: Currency::Usd,
            exchange_rate: 0.0,
        };
        let echo = EchoedRecord::new(&sample_spec(), &result);
        assert_eq!(echo.horsepower, "150 hp");
        assert_eq!(echo.total_speed, "220 km/h");
        assert_eq!(echo.performance_0_100_km_h, "7.5 sec");
        assert_eq!(echo.torque, "300 Nm");
        assert_eq!(echo.engine_cc, "2000 cc");
        assert_eq!(echo.battery_capacity_kwh, "0.0 kWh");
        assert_eq!(echo.predicted_price_usd, "$ 31,250");
        assert!(echo.predicted_price_converted.is_none());
        assert_eq!(echo.rows().len(), 12);
    }

    #[test]
    fn echo_includes_conversion_only_with_positive_rate() {
        let mut result = PredictionResult {
            predicted_price_usd: 20_000.0,
            predicted_price_converted: Some(0.0),
            currency: Currency::Eur,
            exchange_rate: 0.0,
        };
        let echo = EchoedRecord::new(&sample_spec(), &result);
        assert!(echo.predicted_price_converted.is_none());

        result.exchange_rate = 0.5;
        result.predicted_price_converted = Some(10_000.0);
        let echo = EchoedRecord::new(&sample_spec(), &result);
        assert_eq!(echo.predicted_price_converted.as_deref(), Some("€ 10,000"));
        assert_eq!(echo.rows().len(), 13);
    }
}
