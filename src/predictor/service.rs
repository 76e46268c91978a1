use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::artifacts::{PriceModel, Preprocessor};
use crate::error::{AppError, Result};
use crate::format::{format_money, format_rate, EchoedRecord};
use crate::types::{CanonicalRecord, Currency, PredictionResult, PredictionWarning, VehicleSpec};

/// How a non-USD request with a zero exchange rate is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionPolicy {
    /// Omit the converted price instead of reporting it as zero.
    pub suppress_zero_rate: bool,
}

/// Everything the presentation layer renders for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub warnings: Vec<PredictionWarning>,
    /// `Estimated Car Price: Rp 375,000,000 (IDR)`
    pub headline: String,
    /// Present only when the converted price is headlined.
    pub exchange_rate_note: Option<String>,
    pub echo: EchoedRecord,
}

/// Undo the training-time `log1p` on the target.
pub fn invert_log_price(log_price: f64) -> f64 {
    log_price.exp_m1()
}

/// Owns the fitted artifacts for the process lifetime. Stateless per request.
#[derive(Clone)]
pub struct PredictionService {
    preprocessor: Arc<dyn Preprocessor>,
    model: Arc<dyn PriceModel>,
    policy: ConversionPolicy,
}

impl PredictionService {
    pub fn new(
        preprocessor: Arc<dyn Preprocessor>,
        model: Arc<dyn PriceModel>,
        policy: ConversionPolicy,
    ) -> Self {
        Self {
            preprocessor,
            model,
            policy,
        }
    }

    pub fn num_features(&self) -> usize {
        self.preprocessor.num_features()
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run one specification through transform, model, inverse transform and
    /// currency conversion.
    ///
    /// A zero rate for a non-USD currency is a warning, never an error: the
    /// USD price is still produced. Transform and model errors abort the
    /// request with no partial result.
    pub fn predict(
        &self,
        spec: &VehicleSpec,
        currency: Currency,
        exchange_rate: f64,
    ) -> Result<PredictionOutcome> {
        let mut warnings = Vec::new();
        if currency != Currency::Usd && exchange_rate == 0.0 {
            warn!(currency = %currency, "invalid exchange rate; showing USD price only");
            warnings.push(PredictionWarning::InvalidExchangeRate { currency });
        }

        let record = CanonicalRecord::from_spec(spec);
        let features = self.preprocessor.transform(&record)?;
        let log_price = self.model.predict(&features)?;
        let usd = invert_log_price(log_price);
        if !usd.is_finite() {
            return Err(AppError::Inference(format!(
                "log price {log_price} does not map to a finite USD price"
            )));
        }
        debug!(
            num_features = features.len(),
            log_price, usd, "model output"
        );

        let converted = match currency {
            Currency::Usd => None,
            _ if exchange_rate == 0.0 && self.policy.suppress_zero_rate => None,
            _ => Some(usd * exchange_rate),
        };
        if let Some(value) = converted.filter(|v| !v.is_finite()) {
            return Err(AppError::Inference(format!(
                "converted price {value} is not finite"
            )));
        }

        let result = PredictionResult {
            predicted_price_usd: usd,
            predicted_price_converted: converted,
            currency,
            exchange_rate,
        };

        let (headline, exchange_rate_note) = match result.predicted_price_converted {
            Some(value) if result.shows_conversion() => (
                format!(
                    "Estimated Car Price: {} ({currency})",
                    format_money(currency, value)
                ),
                Some(format!(
                    "Exchange Rate Used: 1 USD = {} {currency}",
                    format_rate(exchange_rate)
                )),
            ),
            _ => (
                format!(
                    "Estimated Car Price: {} (USD)",
                    format_money(Currency::Usd, usd)
                ),
                None,
            ),
        };

        info!(
            company = %spec.company_names,
            model = %spec.cars_names,
            currency = %currency,
            price_usd = usd,
            "prediction served"
        );

        let echo = EchoedRecord::new(spec, &result);
        Ok(PredictionOutcome {
            result,
            warnings,
            headline,
            exchange_rate_note,
            echo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{sample_spec, Cell, FeatureVector};

    /// Emits horsepower as the only feature.
    struct HorsepowerOnly;

    impl Preprocessor for HorsepowerOnly {
        fn transform(&self, record: &CanonicalRecord) -> Result<FeatureVector> {
            match record.columns()[3].1 {
                Cell::Number(v) if v.is_finite() => Ok(FeatureVector(vec![v])),
                other => Err(AppError::Transform(format!(
                    "horsepower: could not convert {other:?} to float"
                ))),
            }
        }

        fn num_features(&self) -> usize {
            1
        }
    }

    /// Fixed log-price regardless of input.
    struct FixedLogPrice(f64);

    impl PriceModel for FixedLogPrice {
        fn predict(&self, _features: &FeatureVector) -> Result<f64> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingModel;

    impl PriceModel for FailingModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64> {
            Err(AppError::Inference("booster is corrupt".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    const USD_PRICE: f64 = 25_000.0;

    fn service(policy: ConversionPolicy) -> PredictionService {
        PredictionService::new(
            Arc::new(HorsepowerOnly),
            Arc::new(FixedLogPrice(USD_PRICE.ln_1p())),
            policy,
        )
    }

    #[test]
    fn expm1_undoes_log1p() {
        for x in [0.0, 1e-9, 0.5, 1.0, 999.0, 25_000.0, 1.5e6, 3.2e7] {
            let back = invert_log_price(f64::ln_1p(x));
            assert!((back - x).abs() <= 1e-9 * x.max(1.0), "x={x} back={back}");
        }
    }

    #[test]
    fn usd_request_never_converts() {
        let out = service(ConversionPolicy::default())
            .predict(&sample_spec(), Currency::Usd, 15_000.0)
            .unwrap();
        assert!(out.result.predicted_price_converted.is_none());
        assert!(out.warnings.is_empty());
        assert!((out.result.predicted_price_usd - USD_PRICE).abs() < 1e-6);
        assert_eq!(out.headline, "Estimated Car Price: $ 25,000 (USD)");
        assert!(out.exchange_rate_note.is_none());
        assert!(out.echo.predicted_price_converted.is_none());
    }

    #[test]
    fn usd_with_zero_rate_is_not_a_warning() {
        let out = service(ConversionPolicy::default())
            .predict(&sample_spec(), Currency::Usd, 0.0)
            .unwrap();
        assert!(out.warnings.is_empty());
        assert!(out.echo.predicted_price_usd.starts_with('$'));
    }

    #[test]
    fn idr_conversion_multiplies_by_rate() {
        let out = service(ConversionPolicy::default())
            .predict(&sample_spec(), Currency::Idr, 15_000.0)
            .unwrap();
        let usd = out.result.predicted_price_usd;
        assert_eq!(out.result.predicted_price_converted, Some(usd * 15_000.0));
        assert_eq!(out.headline, "Estimated Car Price: Rp 375,000,000 (IDR)");
        assert_eq!(
            out.exchange_rate_note.as_deref(),
            Some("Exchange Rate Used: 1 USD = 15,000 IDR")
        );
        assert_eq!(
            out.echo.predicted_price_converted.as_deref(),
            Some("Rp 375,000,000")
        );
    }

    #[test]
    fn eur_with_zero_rate_warns_and_reports_zero() {
        let out = service(ConversionPolicy::default())
            .predict(&sample_spec(), Currency::Eur, 0.0)
            .unwrap();
        assert_eq!(
            out.warnings,
            vec![PredictionWarning::InvalidExchangeRate {
                currency: Currency::Eur
            }]
        );
        assert_eq!(out.result.predicted_price_converted, Some(0.0));
        assert_eq!(
            format_money(Currency::Eur, out.result.predicted_price_converted.unwrap()),
            "€ 0"
        );
        assert_eq!(out.headline, "Estimated Car Price: $ 25,000 (USD)");
    }

    #[test]
    fn zero_rate_conversion_can_be_suppressed() {
        let out = service(ConversionPolicy {
            suppress_zero_rate: true,
        })
        .predict(&sample_spec(), Currency::Jpy, 0.0)
        .unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.result.predicted_price_converted.is_none());
    }

    #[test]
    fn other_currency_has_no_symbol() {
        let out = service(ConversionPolicy::default())
            .predict(&sample_spec(), Currency::Other, 2.0)
            .unwrap();
        assert_eq!(out.headline, "Estimated Car Price: 50,000 (Other)");
    }

    #[test]
    fn transform_failure_yields_no_result() {
        let mut spec = sample_spec();
        spec.horsepower = f64::NAN;
        let err = service(ConversionPolicy::default())
            .predict(&spec, Currency::Usd, 0.0)
            .unwrap_err();
        assert!(matches!(err, AppError::Transform(_)));
    }

    #[test]
    fn overflowing_log_price_is_an_inference_error() {
        let svc = PredictionService::new(
            Arc::new(HorsepowerOnly),
            Arc::new(FixedLogPrice(800.0)),
            ConversionPolicy::default(),
        );
        for (currency, rate) in [(Currency::Usd, 0.0), (Currency::Idr, 15_000.0)] {
            let err = svc.predict(&sample_spec(), currency, rate).unwrap_err();
            assert!(matches!(err, AppError::Inference(_)), "{currency}: {err}");
        }
    }

    #[test]
    fn overflowing_conversion_is_an_inference_error() {
        let svc = PredictionService::new(
            Arc::new(HorsepowerOnly),
            Arc::new(FixedLogPrice(705.0)),
            ConversionPolicy::default(),
        );
        assert!(svc.predict(&sample_spec(), Currency::Usd, 0.0).is_ok());
        let err = svc
            .predict(&sample_spec(), Currency::Jpy, 100_000.0)
            .unwrap_err();
        assert!(matches!(err, AppError::Inference(_)));
    }

    #[test]
    fn model_failure_yields_no_result() {
        let svc = PredictionService::new(
            Arc::new(HorsepowerOnly),
            Arc::new(FailingModel),
            ConversionPolicy::default(),
        );
        let err = svc.predict(&sample_spec(), Currency::Idr, 15_000.0).unwrap_err();
        assert_eq!(err.to_string(), "Model inference failed: booster is corrupt");
    }
}
