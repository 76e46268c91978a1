use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{error, warn};

use super::health::{HealthCounters, HealthState};
use super::latency::{LatencySnapshot, LatencyStats};
use super::pages;
use crate::config::HISTOGRAM_BINS;
use crate::dataset::{Dataset, DatasetSummary, Histogram};
use crate::error::{AppError, Result};
use crate::input::{PredictRequest, VehicleForm};
use crate::predictor::{PredictionOutcome, PredictionService};

const MAX_HISTOGRAM_BINS: usize = 200;

#[derive(Clone)]
pub struct ApiState {
    pub service: PredictionService,
    pub dataset: Option<Arc<Dataset>>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

impl ApiState {
    pub fn new(service: PredictionService, dataset: Option<Dataset>) -> Self {
        Self {
            service,
            dataset: dataset.map(Arc::new),
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
        }
    }

    /// Request boundary: every failure is logged, counted and handed back
    /// for display. Nothing here panics or retries.
    fn run_prediction(&self, request: &PredictRequest) -> Result<PredictionOutcome> {
        let started = Instant::now();
        let outcome = self.service.predict(
            &request.record,
            request.currency,
            request.exchange_rate,
        );
        match &outcome {
            Ok(o) => {
                self.latency.record(started.elapsed());
                self.health.record_success(o.warnings.len(), now_ns());
            }
            Err(e) => {
                error!("Prediction failed: {e}");
                self.health.record_failure();
            }
        }
        outcome
    }

    fn reject(&self, e: &AppError) {
        warn!("Rejected input: {e}");
        self.health.record_rejection();
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/predict", post(submit_form))
        .route("/api/predict", post(predict_json))
        .route("/api/eda/summary", get(eda_summary))
        .route("/api/eda/histogram/:column", get(eda_histogram))
        .route("/health", get(health))
        .route("/stats/latency", get(stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct HistogramQuery {
    pub bins: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub num_features: usize,
    pub dataset_rows: Option<usize>,
    #[serde(flatten)]
    pub counters: HealthCounters,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn form_page() -> Html<String> {
    Html(pages::form_page(&VehicleForm::with_defaults()))
}

async fn submit_form(State(state): State<ApiState>, Form(form): Form<VehicleForm>) -> Response {
    let request = match form.parse() {
        Ok(r) => r,
        Err(e) => {
            state.reject(&e);
            return (e.status(), Html(pages::failure_page(&form, &e))).into_response();
        }
    };
    match state.run_prediction(&request) {
        Ok(outcome) => Html(pages::result_page(&form, &outcome)).into_response(),
        Err(e) => (e.status(), Html(pages::failure_page(&form, &e))).into_response(),
    }
}

async fn predict_json(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionOutcome>> {
    let request = match payload {
        Ok(Json(r)) => r,
        Err(rejection) => {
            let e = AppError::Validation(rejection.body_text());
            state.reject(&e);
            return Err(e);
        }
    };
    if let Err(e) = request.validate() {
        state.reject(&e);
        return Err(e);
    }
    Ok(Json(state.run_prediction(&request)?))
}

async fn eda_summary(State(state): State<ApiState>) -> Result<Json<DatasetSummary>> {
    let dataset = state.dataset.as_ref().ok_or(AppError::DatasetUnavailable)?;
    Ok(Json(dataset.summary()))
}

async fn eda_histogram(
    State(state): State<ApiState>,
    Path(column): Path<String>,
    Query(params): Query<HistogramQuery>,
) -> Result<Json<Histogram>> {
    let dataset = state.dataset.as_ref().ok_or(AppError::DatasetUnavailable)?;
    let bins = params
        .bins
        .unwrap_or(HISTOGRAM_BINS)
        .clamp(1, MAX_HISTOGRAM_BINS);
    Ok(Json(dataset.histogram(&column, bins)?))
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.service.model_name().to_string(),
        num_features: state.service.num_features(),
        dataset_rows: state.dataset.as_ref().map(|d| d.len()),
        counters: state.health.counters(),
    })
}

async fn stats_latency(State(state): State<ApiState>) -> Json<LatencySnapshot> {
    Json(state.latency.snapshot())
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
