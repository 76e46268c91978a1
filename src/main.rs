mod api;
mod artifacts;
mod config;
mod dataset;
mod error;
mod format;
mod input;
mod predictor;
mod types;

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::artifacts::{check_compatible, FittedPipeline, PriceModel, PriceModelArtifact, Preprocessor};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::predictor::{ConversionPolicy, PredictionService};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Fitted artifacts: the app cannot serve predictions without them ---
    let pipeline = FittedPipeline::load(Path::new(&cfg.pipeline_path))?;
    let model = PriceModelArtifact::load(Path::new(&cfg.model_path))?;
    check_compatible(&pipeline, &model)?;
    info!(
        pipeline = %cfg.pipeline_path,
        model = %cfg.model_path,
        kind = model.name(),
        num_features = pipeline.num_features(),
        "Artifacts loaded"
    );
    debug!(features = ?pipeline.feature_names(), "Pipeline output features");

    let service = PredictionService::new(
        Arc::new(pipeline),
        Arc::new(model),
        ConversionPolicy {
            suppress_zero_rate: cfg.suppress_zero_rate_conversion,
        },
    );

    // --- Historical dataset: optional, only the EDA endpoints need it ---
    let dataset = match Dataset::load(Path::new(&cfg.dataset_path)) {
        Ok(d) if d.is_empty() => {
            warn!("Dataset at {} has no rows; EDA endpoints will return empty aggregates", cfg.dataset_path);
            Some(d)
        }
        Ok(d) => Some(d),
        Err(e) => {
            warn!("Dataset unavailable at {}: {e}. EDA endpoints will return 503.", cfg.dataset_path);
            None
        }
    };

    // HTTP server
    let app = router(ApiState::new(service, dataset));
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP server listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
