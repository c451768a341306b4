use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::use_cases::merge_pipeline::{MergePipeline, PipelineReport};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;

/// Load `.env` and configuration, install logging, then run the pipeline once
pub async fn run() -> Result<PipelineReport> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = AppConfig::load()?;
    info!(
        first = %config.input.first.display(),
        second = %config.input.second.display(),
        output = %config.output.json_path.display(),
        database = ?config.database,
        "Starting merge"
    );

    MergePipeline::new(config).run().await
}
