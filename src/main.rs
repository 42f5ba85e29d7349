use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use news_bias_ai::config::load_config;
use news_bias_ai::core::cache::CacheManager;
use news_bias_ai::core::error::AppError;
use news_bias_ai::features::comparison::ComparisonService;
use news_bias_ai::features::generation::GeminiClient;
use news_bias_ai::features::news::NewsApiClient;
use news_bias_ai::features::pipeline::PipelineService;
use news_bias_ai::server::{AppState, build_router};

const CACHE_CAPACITY: u64 = 256;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(error) => {
            tracing::error!(%error, "refusing to start");
            return Err(error);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let cache_manager = CacheManager::new(config.cache_enabled, CACHE_CAPACITY);
    let news_client = Arc::new(NewsApiClient::new(config.clone(), cache_manager.clone())?);
    let gemini_client = Arc::new(GeminiClient::new(config.clone())?);
    let comparison_service = Arc::new(ComparisonService::new(&config, gemini_client)?);
    let pipeline = Arc::new(PipelineService::new(
        config.clone(),
        news_client,
        comparison_service,
        cache_manager,
    ));

    let app = build_router(AppState::new(pipeline));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        %addr,
        liberal = %config.liberal.name,
        conservative = %config.conservative.name,
        "starting server"
    );
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::internal(format!("failed to bind: {err}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|err| AppError::internal(format!("server error: {err}")))?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
