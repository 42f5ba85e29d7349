pub mod state;

use axum::Router;
use axum::routing::get;

use crate::features::pipeline::{handle_healthcheck, handle_latest_analysis, handle_run_analysis};

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handle_healthcheck))
        .route(
            "/api/analysis",
            get(handle_latest_analysis).post(handle_run_analysis),
        )
        .with_state(state)
}
