use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde_json::{Value, json};

use crate::core::error::AppError;
use crate::features::pipeline::dto::{AnalysisReportDto, LatestAnalysisQuery};
use crate::features::pipeline::helpers::parse_analysis_request;
use crate::server::AppState;

pub async fn handle_run_analysis(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisReportDto>, AppError> {
    let request = parse_analysis_request(&body)?;
    let report = state.pipeline.run_analysis(request).await?;
    Ok(Json(report))
}

pub async fn handle_latest_analysis(
    State(state): State<AppState>,
    Query(query): Query<LatestAnalysisQuery>,
) -> Result<Json<AnalysisReportDto>, AppError> {
    let report = state.pipeline.latest_report(query.lookback_hours).await?;
    Ok(Json(report))
}

pub async fn handle_healthcheck() -> Result<Json<Value>, AppError> {
    Ok(Json(json!({ "status": "ok" })))
}
