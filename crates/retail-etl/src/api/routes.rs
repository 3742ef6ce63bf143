use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use retail_etl_core::{warehouse, AggregatedRecord, EtlError, RunReport};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RunParams {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub status: &'static str,
    pub report: RunReport,
}

pub async fn list_sales(
    State(state): State<AppState>,
) -> Result<Json<Vec<AggregatedRecord>>, ApiError> {
    let records = warehouse::fetch_aggregated(state.warehouse()).await?;
    Ok(Json(records))
}

pub async fn run_etl(
    State(state): State<AppState>,
    Query(params): Query<RunParams>,
) -> Result<Json<RunResponse>, ApiError> {
    let pipeline = state.pipeline().lock().await;
    let report = pipeline.run(params.date).await?;
    Ok(Json(RunResponse {
        status: "success",
        report,
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Wraps pipeline failures so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError(EtlError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_connection() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<EtlError> for ApiError {
    fn from(err: EtlError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(%status, "request failed: {}", self.0);
        let body = Json(json!({
            "status": "error",
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use retail_etl_core::db::SqlxError;

    use super::*;

    #[test]
    fn unreachable_store_maps_to_service_unavailable() {
        let err = ApiError::from(EtlError::connection("warehouse", SqlxError::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn other_failures_map_to_internal_error() {
        let err = ApiError::from(EtlError::FileNotFound {
            path: PathBuf::from("in_store_sales.csv"),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
