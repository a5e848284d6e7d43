use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{entities::log_entry, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub limit: Option<u64>,
}

/// Audit trail, newest first
pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<log_entry::Model>>>, ServiceError> {
    let Query(query) = query?;
    let entries = state.services.logs.list_logs(query.limit).await?;
    Ok(Json(ApiResponse::success(entries)))
}
