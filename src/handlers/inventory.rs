use axum::{extract::State, http::StatusCode, Json};

use super::Actor;
use crate::{
    entities::{equipment_item, ore_batch},
    errors::ServiceError,
    services::inventory::{BatchView, CreateBatchRequest, CreateEquipmentRequest, EquipmentView},
    ApiResponse, AppState,
};

pub async fn list_batches(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BatchView>>>, ServiceError> {
    let batches = state.services.inventory.list_batches().await?;
    Ok(Json(ApiResponse::success(batches)))
}

pub async fn create_batch(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateBatchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ore_batch::Model>>), ServiceError> {
    let batch = state
        .services
        .inventory
        .create_batch(actor.as_str(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(batch))))
}

pub async fn list_equipment(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<EquipmentView>>>, ServiceError> {
    let items = state.services.inventory.list_equipment().await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn create_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateEquipmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<equipment_item::Model>>), ServiceError> {
    let item = state
        .services
        .inventory
        .create_equipment(actor.as_str(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}
