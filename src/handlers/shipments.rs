use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{Actor, IdParam};
use crate::{
    entities::shipment::Model as ShipmentModel,
    errors::ServiceError,
    services::shipments::{CreateShipmentRequest, ShipmentView, UpdateShipmentStatusRequest},
    ApiResponse, AppState,
};

pub async fn list_shipments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ShipmentView>>>, ServiceError> {
    let shipments = state.services.shipments.list_shipments().await?;
    Ok(Json(ApiResponse::success(shipments)))
}

pub async fn create_shipment(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShipmentModel>>), ServiceError> {
    let shipment = state
        .services
        .shipments
        .create_shipment(actor.as_str(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(shipment))))
}

pub async fn update_shipment_status(
    State(state): State<AppState>,
    actor: Actor,
    IdParam(id): IdParam,
    Json(payload): Json<UpdateShipmentStatusRequest>,
) -> Result<Json<ApiResponse<ShipmentModel>>, ServiceError> {
    let shipment = state
        .services
        .shipments
        .update_shipment_status(actor.as_str(), id, payload)
        .await?;
    Ok(Json(ApiResponse::success(shipment)))
}
