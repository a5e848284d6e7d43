use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{Actor, IdParam};
use crate::{
    entities::order::Model as OrderModel,
    errors::ServiceError,
    services::orders::{CreateOrderRequest, CreatedOrder, OrderView, UpdateOrderStatusRequest},
    ApiResponse, AppState,
};

/// List every order with its items
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OrderView>>>, ServiceError> {
    let orders = state.services.orders.list_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

pub async fn get_order(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<ApiResponse<OrderView>>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Create an order together with its items
pub async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedOrder>>), ServiceError> {
    let created = state
        .services
        .orders
        .create_order(actor.as_str(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    actor: Actor,
    IdParam(id): IdParam,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderModel>>, ServiceError> {
    let order = state
        .services
        .orders
        .update_order_status(actor.as_str(), id, payload)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
