use axum::{extract::State, Json};

use super::IdParam;
use crate::{
    entities::{contractor, equipment_category, ore_type, transport, unit, warehouse},
    errors::ServiceError,
    ApiResponse, AppState,
};

type ListResult<T> = Result<Json<ApiResponse<Vec<T>>>, ServiceError>;
type ItemResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

pub async fn list_units(State(state): State<AppState>) -> ListResult<unit::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_units().await?,
    )))
}

pub async fn get_unit(State(state): State<AppState>, IdParam(id): IdParam) -> ItemResult<unit::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_unit(id).await?,
    )))
}

pub async fn list_warehouses(State(state): State<AppState>) -> ListResult<warehouse::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_warehouses().await?,
    )))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> ItemResult<warehouse::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_warehouse(id).await?,
    )))
}

pub async fn list_ore_types(State(state): State<AppState>) -> ListResult<ore_type::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_ore_types().await?,
    )))
}

pub async fn get_ore_type(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> ItemResult<ore_type::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_ore_type(id).await?,
    )))
}

pub async fn list_equipment_categories(
    State(state): State<AppState>,
) -> ListResult<equipment_category::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_equipment_categories().await?,
    )))
}

pub async fn get_equipment_category(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> ItemResult<equipment_category::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_equipment_category(id).await?,
    )))
}

pub async fn list_contractors(State(state): State<AppState>) -> ListResult<contractor::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_contractors().await?,
    )))
}

pub async fn get_contractor(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> ItemResult<contractor::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_contractor(id).await?,
    )))
}

pub async fn list_transport(State(state): State<AppState>) -> ListResult<transport::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_transport().await?,
    )))
}

pub async fn get_transport(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> ItemResult<transport::Model> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_transport(id).await?,
    )))
}
