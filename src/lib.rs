//! Ore Warehouse API Library
//!
//! Warehouse backend for an ore-processing operation: reference catalog,
//! ore batches and equipment, sales orders with line items, shipments and an
//! audit trail, served over a JSON REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod services;
pub mod tracing;

use axum::{
    http::HeaderValue,
    routing::{get, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::events::AuditLogger;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig, audit: AuditLogger) -> Self {
        let services = handlers::AppServices::new(db.clone(), audit);
        Self {
            db,
            config,
            services,
            started_at: Instant::now(),
        }
    }
}

// Common response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Routes mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route(
            "/orders/:id/status",
            put(handlers::orders::update_order_status),
        );

    let inventory = Router::new()
        .route(
            "/batches",
            get(handlers::inventory::list_batches).post(handlers::inventory::create_batch),
        )
        .route(
            "/equipment",
            get(handlers::inventory::list_equipment).post(handlers::inventory::create_equipment),
        );

    let shipments = Router::new()
        .route(
            "/shipments",
            get(handlers::shipments::list_shipments).post(handlers::shipments::create_shipment),
        )
        .route(
            "/shipments/:id/status",
            put(handlers::shipments::update_shipment_status),
        );

    let catalog = Router::new()
        .route("/units", get(handlers::catalog::list_units))
        .route("/units/:id", get(handlers::catalog::get_unit))
        .route("/warehouses", get(handlers::catalog::list_warehouses))
        .route("/warehouses/:id", get(handlers::catalog::get_warehouse))
        .route("/ore-types", get(handlers::catalog::list_ore_types))
        .route("/ore-types/:id", get(handlers::catalog::get_ore_type))
        .route(
            "/equipment-categories",
            get(handlers::catalog::list_equipment_categories),
        )
        .route(
            "/equipment-categories/:id",
            get(handlers::catalog::get_equipment_category),
        )
        .route("/contractors", get(handlers::catalog::list_contractors))
        .route("/contractors/:id", get(handlers::catalog::get_contractor))
        .route("/transport", get(handlers::catalog::list_transport))
        .route("/transport/:id", get(handlers::catalog::get_transport));

    Router::new()
        .merge(orders)
        .merge(inventory)
        .merge(shipments)
        .route("/logs", get(handlers::logs::list_logs))
        .nest("/catalog", catalog)
}

/// CORS policy: explicit origins when configured, permissive in development,
/// same-origin only otherwise.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.is_development() {
        ::tracing::info!("Using permissive CORS in the development environment");
        CorsLayer::permissive()
    } else {
        ::tracing::warn!(
            "No CORS origins configured; cross-origin requests will be refused (set APP__CORS_ALLOWED_ORIGINS)"
        );
        CorsLayer::new()
    }
}

/// Full application router with middleware applied
pub fn build_router(state: AppState) -> Router {
    let mut app = Router::<AppState>::new()
        .merge(health::health_routes())
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api/v1", api_v1_routes());

    if let Some(dir) = state.config.static_dir.as_ref() {
        ::tracing::info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    let cors = cors_layer(&state.config);

    app.layer(crate::tracing::configure_http_tracing())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
