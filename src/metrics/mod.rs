//! Prometheus counters for the order write path and the audit pipeline,
//! exposed in text format at `GET /metrics`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use tracing::error;

use crate::errors::ServiceError;

lazy_static! {
    pub static ref REGISTRY: Registry = build_registry();
    pub static ref ORDERS_CREATED: IntCounter =
        IntCounter::new("orders_created_total", "Total number of orders created")
            .expect("metric can be created");
    pub static ref ORDER_CREATION_FAILURES: IntCounter = IntCounter::new(
        "order_creation_failures_total",
        "Total number of failed order creations"
    )
    .expect("metric can be created");
    pub static ref AUDIT_ENTRIES_WRITTEN: IntCounter = IntCounter::new(
        "audit_entries_written_total",
        "Audit entries persisted by the audit writer"
    )
    .expect("metric can be created");
    pub static ref AUDIT_WRITE_FAILURES: IntCounter = IntCounter::new(
        "audit_write_failures_total",
        "Audit entries the sink failed to persist"
    )
    .expect("metric can be created");
    pub static ref AUDIT_ENTRIES_DROPPED: IntCounter = IntCounter::new(
        "audit_entries_dropped_total",
        "Audit entries dropped because the audit channel was full or closed"
    )
    .expect("metric can be created");
}

fn build_registry() -> Registry {
    let registry = Registry::new();
    let counters: [&IntCounter; 5] = [
        &*ORDERS_CREATED,
        &*ORDER_CREATION_FAILURES,
        &*AUDIT_ENTRIES_WRITTEN,
        &*AUDIT_WRITE_FAILURES,
        &*AUDIT_ENTRIES_DROPPED,
    ];
    for counter in counters {
        if let Err(e) = registry.register(Box::new(counter.clone())) {
            error!("Failed to register metric: {}", e);
        }
    }
    registry
}

/// Renders every registered metric in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

pub async fn metrics_handler() -> Result<Response, ServiceError> {
    let body = render().map_err(|e| {
        error!("Failed to export metrics: {}", e);
        ServiceError::InternalError(format!("metrics export failed: {e}"))
    })?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
