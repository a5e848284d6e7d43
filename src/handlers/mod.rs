pub mod catalog;
pub mod inventory;
pub mod logs;
pub mod orders;
pub mod shipments;

use crate::{
    db::DbPool,
    errors::ServiceError,
    events::{AuditLogger, DEFAULT_ACTOR},
    services::{
        catalog::CatalogService, inventory::InventoryService, logs::LogService,
        orders::OrderService, shipments::ShipmentService,
    },
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::convert::Infallible;
use std::sync::Arc;

/// Header a caller uses to name itself in the audit trail
pub const ACTOR_HEADER: &str = "x-actor";

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub inventory: Arc<InventoryService>,
    pub orders: Arc<OrderService>,
    pub shipments: Arc<ShipmentService>,
    pub logs: Arc<LogService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditLogger) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            inventory: Arc::new(InventoryService::new(db_pool.clone(), audit.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone(), audit.clone())),
            shipments: Arc::new(ShipmentService::new(db_pool.clone(), audit)),
            logs: Arc::new(LogService::new(db_pool)),
        }
    }
}

/// Who performed a mutating request. Taken from `x-actor`, else `system`.
/// Attribution only; nothing is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_ACTOR);
        Ok(Actor(actor.to_string()))
    }
}

/// Numeric `:id` path segment. Anything that is not an `i32` is a 400 with
/// the usual error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParam(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state).await?;
        Ok(IdParam(id))
    }
}
