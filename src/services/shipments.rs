use crate::{
    db::DbPool,
    entities::{
        order,
        shipment::{self, Entity as ShipmentEntity, Model as ShipmentModel},
        transport,
    },
    errors::ServiceError,
    events::{AuditAction, AuditEntry, AuditLogger, EntityKind},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use super::{status_or_default, validate_not_blank};

pub const DEFAULT_SHIPMENT_STATUS: &str = "planned";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShipmentRequest {
    #[validate(range(min = 1, message = "order_id must reference an order"))]
    pub order_id: i32,
    /// Missing, null and 0 all mean "no transport assigned"
    #[validate(range(min = 0, message = "transport_id must not be negative"))]
    #[serde(default)]
    pub transport_id: Option<i32>,
    #[serde(default)]
    pub planned_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateShipmentRequest {
    /// Transport reference to persist; the 0 sentinel becomes `None`
    pub fn transport_ref(&self) -> Option<i32> {
        self.transport_id.filter(|id| *id > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateShipmentStatusRequest {
    #[validate(custom = "validate_not_blank")]
    pub status: String,
    /// Recorded as the actual shipping date when present
    #[serde(default)]
    pub actual_date: Option<NaiveDate>,
}

/// Shipment with order number and transport name resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct ShipmentView {
    pub id: i32,
    pub order_id: i32,
    pub order_number: Option<String>,
    pub transport_id: Option<i32>,
    pub transport_name: Option<String>,
    pub planned_date: Option<NaiveDate>,
    pub actual_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ShipmentService {
    db_pool: Arc<DbPool>,
    audit: AuditLogger,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditLogger) -> Self {
        Self { db_pool, audit }
    }

    #[instrument(skip(self, request), fields(order_id = request.order_id))]
    pub async fn create_shipment(
        &self,
        actor: &str,
        request: CreateShipmentRequest,
    ) -> Result<ShipmentModel, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let shipment = shipment::ActiveModel {
            order_id: Set(request.order_id),
            transport_id: Set(request.transport_ref()),
            planned_date: Set(request.planned_date),
            actual_date: Set(request.actual_date),
            status: Set(status_or_default(
                request.status.as_deref(),
                DEFAULT_SHIPMENT_STATUS,
            )),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = request.order_id, "Failed to insert shipment");
            ServiceError::db_error(e)
        })?;

        info!(shipment_id = shipment.id, "Shipment created");
        self.audit.record(AuditEntry::new(
            actor,
            AuditAction::Create,
            EntityKind::Shipment,
            format!(
                "shipment {} created for order {}",
                shipment.id, shipment.order_id
            ),
        ));

        Ok(shipment)
    }

    /// Shipments, most recent first
    #[instrument(skip(self))]
    pub async fn list_shipments(&self) -> Result<Vec<ShipmentView>, ServiceError> {
        ShipmentEntity::find()
            .select_only()
            .columns([
                shipment::Column::Id,
                shipment::Column::OrderId,
                shipment::Column::TransportId,
                shipment::Column::PlannedDate,
                shipment::Column::ActualDate,
                shipment::Column::Status,
                shipment::Column::CreatedAt,
                shipment::Column::UpdatedAt,
            ])
            .column_as(order::Column::OrderNumber, "order_number")
            .column_as(transport::Column::Name, "transport_name")
            .join(JoinType::LeftJoin, shipment::Relation::Order.def())
            .join(JoinType::LeftJoin, shipment::Relation::Transport.def())
            .order_by_desc(shipment::Column::CreatedAt)
            .order_by_desc(shipment::Column::Id)
            .into_model::<ShipmentView>()
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list shipments");
                ServiceError::db_error(e)
            })
    }

    #[instrument(skip(self, request), fields(shipment_id = shipment_id, new_status = %request.status))]
    pub async fn update_shipment_status(
        &self,
        actor: &str,
        shipment_id: i32,
        request: UpdateShipmentStatusRequest,
    ) -> Result<ShipmentModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let status = request.status.trim().to_string();

        let mut update = ShipmentEntity::update_many()
            .col_expr(shipment::Column::Status, Expr::value(status.clone()))
            .col_expr(shipment::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(actual_date) = request.actual_date {
            update = update.col_expr(shipment::Column::ActualDate, Expr::value(actual_date));
        }

        let result = update
            .filter(shipment::Column::Id.eq(shipment_id))
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, shipment_id, "Failed to update shipment status");
                ServiceError::db_error(e)
            })?;

        if result.rows_affected == 0 {
            warn!(shipment_id, "Shipment not found for status update");
            return Err(ServiceError::NotFound(format!(
                "Shipment {shipment_id} not found"
            )));
        }

        info!(shipment_id, new_status = %status, "Shipment status updated");
        self.audit.record(AuditEntry::new(
            actor,
            AuditAction::UpdateStatus,
            EntityKind::Shipment,
            format!("shipment {shipment_id} status set to {status}"),
        ));

        ShipmentEntity::find_by_id(shipment_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, shipment_id, "Failed to reload shipment");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Shipment {shipment_id} not found")))
    }
}
