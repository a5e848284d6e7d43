use crate::{
    db::DbPool,
    entities::{
        equipment_category, equipment_item, ore_batch, ore_type, unit, warehouse,
    },
    errors::ServiceError,
    events::{AuditAction, AuditEntry, AuditLogger, EntityKind},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, EntityTrait, FromQueryResult, JoinType, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

use super::{validate_not_blank, validate_positive_quantity};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBatchRequest {
    #[validate(custom = "validate_not_blank")]
    pub batch_code: String,
    #[validate(range(min = 1, message = "ore_type_id must reference an ore type"))]
    pub ore_type_id: i32,
    #[validate(range(min = 1, message = "warehouse_id must reference a warehouse"))]
    pub warehouse_id: i32,
    #[validate(range(min = 1, message = "unit_id must reference a unit"))]
    pub unit_id: i32,
    #[validate(custom = "validate_positive_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub quality: Option<f64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub mined_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEquipmentRequest {
    #[validate(range(min = 1, message = "category_id must reference an equipment category"))]
    pub category_id: i32,
    #[validate(range(min = 1, message = "warehouse_id must reference a warehouse"))]
    pub warehouse_id: i32,
    #[validate(range(min = 1, message = "unit_id must reference a unit"))]
    pub unit_id: i32,
    #[validate(custom = "validate_positive_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[validate(range(min = 0, message = "service_life_months must not be negative"))]
    #[serde(default)]
    pub service_life_months: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Ore batch with ore type, warehouse and unit names resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct BatchView {
    pub id: i32,
    pub batch_code: String,
    pub ore_type_id: i32,
    pub ore_type_name: String,
    pub warehouse_id: i32,
    pub warehouse_name: String,
    pub unit_id: i32,
    pub unit_name: String,
    pub unit_symbol: String,
    pub quantity: f64,
    pub quality: Option<f64>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub mined_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct EquipmentView {
    pub id: i32,
    pub category_id: i32,
    pub category_name: String,
    pub warehouse_id: i32,
    pub warehouse_name: String,
    pub unit_id: i32,
    pub unit_name: String,
    pub unit_symbol: String,
    pub quantity: f64,
    pub serial_number: Option<String>,
    pub service_life_months: Option<i32>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Ore batches and equipment stock
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    audit: AuditLogger,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditLogger) -> Self {
        Self { db_pool, audit }
    }

    #[instrument(skip(self, request), fields(batch_code = %request.batch_code))]
    pub async fn create_batch(
        &self,
        actor: &str,
        request: CreateBatchRequest,
    ) -> Result<ore_batch::Model, ServiceError> {
        request.validate()?;

        let batch = ore_batch::ActiveModel {
            batch_code: Set(request.batch_code.trim().to_string()),
            ore_type_id: Set(request.ore_type_id),
            warehouse_id: Set(request.warehouse_id),
            unit_id: Set(request.unit_id),
            quantity: Set(request.quantity),
            quality: Set(request.quality),
            priority: Set(non_blank(request.priority)),
            status: Set(non_blank(request.status)),
            mined_on: Set(request.mined_on),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert ore batch");
            ServiceError::db_error(e)
        })?;

        info!(batch_id = batch.id, "Ore batch created");
        self.audit.record(AuditEntry::new(
            actor,
            AuditAction::Create,
            EntityKind::OreBatch,
            format!(
                "batch {} ({}) created, quantity {}",
                batch.id, batch.batch_code, batch.quantity
            ),
        ));

        Ok(batch)
    }

    /// Batches with catalog names, most recent first
    #[instrument(skip(self))]
    pub async fn list_batches(&self) -> Result<Vec<BatchView>, ServiceError> {
        ore_batch::Entity::find()
            .select_only()
            .columns([
                ore_batch::Column::Id,
                ore_batch::Column::BatchCode,
                ore_batch::Column::OreTypeId,
                ore_batch::Column::WarehouseId,
                ore_batch::Column::UnitId,
                ore_batch::Column::Quantity,
                ore_batch::Column::Quality,
                ore_batch::Column::Priority,
                ore_batch::Column::Status,
                ore_batch::Column::MinedOn,
                ore_batch::Column::CreatedAt,
            ])
            .column_as(ore_type::Column::Name, "ore_type_name")
            .column_as(warehouse::Column::Name, "warehouse_name")
            .column_as(unit::Column::Name, "unit_name")
            .column_as(unit::Column::Symbol, "unit_symbol")
            .join(JoinType::InnerJoin, ore_batch::Relation::OreType.def())
            .join(JoinType::InnerJoin, ore_batch::Relation::Warehouse.def())
            .join(JoinType::InnerJoin, ore_batch::Relation::Unit.def())
            .order_by_desc(ore_batch::Column::CreatedAt)
            .order_by_desc(ore_batch::Column::Id)
            .into_model::<BatchView>()
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list ore batches");
                ServiceError::db_error(e)
            })
    }

    #[instrument(skip(self, request), fields(category_id = request.category_id))]
    pub async fn create_equipment(
        &self,
        actor: &str,
        request: CreateEquipmentRequest,
    ) -> Result<equipment_item::Model, ServiceError> {
        request.validate()?;

        let item = equipment_item::ActiveModel {
            category_id: Set(request.category_id),
            warehouse_id: Set(request.warehouse_id),
            unit_id: Set(request.unit_id),
            quantity: Set(request.quantity),
            serial_number: Set(non_blank(request.serial_number)),
            service_life_months: Set(request.service_life_months),
            status: Set(non_blank(request.status)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert equipment item");
            ServiceError::db_error(e)
        })?;

        info!(equipment_id = item.id, "Equipment item created");
        self.audit.record(AuditEntry::new(
            actor,
            AuditAction::Create,
            EntityKind::Equipment,
            format!(
                "equipment {} (category {}) created, quantity {}",
                item.id, item.category_id, item.quantity
            ),
        ));

        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn list_equipment(&self) -> Result<Vec<EquipmentView>, ServiceError> {
        equipment_item::Entity::find()
            .select_only()
            .columns([
                equipment_item::Column::Id,
                equipment_item::Column::CategoryId,
                equipment_item::Column::WarehouseId,
                equipment_item::Column::UnitId,
                equipment_item::Column::Quantity,
                equipment_item::Column::SerialNumber,
                equipment_item::Column::ServiceLifeMonths,
                equipment_item::Column::Status,
                equipment_item::Column::CreatedAt,
            ])
            .column_as(equipment_category::Column::Name, "category_name")
            .column_as(warehouse::Column::Name, "warehouse_name")
            .column_as(unit::Column::Name, "unit_name")
            .column_as(unit::Column::Symbol, "unit_symbol")
            .join(JoinType::InnerJoin, equipment_item::Relation::Category.def())
            .join(JoinType::InnerJoin, equipment_item::Relation::Warehouse.def())
            .join(JoinType::InnerJoin, equipment_item::Relation::Unit.def())
            .order_by_desc(equipment_item::Column::CreatedAt)
            .order_by_desc(equipment_item::Column::Id)
            .into_model::<EquipmentView>()
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list equipment");
                ServiceError::db_error(e)
            })
    }
}
