use crate::{
    db::DbPool,
    entities::{
        contractor, ore_batch,
        order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel},
        order_item::{self, Entity as OrderItemEntity, Model as OrderItemModel},
        unit, warehouse,
    },
    errors::ServiceError,
    events::{AuditAction, AuditEntry, AuditLogger, EntityKind},
    metrics::{ORDERS_CREATED, ORDER_CREATION_FAILURES},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use super::{status_or_default, validate_not_blank, validate_positive_quantity};

pub const DEFAULT_ORDER_STATUS: &str = "new";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderItemRequest {
    pub batch_id: i32,
    pub unit_id: i32,
    pub quantity: f64,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(custom = "validate_not_blank")]
    pub order_number: String,
    #[validate(range(min = 1, message = "contractor_id must reference a contractor"))]
    pub contractor_id: i32,
    #[validate(range(min = 1, message = "warehouse_id must reference a warehouse"))]
    pub warehouse_id: i32,
    /// Free-form; blank or missing becomes `new`
    #[serde(default)]
    pub status: Option<String>,
    /// Defaults to today (UTC)
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "an order needs at least one item"))]
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    #[validate(custom = "validate_not_blank")]
    pub status: String,
}

/// Rows written by a successful order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedOrder {
    #[serde(flatten)]
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
}

/// Order header with catalog names resolved and its items nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: i32,
    pub order_number: String,
    pub contractor_id: i32,
    pub contractor_name: Option<String>,
    pub warehouse_id: i32,
    pub warehouse_name: Option<String>,
    pub status: String,
    pub order_date: NaiveDate,
    pub total_quantity: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemView {
    pub id: i32,
    pub batch_id: i32,
    /// `None` when the referenced batch no longer exists
    pub batch_code: Option<String>,
    pub unit_id: i32,
    pub unit_name: Option<String>,
    pub unit_symbol: Option<String>,
    pub quantity: f64,
    pub price_per_unit: f64,
}

#[derive(Debug, Clone, FromQueryResult)]
struct OrderHeaderRow {
    id: i32,
    order_number: String,
    contractor_id: i32,
    contractor_name: Option<String>,
    warehouse_id: i32,
    warehouse_name: Option<String>,
    status: String,
    order_date: NaiveDate,
    total_quantity: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromQueryResult)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    batch_id: i32,
    batch_code: Option<String>,
    unit_id: i32,
    unit_name: Option<String>,
    unit_symbol: Option<String>,
    quantity: f64,
    price_per_unit: f64,
}

impl From<OrderHeaderRow> for OrderView {
    fn from(row: OrderHeaderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            contractor_id: row.contractor_id,
            contractor_name: row.contractor_name,
            warehouse_id: row.warehouse_id,
            warehouse_name: row.warehouse_name,
            status: row.status,
            order_date: row.order_date,
            total_quantity: row.total_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            items: Vec::new(),
        }
    }
}

impl From<OrderItemRow> for OrderItemView {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            batch_id: row.batch_id,
            batch_code: row.batch_code,
            unit_id: row.unit_id,
            unit_name: row.unit_name,
            unit_symbol: row.unit_symbol,
            quantity: row.quantity,
            price_per_unit: row.price_per_unit,
        }
    }
}

/// Checks the whole request before anything is written
fn validate_create_order(request: &CreateOrderRequest) -> Result<(), ServiceError> {
    request.validate()?;

    for (index, item) in request.items.iter().enumerate() {
        if item.batch_id < 1 {
            return Err(ServiceError::ValidationError(format!(
                "items[{index}].batch_id must reference a batch"
            )));
        }
        if item.unit_id < 1 {
            return Err(ServiceError::ValidationError(format!(
                "items[{index}].unit_id must reference a unit"
            )));
        }
        if validate_positive_quantity(item.quantity).is_err() {
            return Err(ServiceError::ValidationError(format!(
                "items[{index}].quantity must be greater than zero"
            )));
        }
        if let Some(price) = item.price_per_unit {
            if !price.is_finite() {
                return Err(ServiceError::ValidationError(format!(
                    "items[{index}].price_per_unit must be a finite number"
                )));
            }
        }
    }

    Ok(())
}

/// Attaches items to their orders, keeping header order and per-order item
/// order exactly as the two queries returned them.
fn assemble_orders(headers: Vec<OrderHeaderRow>, items: Vec<OrderItemRow>) -> Vec<OrderView> {
    let mut orders: Vec<OrderView> = Vec::with_capacity(headers.len());
    let mut index_by_id: HashMap<i32, usize> = HashMap::with_capacity(headers.len());

    for header in headers {
        index_by_id.insert(header.id, orders.len());
        orders.push(header.into());
    }

    for item in items {
        match index_by_id.get(&item.order_id) {
            Some(&idx) => orders[idx].items.push(item.into()),
            None => warn!(
                order_id = item.order_id,
                item_id = item.id,
                "Item returned for an order outside the header set"
            ),
        }
    }

    orders
}

/// Service for sales orders and their line items
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    audit: AuditLogger,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, audit: AuditLogger) -> Self {
        Self { db_pool, audit }
    }

    /// Creates an order header and its items atomically.
    ///
    /// The header is inserted with a zero total, items follow in request
    /// order, and the header total is then set to the sum of their
    /// quantities. Any failure rolls the whole unit back. The audit entry is
    /// queued only after commit.
    #[instrument(skip(self, request), fields(order_number = %request.order_number, item_count = request.items.len()))]
    pub async fn create_order(
        &self,
        actor: &str,
        request: CreateOrderRequest,
    ) -> Result<CreatedOrder, ServiceError> {
        match self.insert_order(request).await {
            Ok(created) => {
                ORDERS_CREATED.inc();
                info!(
                    order_id = created.order.id,
                    total_quantity = created.order.total_quantity,
                    "Order created successfully"
                );
                self.audit.record(AuditEntry::new(
                    actor,
                    AuditAction::Create,
                    EntityKind::Order,
                    format!(
                        "order {} ({}) created with {} item(s), total quantity {}",
                        created.order.id,
                        created.order.order_number,
                        created.items.len(),
                        created.order.total_quantity
                    ),
                ));
                Ok(created)
            }
            Err(e) => {
                ORDER_CREATION_FAILURES.inc();
                if e.is_caller_error() {
                    warn!(error = %e, "Order creation rejected");
                } else {
                    error!(error = %e, "Order creation failed");
                }
                Err(e)
            }
        }
    }

    async fn insert_order(&self, request: CreateOrderRequest) -> Result<CreatedOrder, ServiceError> {
        validate_create_order(&request)?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::db_error(e)
        })?;

        let header = OrderActiveModel {
            order_number: Set(request.order_number.trim().to_string()),
            contractor_id: Set(request.contractor_id),
            warehouse_id: Set(request.warehouse_id),
            status: Set(status_or_default(
                request.status.as_deref(),
                DEFAULT_ORDER_STATUS,
            )),
            order_date: Set(request.order_date.unwrap_or_else(|| now.date_naive())),
            total_quantity: Set(0.0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert order header");
            ServiceError::db_error(e)
        })?;

        let mut total_quantity = 0.0;
        let mut items = Vec::with_capacity(request.items.len());
        for (position, item) in request.items.iter().enumerate() {
            let model = order_item::ActiveModel {
                order_id: Set(header.id),
                batch_id: Set(item.batch_id),
                unit_id: Set(item.unit_id),
                quantity: Set(item.quantity),
                price_per_unit: Set(item.price_per_unit.unwrap_or(0.0)),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = header.id, position, "Failed to insert order item");
                ServiceError::db_error(e)
            })?;

            total_quantity += item.quantity;
            items.push(model);
        }

        let mut header: OrderActiveModel = header.into();
        header.total_quantity = Set(total_quantity);
        header.updated_at = Set(Utc::now());
        let order = header.update(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to write order total");
            ServiceError::db_error(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = order.id, "Failed to commit order creation transaction");
            ServiceError::db_error(e)
        })?;

        Ok(CreatedOrder { order, items })
    }

    /// Sets a new status on one order. NotFound when no row matched.
    #[instrument(skip(self, request), fields(order_id = order_id, new_status = %request.status))]
    pub async fn update_order_status(
        &self,
        actor: &str,
        order_id: i32,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderModel, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let status = request.status.trim().to_string();

        let result = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(status.clone()))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id, "Failed to update order status");
                ServiceError::db_error(e)
            })?;

        if result.rows_affected == 0 {
            warn!(order_id, "Order not found for status update");
            return Err(ServiceError::NotFound(format!("Order {order_id} not found")));
        }

        info!(order_id, new_status = %status, "Order status updated");
        self.audit.record(AuditEntry::new(
            actor,
            AuditAction::UpdateStatus,
            EntityKind::Order,
            format!("order {order_id} status set to {status}"),
        ));

        OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id, "Failed to reload order after status update");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))
    }

    /// Every order, most recent first, each with its full item list
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderView>, ServiceError> {
        let orders = self.load_orders(Self::header_query()).await?;
        info!(count = orders.len(), "Orders listed");
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i32) -> Result<OrderView, ServiceError> {
        let query = Self::header_query().filter(order::Column::Id.eq(order_id));
        self.load_orders(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))
    }

    fn header_query() -> Select<OrderEntity> {
        OrderEntity::find()
            .select_only()
            .columns([
                order::Column::Id,
                order::Column::OrderNumber,
                order::Column::ContractorId,
                order::Column::WarehouseId,
                order::Column::Status,
                order::Column::OrderDate,
                order::Column::TotalQuantity,
                order::Column::CreatedAt,
                order::Column::UpdatedAt,
            ])
            .column_as(contractor::Column::Name, "contractor_name")
            .column_as(warehouse::Column::Name, "warehouse_name")
            .join(JoinType::LeftJoin, order::Relation::Contractor.def())
            .join(JoinType::LeftJoin, order::Relation::Warehouse.def())
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
    }

    /// Two-phase read: headers first, then every item of those headers in a
    /// single IN-list query.
    async fn load_orders(&self, headers: Select<OrderEntity>) -> Result<Vec<OrderView>, ServiceError> {
        let db = &*self.db_pool;

        let headers = headers
            .into_model::<OrderHeaderRow>()
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch order headers");
                ServiceError::db_error(e)
            })?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = headers.iter().map(|h| h.id).collect();

        let items = OrderItemEntity::find()
            .select_only()
            .columns([
                order_item::Column::Id,
                order_item::Column::OrderId,
                order_item::Column::BatchId,
                order_item::Column::UnitId,
                order_item::Column::Quantity,
                order_item::Column::PricePerUnit,
            ])
            .column_as(ore_batch::Column::BatchCode, "batch_code")
            .column_as(unit::Column::Name, "unit_name")
            .column_as(unit::Column::Symbol, "unit_symbol")
            .join(JoinType::LeftJoin, order_item::Relation::OreBatch.def())
            .join(JoinType::LeftJoin, order_item::Relation::Unit.def())
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_item::Column::Id)
            .into_model::<OrderItemRow>()
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch order items");
                ServiceError::db_error(e)
            })?;

        Ok(assemble_orders(headers, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn item(batch_id: i32, unit_id: i32, quantity: f64) -> CreateOrderItemRequest {
        CreateOrderItemRequest {
            batch_id,
            unit_id,
            quantity,
            price_per_unit: None,
        }
    }

    fn request(items: Vec<CreateOrderItemRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            order_number: "SO-1".into(),
            contractor_id: 1,
            warehouse_id: 1,
            status: None,
            order_date: None,
            items,
        }
    }

    fn header(id: i32) -> OrderHeaderRow {
        let now = Utc::now();
        OrderHeaderRow {
            id,
            order_number: format!("SO-{id}"),
            contractor_id: 1,
            contractor_name: Some("Acme".into()),
            warehouse_id: 1,
            warehouse_name: None,
            status: "new".into(),
            order_date: now.date_naive(),
            total_quantity: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    fn item_row(id: i32, order_id: i32) -> OrderItemRow {
        OrderItemRow {
            id,
            order_id,
            batch_id: 1,
            batch_code: None,
            unit_id: 1,
            unit_name: Some("tonne".into()),
            unit_symbol: Some("t".into()),
            quantity: 1.0,
            price_per_unit: 0.0,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_create_order(&request(vec![item(1, 1, 10.0), item(2, 1, 5.0)])).is_ok());
    }

    #[test]
    fn empty_item_list_is_rejected() {
        assert_matches!(
            validate_create_order(&request(vec![])),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn header_references_must_be_set() {
        let mut req = request(vec![item(1, 1, 1.0)]);
        req.contractor_id = 0;
        assert_matches!(validate_create_order(&req), Err(ServiceError::ValidationError(_)));

        let mut req = request(vec![item(1, 1, 1.0)]);
        req.warehouse_id = 0;
        assert_matches!(validate_create_order(&req), Err(ServiceError::ValidationError(_)));

        let mut req = request(vec![item(1, 1, 1.0)]);
        req.order_number = "   ".into();
        assert_matches!(validate_create_order(&req), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn any_bad_item_rejects_the_whole_order() {
        let err = validate_create_order(&request(vec![item(1, 1, 3.0), item(2, 1, 0.0)]))
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("items[1].quantity"));

        assert_matches!(
            validate_create_order(&request(vec![item(0, 1, 3.0)])),
            Err(ServiceError::ValidationError(msg)) if msg.contains("batch_id")
        );
        assert_matches!(
            validate_create_order(&request(vec![item(1, 0, 3.0)])),
            Err(ServiceError::ValidationError(msg)) if msg.contains("unit_id")
        );
    }

    #[test]
    fn assembly_keeps_header_order_and_groups_items() {
        let headers = vec![header(3), header(1), header(2)];
        let items = vec![item_row(10, 1), item_row(11, 3), item_row(12, 1), item_row(13, 2)];

        let orders = assemble_orders(headers, items);

        let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let item_ids = |o: &OrderView| o.items.iter().map(|i| i.id).collect::<Vec<_>>();
        assert_eq!(item_ids(&orders[0]), vec![11]);
        assert_eq!(item_ids(&orders[1]), vec![10, 12]);
        assert_eq!(item_ids(&orders[2]), vec![13]);
    }

    #[test]
    fn assembly_ignores_items_of_unknown_orders() {
        let orders = assemble_orders(vec![header(1)], vec![item_row(5, 1), item_row(6, 99)]);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].id, 5);
    }
}
