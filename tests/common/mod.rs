#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Method, Request},
    Router,
};
use chrono::NaiveDate;
use ore_warehouse_api::{
    build_router,
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{
        contractor, equipment_category, log_entry, ore_batch, ore_type, order, order_item,
        transport, unit, warehouse,
    },
    errors::ServiceError,
    events::{spawn_audit_writer, AuditEntry, AuditLogger, AuditSink, DbAuditSink},
    services::orders::{CreateOrderItemRequest, CreateOrderRequest},
    AppState,
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Identifiers of the reference rows every test database starts with
pub mod seed {
    pub const TONNE: i32 = 1;
    pub const PIECE: i32 = 2;
    pub const NORTH_YARD: i32 = 1;
    pub const RAIL_DEPOT: i32 = 2;
    pub const MAGNETITE: i32 = 1;
    pub const DRILLS: i32 = 1;
    pub const URAL_STEEL: i32 = 1;
    pub const BALTIC_METALS: i32 = 2;
    pub const TRUCK: i32 = 1;
    pub const BATCH_1: i32 = 1;
    pub const BATCH_2: i32 = 2;
}

/// Keeps every entry it receives
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingSink {
    async fn write(&self, entry: &AuditEntry) -> Result<(), ServiceError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Rejects every entry, like a log store that is down
#[derive(Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl AuditSink for FailingSink {
    async fn write(&self, _entry: &AuditEntry) -> Result<(), ServiceError> {
        *self.attempts.lock().unwrap() += 1;
        Err(ServiceError::AuditError("log store unavailable".into()))
    }
}

/// Application wired to a private in-memory SQLite database
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub db: Arc<DbPool>,
    audit_writer: JoinHandle<()>,
}

impl TestApp {
    /// Audit entries are persisted to the `logs` table
    pub async fn new() -> Self {
        let db = Arc::new(Self::fresh_database().await);
        let sink = Arc::new(DbAuditSink::new(db.clone()));
        Self::assemble(db, sink)
    }

    /// Audit entries go to `sink` instead of the database
    pub async fn with_sink(sink: Arc<dyn AuditSink>) -> Self {
        let db = Arc::new(Self::fresh_database().await);
        Self::assemble(db, sink)
    }

    async fn fresh_database() -> DbPool {
        let pool = db::establish_connection_with_config(&DbConfig::sqlite_memory())
            .await
            .expect("in-memory database");
        db::run_migrations(&pool).await.expect("migrations");
        seed_catalog(&pool).await;
        pool
    }

    fn assemble(db: Arc<DbPool>, sink: Arc<dyn AuditSink>) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;

        let (audit, audit_rx) = AuditLogger::channel(cfg.audit_channel_capacity);
        let audit_writer = spawn_audit_writer(audit_rx, sink);
        let state = AppState::new(db.clone(), cfg, audit);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            db,
            audit_writer,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router error during test request")
    }

    pub async fn order_count(&self) -> u64 {
        order::Entity::find().count(&*self.db).await.unwrap()
    }

    pub async fn order_item_count(&self) -> u64 {
        order_item::Entity::find().count(&*self.db).await.unwrap()
    }

    pub async fn log_count(&self) -> u64 {
        log_entry::Entity::find().count(&*self.db).await.unwrap()
    }

    /// Polls the `logs` table until it holds at least `expected` rows
    pub async fn wait_for_logs(&self, expected: u64) -> u64 {
        for _ in 0..200 {
            let count = self.log_count().await;
            if count >= expected {
                return count;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.log_count().await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.audit_writer.abort();
    }
}

/// Polls `check` until it holds or roughly two seconds have passed
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

pub fn item(batch_id: i32, quantity: f64, price: Option<f64>) -> CreateOrderItemRequest {
    CreateOrderItemRequest {
        batch_id,
        unit_id: seed::TONNE,
        quantity,
        price_per_unit: price,
    }
}

pub fn order_request(number: &str, items: Vec<CreateOrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        order_number: number.to_string(),
        contractor_id: seed::URAL_STEEL,
        warehouse_id: seed::NORTH_YARD,
        status: None,
        order_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        items,
    }
}

async fn seed_catalog(db: &DbPool) {
    for (name, symbol) in [("tonne", "t"), ("piece", "pcs")] {
        unit::ActiveModel {
            name: Set(name.into()),
            symbol: Set(symbol.into()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed unit");
    }

    for (name, location) in [("North Yard", "Pit 3"), ("Rail Depot", "Siding 1")] {
        warehouse::ActiveModel {
            name: Set(name.into()),
            location: Set(Some(location.into())),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed warehouse");
    }

    ore_type::ActiveModel {
        name: Set("Magnetite".into()),
        description: Set(Some("Fe3O4 iron ore".into())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed ore type");

    equipment_category::ActiveModel {
        name: Set("Drills".into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed equipment category");

    for name in ["Ural Steel", "Baltic Metals"] {
        contractor::ActiveModel {
            name: Set(name.into()),
            contact: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed contractor");
    }

    transport::ActiveModel {
        name: Set("Truck 12".into()),
        plate_number: Set(Some("A123BC".into())),
        capacity: Set(Some(40.0)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed transport");

    for code in ["B-001", "B-002"] {
        ore_batch::ActiveModel {
            batch_code: Set(code.into()),
            ore_type_id: Set(seed::MAGNETITE),
            warehouse_id: Set(seed::NORTH_YARD),
            unit_id: Set(seed::TONNE),
            quantity: Set(500.0),
            quality: Set(Some(0.64)),
            priority: Set(None),
            status: Set(Some("stored".into())),
            mined_on: Set(None),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("seed ore batch");
    }
}
