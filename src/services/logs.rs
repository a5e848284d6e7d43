use crate::{
    db::DbPool,
    entities::log_entry::{self, Entity as LogEntity, Model as LogModel},
    errors::ServiceError,
};
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use std::sync::Arc;
use tracing::{error, instrument};

pub const DEFAULT_LOG_LIMIT: u64 = 100;
pub const MAX_LOG_LIMIT: u64 = 1000;

/// Requested page size clamped to `1..=MAX_LOG_LIMIT`
pub fn effective_limit(requested: Option<u64>) -> u64 {
    requested.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT)
}

/// Reads the audit trail
#[derive(Clone)]
pub struct LogService {
    db_pool: Arc<DbPool>,
}

impl LogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Newest entries first
    #[instrument(skip(self))]
    pub async fn list_logs(&self, limit: Option<u64>) -> Result<Vec<LogModel>, ServiceError> {
        LogEntity::find()
            .order_by_desc(log_entry::Column::CreatedAt)
            .order_by_desc(log_entry::Column::Id)
            .limit(effective_limit(limit))
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list audit log");
                ServiceError::db_error(e)
            })
    }
}
