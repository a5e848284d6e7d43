//! Fire-and-forget audit trail.
//!
//! Services hand an [`AuditEntry`] to an [`AuditLogger`] once their write has
//! committed. The logger never blocks and never fails: entries go through a
//! bounded channel to a writer task which persists them via an [`AuditSink`].
//! Sink failures and dropped entries are logged and counted, and stay
//! invisible to the request that produced the entry.

use crate::{db::DbPool, entities::log_entry, errors::ServiceError, metrics};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, Set};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Actor recorded when the caller does not identify itself
pub const DEFAULT_ACTOR: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    UpdateStatus,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::UpdateStatus => "update_status",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Order,
    OreBatch,
    Equipment,
    Shipment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::OreBatch => "ore_batch",
            Self::Equipment => "equipment",
            Self::Shipment => "shipment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub recorded_at: DateTime<Utc>,
    pub actor: String,
    pub action: AuditAction,
    pub entity_kind: EntityKind,
    pub detail: String,
}

impl AuditEntry {
    pub fn new(
        actor: &str,
        action: AuditAction,
        entity_kind: EntityKind,
        detail: impl Into<String>,
    ) -> Self {
        let actor = actor.trim();
        Self {
            recorded_at: Utc::now(),
            actor: if actor.is_empty() {
                DEFAULT_ACTOR.to_string()
            } else {
                actor.to_string()
            },
            action,
            entity_kind,
            detail: detail.into(),
        }
    }
}

/// Destination for audit entries
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn write(&self, entry: &AuditEntry) -> Result<(), ServiceError>;
}

/// Persists entries into the `logs` table
#[derive(Debug, Clone)]
pub struct DbAuditSink {
    db_pool: Arc<DbPool>,
}

impl DbAuditSink {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AuditSink for DbAuditSink {
    async fn write(&self, entry: &AuditEntry) -> Result<(), ServiceError> {
        let model = log_entry::ActiveModel {
            created_at: Set(entry.recorded_at),
            actor: Set(entry.actor.clone()),
            action: Set(entry.action.as_str().to_string()),
            entity_kind: Set(entry.entity_kind.as_str().to_string()),
            detail: Set(entry.detail.clone()),
            ..Default::default()
        };

        model
            .insert(&*self.db_pool)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::AuditError(e.to_string()))
    }
}

/// Cheap-to-clone handle services use to emit audit entries
#[derive(Debug, Clone)]
pub struct AuditLogger {
    sender: mpsc::Sender<AuditEntry>,
}

impl AuditLogger {
    pub fn new(sender: mpsc::Sender<AuditEntry>) -> Self {
        Self { sender }
    }

    /// Creates a logger together with the receiving end for the writer task
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AuditEntry>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Queues an entry without waiting. Never fails the caller.
    pub fn record(&self, entry: AuditEntry) {
        match self.sender.try_send(entry) {
            Ok(()) => debug!("Audit entry queued"),
            Err(TrySendError::Full(entry)) => {
                metrics::AUDIT_ENTRIES_DROPPED.inc();
                warn!(
                    action = %entry.action,
                    entity_kind = %entry.entity_kind,
                    detail = %entry.detail,
                    "Audit channel full; entry dropped"
                );
            }
            Err(TrySendError::Closed(entry)) => {
                metrics::AUDIT_ENTRIES_DROPPED.inc();
                warn!(
                    action = %entry.action,
                    entity_kind = %entry.entity_kind,
                    detail = %entry.detail,
                    "Audit writer stopped; entry dropped"
                );
            }
        }
    }
}

/// Drains the channel into `sink` until every logger has been dropped
pub async fn run_audit_writer(mut rx: mpsc::Receiver<AuditEntry>, sink: Arc<dyn AuditSink>) {
    info!("Starting audit writer");

    while let Some(entry) = rx.recv().await {
        match sink.write(&entry).await {
            Ok(()) => metrics::AUDIT_ENTRIES_WRITTEN.inc(),
            Err(e) => {
                metrics::AUDIT_WRITE_FAILURES.inc();
                error!(
                    error = %e,
                    actor = %entry.actor,
                    action = %entry.action,
                    entity_kind = %entry.entity_kind,
                    detail = %entry.detail,
                    "Failed to write audit entry"
                );
            }
        }
    }

    info!("Audit writer stopped");
}

pub fn spawn_audit_writer(
    rx: mpsc::Receiver<AuditEntry>,
    sink: Arc<dyn AuditSink>,
) -> JoinHandle<()> {
    tokio::spawn(run_audit_writer(rx, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        entries: Mutex<Vec<AuditEntry>>,
    }

    #[async_trait]
    impl AuditSink for RecordingSink {
        async fn write(&self, entry: &AuditEntry) -> Result<(), ServiceError> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn write(&self, _entry: &AuditEntry) -> Result<(), ServiceError> {
            Err(ServiceError::AuditError("sink offline".into()))
        }
    }

    #[test]
    fn blank_actor_falls_back_to_system() {
        let entry = AuditEntry::new("  ", AuditAction::Create, EntityKind::Order, "SO-1");
        assert_eq!(entry.actor, DEFAULT_ACTOR);

        let entry = AuditEntry::new("dispatcher", AuditAction::Create, EntityKind::Order, "SO-1");
        assert_eq!(entry.actor, "dispatcher");
    }

    #[tokio::test]
    async fn writer_persists_entries_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let (logger, rx) = AuditLogger::channel(8);
        let writer = spawn_audit_writer(rx, sink.clone());

        logger.record(AuditEntry::new("a", AuditAction::Create, EntityKind::Order, "first"));
        logger.record(AuditEntry::new(
            "a",
            AuditAction::UpdateStatus,
            EntityKind::Order,
            "second",
        ));
        drop(logger);
        writer.await.unwrap();

        let details: Vec<String> = sink
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.detail.clone())
            .collect();
        assert_eq!(details, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_blocking() {
        let (logger, mut rx) = AuditLogger::channel(1);
        logger.record(AuditEntry::new("a", AuditAction::Create, EntityKind::Shipment, "kept"));
        logger.record(AuditEntry::new("a", AuditAction::Create, EntityKind::Shipment, "lost"));
        drop(logger);

        assert_eq!(rx.recv().await.unwrap().detail, "kept");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn failing_sink_is_contained() {
        let (logger, rx) = AuditLogger::channel(4);
        let writer = spawn_audit_writer(rx, Arc::new(FailingSink));

        logger.record(AuditEntry::new("a", AuditAction::Create, EntityKind::OreBatch, "B-1"));
        drop(logger);

        assert!(writer.await.is_ok());
    }

    #[tokio::test]
    async fn record_after_writer_exit_is_silent() {
        let (logger, rx) = AuditLogger::channel(4);
        drop(rx);
        logger.record(AuditEntry::new("a", AuditAction::Create, EntityKind::Equipment, "E-1"));
    }
}
