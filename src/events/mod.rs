//! Side effects dispatched after a business write has committed.

pub mod audit;

pub use audit::{
    spawn_audit_writer, AuditAction, AuditEntry, AuditLogger, AuditSink, DbAuditSink, EntityKind,
    DEFAULT_ACTOR,
};
