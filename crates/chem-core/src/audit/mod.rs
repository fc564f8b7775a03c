//! Sumidero de auditoría/telemetría append-only.

mod composite;
mod sink;
mod types;

pub use composite::CompositeAuditSink;
pub use sink::{AuditSink, InMemoryAuditSink, LogAuditSink, StoreAuditSink};
pub use types::AuditEvent;
