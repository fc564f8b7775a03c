use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::sync::RwLock;

use chem_domain::{LogLevel, ResolutionRecord, SystemEvent};

use super::types::AuditEvent;
use crate::errors::AuditError;
use crate::store::ReportStore;

/// Sumidero append-only. Los llamadores nunca fallan por su culpa: cualquier
/// `AuditError` se registra y se descarta.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// Sumidero en memoria (tests e inspección).
#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }

    pub async fn resolutions(&self) -> Vec<ResolutionRecord> {
        self.events
            .read()
            .await
            .iter()
            .filter_map(|e| match e {
                AuditEvent::Resolution(r) => Some(r.clone()),
                AuditEvent::System(_) => None,
            })
            .collect()
    }

    pub async fn system_events(&self) -> Vec<SystemEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter_map(|e| match e {
                AuditEvent::System(s) => Some(s.clone()),
                AuditEvent::Resolution(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events.write().await.push(event);
        Ok(())
    }
}

/// Sumidero que sólo escribe en el facade `log` (sin backend persistente).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

#[async_trait]
impl AuditSink for LogAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        match &event {
            AuditEvent::Resolution(r) => info!("audit:resolution substance={} source={} cached={} elapsed_ms={} ip={}",
                                               r.substance_name,
                                               r.response_source,
                                               r.was_cached,
                                               r.processing_time_ms,
                                               r.source_client_ip),
            AuditEvent::System(e) => match e.level {
                LogLevel::Debug => debug!("audit:{}/{} {} {}", e.component, e.action, e.message, e.metadata),
                LogLevel::Info => info!("audit:{}/{} {} {}", e.component, e.action, e.message, e.metadata),
                LogLevel::Warn => warn!("audit:{}/{} {} {}", e.component, e.action, e.message, e.metadata),
                LogLevel::Error => error!("audit:{}/{} {} {}", e.component, e.action, e.message, e.metadata),
            },
        }
        Ok(())
    }
}

/// Sumidero que delega en los procedimientos de auditoría del Store
/// (`log_resolution` y `record_system_event`).
#[derive(Clone)]
pub struct StoreAuditSink {
    store: Arc<dyn ReportStore>,
}

impl StoreAuditSink {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        StoreAuditSink { store }
    }
}

#[async_trait]
impl AuditSink for StoreAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        match &event {
            AuditEvent::Resolution(r) => self.store.log_resolution(r).await?,
            AuditEvent::System(e) => self.store.record_system_event(e).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryReportStore;
    use chem_domain::{RequestMeta, ResponseSource};
    use serde_json::json;

    #[tokio::test]
    async fn in_memory_sink_splits_variants() {
        let sink = InMemoryAuditSink::new();
        sink.record(ResolutionRecord::new("x", &RequestMeta::default(), ResponseSource::Mock, false, 1).into()).await.unwrap();
        sink.record(SystemEvent::info("search", "start", "x", json!({})).into()).await.unwrap();
        assert_eq!(sink.events().await.len(), 2);
        assert_eq!(sink.resolutions().await.len(), 1);
        assert_eq!(sink.system_events().await[0].action, "start");
    }

    #[tokio::test]
    async fn store_sink_forwards_to_store() {
        let store = InMemoryReportStore::new();
        let sink = StoreAuditSink::new(Arc::new(store.clone()));
        sink.record(ResolutionRecord::new("Dipirona", &RequestMeta::default(), ResponseSource::Database, false, 3).into()).await.unwrap();
        sink.record(SystemEvent::info("search", "complete", "ok", json!({"n": 1})).into()).await.unwrap();
        assert_eq!(store.history().await[0].substance_name, "dipirona");
        assert_eq!(store.system_events().await[0].metadata["n"], 1);
    }

    #[tokio::test]
    async fn log_sink_never_fails() {
        let sink = LogAuditSink;
        let ev = SystemEvent::new(LogLevel::Error, "search", "error", "boom", json!({}));
        assert!(sink.record(ev.into()).await.is_ok());
    }
}
