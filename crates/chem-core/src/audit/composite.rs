//! `CompositeAuditSink`: reenvía cada evento a una secuencia de sumideros, en
//! orden. Todos reciben el evento aunque alguno falle; se devuelve el primer
//! error.

use std::sync::Arc;

use async_trait::async_trait;

use super::sink::AuditSink;
use super::types::AuditEvent;
use crate::errors::AuditError;

#[derive(Clone, Default)]
pub struct CompositeAuditSink {
    pub sinks: Vec<Arc<dyn AuditSink>>,
}

impl CompositeAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sinks(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        CompositeAuditSink { sinks }
    }

    pub fn push(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl AuditSink for CompositeAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record(event.clone()).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditSink;
    use chem_domain::SystemEvent;
    use serde_json::json;

    struct Rejecting;

    #[async_trait]
    impl AuditSink for Rejecting {
        async fn record(&self, _event: AuditEvent) -> Result<(), AuditError> {
            Err(AuditError::Rejected("no".into()))
        }
    }

    #[tokio::test]
    async fn every_sink_receives_event_even_after_failure() {
        let a = InMemoryAuditSink::new();
        let b = InMemoryAuditSink::new();
        let composite = CompositeAuditSink::new().push(Arc::new(a.clone()))
                                                 .push(Arc::new(Rejecting))
                                                 .push(Arc::new(b.clone()));
        let out = composite.record(SystemEvent::info("search", "start", "x", json!({})).into()).await;
        assert_eq!(out, Err(AuditError::Rejected("no".into())));
        assert_eq!(a.events().await.len(), 1);
        assert_eq!(b.events().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_composite_accepts_everything() {
        let out = CompositeAuditSink::new().record(SystemEvent::info("a", "b", "c", json!(null)).into()).await;
        assert!(out.is_ok());
    }
}
