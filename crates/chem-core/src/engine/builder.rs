//! Builder para `ResolutionOrchestrator`.
//!
//! Store, sintetizador y sumidero de auditoría son obligatorios; la cache es
//! opcional (el pipeline tolera su ausencia total).
//!
//! ```ignore
//! let orchestrator = ResolutionOrchestrator::builder(store, synthesizer, audit)
//!     .cache(cache)
//!     .config(OrchestratorConfig::default())
//!     .build();
//! ```

use std::sync::Arc;

use crate::audit::AuditSink;
use crate::cache::ReportCache;
use crate::engine::config::OrchestratorConfig;
use crate::engine::core::ResolutionOrchestrator;
use crate::store::ReportStore;
use crate::synth::Synthesizer;

pub struct OrchestratorBuilder {
    store: Arc<dyn ReportStore>,
    synthesizer: Arc<dyn Synthesizer>,
    audit: Arc<dyn AuditSink>,
    cache: Option<Arc<dyn ReportCache>>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    pub fn new(store: Arc<dyn ReportStore>, synthesizer: Arc<dyn Synthesizer>, audit: Arc<dyn AuditSink>) -> Self {
        OrchestratorBuilder { store,
                              synthesizer,
                              audit,
                              cache: None,
                              config: OrchestratorConfig::default() }
    }

    /// Añade un backend de cache.
    #[inline]
    pub fn cache(mut self, cache: Arc<dyn ReportCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[inline]
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ResolutionOrchestrator {
        ResolutionOrchestrator::new(self.store, self.cache, self.synthesizer, self.audit, self.config)
    }
}
