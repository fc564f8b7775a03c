//! Dobles de prueba compartidos por los tests de integración del pipeline.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chem_core::synth::fallback::static_report;
use chem_core::{AuditError, AuditEvent, AuditSink, CacheError, InMemoryAuditSink, InMemoryReportCache, InMemoryReportStore,
                ModelSynthesizer, OrchestratorConfig, ParseStrategy, ReportCache, ReportStore, ResolutionOrchestrator, StoreError,
                Synthesis, SynthesisError, Synthesizer};
use chem_domain::{DegradationProduct, DegradationReport, ResolutionRecord, ResponseSource, SubstanceKey, SystemEvent};

pub fn report(product: &str, reference: &str) -> DegradationReport {
    DegradationReport::new(vec![DegradationProduct::new(product, "Hidrólise", "pH 2", "Baixa").unwrap()],
                           vec![reference.to_string()])
}

/// Sintetizador que cuenta invocaciones y delega en otro.
pub struct CountingSynthesizer {
    inner: Arc<dyn Synthesizer>,
    calls: AtomicUsize,
}

impl CountingSynthesizer {
    pub fn wrap(inner: Arc<dyn Synthesizer>) -> Arc<Self> {
        Arc::new(CountingSynthesizer { inner, calls: AtomicUsize::new(0) })
    }

    pub fn offline() -> Arc<Self> {
        Self::wrap(Arc::new(ModelSynthesizer::offline()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for CountingSynthesizer {
    async fn synthesize(&self, substance_name: &str) -> Result<Synthesis, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.synthesize(substance_name).await
    }
}

/// Sintetizador que devuelve siempre el mismo reporte como `gemini`.
pub struct FixedSynthesizer(pub DegradationReport);

#[async_trait]
impl Synthesizer for FixedSynthesizer {
    async fn synthesize(&self, _substance_name: &str) -> Result<Synthesis, SynthesisError> {
        Ok(Synthesis { report: self.0.clone(), source: ResponseSource::Gemini, strategy: ParseStrategy::Json })
    }
}

pub struct FailingSynthesizer;

#[async_trait]
impl Synthesizer for FailingSynthesizer {
    async fn synthesize(&self, _substance_name: &str) -> Result<Synthesis, SynthesisError> {
        Err(SynthesisError::Model("quota exceeded".into()))
    }
}

pub struct PanickingSynthesizer;

#[async_trait]
impl Synthesizer for PanickingSynthesizer {
    async fn synthesize(&self, _substance_name: &str) -> Result<Synthesis, SynthesisError> {
        panic!("synthesizer exploded")
    }
}

/// Store cuyas escrituras y lecturas se pueden hacer fallar; el resto delega
/// en un store en memoria.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryReportStore,
    pub fail_lookup: bool,
    pub fail_save: bool,
    pub saves: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn failing_save() -> Self {
        FlakyStore { fail_save: true, ..Default::default() }
    }

    pub fn failing_everything() -> Self {
        FlakyStore { fail_lookup: true, fail_save: true, ..Default::default() }
    }
}

#[async_trait]
impl ReportStore for FlakyStore {
    async fn lookup(&self, key: &SubstanceKey) -> Result<Option<DegradationReport>, StoreError> {
        if self.fail_lookup {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.inner.lookup(key).await
    }

    async fn save(&self,
                  key: &SubstanceKey,
                  search_term: &str,
                  report: &DegradationReport,
                  source: ResponseSource,
                  processing_time_ms: u64)
                  -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_save {
            return Err(StoreError::Query("insert rejected".into()));
        }
        self.inner.save(key, search_term, report, source, processing_time_ms).await
    }

    async fn log_resolution(&self, record: &ResolutionRecord) -> Result<(), StoreError> {
        self.inner.log_resolution(record).await
    }

    async fn record_system_event(&self, event: &SystemEvent) -> Result<(), StoreError> {
        self.inner.record_system_event(event).await
    }
}

pub struct FailingCache;

#[async_trait]
impl ReportCache for FailingCache {
    async fn get(&self, _key: &SubstanceKey) -> Result<Option<DegradationReport>, CacheError> {
        Err(CacheError::Unavailable("cache down".into()))
    }

    async fn set(&self, _key: &SubstanceKey, _report: &DegradationReport, _source: ResponseSource) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache down".into()))
    }
}

/// Sumidero que rechaza todo pero cuenta los intentos.
#[derive(Default)]
pub struct FailingAudit {
    pub attempts: AtomicUsize,
    pub resolution_attempts: AtomicUsize,
}

#[async_trait]
impl AuditSink for FailingAudit {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if matches!(event, AuditEvent::Resolution(_)) {
            self.resolution_attempts.fetch_add(1, Ordering::SeqCst);
        }
        Err(AuditError::Rejected("read-only".into()))
    }
}

/// Orquestador offline con cache y store en memoria.
pub struct Harness {
    pub orchestrator: ResolutionOrchestrator,
    pub store: InMemoryReportStore,
    pub cache: Arc<InMemoryReportCache>,
    pub audit: InMemoryAuditSink,
    pub synthesizer: Arc<CountingSynthesizer>,
}

pub fn harness(config: OrchestratorConfig) -> Harness {
    harness_with(CountingSynthesizer::offline(), config)
}

pub fn harness_with(synthesizer: Arc<CountingSynthesizer>, config: OrchestratorConfig) -> Harness {
    let store = InMemoryReportStore::new();
    let cache = Arc::new(InMemoryReportCache::new());
    let audit = InMemoryAuditSink::new();
    let orchestrator = ResolutionOrchestrator::builder(Arc::new(store.clone()), synthesizer.clone(), Arc::new(audit.clone()))
        .cache(cache.clone())
        .config(config)
        .build();
    Harness { orchestrator, store, cache, audit, synthesizer }
}

pub fn static_for(name: &str) -> DegradationReport {
    static_report(name)
}
