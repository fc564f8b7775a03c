//! Núcleo del orquestador de resolución.
//!
//! Máquina de estados por intento:
//! `START → CACHE_CHECK → STORE_CHECK → SYNTHESIZE → PERSIST → AUDIT → DONE`,
//! con `ERROR_RECOVERY` alcanzable desde cualquier etapa intermedia.
//!
//! Garantías:
//! - `resolve` nunca falla ni hace panic hacia el llamador.
//! - El reporte devuelto siempre es válido (products y references presentes).
//! - AUDIT se ejecuta en todos los caminos; sus errores se descartan.
//! - Cache y Store son lecturas puras en un hit: dos llamadas seguidas para la
//!   misma clave devuelven el mismo reporte.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use log::{debug, error, info, warn};
use serde_json::json;

use chem_domain::{DegradationReport, LogLevel, RequestMeta, ResolutionRecord, ResponseSource, SubstanceKey, SystemEvent};

use crate::audit::{AuditEvent, AuditSink};
use crate::cache::ReportCache;
use crate::constants::USER_AGENT_METADATA_LEN;
use crate::engine::builder::OrchestratorBuilder;
use crate::engine::config::OrchestratorConfig;
use crate::errors::PipelineError;
use crate::store::ReportStore;
use crate::synth::{fallback, Synthesizer};

/// Etapas de la máquina de estados de una resolución.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    CacheCheck,
    StoreCheck,
    Synthesize,
    Persist,
    Audit,
    Done,
    ErrorRecovery,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "START",
            Stage::CacheCheck => "CACHE_CHECK",
            Stage::StoreCheck => "STORE_CHECK",
            Stage::Synthesize => "SYNTHESIZE",
            Stage::Persist => "PERSIST",
            Stage::Audit => "AUDIT",
            Stage::Done => "DONE",
            Stage::ErrorRecovery => "ERROR_RECOVERY",
        }
    }
}

/// Resultado de `resolve`: reporte + procedencia + camino de decisión.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub substance_key: SubstanceKey,
    pub report: DegradationReport,
    /// Procedencia del reporte devuelto (`mock_fallback` en ERROR_RECOVERY).
    pub source: ResponseSource,
    /// Procedencia registrada en auditoría (`error` en ERROR_RECOVERY).
    pub audit_source: ResponseSource,
    pub was_cached: bool,
    pub processing_time_ms: u64,
    /// Etapas visitadas, en orden.
    pub path: Vec<Stage>,
}

struct Outcome {
    report: DegradationReport,
    source: ResponseSource,
    audit_source: ResponseSource,
    was_cached: bool,
    processing_time_ms: u64,
}

impl Outcome {
    fn hit(report: DegradationReport, source: ResponseSource, was_cached: bool, processing_time_ms: u64) -> Self {
        Outcome { report, source, audit_source: source, was_cached, processing_time_ms }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Orquestador con dependencias inyectadas (Store, Cache opcional,
/// sintetizador y sumidero de auditoría).
pub struct ResolutionOrchestrator {
    store: Arc<dyn ReportStore>,
    cache: Option<Arc<dyn ReportCache>>,
    synthesizer: Arc<dyn Synthesizer>,
    audit: Arc<dyn AuditSink>,
    config: OrchestratorConfig,
}

impl ResolutionOrchestrator {
    /// Crea un builder con las dependencias obligatorias.
    #[inline]
    pub fn builder(store: Arc<dyn ReportStore>, synthesizer: Arc<dyn Synthesizer>, audit: Arc<dyn AuditSink>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(store, synthesizer, audit)
    }

    pub fn new(store: Arc<dyn ReportStore>,
               cache: Option<Arc<dyn ReportCache>>,
               synthesizer: Arc<dyn Synthesizer>,
               audit: Arc<dyn AuditSink>,
               config: OrchestratorConfig)
               -> Self {
        ResolutionOrchestrator { store, cache, synthesizer, audit, config }
    }

    fn active_cache(&self) -> Option<&Arc<dyn ReportCache>> {
        self.cache.as_ref().filter(|_| self.config.enable_cache)
    }

    /// Resuelve `substance_name` a un reporte. Nunca falla.
    pub async fn resolve(&self, substance_name: &str, meta: &RequestMeta) -> Resolution {
        let started = Instant::now();
        let key = SubstanceKey::new(substance_name);
        let mut path = vec![Stage::Start];
        info!("resolve:start substance={substance_name:?} key={key} ip={}", meta.client_ip);
        self.emit(SystemEvent::info("search",
                                    "start",
                                    format!("Pesquisa iniciada para {substance_name}"),
                                    json!({
                                        "substance": substance_name,
                                        "user_ip": meta.client_ip,
                                        "user_agent": meta.user_agent_prefix(USER_AGENT_METADATA_LEN),
                                    })))
            .await;

        let pipeline = AssertUnwindSafe(self.run_pipeline(substance_name, &key, started, &mut path)).catch_unwind()
                                                                                                    .await;
        let outcome = match pipeline {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => self.recover(substance_name, &key, started, e, &mut path).await,
            Err(payload) => {
                let e = PipelineError::Panicked(panic_message(payload.as_ref()));
                self.recover(substance_name, &key, started, e, &mut path).await
            }
        };

        // AUDIT: siempre, en todos los caminos.
        path.push(Stage::Audit);
        let record = ResolutionRecord::new(substance_name, meta, outcome.audit_source, outcome.was_cached, outcome.processing_time_ms);
        self.write_audit(record.into()).await;
        if outcome.audit_source != ResponseSource::Error {
            self.emit(SystemEvent::info("search",
                                        "complete",
                                        format!("Pesquisa concluída para {substance_name}"),
                                        json!({
                                            "processing_time_ms": outcome.processing_time_ms,
                                            "response_source": outcome.source.as_str(),
                                            "products_count": outcome.report.products().len(),
                                            "references_count": outcome.report.references().len(),
                                        })))
                .await;
        }
        path.push(Stage::Done);
        info!("resolve:done key={key} source={} cached={} elapsed_ms={} path={}",
              outcome.source,
              outcome.was_cached,
              outcome.processing_time_ms,
              path.iter().map(Stage::as_str).collect::<Vec<_>>().join(">"));

        Resolution { substance_key: key,
                     report: outcome.report,
                     source: outcome.source,
                     audit_source: outcome.audit_source,
                     was_cached: outcome.was_cached,
                     processing_time_ms: outcome.processing_time_ms,
                     path }
    }

    async fn run_pipeline(&self,
                          substance_name: &str,
                          key: &SubstanceKey,
                          started: Instant,
                          path: &mut Vec<Stage>)
                          -> Result<Outcome, PipelineError> {
        // CACHE_CHECK
        if let Some(cache) = self.active_cache() {
            path.push(Stage::CacheCheck);
            match cache.get(key).await {
                Ok(Some(report)) => {
                    let elapsed = elapsed_ms(started);
                    debug!("resolve:cache_hit key={key} elapsed_ms={elapsed}");
                    self.emit(SystemEvent::info("search",
                                                "cache_hit",
                                                format!("Cache hit para {substance_name}"),
                                                json!({ "processing_time_ms": elapsed, "cache_key": key.cache_key() })))
                        .await;
                    return Ok(Outcome::hit(report, ResponseSource::Cache, true, elapsed));
                }
                Ok(None) => debug!("resolve:cache_miss key={key}"),
                Err(e) => warn!("resolve:cache_error key={key} err={e} (treated as miss)"),
            }
        }

        // STORE_CHECK
        path.push(Stage::StoreCheck);
        match self.store.lookup(key).await {
            Ok(Some(report)) => {
                let elapsed = elapsed_ms(started);
                debug!("resolve:store_hit key={key} elapsed_ms={elapsed}");
                self.write_cache(key, &report, ResponseSource::Database).await;
                self.emit(SystemEvent::info("search",
                                            "database_hit",
                                            format!("Dados encontrados no banco para {substance_name}"),
                                            json!({ "processing_time_ms": elapsed })))
                    .await;
                return Ok(Outcome::hit(report, ResponseSource::Database, false, elapsed));
            }
            Ok(None) => debug!("resolve:store_miss key={key}"),
            Err(e) => warn!("resolve:store_error key={key} err={e} (treated as not found)"),
        }

        // SYNTHESIZE
        path.push(Stage::Synthesize);
        let synthesis = self.synthesizer.synthesize(substance_name).await?;
        synthesis.report.validate()?;
        let elapsed = elapsed_ms(started);
        let component = if synthesis.source == ResponseSource::Gemini { "ai" } else { "mock" };
        self.emit(SystemEvent::info(component,
                                    "generate",
                                    format!("Relatório gerado ({}) para {substance_name}", synthesis.source),
                                    json!({
                                        "substance": substance_name,
                                        "strategy": synthesis.strategy.as_str(),
                                        "products_count": synthesis.report.products().len(),
                                        "references_count": synthesis.report.references().len(),
                                    })))
            .await;

        // PERSIST (best-effort)
        path.push(Stage::Persist);
        if let Err(e) = self.store
                            .save(key, substance_name, &synthesis.report, synthesis.source, elapsed)
                            .await
        {
            warn!("resolve:store_save_error key={key} err={e} (ignored)");
        }
        self.write_cache(key, &synthesis.report, synthesis.source).await;

        Ok(Outcome::hit(synthesis.report, synthesis.source, false, elapsed))
    }

    /// ERROR_RECOVERY: registra el fallo y devuelve el dataset estático, que
    /// se persiste como `mock_fallback` igual que una síntesis (best-effort).
    async fn recover(&self,
                     substance_name: &str,
                     key: &SubstanceKey,
                     started: Instant,
                     e: PipelineError,
                     path: &mut Vec<Stage>)
                     -> Outcome {
        path.push(Stage::ErrorRecovery);
        let elapsed = elapsed_ms(started);
        error!("resolve:error substance={substance_name:?} elapsed_ms={elapsed} err={e}");
        self.emit(SystemEvent::new(LogLevel::Error,
                                   "search",
                                   "error",
                                   format!("Erro na pesquisa para {substance_name}: {e}"),
                                   json!({ "processing_time_ms": elapsed, "error_message": e.to_string() })))
            .await;
        let report = fallback::static_report(substance_name);
        self.emit(SystemEvent::info("search",
                                    "fallback",
                                    format!("Usando dados mock como fallback para {substance_name}"),
                                    json!({ "processing_time_ms": elapsed })))
            .await;

        path.push(Stage::Persist);
        let persisted = AssertUnwindSafe(async {
                            if let Err(e) = self.store
                                                .save(key, substance_name, &report, ResponseSource::MockFallback, elapsed)
                                                .await
                            {
                                warn!("resolve:fallback_save_error key={key} err={e} (ignored)");
                            }
                            self.write_cache(key, &report, ResponseSource::MockFallback).await;
                        }).catch_unwind()
                          .await;
        if persisted.is_err() {
            warn!("resolve:fallback_persist_panicked key={key} (ignored)");
        }

        Outcome { report,
                  source: ResponseSource::MockFallback,
                  audit_source: ResponseSource::Error,
                  was_cached: false,
                  processing_time_ms: elapsed }
    }

    async fn write_cache(&self, key: &SubstanceKey, report: &DegradationReport, source: ResponseSource) {
        if let Some(cache) = self.active_cache() {
            if let Err(e) = cache.set(key, report, source).await {
                warn!("resolve:cache_set_error key={key} err={e} (ignored)");
            }
        }
    }

    async fn write_audit(&self, event: AuditEvent) {
        let variant = event.variant_name();
        if let Err(e) = self.audit.record(event).await {
            warn!("resolve:audit_error kind={variant} err={e} (ignored)");
        }
    }

    /// Evento de sistema detallado; sólo con `enable_detailed_audit`.
    async fn emit(&self, event: SystemEvent) {
        if self.config.enable_detailed_audit {
            self.write_audit(event.into()).await;
        }
    }
}
