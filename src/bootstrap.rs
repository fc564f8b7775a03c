//! Construcción explícita de dependencias a partir de `AppConfig`.
//!
//! Sin `DATABASE_URL`: Store, Cache y analítica en memoria. Con
//! `DATABASE_URL`: Postgres (pool migrado al arrancar). Si el servidor no
//! responde dentro de `connect_timeout` se arranca en memoria con un `warn!`:
//! la indisponibilidad del Store no impide resolver. La auditoría va al Store
//! y al facade `log`.

use std::sync::Arc;

use log::{info, warn};

use chem_adapters::GeminiClient;
use chem_core::{AuditSink, CompositeAuditSink, InMemoryReportCache, InMemoryReportStore, LogAuditSink, ModelSynthesizer,
                ReportCache, ReportStore, ResolutionOrchestrator, SearchAnalytics, StoreAuditSink, TextModel};
use chem_persistence::{build_pool_from_config, DbConfig, PgPool, PgReportCache, PgReportStore, PoolProvider};

use crate::config::{AppConfig, ModelConfig};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    InMemory,
    Postgres,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::InMemory => "memory",
            Backend::Postgres => "postgres",
        }
    }
}

/// Aplicación ensamblada: orquestador más la superficie de analítica que
/// comparte su Store.
pub struct App {
    pub orchestrator: ResolutionOrchestrator,
    pub analytics: Arc<dyn SearchAnalytics>,
    pub backend: Backend,
    pub model_enabled: bool,
}

/// Sintetizador con cliente Gemini si hay credencial; estático si no.
pub fn build_synthesizer(model: &ModelConfig) -> Result<ModelSynthesizer, AppError> {
    let client: Option<Arc<dyn TextModel>> = match model.gemini() {
        Some(cfg) => Some(Arc::new(GeminiClient::new(cfg)?)),
        None => None,
    };
    Ok(ModelSynthesizer::new(client, model.synthesizer()))
}

/// Pool Postgres ya migrado, construido fuera del runtime async.
pub async fn connect(db: &DbConfig) -> Result<PgPool, AppError> {
    let db = db.clone();
    let pool = tokio::task::spawn_blocking(move || build_pool_from_config(&db)).await
                                                                              .map_err(|e| AppError::Config(format!("pool task: {e}")))??;
    Ok(pool)
}

fn audit_for(store: Arc<dyn ReportStore>) -> Arc<dyn AuditSink> {
    Arc::new(CompositeAuditSink::new().push(Arc::new(StoreAuditSink::new(store)))
                                      .push(Arc::new(LogAuditSink)))
}

pub async fn build_orchestrator(cfg: &AppConfig) -> Result<App, AppError> {
    let synthesizer = Arc::new(build_synthesizer(&cfg.model)?);
    let model_enabled = synthesizer.has_model();

    let pool = match &cfg.database {
        Some(db) => match connect(db).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("bootstrap:database_unavailable err={e} (falling back to memory)");
                None
            }
        },
        None => None,
    };

    let (store, analytics, cache, backend): (Arc<dyn ReportStore>, Arc<dyn SearchAnalytics>, Arc<dyn ReportCache>, Backend) =
        match pool {
            Some(pool) => {
                let store = Arc::new(PgReportStore::new(PoolProvider { pool: pool.clone() }));
                let cache = Arc::new(PgReportCache::with_ttl(PoolProvider { pool }, cfg.cache_ttl));
                (store.clone() as Arc<dyn ReportStore>, store as Arc<dyn SearchAnalytics>, cache as Arc<dyn ReportCache>, Backend::Postgres)
            }
            None => {
                let store = Arc::new(InMemoryReportStore::new());
                let cache = Arc::new(InMemoryReportCache::with_ttl(cfg.cache_ttl));
                (store.clone() as Arc<dyn ReportStore>, store as Arc<dyn SearchAnalytics>, cache as Arc<dyn ReportCache>, Backend::InMemory)
            }
        };

    let orchestrator = ResolutionOrchestrator::builder(store.clone(), synthesizer, audit_for(store))
        .cache(cache)
        .config(cfg.orchestrator)
        .build();
    info!("bootstrap:ready backend={} model_enabled={model_enabled} cache={} detailed_audit={}",
          backend.as_str(),
          cfg.orchestrator.enable_cache,
          cfg.orchestrator.enable_detailed_audit);
    Ok(App { orchestrator, analytics, backend, model_enabled })
}

/// Aplica migraciones pendientes. Requiere `DATABASE_URL`.
pub async fn migrate(cfg: &AppConfig) -> Result<(), AppError> {
    let db = cfg.database
                .as_ref()
                .ok_or_else(|| AppError::Config("migrate requiere DATABASE_URL".into()))?;
    connect(db).await?;
    Ok(())
}
