//! chem-core: pipeline de resolución de reportes de degradación.
//!
//! Cache → Store → Sintetizador → Persistencia → Auditoría, con aislamiento
//! de errores: `ResolutionOrchestrator::resolve` nunca falla.
pub mod audit;
pub mod cache;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod store;
pub mod synth;

pub use audit::{AuditEvent, AuditSink, CompositeAuditSink, InMemoryAuditSink, LogAuditSink, StoreAuditSink};
pub use cache::{CacheEntry, InMemoryReportCache, ReportCache};
pub use engine::{OrchestratorBuilder, OrchestratorConfig, Resolution, ResolutionOrchestrator, Stage};
pub use errors::{AuditError, CacheError, PipelineError, StoreError, SynthesisError};
pub use store::{InMemoryReportStore, RecentSearch, ReportStore, SearchAnalytics, SearchStatistic, StoredReport};
pub use synth::{ModelSynthesizer, ParseStrategy, Synthesis, Synthesizer, SynthesizerConfig, TextModel};
