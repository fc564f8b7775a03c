//! Contratos del Store persistente.
//!
//! El Store es dueño de sus entradas: upsert por clave normalizada, historial
//! de búsquedas append-only y eventos de sistema. Los llamadores tratan un
//! `StoreError` en lectura igual que "no encontrado" y en escritura lo
//! registran sin propagarlo.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chem_domain::{DegradationReport, ResolutionRecord, ResponseSource, SubstanceKey, SystemEvent};

use crate::errors::StoreError;

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Busca el reporte guardado para la clave (ya normalizada).
    async fn lookup(&self, key: &SubstanceKey) -> Result<Option<DegradationReport>, StoreError>;

    /// Upsert del reporte y su metadata por clave normalizada (último escritor gana).
    async fn save(&self,
                  key: &SubstanceKey,
                  search_term: &str,
                  report: &DegradationReport,
                  source: ResponseSource,
                  processing_time_ms: u64)
                  -> Result<(), StoreError>;

    /// Inserta una fila de historial de búsqueda.
    async fn log_resolution(&self, record: &ResolutionRecord) -> Result<(), StoreError>;

    /// Inserta un evento de sistema estructurado.
    async fn record_system_event(&self, event: &SystemEvent) -> Result<(), StoreError>;
}

/// Superficies analíticas de sólo lectura sobre el historial.
#[async_trait]
pub trait SearchAnalytics: Send + Sync {
    /// Conteo por sustancia, ordenado por número de búsquedas descendente.
    async fn search_statistics(&self, limit: usize) -> Result<Vec<SearchStatistic>, StoreError>;
    /// Búsquedas más recientes primero.
    async fn recent_searches(&self, limit: usize) -> Result<Vec<RecentSearch>, StoreError>;
}

/// Entrada completa del Store (reporte + metadata de guardado).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub substance_name: String,
    pub search_term: String,
    pub dcb_name: String,
    pub cas_number: Option<String>,
    pub report: DegradationReport,
    pub response_source: ResponseSource,
    pub processing_time_ms: u64,
    pub content_hash: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistic {
    pub substance_name: String,
    pub dcb_name: Option<String>,
    pub search_count: u64,
    pub last_searched: Option<DateTime<Utc>>,
    pub unique_users: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub id: Uuid,
    pub substance_name: String,
    pub search_term: String,
    pub search_timestamp: DateTime<Utc>,
    pub user_ip: Option<String>,
}
