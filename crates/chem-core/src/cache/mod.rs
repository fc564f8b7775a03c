//! Capa de cache opcional delante del Store.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chem_domain::{DegradationReport, ResponseSource, SubstanceKey};

use crate::errors::CacheError;

pub use memory::InMemoryReportCache;

/// Sombra transitoria de un reporte, con procedencia y momento de escritura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub report: DegradationReport,
    pub source: ResponseSource,
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(report: DegradationReport, source: ResponseSource) -> Self {
        CacheEntry { report, source, inserted_at: Utc::now() }
    }

    /// `true` si la entrada superó el TTL. Sin TTL nunca expira.
    pub fn is_expired(&self, ttl: Option<std::time::Duration>, now: DateTime<Utc>) -> bool {
        match ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok()) {
            Some(ttl) => now - self.inserted_at >= ttl,
            None => false,
        }
    }
}

/// Cache por clave normalizada. Un `CacheError` se degrada a miss.
#[async_trait]
pub trait ReportCache: Send + Sync {
    async fn get(&self, key: &SubstanceKey) -> Result<Option<DegradationReport>, CacheError>;
    async fn set(&self, key: &SubstanceKey, report: &DegradationReport, source: ResponseSource) -> Result<(), CacheError>;
}
