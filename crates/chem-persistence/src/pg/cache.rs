use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::debug;

use chem_core::{CacheEntry, CacheError, ReportCache};
use chem_domain::{DegradationReport, ResponseSource, SubstanceKey};

use super::rows::{parse_source, CacheRow, CacheUpsert};
use super::{run_blocking, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::report_cache;

/// Cache compartida entre procesos sobre la tabla `report_cache`.
///
/// Las claves usan el prefijo `substance_`. Una entrada vencida se borra al
/// leerla y cuenta como miss.
pub struct PgReportCache<P: ConnectionProvider> {
    provider: Arc<P>,
    ttl: Option<Duration>,
}

impl<P: ConnectionProvider> PgReportCache<P> {
    pub fn new(provider: P) -> Self {
        PgReportCache { provider: Arc::new(provider), ttl: None }
    }

    pub fn with_ttl(provider: P, ttl: Option<Duration>) -> Self {
        PgReportCache { provider: Arc::new(provider), ttl }
    }

    pub async fn invalidate(&self, key: &SubstanceKey) -> Result<bool, CacheError> {
        let cache_key = key.cache_key();
        let removed = run_blocking(&self.provider, "cache_invalidate", move |conn| {
                          diesel::delete(report_cache::table.find(&cache_key)).execute(conn)
                                                                             .map_err(PersistenceError::from)
                      }).await?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl<P: ConnectionProvider> ReportCache for PgReportCache<P> {
    async fn get(&self, key: &SubstanceKey) -> Result<Option<DegradationReport>, CacheError> {
        let cache_key = key.cache_key();
        let lookup_key = cache_key.clone();
        let row: Option<CacheRow> = run_blocking(&self.provider, "cache_get", move |conn| {
                                        report_cache::table.find(&lookup_key)
                                                           .first::<CacheRow>(conn)
                                                           .optional()
                                                           .map_err(PersistenceError::from)
                                    }).await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let entry = CacheEntry { report: serde_json::from_value(row.payload).map_err(PersistenceError::from)?,
                                 source: parse_source(&row.response_source)?,
                                 inserted_at: row.inserted_at };
        if entry.is_expired(self.ttl, Utc::now()) {
            debug!("cache_get:expired key={cache_key}");
            // Sólo la fila leída: un `set` concurrente ya cambió `inserted_at`.
            let seen_at = entry.inserted_at;
            run_blocking(&self.provider, "cache_evict", move |conn| {
                diesel::delete(report_cache::table.filter(report_cache::cache_key.eq(&cache_key))
                                                  .filter(report_cache::inserted_at.eq(seen_at)))
                .execute(conn)
                .map_err(PersistenceError::from)
            }).await?;
            return Ok(None);
        }
        entry.report.validate().map_err(|e| CacheError::InvalidPayload(e.to_string()))?;
        Ok(Some(entry.report))
    }

    async fn set(&self, key: &SubstanceKey, report: &DegradationReport, source: ResponseSource) -> Result<(), CacheError> {
        let row = CacheUpsert { cache_key: key.cache_key(),
                                payload: serde_json::to_value(report).map_err(PersistenceError::from)?,
                                response_source: source.as_str().to_string(),
                                inserted_at: Utc::now() };
        run_blocking(&self.provider, "cache_set", move |conn| {
            diesel::insert_into(report_cache::table).values(&row)
                                                    .on_conflict(report_cache::cache_key)
                                                    .do_update()
                                                    .set(&row)
                                                    .execute(conn)
                                                    .map_err(PersistenceError::from)?;
            Ok(())
        }).await?;
        Ok(())
    }
}
