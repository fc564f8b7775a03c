use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use log::debug;
use serde_json::Value;

use chem_core::{RecentSearch, ReportStore, SearchAnalytics, SearchStatistic, StoreError};
use chem_domain::{DegradationReport, ResolutionRecord, ResponseSource, SubstanceKey, SystemEvent};

use super::rows::{report_from_columns, NewSearchRow, NewSystemLogRow, RecentRow, StatisticRow, SubstanceUpsert};
use super::{run_blocking, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::{search_history, substances, system_logs};

/// Store durable sobre Postgres.
///
/// - `lookup`: lectura por `substance_name` (clave normalizada).
/// - `save`: upsert; el último escritor gana.
/// - `log_resolution` / `record_system_event`: inserts append-only.
pub struct PgReportStore<P: ConnectionProvider> {
    provider: Arc<P>,
}

impl<P: ConnectionProvider> Clone for PgReportStore<P> {
    fn clone(&self) -> Self {
        PgReportStore { provider: Arc::clone(&self.provider) }
    }
}

impl<P: ConnectionProvider> PgReportStore<P> {
    pub fn new(provider: P) -> Self {
        PgReportStore { provider: Arc::new(provider) }
    }

    /// Borra la fila de una sustancia. Uso administrativo y de tests.
    pub async fn delete(&self, key: &SubstanceKey) -> Result<usize, StoreError> {
        let name = key.as_str().to_string();
        run_blocking(&self.provider, "substance_delete", move |conn| {
            diesel::delete(substances::table.filter(substances::substance_name.eq(&name))).execute(conn)
                                                                                          .map_err(PersistenceError::from)
        }).await
          .map_err(StoreError::from)
    }
}

#[async_trait]
impl<P: ConnectionProvider> ReportStore for PgReportStore<P> {
    async fn lookup(&self, key: &SubstanceKey) -> Result<Option<DegradationReport>, StoreError> {
        let name = key.as_str().to_string();
        let row: Option<(Value, Value)> = run_blocking(&self.provider, "substance_lookup", move |conn| {
                                              substances::table.filter(substances::substance_name.eq(&name))
                                                               .select((substances::products, substances::references_list))
                                                               .first::<(Value, Value)>(conn)
                                                               .optional()
                                                               .map_err(PersistenceError::from)
                                          }).await?;
        match row {
            Some((products, references)) => {
                let report = report_from_columns(products, references)?;
                debug!("substance_lookup:hit key={key} products={}", report.products().len());
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }

    async fn save(&self,
                  key: &SubstanceKey,
                  search_term: &str,
                  report: &DegradationReport,
                  source: ResponseSource,
                  processing_time_ms: u64)
                  -> Result<(), StoreError> {
        let (key, search_term, report) = (key.clone(), search_term.to_string(), report.clone());
        run_blocking(&self.provider, "substance_save", move |conn| {
            let row = SubstanceUpsert::new(&key, &search_term, &report, source, processing_time_ms)?;
            diesel::insert_into(substances::table).values(&row)
                                                  .on_conflict(substances::substance_name)
                                                  .do_update()
                                                  .set(&row)
                                                  .execute(conn)
                                                  .map_err(PersistenceError::from)?;
            Ok(())
        }).await?;
        Ok(())
    }

    async fn log_resolution(&self, record: &ResolutionRecord) -> Result<(), StoreError> {
        let record = record.clone();
        run_blocking(&self.provider, "search_history_insert", move |conn| {
            diesel::insert_into(search_history::table).values(NewSearchRow::from(&record))
                                                      .execute(conn)
                                                      .map_err(PersistenceError::from)?;
            Ok(())
        }).await?;
        Ok(())
    }

    async fn record_system_event(&self, event: &SystemEvent) -> Result<(), StoreError> {
        let event = event.clone();
        run_blocking(&self.provider, "system_log_insert", move |conn| {
            diesel::insert_into(system_logs::table).values(NewSystemLogRow::from(&event))
                                                   .execute(conn)
                                                   .map_err(PersistenceError::from)?;
            Ok(())
        }).await?;
        Ok(())
    }
}

#[async_trait]
impl<P: ConnectionProvider> SearchAnalytics for PgReportStore<P> {
    async fn search_statistics(&self, limit: usize) -> Result<Vec<SearchStatistic>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<StatisticRow> = run_blocking(&self.provider, "search_statistics", move |conn| {
                                          diesel::sql_query("SELECT substance_name, dcb_name, search_count, last_searched, unique_users \
                                                             FROM search_statistics \
                                                             ORDER BY search_count DESC, last_searched DESC NULLS LAST, substance_name ASC \
                                                             LIMIT $1").bind::<BigInt, _>(limit)
                                                                       .load(conn)
                                                                       .map_err(PersistenceError::from)
                                      }).await?;
        Ok(rows.into_iter().map(SearchStatistic::from).collect())
    }

    async fn recent_searches(&self, limit: usize) -> Result<Vec<RecentSearch>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<RecentRow> = run_blocking(&self.provider, "recent_searches", move |conn| {
                                       diesel::sql_query("SELECT id, substance_name, search_term, search_timestamp, user_ip \
                                                          FROM recent_searches \
                                                          ORDER BY search_timestamp DESC \
                                                          LIMIT $1").bind::<BigInt, _>(limit)
                                                                    .load(conn)
                                                                    .map_err(PersistenceError::from)
                                   }).await?;
        Ok(rows.into_iter().map(RecentSearch::from).collect())
    }
}
