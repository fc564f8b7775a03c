//! Filas Diesel y su mapeo a tipos de dominio.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz, Uuid as SqlUuid};
use serde_json::Value;
use uuid::Uuid;

use chem_core::{RecentSearch, SearchStatistic};
use chem_domain::{DegradationProduct, DegradationReport, ResolutionRecord, ResponseSource, SubstanceKey, SystemEvent};

use crate::error::PersistenceError;
use crate::schema::{report_cache, search_history, substances, system_logs};

/// Fila para upsert en `substances` (`ON CONFLICT (substance_name)`).
#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = substances)]
pub struct SubstanceUpsert<'a> {
    pub substance_name: &'a str,
    pub search_term: &'a str,
    pub dcb_name: &'a str,
    pub cas_number: Option<&'a str>,
    pub products: Value,
    pub references_list: Value,
    pub response_source: &'a str,
    pub processing_time_ms: i64,
    pub content_hash: String,
    pub updated_at: DateTime<Utc>,
}

impl<'a> SubstanceUpsert<'a> {
    pub fn new(key: &'a SubstanceKey,
               search_term: &'a str,
               report: &DegradationReport,
               source: ResponseSource,
               processing_time_ms: u64)
               -> Result<Self, PersistenceError> {
        Ok(SubstanceUpsert { substance_name: key.as_str(),
                             search_term,
                             dcb_name: search_term.trim(),
                             cas_number: None,
                             products: serde_json::to_value(report.products())?,
                             references_list: serde_json::to_value(report.references())?,
                             response_source: source.as_str(),
                             processing_time_ms: i64::try_from(processing_time_ms).unwrap_or(i64::MAX),
                             content_hash: report.content_hash(),
                             updated_at: Utc::now() })
    }
}

/// Reconstruye y valida un reporte a partir de las columnas JSONB.
pub fn report_from_columns(products: Value, references: Value) -> Result<DegradationReport, PersistenceError> {
    let products: Vec<DegradationProduct> = serde_json::from_value(products)?;
    let references: Vec<String> = serde_json::from_value(references)?;
    let report = DegradationReport::new(products, references);
    report.validate().map_err(|e| PersistenceError::Payload(e.to_string()))?;
    Ok(report)
}

pub fn parse_source(raw: &str) -> Result<ResponseSource, PersistenceError> {
    ResponseSource::from_str(raw).map_err(|e| PersistenceError::Payload(e.to_string()))
}

#[derive(Insertable, Debug)]
#[diesel(table_name = search_history)]
pub struct NewSearchRow<'a> {
    pub id: Uuid,
    pub substance_name: &'a str,
    pub search_term: &'a str,
    pub user_ip: &'a str,
    pub user_agent: &'a str,
    pub response_source: &'a str,
    pub was_cached: bool,
    pub processing_time_ms: i64,
    pub search_timestamp: DateTime<Utc>,
}

impl<'a> From<&'a ResolutionRecord> for NewSearchRow<'a> {
    fn from(r: &'a ResolutionRecord) -> Self {
        NewSearchRow { id: r.id,
                       substance_name: &r.substance_name,
                       search_term: &r.search_term,
                       user_ip: &r.source_client_ip,
                       user_agent: &r.user_agent,
                       response_source: r.response_source.as_str(),
                       was_cached: r.was_cached,
                       processing_time_ms: i64::try_from(r.processing_time_ms).unwrap_or(i64::MAX),
                       search_timestamp: r.timestamp }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = system_logs)]
pub struct NewSystemLogRow<'a> {
    pub level: &'a str,
    pub component: &'a str,
    pub action: &'a str,
    pub message: &'a str,
    pub metadata: &'a Value,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a SystemEvent> for NewSystemLogRow<'a> {
    fn from(e: &'a SystemEvent) -> Self {
        NewSystemLogRow { level: e.level.as_str(),
                          component: &e.component,
                          action: &e.action,
                          message: &e.message,
                          metadata: &e.metadata,
                          created_at: e.timestamp }
    }
}

#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = report_cache)]
pub struct CacheUpsert {
    pub cache_key: String,
    pub payload: Value,
    pub response_source: String,
    pub inserted_at: DateTime<Utc>,
}

#[derive(Queryable, Debug)]
pub struct CacheRow {
    pub cache_key: String,
    pub payload: Value,
    pub response_source: String,
    pub inserted_at: DateTime<Utc>,
}

/// Fila de la vista `search_statistics`.
#[derive(QueryableByName, Debug)]
pub struct StatisticRow {
    #[diesel(sql_type = Text)]
    pub substance_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub dcb_name: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub search_count: i64,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub last_searched: Option<DateTime<Utc>>,
    #[diesel(sql_type = BigInt)]
    pub unique_users: i64,
}

impl From<StatisticRow> for SearchStatistic {
    fn from(r: StatisticRow) -> Self {
        SearchStatistic { substance_name: r.substance_name,
                          dcb_name: r.dcb_name,
                          search_count: r.search_count.max(0) as u64,
                          last_searched: r.last_searched,
                          unique_users: r.unique_users.max(0) as u64 }
    }
}

/// Fila de la vista `recent_searches`.
#[derive(QueryableByName, Debug)]
pub struct RecentRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = Text)]
    pub substance_name: String,
    #[diesel(sql_type = Text)]
    pub search_term: String,
    #[diesel(sql_type = Timestamptz)]
    pub search_timestamp: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Text>)]
    pub user_ip: Option<String>,
}

impl From<RecentRow> for RecentSearch {
    fn from(r: RecentRow) -> Self {
        RecentSearch { id: r.id,
                       substance_name: r.substance_name,
                       search_term: r.search_term,
                       search_timestamp: r.search_timestamp,
                       user_ip: r.user_ip }
    }
}
