//! Store en memoria (rápido para tests, CLI sin base de datos y prototipos).
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use chem_domain::{DegradationReport, ResolutionRecord, ResponseSource, SubstanceKey, SystemEvent};

use super::types::{RecentSearch, ReportStore, SearchAnalytics, SearchStatistic, StoredReport};
use crate::errors::StoreError;

#[derive(Default)]
struct Inner {
    reports: HashMap<SubstanceKey, StoredReport>,
    history: Vec<ResolutionRecord>,
    events: Vec<SystemEvent>,
}

/// Implementación en memoria de `ReportStore` + `SearchAnalytics`.
///
/// Clonar comparte el mismo estado (Arc interno), igual que un pool.
#[derive(Clone, Default)]
pub struct InMemoryReportStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entrada completa guardada para la clave, si existe.
    pub async fn entry(&self, key: &SubstanceKey) -> Option<StoredReport> {
        self.inner.read().await.reports.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.reports.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Historial de búsquedas en orden de inserción.
    pub async fn history(&self) -> Vec<ResolutionRecord> {
        self.inner.read().await.history.clone()
    }

    pub async fn system_events(&self) -> Vec<SystemEvent> {
        self.inner.read().await.events.clone()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn lookup(&self, key: &SubstanceKey) -> Result<Option<DegradationReport>, StoreError> {
        Ok(self.inner.read().await.reports.get(key).map(|e| e.report.clone()))
    }

    async fn save(&self,
                  key: &SubstanceKey,
                  search_term: &str,
                  report: &DegradationReport,
                  source: ResponseSource,
                  processing_time_ms: u64)
                  -> Result<(), StoreError> {
        let entry = StoredReport { substance_name: key.as_str().to_string(),
                                   search_term: search_term.to_string(),
                                   dcb_name: search_term.to_string(),
                                   cas_number: None,
                                   report: report.clone(),
                                   response_source: source,
                                   processing_time_ms,
                                   content_hash: report.content_hash(),
                                   updated_at: Utc::now() };
        self.inner.write().await.reports.insert(key.clone(), entry);
        Ok(())
    }

    async fn log_resolution(&self, record: &ResolutionRecord) -> Result<(), StoreError> {
        self.inner.write().await.history.push(record.clone());
        Ok(())
    }

    async fn record_system_event(&self, event: &SystemEvent) -> Result<(), StoreError> {
        self.inner.write().await.events.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl SearchAnalytics for InMemoryReportStore {
    async fn search_statistics(&self, limit: usize) -> Result<Vec<SearchStatistic>, StoreError> {
        let guard = self.inner.read().await;
        let mut grouped: HashMap<&str, (SearchStatistic, HashSet<&str>)> = HashMap::new();
        for rec in &guard.history {
            let (stat, users) = grouped.entry(rec.substance_name.as_str()).or_insert_with(|| {
                let dcb_name = guard.reports
                                    .get(&SubstanceKey::new(&rec.substance_name))
                                    .map(|e| e.dcb_name.clone());
                (SearchStatistic { substance_name: rec.substance_name.clone(),
                                   dcb_name,
                                   search_count: 0,
                                   last_searched: None,
                                   unique_users: 0 },
                 HashSet::new())
            });
            stat.search_count += 1;
            stat.last_searched = stat.last_searched.max(Some(rec.timestamp));
            users.insert(rec.source_client_ip.as_str());
        }
        let mut stats: Vec<SearchStatistic> = grouped.into_values()
                                                     .map(|(mut stat, users)| {
                                                         stat.unique_users = users.len() as u64;
                                                         stat
                                                     })
                                                     .collect();
        stats.sort_by(|a, b| {
                 b.search_count
                  .cmp(&a.search_count)
                  .then_with(|| b.last_searched.cmp(&a.last_searched))
                  .then_with(|| a.substance_name.cmp(&b.substance_name))
             });
        stats.truncate(limit);
        Ok(stats)
    }

    async fn recent_searches(&self, limit: usize) -> Result<Vec<RecentSearch>, StoreError> {
        let guard = self.inner.read().await;
        let mut recent: Vec<RecentSearch> = guard.history
                                                 .iter()
                                                 .map(|rec| RecentSearch { id: rec.id,
                                                                           substance_name: rec.substance_name.clone(),
                                                                           search_term: rec.search_term.clone(),
                                                                           search_timestamp: rec.timestamp,
                                                                           user_ip: Some(rec.source_client_ip.clone()) })
                                                 .collect();
        // Orden estable: a igual timestamp, la inserción más tardía va primero.
        recent.reverse();
        recent.sort_by(|a, b| b.search_timestamp.cmp(&a.search_timestamp));
        recent.truncate(limit);
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chem_domain::{DegradationProduct, RequestMeta};

    fn report(name: &str) -> DegradationReport {
        DegradationReport::new(vec![DegradationProduct::new(name, "r", "c", "t").unwrap()], vec!["ref".into()])
    }

    #[tokio::test]
    async fn save_then_lookup_by_normalized_key() {
        let store = InMemoryReportStore::new();
        let key = SubstanceKey::new("Ibuprofeno");
        store.save(&key, "Ibuprofeno", &report("4-isobutilfenol"), ResponseSource::Gemini, 40).await.unwrap();

        let found = store.lookup(&SubstanceKey::new("IBUPROFENO")).await.unwrap();
        assert_eq!(found, Some(report("4-isobutilfenol")));
        let entry = store.entry(&key).await.unwrap();
        assert_eq!(entry.search_term, "Ibuprofeno");
        assert_eq!(entry.response_source, ResponseSource::Gemini);
        assert_eq!(entry.content_hash, report("4-isobutilfenol").content_hash());
    }

    #[tokio::test]
    async fn save_is_last_writer_wins() {
        let store = InMemoryReportStore::new();
        let key = SubstanceKey::new("x");
        store.save(&key, "x", &report("a"), ResponseSource::Mock, 1).await.unwrap();
        store.save(&key, "X", &report("b"), ResponseSource::Gemini, 2).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.lookup(&key).await.unwrap(), Some(report("b")));
    }

    #[tokio::test]
    async fn statistics_group_and_order_by_count() {
        let store = InMemoryReportStore::new();
        let a = RequestMeta::new(Some("1.1.1.1"), None);
        let b = RequestMeta::new(Some("2.2.2.2"), None);
        for (term, meta) in [("Paracetamol", &a), ("paracetamol", &b), ("Paracetamol", &a), ("Ibuprofeno", &a)] {
            let rec = ResolutionRecord::new(term, meta, ResponseSource::Cache, true, 1);
            store.log_resolution(&rec).await.unwrap();
        }
        let stats = store.search_statistics(10).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].substance_name, "paracetamol");
        assert_eq!(stats[0].search_count, 3);
        assert_eq!(stats[0].unique_users, 2);
        assert_eq!(stats[1].substance_name, "ibuprofeno");

        let top = store.search_statistics(1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn recent_searches_newest_first() {
        let store = InMemoryReportStore::new();
        for term in ["a", "b", "c"] {
            let rec = ResolutionRecord::new(term, &RequestMeta::default(), ResponseSource::Mock, false, 0);
            store.log_resolution(&rec).await.unwrap();
        }
        let recent = store.recent_searches(2).await.unwrap();
        let terms: Vec<&str> = recent.iter().map(|r| r.search_term.as_str()).collect();
        assert_eq!(terms, vec!["c", "b"]);
    }
}
