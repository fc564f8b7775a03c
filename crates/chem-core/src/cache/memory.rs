use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::debug;

use chem_domain::{DegradationReport, ResponseSource, SubstanceKey};

use super::{CacheEntry, ReportCache};
use crate::errors::CacheError;

/// Cache en proceso sobre `DashMap` (seguro para escritores concurrentes).
///
/// Con `ttl = None` las entradas viven hasta que se sobrescriben o se
/// invalidan explícitamente.
#[derive(Debug, Default)]
pub struct InMemoryReportCache {
    entries: DashMap<SubstanceKey, CacheEntry>,
    ttl: Option<Duration>,
}

impl InMemoryReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        InMemoryReportCache { entries: DashMap::new(), ttl }
    }

    /// Invalidación explícita (operador externo).
    pub fn invalidate(&self, key: &SubstanceKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Elimina la entrada sólo si sigue expirada al tomar el lock del shard;
    /// un `set` concurrente posterior a la lectura sobrevive.
    fn evict_expired(&self, key: &SubstanceKey, now: DateTime<Utc>) -> bool {
        let evicted = self.entries.remove_if(key, |_, e| e.is_expired(self.ttl, now)).is_some();
        if evicted {
            debug!("cache:expired key={key}");
        }
        evicted
    }

    pub fn entry(&self, key: &SubstanceKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ReportCache for InMemoryReportCache {
    async fn get(&self, key: &SubstanceKey) -> Result<Option<DegradationReport>, CacheError> {
        let now = Utc::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl, now) => return Ok(Some(entry.report.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        self.evict_expired(key, now);
        Ok(None)
    }

    async fn set(&self, key: &SubstanceKey, report: &DegradationReport, source: ResponseSource) -> Result<(), CacheError> {
        self.entries.insert(key.clone(), CacheEntry::new(report.clone(), source));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chem_domain::DegradationProduct;

    fn report() -> DegradationReport {
        DegradationReport::new(vec![DegradationProduct::new("NAPQI", "Oxidação", "pH 7", "Hepatotóxico").unwrap()], vec![])
    }

    #[tokio::test]
    async fn set_then_get_returns_identical_report() {
        let cache = InMemoryReportCache::new();
        let key = SubstanceKey::new("Paracetamol");
        cache.set(&key, &report(), ResponseSource::Gemini).await.unwrap();
        assert_eq!(cache.get(&SubstanceKey::new("paracetamol")).await.unwrap(), Some(report()));
        assert_eq!(cache.entry(&key).unwrap().source, ResponseSource::Gemini);
    }

    #[tokio::test]
    async fn zero_ttl_behaves_as_miss_and_evicts() {
        let cache = InMemoryReportCache::with_ttl(Some(Duration::ZERO));
        let key = SubstanceKey::new("x");
        cache.set(&key, &report(), ResponseSource::Mock).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn eviction_spares_entry_rewritten_after_expiry_check() {
        let cache = InMemoryReportCache::with_ttl(Some(Duration::from_secs(60)));
        let key = SubstanceKey::new("x");
        let stale = CacheEntry { inserted_at: Utc::now() - chrono::Duration::minutes(5),
                                 ..CacheEntry::new(report(), ResponseSource::Mock) };
        cache.entries.insert(key.clone(), stale);
        let now = Utc::now();
        // `get` vio la entrada vencida; un `set` entra antes del borrado.
        cache.entries.insert(key.clone(), CacheEntry::new(report(), ResponseSource::Gemini));
        assert!(!cache.evict_expired(&key, now));
        assert_eq!(cache.entry(&key).map(|e| e.source), Some(ResponseSource::Gemini));

        cache.entries.insert(key.clone(), CacheEntry { inserted_at: now - chrono::Duration::minutes(5),
                                                       ..CacheEntry::new(report(), ResponseSource::Mock) });
        assert!(cache.evict_expired(&key, now));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = InMemoryReportCache::new();
        let key = SubstanceKey::new("x");
        cache.set(&key, &report(), ResponseSource::Mock).await.unwrap();
        assert!(cache.invalidate(&key));
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }
}
