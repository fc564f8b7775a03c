//! Store persistente de reportes y trait de analítica de búsquedas.

mod memory;
mod types;

pub use memory::InMemoryReportStore;
pub use types::{RecentSearch, ReportStore, SearchAnalytics, SearchStatistic, StoredReport};
