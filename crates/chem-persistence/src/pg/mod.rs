//! Implementaciones Postgres (Diesel) de los traits del core.
//!
//! - `PgReportStore`: `ReportStore` + `SearchAnalytics` sobre las tablas
//!   `substances`, `search_history`, `system_logs` y las vistas de analítica.
//! - `PgReportCache`: `ReportCache` sobre `report_cache`.
//!
//! Diesel es síncrono: cada operación corre en `spawn_blocking` con una
//! conexión del pool y reintento ante errores transitorios. Los traits del
//! core son async, así que el orquestador nunca bloquea su runtime.

mod cache;
mod rows;
mod store;

use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, warn};

use crate::config::DbConfig;
use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;

pub use cache::PgReportCache;
pub use store::PgReportStore;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real o un doble de test sin acoplar los stores a
/// r2d2. Debe devolver `PersistenceError::PoolUnavailable` si no hay conexión.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
#[derive(Clone)]
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::PoolUnavailable(format!("pool error: {e}")))
    }
}

/// Determina si un error es transitorio (conviene reintentar con backoff).
pub(crate) fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos drivers entregan desconexiones como texto libre.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry con backoff lineal corto: 3 reintentos (15ms, 30ms, 45ms), `warn!`
/// por intento. Sólo repite la unidad de trabajo provista por `f`.
pub(crate) fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Ejecuta `f` con una conexión del provider en el pool de hilos bloqueantes
/// de tokio, con reintento.
pub(crate) async fn run_blocking<P, T, F>(provider: &Arc<P>, op: &'static str, f: F) -> Result<T, PersistenceError>
    where P: ConnectionProvider,
          T: Send + 'static,
          F: FnMut(&mut PgConnection) -> Result<T, PersistenceError> + Send + 'static
{
    let provider = Arc::clone(provider);
    let mut f = f;
    debug!("{op}:start");
    let result = tokio::task::spawn_blocking(move || {
                     with_retry(|| {
                         let mut conn = provider.connection()?;
                         f(&mut *conn)
                     })
                 }).await
                   .map_err(|e| PersistenceError::TransientIo(format!("{op}: blocking task failed: {e}")))?;
    if let Err(e) = &result {
        debug!("{op}:error err={e}");
    }
    result
}

/// Construye un pool Postgres r2d2 y aplica migraciones pendientes.
///
/// Si `min_size > max_size` se usa `min_size = max_size`. Usa el
/// `connect_timeout` por defecto; ver `build_pool_from_config`.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let mut cfg = DbConfig::new(database_url);
    cfg.min_connections = min_size;
    cfg.max_connections = max_size;
    build_pool_from_config(&cfg)
}

/// Pool ya migrado a partir de un `DbConfig`.
///
/// Tanto la construcción como cada `get()` esperan como mucho
/// `cfg.connect_timeout`. Un servidor inalcanzable devuelve
/// `PersistenceError::PoolUnavailable` en ese plazo.
pub fn build_pool_from_config(cfg: &DbConfig) -> Result<PgPool, PersistenceError> {
    let validated_min = cfg.min_connections.max(1);
    let validated_max = cfg.max_connections.max(1);
    if validated_min > validated_max {
        warn!("build_pool: min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let manager = ConnectionManager::<PgConnection>::new(cfg.url.as_str());
    let pool = r2d2::Pool::builder().min_idle(Some(validated_min.min(validated_max)))
                                    .max_size(validated_max)
                                    .connection_timeout(cfg.connect_timeout)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::PoolUnavailable(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::PoolUnavailable(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}
