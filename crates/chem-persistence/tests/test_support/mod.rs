#![allow(dead_code)]

use chem_persistence::config::DbConfig;
use chem_persistence::pg::{build_pool, PgPool, PoolProvider};
use once_cell::sync::Lazy;
use uuid::Uuid;

pub static TEST_POOL: Lazy<Option<PgPool>> = Lazy::new(|| {
    let cfg = DbConfig::from_env()?;
    // usar 1x2: los stores piden conexiones desde hilos bloqueantes.
    match build_pool(&cfg.url, 1, 2) {
        Ok(p) => Some(p),
        Err(e) => {
            eprintln!("No se pudo construir pool de test: {e}");
            None
        }
    }
});

/// Provider sobre el pool compartido; `None` si no hay DATABASE_URL.
pub fn provider() -> Option<PoolProvider> {
    match TEST_POOL.as_ref() {
        Some(pool) => Some(PoolProvider { pool: pool.clone() }),
        None => {
            eprintln!("skip (no DATABASE_URL)");
            None
        }
    }
}

/// Nombre de sustancia único por test para no chocar entre ejecuciones.
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
