//! Configuración de conexión desde variables de entorno (`.env` incluido).
//!
//! `DATABASE_URL` es opcional: sin ella la aplicación trabaja en memoria.

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const DEFAULT_MIN_CONNECTIONS: u32 = 2;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;
/// Espera máxima por una conexión del pool (r2d2 usa 30 s por defecto).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        DbConfig { url: url.into(),
                   min_connections: DEFAULT_MIN_CONNECTIONS,
                   max_connections: DEFAULT_MAX_CONNECTIONS,
                   connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout.max(Duration::from_millis(100));
        self
    }

    /// Lee `DATABASE_URL`, `DATABASE_MIN_CONNECTIONS`,
    /// `DATABASE_MAX_CONNECTIONS` y `DATABASE_CONNECT_TIMEOUT_SECS`. `None` si
    /// no hay URL.
    pub fn from_env() -> Option<Self> {
        Lazy::force(&DOTENV_LOADED);
        let url = env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())?;
        let min_connections = env::var("DATABASE_MIN_CONNECTIONS").ok()
                                                                  .and_then(|v| v.parse().ok())
                                                                  .unwrap_or(DEFAULT_MIN_CONNECTIONS);
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS").ok()
                                                                  .and_then(|v| v.parse().ok())
                                                                  .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let connect_timeout = env::var("DATABASE_CONNECT_TIMEOUT_SECS").ok()
                                                                       .and_then(|v| v.parse().ok())
                                                                       .map(Duration::from_secs)
                                                                       .unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        Some(DbConfig { url, min_connections, max_connections, connect_timeout }.with_connect_timeout(connect_timeout))
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_pool_bounds() {
        let cfg = DbConfig::new("postgres://localhost/chem");
        assert_eq!(cfg.min_connections, 2);
        assert_eq!(cfg.max_connections, 16);
        assert_eq!(cfg.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn connect_timeout_has_a_floor() {
        let cfg = DbConfig::new("postgres://localhost/chem").with_connect_timeout(Duration::ZERO);
        assert_eq!(cfg.connect_timeout, Duration::from_millis(100));
    }
}
