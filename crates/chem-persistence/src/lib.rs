//! chem-persistence
//!
//! Implementaciones Postgres (Diesel + r2d2) de `ReportStore`,
//! `SearchAnalytics` y `ReportCache`, más utilidades de conexión y
//! migraciones embebidas.
//!
//! Módulos:
//! - `pg`: stores sobre Postgres y construcción del pool.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_pool, build_pool_from_config, ConnectionProvider, PgPool, PgReportCache, PgReportStore, PoolProvider};
