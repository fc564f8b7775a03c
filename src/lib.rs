//! chemreport: resolución de reportes de productos de degradación.
//!
//! Ensambla el pipeline de `chem-core` con los backends de
//! `chem-persistence` (Postgres) o en memoria, y el cliente Gemini de
//! `chem-adapters`:
//! - `config` lee el entorno (`.env` incluido).
//! - `bootstrap` construye el orquestador.
//! - `cli` parsea argumentos y presenta resultados.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod errors;

pub use bootstrap::{build_orchestrator, App, Backend};
pub use cli::{parse_args, Command};
pub use config::{AppConfig, ModelConfig};
pub use errors::AppError;
