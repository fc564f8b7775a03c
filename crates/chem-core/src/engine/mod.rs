//! Orquestador de resolución.
//!
//! Provee el pipeline CACHE_CHECK → STORE_CHECK → SYNTHESIZE → PERSIST →
//! AUDIT, su configuración y un builder para inyectar dependencias.

pub mod builder;
pub mod config;
pub mod core;

pub use builder::OrchestratorBuilder;
pub use config::OrchestratorConfig;
pub use self::core::{Resolution, ResolutionOrchestrator, Stage};
