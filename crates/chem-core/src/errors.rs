//! Taxonomía de errores del pipeline de resolución.
//!
//! Ningún error de este módulo cruza `ResolutionOrchestrator::resolve`: cada
//! uno se convierte en una continuación degradada en el punto de uso.

use thiserror::Error;

use chem_domain::DomainError;

/// Backend persistente no disponible o consulta fallida. En lectura equivale a
/// "no encontrado"; en escritura se registra y se ignora.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")] Unavailable(String),
    #[error("store query failed: {0}")] Query(String),
    #[error("stored payload is invalid: {0}")] InvalidPayload(String),
}

/// Backend de cache no disponible. En lectura equivale a "miss".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache unavailable: {0}")] Unavailable(String),
    #[error("cached payload is invalid: {0}")] InvalidPayload(String),
}

/// Fallo al sintetizar un reporte con el modelo generativo.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("no model credential configured")] MissingCredential,
    #[error("model request failed: {0}")] Model(String),
    #[error("model call timed out after {0} ms")] Timeout(u64),
    #[error("model reply could not be parsed into a report")] Unparseable,
}

/// Escritura de telemetría fallida. Se traga siempre.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")] Unavailable(String),
    #[error("audit write rejected: {0}")] Rejected(String),
}

/// Error interceptado en la cima del pipeline; dispara ERROR_RECOVERY.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("synthesis failed: {0}")] Synthesis(#[from] SynthesisError),
    #[error("synthesized report is invalid: {0}")] InvalidReport(String),
    #[error("pipeline panicked: {0}")] Panicked(String),
}

impl From<DomainError> for PipelineError {
    fn from(e: DomainError) -> Self {
        PipelineError::InvalidReport(e.to_string())
    }
}

impl From<StoreError> for AuditError {
    fn from(e: StoreError) -> Self {
        AuditError::Unavailable(e.to_string())
    }
}
