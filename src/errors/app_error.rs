use thiserror::Error;

use chem_adapters::ModelClientError;
use chem_core::StoreError;
use chem_persistence::PersistenceError;

/// Errores de la aplicación (configuración, arranque y CLI). Nunca provienen
/// de `resolve`, que no falla.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Uso incorrecto: {0}")]
    Usage(String),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Error del cliente de modelo: {0}")]
    Model(#[from] ModelClientError),
    #[error("Error del store: {0}")]
    Store(#[from] StoreError),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Código de salida del proceso para este error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 2,
            AppError::Config(_) => 3,
            AppError::Store(_) => 4,
            _ => 5,
        }
    }
}
