//! Errores de persistencia.
//! Mapea errores de Diesel / conexión a variantes semánticas y luego a los
//! errores de frontera del core (`StoreError`, `CacheError`, `AuditError`).

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use chem_core::{AuditError, CacheError, StoreError};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("not found")]
    NotFound,
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    /// El pool agotó su `connect_timeout` sin entregar conexión. No se
    /// reintenta: la espera ya ocurrió dentro del pool.
    #[error("database unavailable: {0}")]
    PoolUnavailable(String),
    #[error("stored payload could not be decoded: {0}")]
    Payload(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(info.message().to_string()),
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Payload(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Payload(format!("ser: {e}")),
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::TransientIo(msg) | PersistenceError::PoolUnavailable(msg) => StoreError::Unavailable(msg),
            PersistenceError::Payload(msg) => StoreError::InvalidPayload(msg),
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<PersistenceError> for CacheError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Payload(msg) => CacheError::InvalidPayload(msg),
            other => CacheError::Unavailable(other.to_string()),
        }
    }
}

impl From<PersistenceError> for AuditError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::CheckViolation(msg) => AuditError::Rejected(msg),
            other => AuditError::Unavailable(other.to_string()),
        }
    }
}
