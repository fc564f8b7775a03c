use thiserror::Error;

use chem_core::SynthesisError;

/// Fallos del cliente HTTP del modelo generativo.
#[derive(Debug, Error)]
pub enum ModelClientError {
    #[error("http transport error: {0}")]
    Transport(reqwest::Error),
    #[error("model endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("prompt blocked by model: {0}")]
    Blocked(String),
    #[error("model reply carried no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for ModelClientError {
    /// Descarta la URL del error para no arrastrar endpoints ni credenciales
    /// a logs o auditoría.
    fn from(err: reqwest::Error) -> Self {
        ModelClientError::Transport(err.without_url())
    }
}

impl From<ModelClientError> for SynthesisError {
    fn from(err: ModelClientError) -> Self {
        match err {
            ModelClientError::Timeout(ms) => SynthesisError::Timeout(ms),
            other => SynthesisError::Model(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_keeps_its_kind() {
        assert_eq!(SynthesisError::from(ModelClientError::Timeout(500)), SynthesisError::Timeout(500));
    }

    #[test]
    fn status_becomes_model_error_with_details() {
        let err = SynthesisError::from(ModelClientError::Status { status: 429, body: "quota".into() });
        assert_eq!(err, SynthesisError::Model("model endpoint returned status 429: quota".into()));
    }
}
