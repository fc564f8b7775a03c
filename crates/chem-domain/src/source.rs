use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Procedencia de un reporte resuelto.
///
/// `Error` sólo aparece en registros de auditoría: el reporte devuelto en ese
/// camino se etiqueta `MockFallback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Database,
    Gemini,
    Mock,
    MockFallback,
    Error,
}

impl ResponseSource {
    /// Representación estable usada en columnas y logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Database => "database",
            ResponseSource::Gemini => "gemini",
            ResponseSource::Mock => "mock",
            ResponseSource::MockFallback => "mock_fallback",
            ResponseSource::Error => "error",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cache" => Ok(ResponseSource::Cache),
            "database" => Ok(ResponseSource::Database),
            "gemini" => Ok(ResponseSource::Gemini),
            "mock" => Ok(ResponseSource::Mock),
            "mock_fallback" => Ok(ResponseSource::MockFallback),
            "error" => Ok(ResponseSource::Error),
            other => Err(DomainError::ValidationError(format!("response_source desconocido: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_roundtrip_matches_serde_names() {
        for src in [ResponseSource::Cache, ResponseSource::Database, ResponseSource::Gemini, ResponseSource::Mock, ResponseSource::MockFallback, ResponseSource::Error] {
            let json = serde_json::to_string(&src).unwrap();
            assert_eq!(json, format!("\"{}\"", src.as_str()));
            assert_eq!(src.as_str().parse::<ResponseSource>().unwrap(), src);
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!("openai".parse::<ResponseSource>().is_err());
    }
}
