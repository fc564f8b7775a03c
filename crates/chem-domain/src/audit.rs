//! Entidades de auditoría: metadatos de la petición, registro de resolución
//! (una fila por intento) y eventos de sistema estructurados.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{ResponseSource, SubstanceKey};

/// Valor usado cuando no se conoce la IP del cliente.
pub const UNKNOWN_CLIENT_IP: &str = "unknown";

/// Identidad mínima del llamador capturada para auditoría.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub client_ip: String,
    pub user_agent: String,
}

impl Default for RequestMeta {
    fn default() -> Self {
        RequestMeta { client_ip: UNKNOWN_CLIENT_IP.to_string(),
                      user_agent: String::new() }
    }
}

impl RequestMeta {
    pub fn new(client_ip: Option<&str>, user_agent: Option<&str>) -> Self {
        let client_ip = client_ip.map(str::trim)
                                 .filter(|ip| !ip.is_empty())
                                 .unwrap_or(UNKNOWN_CLIENT_IP)
                                 .to_string();
        RequestMeta { client_ip,
                      user_agent: user_agent.unwrap_or_default().to_string() }
    }

    /// Extrae IP y user-agent de cabeceras HTTP (nombres sin distinguir
    /// mayúsculas). Preferencia: primer valor de `x-forwarded-for`, luego
    /// `x-real-ip`, si no `"unknown"`.
    pub fn from_headers<'a, I>(headers: I) -> Self
        where I: IntoIterator<Item = (&'a str, &'a str)>
    {
        let mut forwarded = None;
        let mut real_ip = None;
        let mut user_agent = None;
        for (name, value) in headers {
            match name.to_ascii_lowercase().as_str() {
                "x-forwarded-for" => forwarded = value.split(',').next(),
                "x-real-ip" => real_ip = Some(value),
                "user-agent" => user_agent = Some(value),
                _ => {}
            }
        }
        RequestMeta::new(forwarded.or(real_ip), user_agent)
    }

    /// User agent truncado a `max` caracteres (para metadata de eventos).
    pub fn user_agent_prefix(&self, max: usize) -> String {
        self.user_agent.chars().take(max).collect()
    }
}

/// Registro append-only de un intento de resolución.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub id: Uuid,
    /// Clave normalizada (minúsculas).
    pub substance_name: String,
    /// Entrada original del usuario, con mayúsculas preservadas.
    pub search_term: String,
    pub source_client_ip: String,
    pub user_agent: String,
    pub response_source: ResponseSource,
    pub was_cached: bool,
    pub processing_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl ResolutionRecord {
    pub fn new(search_term: &str,
               meta: &RequestMeta,
               response_source: ResponseSource,
               was_cached: bool,
               processing_time_ms: u64)
               -> Self {
        ResolutionRecord { id: Uuid::new_v4(),
                           substance_name: SubstanceKey::new(search_term).as_str().to_string(),
                           search_term: search_term.to_string(),
                           source_client_ip: meta.client_ip.clone(),
                           user_agent: meta.user_agent.clone(),
                           response_source,
                           was_cached,
                           processing_time_ms,
                           timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evento de sistema libre (nivel, componente, acción, mensaje, metadata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub level: LogLevel,
    pub component: String,
    pub action: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl SystemEvent {
    pub fn new(level: LogLevel, component: &str, action: &str, message: impl Into<String>, metadata: serde_json::Value) -> Self {
        SystemEvent { level,
                      component: component.to_string(),
                      action: action.to_string(),
                      message: message.into(),
                      metadata,
                      timestamp: Utc::now() }
    }

    pub fn info(component: &str, action: &str, message: impl Into<String>, metadata: serde_json::Value) -> Self {
        SystemEvent::new(LogLevel::Info, component, action, message, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forwarded_for_takes_precedence() {
        let meta = RequestMeta::from_headers(vec![("X-Real-IP", "10.0.0.9"),
                                                  ("X-Forwarded-For", "203.0.113.7, 10.0.0.1"),
                                                  ("User-Agent", "curl/8.0")]);
        assert_eq!(meta.client_ip, "203.0.113.7");
        assert_eq!(meta.user_agent, "curl/8.0");
    }

    #[test]
    fn missing_headers_default_to_unknown() {
        let meta = RequestMeta::from_headers(Vec::<(&str, &str)>::new());
        assert_eq!(meta.client_ip, UNKNOWN_CLIENT_IP);
        assert_eq!(meta.user_agent, "");
    }

    #[test]
    fn record_normalizes_name_but_keeps_search_term() {
        let rec = ResolutionRecord::new("Paracetamol", &RequestMeta::default(), ResponseSource::Mock, false, 12);
        assert_eq!(rec.substance_name, "paracetamol");
        assert_eq!(rec.search_term, "Paracetamol");
        assert_eq!(rec.source_client_ip, "unknown");
    }

    #[test]
    fn log_level_serializes_uppercase() {
        let ev = SystemEvent::info("search", "start", "x", json!({}));
        assert_eq!(serde_json::to_value(&ev).unwrap()["level"], "INFO");
    }

    #[test]
    fn user_agent_prefix_counts_chars() {
        let meta = RequestMeta::new(None, Some("ñandú-agent"));
        assert_eq!(meta.user_agent_prefix(5), "ñandú");
    }
}
