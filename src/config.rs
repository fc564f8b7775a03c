//! Configuración central de la aplicación.
//!
//! Carga variables de entorno (.env incluido, una sola vez) y produce un
//! `AppConfig` inmutable. `from_lookup` recibe la fuente de variables para
//! poder probar la lectura sin tocar el entorno del proceso.

use std::env;
use std::time::Duration;

use chem_adapters::{GeminiConfig, DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL};
use chem_core::constants::DEFAULT_TEMPERATURE;
use chem_core::{OrchestratorConfig, SynthesizerConfig};
use chem_persistence::config::{DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS};
use chem_persistence::{init_dotenv, DbConfig};

use crate::errors::AppError;

pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

/// Parámetros del modelo generativo. Sin `api_key` se usa el dataset estático.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig { api_key: None,
                      model: DEFAULT_GEMINI_MODEL.to_string(),
                      api_url: DEFAULT_GEMINI_API_URL.to_string(),
                      temperature: DEFAULT_TEMPERATURE,
                      timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS) }
    }
}

impl ModelConfig {
    pub fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = ModelConfig::default();
        let temperature = parse_var(get, "MODEL_TEMPERATURE")?.unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Config(format!("MODEL_TEMPERATURE fuera de rango [0, 2]: {temperature}")));
        }
        let timeout_secs: u64 = parse_var(get, "MODEL_TIMEOUT_SECS")?.unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS);
        Ok(ModelConfig { api_key: non_empty(get, "GOOGLE_GENERATIVE_AI_API_KEY"),
                         model: non_empty(get, "GEMINI_MODEL").unwrap_or(defaults.model),
                         api_url: non_empty(get, "GEMINI_API_URL").unwrap_or(defaults.api_url),
                         temperature,
                         timeout: Duration::from_secs(timeout_secs.max(1)) })
    }

    /// Configuración del cliente HTTP, sólo si hay credencial.
    pub fn gemini(&self) -> Option<GeminiConfig> {
        let key = self.api_key.as_deref()?;
        Some(GeminiConfig::new(key).with_model(&self.model)
                                   .with_base_url(&self.api_url)
                                   .with_timeout(self.timeout))
    }

    pub fn synthesizer(&self) -> SynthesizerConfig {
        SynthesizerConfig { temperature: self.temperature,
                            timeout: Some(self.timeout) }
    }
}

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None`: backends en memoria.
    pub database: Option<DbConfig>,
    pub model: ModelConfig,
    pub orchestrator: OrchestratorConfig,
    /// `None`: las entradas de cache no expiran.
    pub cache_ttl: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { database: None,
                    model: ModelConfig::default(),
                    orchestrator: OrchestratorConfig::default(),
                    cache_ttl: None }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        init_dotenv();
        Self::from_lookup(&|k| env::var(k).ok())
    }

    pub fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database = match non_empty(get, "DATABASE_URL") {
            Some(url) => {
                let mut db = DbConfig::new(url);
                db.min_connections = parse_var(get, "DATABASE_MIN_CONNECTIONS")?.unwrap_or(DEFAULT_MIN_CONNECTIONS);
                db.max_connections = parse_var(get, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
                if let Some(secs) = parse_var::<u64>(get, "DATABASE_CONNECT_TIMEOUT_SECS")? {
                    db = db.with_connect_timeout(Duration::from_secs(secs));
                }
                Some(db)
            }
            None => None,
        };
        let defaults = OrchestratorConfig::default();
        let orchestrator =
            OrchestratorConfig { enable_cache: parse_flag(get, "CHEMREPORT_ENABLE_CACHE")?.unwrap_or(defaults.enable_cache),
                                 enable_detailed_audit: parse_flag(get, "CHEMREPORT_DETAILED_AUDIT")?.unwrap_or(defaults.enable_detailed_audit) };
        let cache_ttl = parse_var::<u64>(get, "CHEMREPORT_CACHE_TTL_SECS")?.filter(|s| *s > 0)
                                                                             .map(Duration::from_secs);
        Ok(AppConfig { database,
                       model: ModelConfig::from_lookup(get)?,
                       orchestrator,
                       cache_ttl })
    }
}

fn non_empty(get: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(get: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError> {
    match non_empty(get, key) {
        Some(raw) => raw.parse::<T>()
                        .map(Some)
                        .map_err(|_| AppError::Config(format!("{key} inválido: {raw:?}"))),
        None => Ok(None),
    }
}

fn parse_flag(get: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>, AppError> {
    match non_empty(get, key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(AppError::Config(format!("{key} debe ser booleano: {v:?}"))),
        },
    }
}
