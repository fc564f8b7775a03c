//! Cliente REST de Gemini (`generateContent`) como `TextModel`.
//!
//! Una única petición de completado por llamada, sin streaming ni
//! reintentos: la degradación ante fallos la decide el sintetizador.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use chem_core::{SynthesisError, TextModel};

use crate::error::ModelClientError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Cabecera con la credencial. Nunca va en la URL: los errores de reqwest
/// citan la URL completa.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        GeminiConfig { api_key: api_key.into(),
                       model: DEFAULT_GEMINI_MODEL.to_string(),
                       base_url: DEFAULT_GEMINI_API_URL.to_string(),
                       timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<PartOut<'a>>,
}

#[derive(Debug, Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Debug, Deserialize)]
struct PartIn {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatena el texto de las partes del primer candidato.
    fn into_text(self) -> Result<String, ModelClientError> {
        let text: String = self.candidates
                               .into_iter()
                               .next()
                               .and_then(|c| c.content)
                               .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
                               .unwrap_or_default();
        if !text.trim().is_empty() {
            return Ok(text);
        }
        match self.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(ModelClientError::Blocked(reason)),
            None => Err(ModelClientError::EmptyResponse),
        }
    }
}

pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ModelClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(GeminiClient { http, config })
    }

    /// Petición cruda; devuelve el texto del primer candidato.
    pub async fn generate_text(&self, prompt: &str, temperature: f32) -> Result<String, ModelClientError> {
        let body = GenerateRequest { contents: vec![Content { parts: vec![PartOut { text: prompt }] }],
                                     generation_config: GenerationConfig { temperature } };
        debug!("gemini:request model={} temperature={temperature} prompt_len={}", self.config.model, prompt.len());
        let response = self.http
                           .post(self.config.endpoint())
                           .header(API_KEY_HEADER, self.config.api_key.as_str())
                           .json(&body)
                           .send()
                           .await
                           .map_err(|e| self.classify(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("gemini:status model={} status={}", self.config.model, status.as_u16());
            return Err(ModelClientError::Status { status: status.as_u16(), body });
        }
        let parsed: GenerateResponse = response.json().await.map_err(|e| self.classify(e))?;
        let text = parsed.into_text()?;
        debug!("gemini:response model={} text_len={}", self.config.model, text.len());
        Ok(text)
    }

    fn classify(&self, err: reqwest::Error) -> ModelClientError {
        if err.is_timeout() {
            ModelClientError::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            ModelClientError::from(err)
        }
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, SynthesisError> {
        Ok(self.generate_text(prompt, temperature).await?)
    }
}
