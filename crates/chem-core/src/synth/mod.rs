//! Sintetizador de reportes.
//!
//! Dos estrategias, elegidas por configuración:
//! - Modelo: prompt fijo → texto crudo → `parse::parse_response`.
//! - Estática: dataset de respaldo (sin credencial de modelo).
//!
//! `ModelSynthesizer` nunca devuelve error: fallos de red, timeouts o texto
//! ininterpretable se degradan al dataset estático con procedencia
//! `mock_fallback`.

pub mod fallback;
pub mod parse;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use chem_domain::{DegradationReport, ResponseSource};

use crate::constants::DEFAULT_TEMPERATURE;
use crate::errors::SynthesisError;

pub use parse::ParseStrategy;

/// Cliente de modelo generativo de texto (caja negra).
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Nombre del modelo (para logs).
    fn name(&self) -> &str;
    /// Una petición de completado; devuelve el texto crudo.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, SynthesisError>;
}

/// Resultado de una síntesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub report: DegradationReport,
    pub source: ResponseSource,
    pub strategy: ParseStrategy,
}

/// Contrato que consume el orquestador. Implementaciones propias pueden
/// devolver error; el orquestador lo trata en ERROR_RECOVERY.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, substance_name: &str) -> Result<Synthesis, SynthesisError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizerConfig {
    pub temperature: f32,
    /// Límite de la llamada al modelo. `None` = sin límite propio.
    pub timeout: Option<Duration>,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        SynthesizerConfig { temperature: DEFAULT_TEMPERATURE,
                            timeout: Some(Duration::from_secs(60)) }
    }
}

/// Sintetizador estándar: modelo si hay credencial, dataset estático si no.
pub struct ModelSynthesizer {
    model: Option<Arc<dyn TextModel>>,
    config: SynthesizerConfig,
}

impl ModelSynthesizer {
    pub fn new(model: Option<Arc<dyn TextModel>>, config: SynthesizerConfig) -> Self {
        ModelSynthesizer { model, config }
    }

    /// Sintetizador sin modelo (sólo dataset estático).
    pub fn offline() -> Self {
        ModelSynthesizer::new(None, SynthesizerConfig::default())
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Llama al modelo y recorre la cadena de estrategias. Un resultado de
    /// `StaticFallback` aquí significa texto ininterpretable.
    async fn generate_with_model(&self, substance_name: &str) -> Result<(DegradationReport, ParseStrategy), SynthesisError> {
        let model = self.model.as_ref().ok_or(SynthesisError::MissingCredential)?;
        let prompt = prompt::build_prompt(substance_name);
        debug!("synth:request model={} temperature={} prompt_len={}", model.name(), self.config.temperature, prompt.len());
        let call = model.generate(&prompt, self.config.temperature);
        let text = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await
                                                             .map_err(|_| SynthesisError::Timeout(limit.as_millis() as u64))??,
            None => call.await?,
        };
        let (report, strategy) = parse::parse_response(&text, substance_name);
        if strategy == ParseStrategy::StaticFallback {
            return Err(SynthesisError::Unparseable);
        }
        Ok((report, strategy))
    }
}

#[async_trait]
impl Synthesizer for ModelSynthesizer {
    async fn synthesize(&self, substance_name: &str) -> Result<Synthesis, SynthesisError> {
        match self.generate_with_model(substance_name).await {
            Ok((report, strategy)) => {
                info!("synth:model substance={substance_name} strategy={} products={}", strategy.as_str(), report.products().len());
                Ok(Synthesis { report, source: ResponseSource::Gemini, strategy })
            }
            Err(SynthesisError::MissingCredential) => {
                debug!("synth:static substance={substance_name} (no model credential)");
                Ok(Synthesis { report: fallback::static_report(substance_name),
                               source: ResponseSource::Mock,
                               strategy: ParseStrategy::StaticFallback })
            }
            Err(e) => {
                warn!("synth:degraded substance={substance_name} err={e}");
                Ok(Synthesis { report: fallback::static_report(substance_name),
                               source: ResponseSource::MockFallback,
                               strategy: ParseStrategy::StaticFallback })
            }
        }
    }
}
