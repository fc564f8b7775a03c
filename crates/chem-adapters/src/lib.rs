//! chem-adapters: clientes externos que implementan los traits del core.
//!
//! - `gemini`: `GeminiClient`, un `TextModel` sobre la API REST de Gemini.

pub mod error;
pub mod gemini;

pub use error::ModelClientError;
pub use gemini::{GeminiClient, GeminiConfig, API_KEY_HEADER, DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL};
