//! Transport seam between the oracle and the generative service.

use super::config::OracleConfig;
use crate::world::ImageRef;
use async_trait::async_trait;
use gemini::{Gemini, Schema};
use thiserror::Error;

/// Errors from a single generative call.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("Gemini API error: {0}")]
    Api(#[from] gemini::Error),

    #[error("Malformed structured output: {0}")]
    Malformed(String),

    #[error("No image data in response")]
    NoImage,
}

impl From<serde_json::Error> for OracleError {
    fn from(e: serde_json::Error) -> Self {
        OracleError::Malformed(e.to_string())
    }
}

/// Raw request/response access to a text and image generator.
///
/// Implementations perform exactly one attempt per call; retry and fallback
/// policy lives in [`Oracle`](super::Oracle).
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate JSON text constrained by `schema`. Returns the raw text.
    async fn generate_json(&self, prompt: &str, schema: &Schema) -> Result<String, OracleError>;

    /// Generate one image for `prompt`.
    async fn generate_image(&self, prompt: &str) -> Result<ImageRef, OracleError>;
}

/// Backend backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Gemini,
    text_model: String,
    image_model: String,
}

impl GeminiBackend {
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: config.client(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate_json(&self, prompt: &str, schema: &Schema) -> Result<String, OracleError> {
        Ok(self
            .client
            .generate_json(&self.text_model, prompt, schema.clone())
            .await?)
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageRef, OracleError> {
        match self.client.generate_image(&self.image_model, prompt).await {
            Ok(data) => Ok(data.into()),
            Err(gemini::Error::MissingPayload(_)) => Err(OracleError::NoImage),
            Err(e) => Err(e.into()),
        }
    }
}
