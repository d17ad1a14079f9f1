//! Configuration for the generative backend.

use std::time::Duration;

/// Settings for talking to the Gemini API.
///
/// The credential is passed in explicitly; `from_env` is a convenience for
/// binaries and live tests.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// API credential.
    pub api_key: String,

    /// Model used for backstories and scenes.
    pub text_model: String,

    /// Model used for portraits and scene art.
    pub image_model: String,

    /// Override for the API root.
    pub base_url: Option<String>,

    /// Whole-request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Extra attempts for image generation after the first failure.
    pub image_retries: u32,
}

impl OracleConfig {
    /// Create a config with default models for the given credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            text_model: gemini::DEFAULT_TEXT_MODEL.to_string(),
            image_model: gemini::DEFAULT_IMAGE_MODEL.to_string(),
            base_url: None,
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
            image_retries: 1,
        }
    }

    /// Read the credential from `GEMINI_API_KEY` (or `API_KEY`) and optional
    /// model overrides from `SCHOLOMANCE_TEXT_MODEL` / `SCHOLOMANCE_IMAGE_MODEL`.
    pub fn from_env() -> Result<Self, gemini::Error> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| gemini::Error::NoApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("SCHOLOMANCE_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Ok(model) = std::env::var("SCHOLOMANCE_IMAGE_MODEL") {
            config.image_model = model;
        }
        Ok(config)
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeouts(mut self, request: Duration, connect: Duration) -> Self {
        self.request_timeout = request;
        self.connect_timeout = connect;
        self
    }

    pub fn with_image_retries(mut self, retries: u32) -> Self {
        self.image_retries = retries;
        self
    }

    /// Build the HTTP client described by this config.
    pub fn client(&self) -> gemini::Gemini {
        let client = gemini::Gemini::with_timeouts(
            &self.api_key,
            self.request_timeout,
            self.connect_timeout,
        );
        match &self.base_url {
            Some(url) => client.with_base_url(url),
            None => client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::new("key");
        assert_eq!(config.text_model, "gemini-2.5-flash");
        assert_eq!(config.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.image_retries, 1);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_builder() {
        let config = OracleConfig::new("key")
            .with_text_model("gemini-2.5-pro")
            .with_image_model("imagen")
            .with_image_retries(2)
            .with_timeouts(Duration::from_secs(10), Duration::from_secs(2));

        assert_eq!(config.text_model, "gemini-2.5-pro");
        assert_eq!(config.image_model, "imagen");
        assert_eq!(config.image_retries, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }
}
