//! The generative client used by character creation and the turn loop.

use super::backend::{GeminiBackend, GenerativeBackend, OracleError};
use super::config::OracleConfig;
use super::prompts;
use super::resilient::{resilient, retrying, RetryPolicy};
use crate::world::{Character, CharacterProfile, HistoryEntry, ImageRef, Skill};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Backstory and skills for a new character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetails {
    pub backstory: String,
    pub skills: Vec<Skill>,
}

impl CharacterDetails {
    pub fn fallback() -> Self {
        Self {
            backstory: prompts::FALLBACK_BACKSTORY.to_string(),
            skills: prompts::fallback_skills(),
        }
    }

    fn validate(self) -> Result<Self, OracleError> {
        if self.backstory.trim().is_empty() {
            return Err(OracleError::Malformed("empty backstory".to_string()));
        }
        if self.skills.is_empty() {
            return Err(OracleError::Malformed("no skills".to_string()));
        }
        Ok(self)
    }
}

/// A narrated scene and the moves offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub description: String,
    pub choices: Vec<String>,
}

impl Scene {
    pub fn new(description: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            description: description.into(),
            choices,
        }
    }

    pub fn fallback() -> Self {
        Self {
            description: prompts::FALLBACK_SCENE.to_string(),
            choices: prompts::FALLBACK_CHOICES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    fn validate(self) -> Result<Self, OracleError> {
        if self.description.trim().is_empty() {
            return Err(OracleError::Malformed("empty scene description".to_string()));
        }
        if self.choices.is_empty() {
            return Err(OracleError::Malformed("no choices".to_string()));
        }
        Ok(self)
    }
}

/// Generative client for details, portraits, scenes and scene art.
///
/// Only [`generate_image_with_retry`](Self::generate_image_with_retry) can
/// fail; every other capability degrades to a fixed fallback.
#[derive(Clone)]
pub struct Oracle {
    backend: Arc<dyn GenerativeBackend>,
    image_retries: u32,
}

impl Oracle {
    /// Create an oracle talking to Gemini with the given configuration.
    pub fn new(config: OracleConfig) -> Self {
        let image_retries = config.image_retries;
        Self {
            backend: Arc::new(GeminiBackend::new(&config)),
            image_retries,
        }
    }

    /// Create an oracle from `GEMINI_API_KEY` / `API_KEY`.
    pub fn from_env() -> Result<Self, gemini::Error> {
        Ok(Self::new(OracleConfig::from_env()?))
    }

    /// Create an oracle over any backend, with one image retry.
    pub fn with_backend(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            image_retries: 1,
        }
    }

    pub fn with_image_retries(mut self, retries: u32) -> Self {
        self.image_retries = retries;
        self
    }

    pub fn image_retries(&self) -> u32 {
        self.image_retries
    }

    /// Backstory and skills for `profile`. Single attempt.
    pub async fn generate_character_details(&self, profile: &CharacterProfile) -> CharacterDetails {
        let backend = &self.backend;
        let schema = prompts::details_schema();
        let schema = &schema;

        resilient(
            "character_details",
            prompts::details_prompt(profile),
            RetryPolicy::SINGLE_ATTEMPT,
            |prompt| async move {
                let text = backend.generate_json(&prompt, schema).await?;
                serde_json::from_str::<CharacterDetails>(&text)?.validate()
            },
            CharacterDetails::fallback,
        )
        .await
    }

    /// Generate an image, softening the prompt before each of `retries`
    /// further attempts. Returns the last error if all attempts fail.
    pub async fn generate_image_with_retry(
        &self,
        prompt: &str,
        retries: u32,
    ) -> Result<ImageRef, OracleError> {
        let backend = &self.backend;
        retrying(
            "image",
            prompt.to_string(),
            RetryPolicy::new(retries, prompts::soften_prompt),
            |prompt| async move { backend.generate_image(&prompt).await },
        )
        .await
    }

    /// Portrait for a character; the placeholder portrait on failure.
    pub async fn generate_character_portrait(
        &self,
        race: &str,
        class: &str,
        description: &str,
    ) -> ImageRef {
        let prompt = prompts::portrait_prompt(race, class, description);
        match self.generate_image_with_retry(&prompt, self.image_retries).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(operation = "portrait", error = %e, "using placeholder portrait");
                prompts::portrait_placeholder()
            }
        }
    }

    /// Background art for a scene; the placeholder scene on failure.
    pub async fn generate_scene_image(&self, description: &str) -> ImageRef {
        let prompt = prompts::scene_image_prompt(description);
        match self.generate_image_with_retry(&prompt, self.image_retries).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(operation = "scene_image", error = %e, "using placeholder scene");
                prompts::scene_placeholder()
            }
        }
    }

    /// Continue the story after `action`. Single attempt.
    pub async fn generate_next_scene(
        &self,
        history: &[HistoryEntry],
        action: &str,
        character: &Character,
    ) -> Scene {
        let backend = &self.backend;
        let schema = prompts::scene_schema();
        let schema = &schema;

        resilient(
            "next_scene",
            prompts::scene_prompt(history, action, character),
            RetryPolicy::SINGLE_ATTEMPT,
            |prompt| async move {
                let text = backend.generate_json(&prompt, schema).await?;
                serde_json::from_str::<Scene>(&text)?.validate()
            },
            Scene::fallback,
        )
        .await
    }
}
