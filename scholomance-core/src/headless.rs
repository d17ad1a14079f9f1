//! Headless game interface for programmatic use.
//!
//! This module drives character creation and the turn loop without any UI.
//! It's designed for:
//! - The line-oriented `scholomance` binary
//! - Live smoke tests against the real API
//! - Script-driven sessions
//!
//! # Example
//!
//! ```ignore
//! use scholomance_core::headless::{HeadlessConfig, HeadlessGame};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HeadlessConfig::quick_start("Kaito");
//!     let mut game = HeadlessGame::from_env(config).await?;
//!
//!     let response = game.choose(1).await?;
//!     println!("{}", response.narrative);
//!     for (i, choice) in response.choices.iter().enumerate() {
//!         println!("{}. {choice}", i + 1);
//!     }
//!     Ok(())
//! }
//! ```

use crate::catalog::{Alignment, Background, Class, Race};
use crate::character_builder::{Appearance, CharacterDraft, DraftError};
use crate::oracle::Oracle;
use crate::session::{Storyteller, TurnEngine, TurnError};
use crate::world::{Character, HistoryEntry, ImageRef};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a headless session.
#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("{0}")]
    Draft(#[from] DraftError),

    #[error("Configuration error: {0}")]
    Config(#[from] gemini::Error),

    #[error("{0}")]
    Turn(#[from] TurnError),

    #[error("No choice {index}: pick 1 to {available}")]
    NoSuchChoice { index: usize, available: usize },
}

/// Character selections for a headless session.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub name: String,
    pub race: Race,
    pub class: Class,
    pub background: Background,
    pub alignment: Alignment,
    pub appearance: Appearance,
}

impl HeadlessConfig {
    /// A Terran Star-Knight with default appearance.
    pub fn quick_start(name: impl Into<String>) -> Self {
        Self::custom(
            name,
            Race::TerranHuman,
            Class::StarKnight,
            Background::AcademyLegacy,
            Alignment::TrueNeutral,
        )
    }

    pub fn custom(
        name: impl Into<String>,
        race: Race,
        class: Class,
        background: Background,
        alignment: Alignment,
    ) -> Self {
        Self {
            name: name.into(),
            race,
            class,
            background,
            alignment,
            appearance: Appearance::default(),
        }
    }

    /// Random race, class, background and alignment.
    pub fn randomized<R: Rng + ?Sized>(name: impl Into<String>, rng: &mut R) -> Self {
        Self::custom(
            name,
            Race::random(rng),
            Class::random(rng),
            Background::random(rng),
            Alignment::random(rng),
        )
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    /// The creator-screen draft these selections describe.
    pub fn draft(&self) -> CharacterDraft {
        let mut draft = CharacterDraft::new();
        draft
            .set_name(&self.name)
            .set_race(self.race.name())
            .set_class(self.class.name())
            .set_background(self.background.name())
            .set_alignment(self.alignment.name())
            .set_appearance(self.appearance.clone());
        draft
    }
}

/// The result of one headless turn.
#[derive(Debug, Clone)]
pub struct GameResponse {
    pub narrative: String,
    pub choices: Vec<String>,
    pub turn: u32,
}

/// An entry in the game transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub action: String,
    pub narrative: String,
    pub turn: u32,
}

/// A headless game that can be controlled programmatically.
pub struct HeadlessGame {
    engine: TurnEngine,
    transcript: Vec<TranscriptEntry>,
}

impl HeadlessGame {
    /// Create the character with `oracle` and open a session.
    pub async fn new(config: HeadlessConfig, oracle: Oracle) -> Result<Self, HeadlessError> {
        let character = config.draft().finalize(&oracle).await?;
        Ok(Self::with_storyteller(character, Arc::new(oracle)))
    }

    /// Like [`new`](Self::new), reading the credential from the environment.
    pub async fn from_env(config: HeadlessConfig) -> Result<Self, HeadlessError> {
        let oracle = Oracle::from_env()?;
        Self::new(config, oracle).await
    }

    /// Open a session for an existing character.
    pub fn with_storyteller(character: Character, storyteller: Arc<dyn Storyteller>) -> Self {
        Self {
            engine: TurnEngine::new(character, storyteller),
            transcript: Vec::new(),
        }
    }

    /// Take a free-form action.
    pub async fn send(&mut self, action: &str) -> Result<GameResponse, HeadlessError> {
        let report = self.engine.submit_action(action).await?;

        self.transcript.push(TranscriptEntry {
            action: action.to_string(),
            narrative: report.scene.description.clone(),
            turn: report.turn,
        });

        Ok(GameResponse {
            narrative: report.scene.description,
            choices: report.scene.choices,
            turn: report.turn,
        })
    }

    /// Take the offered choice at `index`, counting from 1.
    pub async fn choose(&mut self, index: usize) -> Result<GameResponse, HeadlessError> {
        let choices = self.engine.choices();
        let choice = index
            .checked_sub(1)
            .and_then(|i| choices.get(i))
            .cloned()
            .ok_or(HeadlessError::NoSuchChoice {
                index,
                available: choices.len(),
            })?;
        self.send(&choice).await
    }

    // ========================================================================
    // Game State Queries
    // ========================================================================

    pub fn character(&self) -> &Character {
        self.engine.character()
    }

    pub fn scene(&self) -> String {
        self.engine.scene_description()
    }

    pub fn choices(&self) -> Vec<String> {
        self.engine.choices()
    }

    pub fn scene_image(&self) -> Option<ImageRef> {
        self.engine.scene_image()
    }

    pub fn turn_count(&self) -> u32 {
        self.engine.turn_count()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.engine.history()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn last_response(&self) -> Option<&str> {
        self.transcript.last().map(|e| e.narrative.as_str())
    }

    /// The underlying engine, for advanced use.
    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Scene;
    use crate::session::OPENING_CHOICES;
    use crate::testing::{sample_character, ScriptedBackend, ScriptedStoryteller};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_quick_start_config() {
        let config = HeadlessConfig::quick_start("Kaito");
        let draft = config.draft();
        assert_eq!(draft.name(), "Kaito");
        assert_eq!(draft.race(), "Terran (Human)");
        assert_eq!(draft.class(), "Star-Knight");
        assert_eq!(draft.alignment(), "True Neutral");
    }

    #[test]
    fn test_randomized_config() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = HeadlessConfig::randomized("Rei", &mut rng);
        assert_eq!(config.name, "Rei");
        assert!(Race::all().contains(&config.race));
        assert_eq!(config.appearance, Appearance::default());
    }

    #[tokio::test]
    async fn test_new_rejects_blank_name() {
        let oracle = Oracle::with_backend(Arc::new(ScriptedBackend::new()));
        let result = HeadlessGame::new(HeadlessConfig::quick_start(""), oracle).await;
        assert!(matches!(result, Err(HeadlessError::Draft(DraftError::MissingName))));
    }

    #[tokio::test]
    async fn test_new_with_fallback_oracle() {
        let oracle = Oracle::with_backend(Arc::new(ScriptedBackend::new()));
        let mut game = HeadlessGame::new(HeadlessConfig::quick_start("Vex"), oracle)
            .await
            .unwrap();

        assert_eq!(game.character().name, "Vex");
        let response = game.choose(2).await.unwrap();
        assert_eq!(response.turn, 2);
        assert_eq!(response.choices, Scene::fallback().choices);
        assert_eq!(game.history()[1], HistoryEntry::player(OPENING_CHOICES[1]));
    }

    #[tokio::test]
    async fn test_choose_and_transcript() {
        let storyteller = Arc::new(
            ScriptedStoryteller::new()
                .with_scene(Scene::new("The cadets scatter.", vec!["Follow".into()])),
        );
        let mut game = HeadlessGame::with_storyteller(sample_character(), storyteller.clone());

        let response = game.choose(1).await.unwrap();
        assert_eq!(response.narrative, "The cadets scatter.");
        assert_eq!(storyteller.scene_requests()[0].1, OPENING_CHOICES[0]);
        assert_eq!(game.transcript().len(), 1);
        assert_eq!(game.last_response(), Some("The cadets scatter."));

        let err = game.choose(2).await.unwrap_err();
        assert!(matches!(
            err,
            HeadlessError::NoSuchChoice {
                index: 2,
                available: 1
            }
        ));
        assert!(game.choose(0).await.is_err());
        assert_eq!(game.turn_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_turn_not_recorded() {
        let storyteller = Arc::new(ScriptedStoryteller::new());
        let mut game = HeadlessGame::with_storyteller(sample_character(), storyteller);

        let err = game.send("Commune with the void").await.unwrap_err();
        assert!(matches!(err, HeadlessError::Turn(TurnError::Narrative(_))));
        assert!(game.transcript().is_empty());
        assert_eq!(game.turn_count(), 1);
    }
}
