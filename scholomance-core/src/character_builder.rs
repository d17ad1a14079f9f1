//! Character creation.
//!
//! A [`CharacterDraft`] holds the creator-screen selections. Selections are
//! stored as display names and assigned without validation; only the name is
//! checked, and only when the draft is finalized.

use crate::catalog::{Alignment, Background, Class, Cybernetics, HairStyle, Race};
use crate::oracle::Oracle;
use crate::stats::{calculate_stats, Stats};
use crate::world::{Character, CharacterProfile};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the backstory excerpt added to the portrait prompt.
const BACKSTORY_EXCERPT_CHARS: usize = 100;

/// Visual choices that feed the portrait prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub hair_style: String,
    /// CSS hex colour, e.g. `#06d6e5`.
    pub hair_color: String,
    pub eye_color: String,
    pub cybernetics: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            hair_style: HairStyle::CrewCut.name().to_string(),
            hair_color: "#06d6e5".to_string(),
            eye_color: "#ff00ff".to_string(),
            cybernetics: Cybernetics::None.name().to_string(),
        }
    }
}

impl Appearance {
    /// One-line visual description for the portrait prompt.
    pub fn describe(&self, alignment: &str, background: &str) -> String {
        format!(
            "Hair: {} ({}). Eyes: {}. Cybernetics: {}. A {} {} character.",
            self.hair_style,
            self.hair_color,
            self.eye_color,
            self.cybernetics,
            alignment,
            background
        )
    }
}

/// Errors from finalizing a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    MissingName,
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftError::MissingName => write!(f, "Character Name is required"),
        }
    }
}

impl std::error::Error for DraftError {}

/// In-progress character selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    name: String,
    race: String,
    class: String,
    alignment: String,
    background: String,
    appearance: Appearance,
}

impl Default for CharacterDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            race: Race::all()[0].name().to_string(),
            class: Class::all()[0].name().to_string(),
            alignment: Alignment::TrueNeutral.name().to_string(),
            background: Background::all()[0].name().to_string(),
            appearance: Appearance::default(),
        }
    }
}

impl CharacterDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn race(&self) -> &str {
        &self.race
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn alignment(&self) -> &str {
        &self.alignment
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_race(&mut self, race: impl Into<String>) -> &mut Self {
        self.race = race.into();
        self
    }

    pub fn set_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.class = class.into();
        self
    }

    pub fn set_alignment(&mut self, alignment: impl Into<String>) -> &mut Self {
        self.alignment = alignment.into();
        self
    }

    pub fn set_background(&mut self, background: impl Into<String>) -> &mut Self {
        self.background = background.into();
        self
    }

    pub fn set_hair_style(&mut self, style: impl Into<String>) -> &mut Self {
        self.appearance.hair_style = style.into();
        self
    }

    pub fn set_hair_color(&mut self, color: impl Into<String>) -> &mut Self {
        self.appearance.hair_color = color.into();
        self
    }

    pub fn set_eye_color(&mut self, color: impl Into<String>) -> &mut Self {
        self.appearance.eye_color = color.into();
        self
    }

    pub fn set_cybernetics(&mut self, cybernetics: impl Into<String>) -> &mut Self {
        self.appearance.cybernetics = cybernetics.into();
        self
    }

    pub fn set_appearance(&mut self, appearance: Appearance) -> &mut Self {
        self.appearance = appearance;
        self
    }

    /// Stats for the current race and class, recomputed on every call.
    pub fn stats(&self) -> Stats {
        calculate_stats(&self.race, &self.class)
    }

    /// Draw race, class, background and alignment independently.
    ///
    /// Name and appearance are left alone.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        self.race = Race::random(rng).name().to_string();
        self.class = Class::random(rng).name().to_string();
        self.background = Background::random(rng).name().to_string();
        self.alignment = Alignment::random(rng).name().to_string();
        self
    }

    /// Identity fields sent to the generator. The name is trimmed.
    pub fn profile(&self) -> CharacterProfile {
        CharacterProfile {
            name: self.name.trim().to_string(),
            race: self.race.clone(),
            class: self.class.clone(),
            background: self.background.clone(),
            alignment: self.alignment.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingName);
        }
        Ok(())
    }

    /// Portrait description: appearance line plus the start of the backstory.
    pub fn portrait_description(&self, backstory: &str) -> String {
        let excerpt: String = backstory.chars().take(BACKSTORY_EXCERPT_CHARS).collect();
        format!(
            "{} {}",
            self.appearance.describe(&self.alignment, &self.background),
            excerpt
        )
    }

    /// Generate details and a portrait, then assemble the character.
    ///
    /// Fails only when the name is blank, in which case the oracle is never
    /// called.
    pub async fn finalize(&self, oracle: &Oracle) -> Result<Character, DraftError> {
        self.validate()?;
        let profile = self.profile();
        tracing::info!(
            name = %profile.name,
            race = %profile.race,
            class = %profile.class,
            "finalizing character"
        );

        let details = oracle.generate_character_details(&profile).await;
        let description = self.portrait_description(&details.backstory);
        let portrait = oracle
            .generate_character_portrait(&self.race, &self.class, &description)
            .await;

        Ok(Character::new(
            profile,
            self.stats(),
            details.skills,
            details.backstory,
            portrait,
        ))
    }
}
