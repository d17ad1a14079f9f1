//! Core game records: characters, skills, images and narrative history.

use crate::stats::{StatKey, Stats};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a skill is triggered or always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    Active,
    Passive,
}

impl SkillKind {
    pub fn name(&self) -> &'static str {
        match self {
            SkillKind::Active => "Active",
            SkillKind::Passive => "Passive",
        }
    }
}

/// A special ability produced during character generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: SkillKind,
    /// Attribute the skill scales with.
    #[serde(rename = "statScale")]
    pub stat_scale: StatKey,
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: SkillKind,
        stat_scale: StatKey,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            stat_scale,
        }
    }
}

/// Reference to a generated or placeholder image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// A remotely hosted image.
    Url { url: String },
    /// Base64 image data carried inline.
    Inline { mime_type: String, data: String },
}

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        ImageRef::Url { url: url.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ImageRef::Inline {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Render as a URI usable by an `<img>` tag or a browser.
    pub fn to_uri(&self) -> String {
        match self {
            ImageRef::Url { url } => url.clone(),
            ImageRef::Inline { mime_type, data } => format!("data:{mime_type};base64,{data}"),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageRef::Inline { .. })
    }
}

impl From<gemini::InlineData> for ImageRef {
    fn from(data: gemini::InlineData) -> Self {
        ImageRef::Inline {
            mime_type: data.mime_type,
            data: data.data,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// The identity fields sent to the generator when fleshing out a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub race: String,
    pub class: String,
    pub background: String,
    pub alignment: String,
}

/// A finalized player character.
///
/// Built once by the character draft and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    pub race: String,
    #[serde(rename = "classType")]
    pub class: String,
    pub background: String,
    pub alignment: String,
    pub stats: Stats,
    pub skills: Vec<Skill>,
    pub backstory: String,
    pub portrait: ImageRef,
    pub hp: u32,
    pub max_hp: u32,
    pub energy: u32,
    pub max_energy: u32,
}

impl Character {
    /// Assemble a character at full hit points and energy.
    pub fn new(
        profile: CharacterProfile,
        stats: Stats,
        skills: Vec<Skill>,
        backstory: impl Into<String>,
        portrait: ImageRef,
    ) -> Self {
        let max_hp = stats.max_hp();
        let max_energy = stats.max_energy();
        Self {
            name: profile.name,
            race: profile.race,
            class: profile.class,
            background: profile.background,
            alignment: profile.alignment,
            stats,
            skills,
            backstory: backstory.into(),
            portrait,
            hp: max_hp,
            max_hp,
            energy: max_energy,
            max_energy,
        }
    }

    /// Fill level of the HP bar, 0 to 100.
    pub fn hp_percent(&self) -> f32 {
        percent(self.hp, self.max_hp)
    }

    /// Fill level of the energy bar, 0 to 100.
    pub fn energy_percent(&self) -> f32 {
        percent(self.energy, self.max_energy)
    }
}

fn percent(current: u32, max: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    (current as f32 / max as f32 * 100.0).clamp(0.0, 100.0)
}

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Player,
    Narrator,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Player => "player",
            Speaker::Narrator => "narrator",
        }
    }
}

/// One line of the running story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl HistoryEntry {
    pub fn narrator(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Narrator,
            text: text.into(),
        }
    }

    pub fn player(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Player,
            text: text.into(),
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker.label(), self.text)
    }
}
