//! Narrative turn engine for the Scholomance space-opera RPG.
//!
//! This crate provides:
//! - Character creation with live stat previews
//! - A Gemini-backed oracle for backstories, portraits, scenes and scene art
//! - A turn engine that sequences narration, history and background images
//! - A headless driver and offline testing utilities
//!
//! # Quick Start
//!
//! ```ignore
//! use scholomance_core::{CharacterDraft, Oracle, OracleConfig, TurnEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let oracle = Oracle::new(OracleConfig::new("your-api-key"));
//!
//!     let mut draft = CharacterDraft::new();
//!     draft.set_name("Kaito").set_race("Cyber-Elf").set_class("Tech-Rogue");
//!     let character = draft.finalize(&oracle).await?;
//!
//!     let engine = TurnEngine::with_oracle(character, oracle);
//!     let report = engine.submit_action("Look for the registration desk").await?;
//!     println!("{}", report.scene.description);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod character_builder;
pub mod headless;
pub mod oracle;
pub mod session;
pub mod stats;
pub mod testing;
pub mod world;

// Primary public API
pub use catalog::{Alignment, Background, Class, Cybernetics, HairStyle, Race};
pub use character_builder::{Appearance, CharacterDraft, DraftError};
pub use headless::{HeadlessConfig, HeadlessError, HeadlessGame};
pub use oracle::{CharacterDetails, Oracle, OracleConfig, OracleError, Scene};
pub use session::{Storyteller, TurnEngine, TurnError, TurnReport, TurnState};
pub use stats::{calculate_stats, StatKey, Stats};
pub use testing::{ScriptedBackend, ScriptedStoryteller, TestHarness};
pub use world::{Character, HistoryEntry, ImageRef, Skill, SkillKind};
