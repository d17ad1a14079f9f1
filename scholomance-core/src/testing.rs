//! Testing utilities for the turn engine and the oracle.
//!
//! This module provides tools for offline testing:
//! - `ScriptedBackend` stands in for the Gemini API underneath an [`Oracle`](crate::Oracle)
//! - `ScriptedStoryteller` stands in for the oracle underneath a [`TurnEngine`]
//! - `TestHarness` for scripted game scenarios
//! - Assertion helpers for verifying turn state

use crate::oracle::{GenerativeBackend, OracleError, Scene};
use crate::session::{Storyteller, TurnEngine, TurnError, TurnReport};
use crate::stats::calculate_stats;
use crate::world::{Character, CharacterProfile, HistoryEntry, ImageRef};
use async_trait::async_trait;
use gemini::Schema;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// A cadet for tests that skip character creation.
pub fn sample_character() -> Character {
    let profile = CharacterProfile {
        name: "Kaito".to_string(),
        race: "Cyber-Elf".to_string(),
        class: "Tech-Rogue".to_string(),
        background: "Corporate Spy".to_string(),
        alignment: "Chaotic Neutral".to_string(),
    };
    let stats = calculate_stats(&profile.race, &profile.class);
    Character::new(
        profile,
        stats,
        crate::oracle::prompts::fallback_skills(),
        "A quiet infiltrator.",
        ImageRef::url("https://example.com/kaito.png"),
    )
}

/// A generative backend that replays scripted results and records prompts.
///
/// When a queue runs dry the call fails, which drives the oracle onto its
/// fallback path.
#[derive(Default)]
pub struct ScriptedBackend {
    texts: Mutex<VecDeque<Result<String, OracleError>>>,
    images: Mutex<VecDeque<Result<ImageRef, OracleError>>>,
    text_prompts: Mutex<Vec<String>>,
    image_prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw JSON text response.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        lock(&self.texts).push_back(Ok(text.into()));
        self
    }

    pub fn with_text_error(self, error: OracleError) -> Self {
        lock(&self.texts).push_back(Err(error));
        self
    }

    pub fn with_image(self, image: ImageRef) -> Self {
        lock(&self.images).push_back(Ok(image));
        self
    }

    pub fn with_image_error(self, error: OracleError) -> Self {
        lock(&self.images).push_back(Err(error));
        self
    }

    /// Prompts received by `generate_json`, in order.
    pub fn text_prompts(&self) -> Vec<String> {
        lock(&self.text_prompts).clone()
    }

    /// Prompts received by `generate_image`, in order.
    pub fn image_prompts(&self) -> Vec<String> {
        lock(&self.image_prompts).clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate_json(&self, prompt: &str, _schema: &Schema) -> Result<String, OracleError> {
        lock(&self.text_prompts).push(prompt.to_string());
        lock(&self.texts)
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Malformed("no scripted text".to_string())))
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageRef, OracleError> {
        lock(&self.image_prompts).push(prompt.to_string());
        lock(&self.images)
            .pop_front()
            .unwrap_or(Err(OracleError::NoImage))
    }
}

enum ImageScript {
    Ready(Result<ImageRef, OracleError>),
    Gated(oneshot::Receiver<()>, ImageRef),
}

/// A storyteller that replays scripted scenes and images.
///
/// Scenes and images can be held back behind a gate so tests control when an
/// in-flight request completes. An exhausted queue yields an error.
#[derive(Default)]
pub struct ScriptedStoryteller {
    scenes: Mutex<VecDeque<Result<Scene, OracleError>>>,
    images: Mutex<VecDeque<ImageScript>>,
    scene_gate: Mutex<Option<oneshot::Receiver<()>>>,
    scene_requests: Mutex<Vec<(Vec<HistoryEntry>, String)>>,
    image_requests: Mutex<Vec<String>>,
}

impl ScriptedStoryteller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(self, scene: Scene) -> Self {
        self.queue_scene(Ok(scene));
        self
    }

    pub fn with_scene_error(self, error: OracleError) -> Self {
        self.queue_scene(Err(error));
        self
    }

    pub fn with_image(self, image: ImageRef) -> Self {
        self.queue_image(Ok(image));
        self
    }

    pub fn with_image_error(self, error: OracleError) -> Self {
        self.queue_image(Err(error));
        self
    }

    pub fn queue_scene(&self, scene: Result<Scene, OracleError>) {
        lock(&self.scenes).push_back(scene);
    }

    pub fn queue_image(&self, image: Result<ImageRef, OracleError>) {
        lock(&self.images).push_back(ImageScript::Ready(image));
    }

    /// Hold the next scene request until the returned sender fires.
    pub fn gate_next_scene(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *lock(&self.scene_gate) = Some(rx);
        tx
    }

    /// Queue an image that is delivered only once the returned sender fires.
    pub fn gate_image(&self, image: ImageRef) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.images).push_back(ImageScript::Gated(rx, image));
        tx
    }

    /// History and action of every scene request, in order.
    pub fn scene_requests(&self) -> Vec<(Vec<HistoryEntry>, String)> {
        lock(&self.scene_requests).clone()
    }

    /// Description of every image request, in order.
    pub fn image_requests(&self) -> Vec<String> {
        lock(&self.image_requests).clone()
    }
}

#[async_trait]
impl Storyteller for ScriptedStoryteller {
    async fn next_scene(
        &self,
        history: &[HistoryEntry],
        action: &str,
        _character: &Character,
    ) -> Result<Scene, OracleError> {
        lock(&self.scene_requests).push((history.to_vec(), action.to_string()));
        let gate = lock(&self.scene_gate).take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        lock(&self.scenes)
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Malformed("no scripted scene".to_string())))
    }

    async fn scene_image(&self, description: &str) -> Result<ImageRef, OracleError> {
        lock(&self.image_requests).push(description.to_string());
        let script = lock(&self.images).pop_front();
        match script {
            Some(ImageScript::Ready(result)) => result,
            Some(ImageScript::Gated(gate, image)) => {
                let _ = gate.await;
                Ok(image)
            }
            None => Err(OracleError::NoImage),
        }
    }
}

/// Test harness for running scripted turns against a [`TurnEngine`].
///
/// Must be created inside a Tokio runtime.
pub struct TestHarness {
    pub storyteller: Arc<ScriptedStoryteller>,
    pub engine: TurnEngine,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_character(sample_character())
    }

    pub fn with_character(character: Character) -> Self {
        let storyteller = Arc::new(ScriptedStoryteller::new());
        let engine = TurnEngine::new(character, storyteller.clone());
        Self {
            storyteller,
            engine,
        }
    }

    /// Queue the scene returned for the next action.
    pub fn expect_scene(&mut self, description: &str, choices: &[&str]) -> &mut Self {
        let choices = choices.iter().map(|c| c.to_string()).collect();
        self.storyteller
            .queue_scene(Ok(Scene::new(description, choices)));
        self
    }

    /// Queue a narrative failure for the next action.
    pub fn expect_failure(&mut self) -> &mut Self {
        self.storyteller
            .queue_scene(Err(OracleError::Malformed("scripted failure".to_string())));
        self
    }

    pub async fn act(&self, action: &str) -> Result<TurnReport, TurnError> {
        self.engine.submit_action(action).await
    }

    pub fn last_entry(&self) -> Option<HistoryEntry> {
        self.engine.history().last().cloned()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// Assertion helpers

#[track_caller]
pub fn assert_turn(engine: &TurnEngine, expected: u32) {
    let actual = engine.turn_count();
    assert_eq!(actual, expected, "Expected turn {expected}, got {actual}");
}

#[track_caller]
pub fn assert_choices(engine: &TurnEngine, expected: &[&str]) {
    let actual = engine.choices();
    assert_eq!(actual, expected, "Unexpected choices");
}

#[track_caller]
pub fn assert_history_len(engine: &TurnEngine, expected: usize) {
    let actual = engine.history().len();
    assert_eq!(
        actual, expected,
        "Expected {expected} history entries, got {actual}"
    );
}

#[track_caller]
pub fn assert_idle(engine: &TurnEngine) {
    assert!(!engine.is_busy(), "Expected engine to be idle");
}
