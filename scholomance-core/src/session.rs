//! The turn engine - the game loop after character creation.
//!
//! A [`TurnEngine`] owns the current scene, the offered choices, the running
//! history and a single busy flag. Each [`submit_action`](TurnEngine::submit_action)
//! asks the [`Storyteller`] for the next scene and, once the turn is
//! committed, refreshes the scene image in a detached task.
//!
//! Every image request takes the next value of a generation counter, and
//! committing a turn bumps it too. A completion is applied only while its
//! generation is still the latest, so a slow image from turn N never replaces
//! the image of turn N+1, and an older refresh never overwrites a newer one.

use crate::oracle::{Oracle, OracleError, Scene};
use crate::world::{Character, HistoryEntry, ImageRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Narration shown before the first action.
pub const OPENING_SCENE: &str = "You step off the transport shuttle onto the obsidian landing platform of Scholomance. The massive academy floats in the void, tethered to a dying star. Other cadets surround you, a mix of anxiety and arrogance on their faces.";

pub const OPENING_CHOICES: [&str; 3] = [
    "Look for the registration desk",
    "Inspect the other cadets",
    "Commune with the void",
];

/// Scene description used for the image requested at start-up.
pub const LANDING_SCENE: &str =
    "Scholomance academy landing platform, space opera, floating in void near dying star, anime style";

/// Errors from [`TurnEngine::submit_action`].
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    #[error("A turn is already in progress")]
    Busy,

    #[error("Narrative generation failed: {0}")]
    Narrative(#[from] OracleError),
}

/// What the turn engine needs from the generative side.
#[async_trait]
pub trait Storyteller: Send + Sync {
    /// Produce the scene that follows `action`.
    async fn next_scene(
        &self,
        history: &[HistoryEntry],
        action: &str,
        character: &Character,
    ) -> Result<Scene, OracleError>;

    /// Produce background art for a scene description.
    async fn scene_image(&self, description: &str) -> Result<ImageRef, OracleError>;
}

/// The oracle absorbs failures into fallback content, so it never errors here.
#[async_trait]
impl Storyteller for Oracle {
    async fn next_scene(
        &self,
        history: &[HistoryEntry],
        action: &str,
        character: &Character,
    ) -> Result<Scene, OracleError> {
        Ok(self.generate_next_scene(history, action, character).await)
    }

    async fn scene_image(&self, description: &str) -> Result<ImageRef, OracleError> {
        Ok(self.generate_scene_image(description).await)
    }
}

/// Unique identifier for a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable state of the game loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    pub scene_description: String,
    /// `None` until the first image arrives.
    pub scene_image: Option<ImageRef>,
    pub choices: Vec<String>,
    /// Append-only, oldest first.
    pub history: Vec<HistoryEntry>,
    pub turn_count: u32,
    pub busy: bool,
    /// Generation of the newest image request.
    pub image_generation: u64,
}

impl TurnState {
    /// The state before any action has been taken.
    pub fn opening() -> Self {
        Self {
            scene_description: OPENING_SCENE.to_string(),
            scene_image: None,
            choices: OPENING_CHOICES.iter().map(|c| c.to_string()).collect(),
            history: Vec::new(),
            turn_count: 1,
            busy: false,
            image_generation: 0,
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::opening()
    }
}

/// A background scene image request.
#[derive(Debug)]
pub struct ImageRefresh {
    epoch: u32,
    generation: u64,
    handle: JoinHandle<bool>,
}

impl ImageRefresh {
    /// Turn the image was requested for.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Position of this request among all image requests of the session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the request and report whether its image was applied.
    pub async fn wait(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

/// Outcome of a resolved turn.
#[derive(Debug)]
pub struct TurnReport {
    /// Turn number after the commit.
    pub turn: u32,
    pub scene: Scene,
    /// Image refresh for the new scene. Dropping it leaves the task running.
    pub image: ImageRefresh,
}

struct Shared {
    id: SessionId,
    character: Character,
    storyteller: Arc<dyn Storyteller>,
    state: Mutex<TurnState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TurnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the busy flag when a submission ends, including when the caller
/// drops the future mid-request.
struct BusyGuard<'a> {
    shared: &'a Shared,
    released: bool,
}

impl BusyGuard<'_> {
    /// Apply a successful turn and clear busy under one lock.
    fn commit<T>(mut self, apply: impl FnOnce(&mut TurnState) -> T) -> T {
        let mut state = self.shared.lock();
        let out = apply(&mut state);
        state.busy = false;
        self.released = true;
        out
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.shared.lock().busy = false;
        }
    }
}

/// Handle to a running game loop.
///
/// Cloning is cheap and every clone sees the same state, so a display can
/// read [`snapshot`](Self::snapshot) while a turn is in flight.
#[derive(Clone)]
pub struct TurnEngine {
    shared: Arc<Shared>,
}

impl TurnEngine {
    /// Start a game loop and request the landing image in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(character: Character, storyteller: Arc<dyn Storyteller>) -> Self {
        Self::open(character, storyteller).0
    }

    /// Like [`new`](Self::new) but also returns the landing image request.
    pub fn open(character: Character, storyteller: Arc<dyn Storyteller>) -> (Self, ImageRefresh) {
        let engine = Self {
            shared: Arc::new(Shared {
                id: SessionId::new(),
                character,
                storyteller,
                state: Mutex::new(TurnState::opening()),
            }),
        };
        tracing::info!(
            session = %engine.shared.id,
            character = %engine.shared.character.name,
            "session started"
        );
        let landing = engine.request_image(LANDING_SCENE.to_string());
        (engine, landing)
    }

    pub fn with_oracle(character: Character, oracle: Oracle) -> Self {
        Self::new(character, Arc::new(oracle))
    }

    pub fn id(&self) -> SessionId {
        self.shared.id
    }

    pub fn character(&self) -> &Character {
        &self.shared.character
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> TurnState {
        self.shared.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.shared.lock().busy
    }

    pub fn turn_count(&self) -> u32 {
        self.shared.lock().turn_count
    }

    pub fn choices(&self) -> Vec<String> {
        self.shared.lock().choices.clone()
    }

    pub fn scene_description(&self) -> String {
        self.shared.lock().scene_description.clone()
    }

    pub fn scene_image(&self) -> Option<ImageRef> {
        self.shared.lock().scene_image.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.shared.lock().history.clone()
    }

    /// Resolve one player action.
    ///
    /// Rejected with [`TurnError::Busy`] while another action is in flight.
    /// On a narrative failure nothing but the busy flag changes.
    pub async fn submit_action(&self, choice: impl Into<String>) -> Result<TurnReport, TurnError> {
        let choice = choice.into();
        let shared = &*self.shared;

        let history = {
            let mut state = shared.lock();
            if state.busy {
                return Err(TurnError::Busy);
            }
            state.busy = true;

            let mut history = state.history.clone();
            history.push(HistoryEntry::narrator(state.scene_description.clone()));
            history.push(HistoryEntry::player(choice.clone()));
            history
        };
        let guard = BusyGuard {
            shared,
            released: false,
        };

        tracing::debug!(session = %shared.id, action = %choice, "submitting action");

        let scene = match shared
            .storyteller
            .next_scene(&history, &choice, &shared.character)
            .await
        {
            Ok(scene) => scene,
            Err(e) => {
                drop(guard);
                tracing::warn!(session = %shared.id, error = %e, "turn failed, state unchanged");
                return Err(TurnError::Narrative(e));
            }
        };

        let (turn, generation) = guard.commit(|state| {
            state.scene_description = scene.description.clone();
            state.choices = scene.choices.clone();
            state.history = history;
            state.turn_count += 1;
            state.image_generation += 1;
            (state.turn_count, state.image_generation)
        });
        tracing::info!(session = %shared.id, turn, "turn resolved");

        let image = self.spawn_image(turn, generation, scene.description.clone());
        Ok(TurnReport { turn, scene, image })
    }

    /// Request a new image for `description`. Supersedes every earlier request.
    pub fn refresh_scene_image(&self, description: impl Into<String>) -> ImageRefresh {
        self.request_image(description.into())
    }

    fn request_image(&self, description: String) -> ImageRefresh {
        let (epoch, generation) = {
            let mut state = self.shared.lock();
            state.image_generation += 1;
            (state.turn_count, state.image_generation)
        };
        self.spawn_image(epoch, generation, description)
    }

    fn spawn_image(&self, epoch: u32, generation: u64, description: String) -> ImageRefresh {
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let image = match shared.storyteller.scene_image(&description).await {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!(session = %shared.id, epoch, error = %e, "scene image failed");
                    return false;
                }
            };

            let mut state = shared.lock();
            if state.image_generation != generation {
                let latest = state.image_generation;
                drop(state);
                tracing::debug!(
                    session = %shared.id,
                    epoch,
                    generation,
                    latest,
                    "discarding stale scene image"
                );
                return false;
            }
            state.scene_image = Some(image);
            true
        });
        ImageRefresh {
            epoch,
            generation,
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_character, ScriptedStoryteller};

    fn engine(storyteller: &Arc<ScriptedStoryteller>) -> (TurnEngine, ImageRefresh) {
        TurnEngine::open(sample_character(), storyteller.clone())
    }

    #[tokio::test]
    async fn test_opening_state() {
        let storyteller = Arc::new(ScriptedStoryteller::new());
        let (engine, _landing) = engine(&storyteller);
        let state = engine.snapshot();

        assert_eq!(state.turn_count, 1);
        assert_eq!(state.scene_description, OPENING_SCENE);
        assert_eq!(state.choices, OPENING_CHOICES);
        assert!(state.history.is_empty());
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn test_landing_image_applied() {
        let image = ImageRef::url("https://example.com/landing.png");
        let storyteller = Arc::new(ScriptedStoryteller::new().with_image(image.clone()));
        let (engine, landing) = engine(&storyteller);

        assert_eq!(landing.epoch(), 1);
        assert_eq!(landing.generation(), 1);
        assert!(landing.wait().await);
        assert_eq!(engine.scene_image(), Some(image));
        assert_eq!(storyteller.image_requests(), vec![LANDING_SCENE]);
    }

    #[tokio::test]
    async fn test_landing_image_failure_keeps_empty() {
        let storyteller = Arc::new(ScriptedStoryteller::new());
        let (engine, landing) = engine(&storyteller);

        assert!(!landing.wait().await);
        assert_eq!(engine.scene_image(), None);
    }

    #[tokio::test]
    async fn test_successful_turn() {
        let storyteller = Arc::new(
            ScriptedStoryteller::new()
                .with_scene(Scene::new("X", vec!["a".into(), "b".into(), "c".into()])),
        );
        let (engine, _landing) = engine(&storyteller);

        let report = engine
            .submit_action("Look for the registration desk")
            .await
            .unwrap();
        assert_eq!(report.turn, 2);
        assert_eq!(report.image.epoch(), 2);

        let state = engine.snapshot();
        assert_eq!(state.turn_count, 2);
        assert_eq!(state.scene_description, "X");
        assert_eq!(state.choices, vec!["a", "b", "c"]);
        assert_eq!(
            state.history,
            vec![
                HistoryEntry::narrator(OPENING_SCENE),
                HistoryEntry::player("Look for the registration desk"),
            ]
        );
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_state_unchanged() {
        let storyteller = Arc::new(
            ScriptedStoryteller::new()
                .with_scene_error(OracleError::Malformed("bad".to_string())),
        );
        let (engine, _landing) = engine(&storyteller);
        let before = engine.snapshot();

        let result = engine.submit_action("Commune with the void").await;
        assert!(matches!(result, Err(TurnError::Narrative(_))));

        let after = engine.snapshot();
        assert_eq!(after.turn_count, before.turn_count);
        assert_eq!(after.history, before.history);
        assert_eq!(after.scene_description, before.scene_description);
        assert_eq!(after.choices, before.choices);
        assert!(!after.busy);
    }

    #[tokio::test]
    async fn test_request_sees_updated_history() {
        let storyteller = Arc::new(
            ScriptedStoryteller::new()
                .with_scene(Scene::new("First", vec!["go".into()]))
                .with_scene(Scene::new("Second", vec!["stay".into()])),
        );
        let (engine, _landing) = engine(&storyteller);

        engine.submit_action("Inspect the other cadets").await.unwrap();
        engine.submit_action("go").await.unwrap();

        let requests = storyteller.scene_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0.len(), 2);
        assert_eq!(requests[1].0.len(), 4);
        assert_eq!(requests[1].0[2], HistoryEntry::narrator("First"));
        assert_eq!(requests[1].1, "go");
        assert_eq!(engine.history().len(), 4);
        assert_eq!(engine.turn_count(), 3);
    }

    #[tokio::test]
    async fn test_busy_rejects_second_submission() {
        let storyteller = Arc::new(
            ScriptedStoryteller::new().with_scene(Scene::new("Later", vec!["on".into()])),
        );
        let gate = storyteller.gate_next_scene();
        let (engine, _landing) = engine(&storyteller);

        let first = tokio::spawn({
            let engine = engine.clone();
            async move { engine.submit_action("Inspect the other cadets").await }
        });
        while !engine.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = engine.submit_action("Commune with the void").await;
        assert!(matches!(second, Err(TurnError::Busy)));
        assert_eq!(engine.turn_count(), 1);

        let _ = gate.send(());
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.turn, 2);
        assert!(!engine.is_busy());
        assert_eq!(storyteller.scene_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_submission_clears_busy() {
        let storyteller = Arc::new(
            ScriptedStoryteller::new().with_scene(Scene::new("Never", vec!["x".into()])),
        );
        let _gate = storyteller.gate_next_scene();
        let (engine, _landing) = engine(&storyteller);

        let pending = tokio::spawn({
            let engine = engine.clone();
            async move { engine.submit_action("Inspect the other cadets").await }
        });
        while !engine.is_busy() {
            tokio::task::yield_now().await;
        }
        pending.abort();
        let _ = pending.await;

        assert!(!engine.is_busy());
        assert_eq!(engine.turn_count(), 1);
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_stale_image_discarded() {
        let fresh = ImageRef::url("https://example.com/turn2.png");
        let storyteller =
            Arc::new(ScriptedStoryteller::new().with_scene(Scene::new("X", vec!["a".into()])));
        let landing_gate = storyteller.gate_image(ImageRef::url("https://example.com/landing.png"));
        storyteller.queue_image(Ok(fresh.clone()));
        let (engine, landing) = engine(&storyteller);
        while storyteller.image_requests().is_empty() {
            tokio::task::yield_now().await;
        }

        let report = engine.submit_action("Look for the registration desk").await.unwrap();
        assert!(report.image.wait().await);
        assert_eq!(engine.scene_image(), Some(fresh.clone()));

        let _ = landing_gate.send(());
        assert!(!landing.wait().await);
        assert_eq!(engine.scene_image(), Some(fresh));
    }

    #[tokio::test]
    async fn test_newer_refresh_in_same_turn_wins() {
        let storyteller = Arc::new(ScriptedStoryteller::new());
        let (engine, landing) = engine(&storyteller);
        assert!(!landing.wait().await);

        let slow_gate = storyteller.gate_image(ImageRef::url("https://example.com/first.png"));
        let newer = ImageRef::url("https://example.com/second.png");
        storyteller.queue_image(Ok(newer.clone()));

        let first = engine.refresh_scene_image("Hangar at dawn");
        while storyteller.image_requests().len() < 2 {
            tokio::task::yield_now().await;
        }
        let second = engine.refresh_scene_image("Hangar at dusk");
        assert_eq!(first.epoch(), second.epoch());
        assert!(second.generation() > first.generation());

        assert!(second.wait().await);
        assert_eq!(engine.scene_image(), Some(newer.clone()));

        let _ = slow_gate.send(());
        assert!(!first.wait().await);
        assert_eq!(engine.scene_image(), Some(newer));
        assert_eq!(engine.snapshot().image_generation, 3);
    }

    #[tokio::test]
    async fn test_sessions_have_distinct_ids() {
        let storyteller = Arc::new(ScriptedStoryteller::new());
        let (a, _) = engine(&storyteller);
        let (b, _) = engine(&storyteller);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
