//! Offline tests for character creation and the turn loop.
//!
//! Everything here runs against scripted backends, so no API key is needed.

use scholomance_core::oracle::prompts;
use scholomance_core::session::{LANDING_SCENE, OPENING_CHOICES, OPENING_SCENE};
use scholomance_core::testing::{
    assert_choices, assert_history_len, assert_idle, assert_turn, sample_character,
    ScriptedBackend, ScriptedStoryteller, TestHarness,
};
use scholomance_core::{
    CharacterDraft, HistoryEntry, ImageRef, Oracle, Scene, TurnEngine, TurnError,
};
use std::sync::Arc;

// =============================================================================
// DOCUMENTED SCENARIO
// =============================================================================

#[tokio::test]
async fn test_first_turn_scenario() {
    let mut harness = TestHarness::new();
    assert_turn(&harness.engine, 1);
    assert_choices(&harness.engine, &OPENING_CHOICES);
    assert_history_len(&harness.engine, 0);

    harness.expect_scene("X", &["a", "b", "c"]);
    let report = harness.act("Look for the registration desk").await.unwrap();

    assert_eq!(report.turn, 2);
    assert_turn(&harness.engine, 2);
    assert_choices(&harness.engine, &["a", "b", "c"]);
    assert_eq!(harness.engine.scene_description(), "X");
    assert_eq!(
        harness.engine.history(),
        vec![
            HistoryEntry::narrator(OPENING_SCENE),
            HistoryEntry::player("Look for the registration desk"),
        ]
    );
    assert_idle(&harness.engine);
}

#[tokio::test]
async fn test_failure_then_success() {
    let mut harness = TestHarness::new();
    harness
        .expect_failure()
        .expect_scene("The void answers.", &["Listen", "Flee"]);

    let before = harness.engine.snapshot();
    let err = harness.act("Commune with the void").await.unwrap_err();
    assert!(matches!(err, TurnError::Narrative(_)));

    let after = harness.engine.snapshot();
    assert_eq!(after.turn_count, before.turn_count);
    assert_eq!(after.history, before.history);
    assert_eq!(after.choices, before.choices);
    assert_eq!(after.scene_description, before.scene_description);
    assert_idle(&harness.engine);

    // The retry sees the same history the failed attempt did.
    harness.act("Commune with the void").await.unwrap();
    let requests = harness.storyteller.scene_requests();
    assert_eq!(requests[0], requests[1]);
    assert_turn(&harness.engine, 2);
}

#[tokio::test]
async fn test_many_turns_grow_history_in_pairs() {
    let mut harness = TestHarness::new();
    for i in 0..5 {
        harness.expect_scene(&format!("Scene {i}"), &["onward"]);
    }

    for i in 0..5u32 {
        let before = harness.engine.history().len();
        harness.act("onward").await.unwrap();
        assert_eq!(harness.engine.history().len(), before + 2);
        assert_turn(&harness.engine, i + 2);
    }

    let history = harness.engine.history();
    assert_eq!(history[8], HistoryEntry::narrator("Scene 3"));
    assert_eq!(history[9], HistoryEntry::player("onward"));
}

// =============================================================================
// IMAGE REFRESH
// =============================================================================

#[tokio::test]
async fn test_image_refresh_follows_turns() {
    let first = ImageRef::url("https://example.com/1.png");
    let second = ImageRef::url("https://example.com/2.png");
    let storyteller = Arc::new(
        ScriptedStoryteller::new()
            .with_scene(Scene::new("Hangar", vec!["Board".into()]))
            .with_scene(Scene::new("Cockpit", vec!["Launch".into()])),
    );
    let (engine, landing) = TurnEngine::open(sample_character(), storyteller.clone());
    // No landing image is scripted, so the request fails and the slot stays empty.
    assert!(!landing.wait().await);
    storyteller.queue_image(Ok(first.clone()));
    storyteller.queue_image(Ok(second.clone()));

    let report = engine.submit_action("Board").await.unwrap();
    assert!(report.image.wait().await);
    assert_eq!(engine.scene_image(), Some(first));

    let report = engine.submit_action("Launch").await.unwrap();
    assert!(report.image.wait().await);
    assert_eq!(engine.scene_image(), Some(second));
    assert_eq!(
        storyteller.image_requests(),
        vec![LANDING_SCENE, "Hangar", "Cockpit"]
    );
}

#[tokio::test]
async fn test_slow_image_from_previous_turn_is_discarded() {
    let storyteller = Arc::new(
        ScriptedStoryteller::new()
            .with_scene(Scene::new("Hangar", vec!["Board".into()]))
            .with_scene(Scene::new("Cockpit", vec!["Launch".into()])),
    );
    let (engine, landing) = TurnEngine::open(sample_character(), storyteller.clone());
    assert!(!landing.wait().await);

    let slow_gate = storyteller.gate_image(ImageRef::url("https://example.com/hangar.png"));
    let fresh = ImageRef::url("https://example.com/cockpit.png");
    storyteller.queue_image(Ok(fresh.clone()));

    let hangar = engine.submit_action("Board").await.unwrap();
    while storyteller.image_requests().len() < 2 {
        tokio::task::yield_now().await;
    }

    let cockpit = engine.submit_action("Launch").await.unwrap();
    assert!(cockpit.image.wait().await);
    assert_eq!(engine.scene_image(), Some(fresh.clone()));

    let _ = slow_gate.send(());
    assert_eq!(hangar.image.epoch(), 2);
    assert!(!hangar.image.wait().await);
    assert_eq!(engine.scene_image(), Some(fresh));
}

// =============================================================================
// CREATION INTO PLAY
// =============================================================================

#[tokio::test]
async fn test_draft_to_first_turn_with_oracle() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_text(
                r#"{"backstory":"Heir to a fallen star-house.","skills":[
                {"name":"Crown Ward","description":"A regal barrier.","type":"Passive","statScale":"CHA"},
                {"name":"Solar Lance","description":"A beam of starlight.","type":"Active","statScale":"STR"},
                {"name":"Court Intrigue","description":"Reads every room.","type":"Active","statScale":"INT"}]}"#,
            )
            .with_text(
                r#"{"description":"A clerk looks up.","choices":["Register","Bribe","Leave"]}"#,
            )
            .with_image(ImageRef::inline("image/png", "cG9ydHJhaXQ=")),
    );
    let oracle = Oracle::with_backend(backend.clone());

    let mut draft = CharacterDraft::new();
    draft
        .set_name("Aurel")
        .set_race("Draconian")
        .set_class("Star-Knight")
        .set_background("Lost Royalty");
    let character = draft.finalize(&oracle).await.unwrap();
    assert_eq!(character.skills.len(), 3);
    assert!(character.portrait.is_inline());

    let (engine, landing) = TurnEngine::open(character, Arc::new(oracle));
    // The landing image runs out of scripted images and gets the placeholder.
    assert!(landing.wait().await);
    assert_eq!(engine.scene_image(), Some(prompts::scene_placeholder()));

    let report = engine
        .submit_action("Look for the registration desk")
        .await
        .unwrap();
    assert_eq!(report.scene.choices, vec!["Register", "Bribe", "Leave"]);

    let scene_prompt = &backend.text_prompts()[1];
    assert!(scene_prompt.contains("The player is a Draconian Star-Knight named Aurel."));
    assert!(scene_prompt.contains(&format!("narrator: {OPENING_SCENE}")));
}
