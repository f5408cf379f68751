//! Drives the advance engine through the built-in demo story.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use nearfield_content::application::static_provider::StaticSceneProvider;
use nearfield_core::action::{ActionType, NextActionType};
use nearfield_core::error::AdvanceError;
use nearfield_core::model::{AdvanceResult, ClueStatus};
use nearfield_narrative::application::clue_journal::ClueJournal;
use nearfield_narrative::application::engine::AdvanceEngine;
use nearfield_narrative::application::query_handlers::get_entity;
use nearfield_narrative::domain::commands::Advance;
use nearfield_test_support::FixedClock;
use serde_json::json;
use uuid::Uuid;

const STORY: &str = "demo-story";

fn demo_engine() -> (AdvanceEngine, Arc<ClueJournal>) {
    let journal = Arc::new(ClueJournal::new());
    let engine = AdvanceEngine::new(
        Arc::new(StaticSceneProvider::demo().unwrap()),
        journal.clone(),
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        )),
        Duration::from_secs(1),
    );
    (engine, journal)
}

async fn send(
    engine: &AdvanceEngine,
    session_id: Uuid,
    scene_id: &str,
    action: ActionType,
    turn_input: Option<&str>,
) -> Result<AdvanceResult, AdvanceError> {
    engine
        .advance(&Advance {
            correlation_id: Uuid::new_v4(),
            session_id,
            story_id: STORY.to_owned(),
            scene_id: scene_id.to_owned(),
            action,
            turn_input: turn_input.map(str::to_owned),
        })
        .await
}

fn current_turn(result: &AdvanceResult) -> u32 {
    result
        .scene_status
        .interaction_policy
        .as_ref()
        .map_or(0, |p| p.current_turn)
}

/// Plays scene-a to its end and returns the results of the three turns.
async fn play_scene_a(engine: &AdvanceEngine, session_id: Uuid) -> Vec<AdvanceResult> {
    send(engine, session_id, "scene-a", ActionType::LoadScene, None)
        .await
        .unwrap();
    let mut turns = vec![
        send(engine, session_id, "scene-a", ActionType::Interact, None)
            .await
            .unwrap(),
    ];
    for text in ["Who sent you?", "Show me your badge."] {
        turns.push(
            send(engine, session_id, "scene-a", ActionType::Interact, Some(text))
                .await
                .unwrap(),
        );
    }
    turns
}

#[tokio::test]
async fn test_load_scene_a_plays_opening_narrative_without_policy() {
    // Arrange
    let (engine, _) = demo_engine();

    // Act
    let result = send(&engine, Uuid::new_v4(), "scene-a", ActionType::LoadScene, None)
        .await
        .unwrap();

    // Assert
    let ids: Vec<_> = result.new_events.iter().map(|u| u.unit_id.as_str()).collect();
    assert_eq!(ids, vec!["U001", "U002"]);
    assert_eq!(result.next_action_type, NextActionType::PlayingNarrative);
    assert!(result.scene_status.interaction_policy.is_none());
    assert!(!result.scene_status.is_scene_over);
}

#[tokio::test]
async fn test_scene_a_converges_on_third_turn_and_mints_courier_clue() {
    // Arrange
    let (engine, journal) = demo_engine();
    let session_id = Uuid::new_v4();

    // Act
    let turns = play_scene_a(&engine, session_id).await;

    // Assert
    let counted: Vec<_> = turns.iter().map(current_turn).collect();
    assert_eq!(counted, vec![1, 2, 3]);
    for result in &turns {
        let policy = result.scene_status.interaction_policy.as_ref().unwrap();
        assert_eq!(policy.max_turns, 3);
    }

    let last = &turns[2];
    assert!(last.scene_status.is_scene_over);
    assert!(!last.scene_status.is_story_over);
    assert_eq!(last.scene_status.next_scene_id.as_deref(), Some("scene-b"));
    assert_eq!(last.next_action_type, NextActionType::SceneEnded);

    let clue = last.scene_status.new_clue.as_ref().unwrap();
    assert_eq!(clue.clue_id, "CLUE_002_COURIER_ID");
    assert_eq!(clue.status, ClueStatus::Untracked);
    assert_eq!(clue.story_id, STORY);
    assert_eq!(journal.clues_for(session_id, STORY), vec![clue.clone()]);

    let courier = get_entity(&engine, session_id, STORY, "npc_courier")
        .await
        .unwrap();
    assert_eq!(courier.attributes["composure"], json!(20));
    assert_eq!(courier.attributes["status"], json!("rattled"));
}

#[tokio::test]
async fn test_scene_b_pass_ends_story_with_missed_opportunity_clue() {
    // Arrange
    let (engine, journal) = demo_engine();
    let session_id = Uuid::new_v4();
    play_scene_a(&engine, session_id).await;
    let entered = send(&engine, session_id, "scene-b", ActionType::LoadScene, None)
        .await
        .unwrap();

    // Act
    let passed = send(&engine, session_id, "scene-b", ActionType::Pass, None)
        .await
        .unwrap();

    // Assert
    assert_eq!(entered.next_action_type, NextActionType::AwaitingIntervention);
    let policy = entered.scene_status.interaction_policy.unwrap();
    assert_eq!((policy.current_turn, policy.max_turns), (0, 5));

    assert!(passed.scene_status.is_scene_over);
    assert!(passed.scene_status.is_story_over);
    assert!(passed.scene_status.next_scene_id.is_none());
    assert!(passed.scene_status.interaction_policy.is_none());
    assert_eq!(passed.next_action_type, NextActionType::SceneEnded);

    let clue = passed.scene_status.new_clue.unwrap();
    assert_eq!(clue.clue_id, "CLUE_003_MISSED_OPPORTUNITY");
    let journaled: Vec<_> = journal
        .clues_for(session_id, STORY)
        .into_iter()
        .map(|c| c.clue_id)
        .collect();
    assert_eq!(
        journaled,
        vec!["CLUE_002_COURIER_ID", "CLUE_003_MISSED_OPPORTUNITY"]
    );

    let after = send(&engine, session_id, "scene-b", ActionType::LoadScene, None).await;
    assert!(matches!(after, Err(AdvanceError::StoryOver(story)) if story == STORY));
}

#[tokio::test]
async fn test_scene_b_turn_without_content_falls_back_to_terminal_default() {
    // Arrange
    let (engine, _) = demo_engine();
    let session_id = Uuid::new_v4();
    play_scene_a(&engine, session_id).await;
    send(&engine, session_id, "scene-b", ActionType::LoadScene, None)
        .await
        .unwrap();

    // Act
    let mut results = Vec::new();
    for turn in 1..=5 {
        let text = format!("turn {turn}");
        results.push(
            send(&engine, session_id, "scene-b", ActionType::Interact, Some(&text))
                .await
                .unwrap(),
        );
    }

    // Assert
    let counted: Vec<_> = results.iter().map(current_turn).collect();
    assert_eq!(counted, vec![1, 2, 3, 4, 5]);
    assert!(results[..4].iter().all(|r| !r.scene_status.is_scene_over));

    let last = &results[4];
    assert_eq!(last.new_events[0].unit_id, "B090");
    assert!(last.scene_status.is_scene_over);
    assert!(last.scene_status.is_story_over);
    assert_eq!(last.next_action_type, NextActionType::SceneEnded);
}

#[tokio::test]
async fn test_pass_is_rejected_outside_intervention() {
    // Arrange
    let (engine, _) = demo_engine();
    let session_id = Uuid::new_v4();
    send(&engine, session_id, "scene-a", ActionType::LoadScene, None)
        .await
        .unwrap();

    // Act
    let result = send(&engine, session_id, "scene-a", ActionType::Pass, None).await;

    // Assert
    assert!(matches!(
        result,
        Err(AdvanceError::InvalidTransition {
            action: ActionType::Pass,
            ..
        })
    ));
}

#[tokio::test]
async fn test_unknown_scene_is_not_found() {
    let (engine, _) = demo_engine();

    let result = send(&engine, Uuid::new_v4(), "scene-z", ActionType::LoadScene, None).await;

    assert!(matches!(result, Err(AdvanceError::SceneNotFound { .. })));
}
