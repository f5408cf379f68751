//! Integration tests for traversal clues.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

fn clues_uri(session_id: Uuid) -> String {
    format!("/api/v1/traversals/{session_id}/stories/demo-story/clues")
}

async fn play_to_story_end(app: impl Fn() -> axum::Router, session_id: Uuid) {
    common::advance(app(), session_id, "scene-a", "LOAD_SCENE", None).await;
    for _ in 0..3 {
        common::advance(app(), session_id, "scene-a", "INTERACT", Some("Hello.")).await;
    }
    common::advance(app(), session_id, "scene-b", "LOAD_SCENE", None).await;
    common::advance(app(), session_id, "scene-b", "PASS", None).await;
}

#[tokio::test]
async fn test_clues_are_empty_before_any_play() {
    let app = common::build_test_app(common::demo_state());
    let session_id = Uuid::new_v4();

    let (status, json) = common::get_json(app, &clues_uri(session_id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session_id"], session_id.to_string());
    assert_eq!(json["story_id"], "demo-story");
    assert!(json["clues"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pass_hands_off_missed_opportunity_clue() {
    // Arrange
    let state = common::demo_state();
    let session_id = Uuid::new_v4();
    let app = || common::build_test_app(state.clone());

    // Act
    play_to_story_end(app, session_id).await;
    let (status, json) = common::get_json(app(), &clues_uri(session_id)).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let clues = json["clues"].as_array().unwrap();
    let ids: Vec<_> = clues.iter().map(|c| c["clue_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["CLUE_002_COURIER_ID", "CLUE_003_MISSED_OPPORTUNITY"]);
    assert!(clues.iter().all(|c| c["status"] == "untracked"));
    assert!(clues.iter().all(|c| c["story_id"] == "demo-story"));
}

#[tokio::test]
async fn test_sessions_on_same_story_do_not_share_clues() {
    // Arrange
    let state = common::demo_state();
    let finished = Uuid::new_v4();
    let started = Uuid::new_v4();
    let app = || common::build_test_app(state.clone());
    play_to_story_end(app, finished).await;
    common::advance(app(), started, "scene-a", "LOAD_SCENE", None).await;

    // Act
    let (_, finished_json) = common::get_json(app(), &clues_uri(finished)).await;
    let (_, started_json) = common::get_json(app(), &clues_uri(started)).await;

    // Assert
    assert_eq!(finished_json["clues"].as_array().unwrap().len(), 2);
    assert!(started_json["clues"].as_array().unwrap().is_empty());
}
