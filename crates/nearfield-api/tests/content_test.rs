//! Integration tests for content metadata.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_content_describes_demo_catalog() {
    // Arrange
    let app = common::build_test_app(common::demo_state());

    // Act
    let (status, json) = common::get_json(app, "/api/v1/content").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"], "static");
    assert_eq!(json["fingerprint"].as_str().unwrap().len(), 64);

    let stories = json["stories"].as_array().unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0]["story_id"], "demo-story");
    assert_eq!(
        stories[0]["scene_ids"],
        serde_json::json!(["scene-a", "scene-b"])
    );
}
