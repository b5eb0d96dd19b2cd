//! HTTP-level tests for project and studio workflow editing.

mod common;

use axum::http::StatusCode;
use common::{
    abc_steps, body_json, create_project, delete, get, onboard, post_empty, post_json,
    project_body, put_json,
};
use peekit_core::workflow::default_step_content;
use serde_json::{json, Value};

fn ids(workflow: &Value) -> Vec<String> {
    workflow
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect()
}

const DEFAULT_IDS: [&str; 5] = ["secured", "culling", "editing", "export", "delivery"];

#[tokio::test]
async fn project_override_replaces_the_snapshot() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(&app, &studio, project_body("Hugo")).await;
    let id = project["id"].as_str().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/projects/{id}/workflow"),
        studio.auth(),
        json!({ "steps": abc_steps() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["applied"], true);
    assert_eq!(data["uses_studio_default"], false);
    assert_eq!(ids(&data["workflow"]), ["a", "b", "c"]);

    // "secured" no longer exists: tracking degrades to the first step at 0%.
    let progress = &data["tracking"]["progress"];
    assert_eq!(progress["percent"], 0);
    assert_eq!(progress["resolved"], false);
    assert_eq!(progress["label"], "A");

    // Activating the first step places the project again.
    let response = post_empty(&app, &format!("/api/v1/projects/{id}/stages/a/activate"), studio.auth()).await;
    let result = body_json(response).await["data"].clone();
    assert_eq!(result["applied"], true);
    assert_eq!(result["current_stage"], "b");
}

#[tokio::test]
async fn empty_override_tracks_the_studio_default_live() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let live = create_project(&app, &studio, project_body("Live")).await;
    let snapshot = create_project(&app, &studio, project_body("Snapshot")).await;
    let live_id = live["id"].as_str().unwrap();
    let snapshot_id = snapshot["id"].as_str().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/projects/{live_id}/workflow"),
        studio.auth(),
        json!({ "steps": [] }),
    )
    .await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["uses_studio_default"], true);
    assert_eq!(ids(&data["workflow"]), DEFAULT_IDS);

    let response = put_json(&app, "/api/v1/studio/workflow", studio.auth(), json!({ "steps": abc_steps() })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let live = body_json(get(&app, &format!("/api/v1/projects/{live_id}"), studio.auth()).await).await;
    assert_eq!(ids(&live["data"]["workflow"]), ["a", "b", "c"]);
    assert_eq!(live["data"]["uses_studio_default"], true);

    let snapshot =
        body_json(get(&app, &format!("/api/v1/projects/{snapshot_id}"), studio.auth()).await).await;
    assert_eq!(ids(&snapshot["data"]["workflow"]), DEFAULT_IDS);
}

#[tokio::test]
async fn new_projects_snapshot_the_current_studio_default() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    put_json(&app, "/api/v1/studio/workflow", studio.auth(), json!({ "steps": abc_steps() })).await;

    let project = create_project(&app, &studio, project_body("Hugo")).await;
    assert_eq!(ids(&project["workflow"]), ["a", "b", "c"]);
    assert_eq!(project["current_stage"], "a");
    assert_eq!(project["uses_studio_default"], false);
}

#[tokio::test]
async fn duplicate_step_ids_are_reassigned_on_save() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(&app, &studio, project_body("Hugo")).await;
    let id = project["id"].as_str().unwrap();

    let steps = json!([
        { "id": "a", "label": "A1", "message": "" },
        { "id": "a", "label": "A2", "message": "" },
        { "id": "", "label": "Blank", "message": "" },
    ]);
    let response = put_json(&app, &format!("/api/v1/projects/{id}/workflow"), studio.auth(), json!({ "steps": steps })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    let saved = ids(&data["workflow"]);
    assert_eq!(saved.len(), 3);
    assert_eq!(saved[0], "a");
    assert_ne!(saved[1], "a");
    assert_ne!(saved[1], saved[2]);
    assert!(saved[1].starts_with("step_"));
    assert_eq!(data["renamed"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn removing_a_step_commits_but_the_last_step_stays() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(
        &app,
        &studio,
        json!({
            "client_name": "Hugo",
            "client_email": "hugo@example.com",
            "stages_config": [{ "id": "a", "label": "A", "message": "" }, { "id": "b", "label": "B", "message": "" }],
        }),
    )
    .await;
    let id = project["id"].as_str().unwrap();

    let response = delete(&app, &format!("/api/v1/projects/{id}/workflow/steps/b"), studio.auth()).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["applied"], true);
    assert_eq!(ids(&data["workflow"]), ["a"]);

    let response = delete(&app, &format!("/api/v1/projects/{id}/workflow/steps/a"), studio.auth()).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["applied"], false);
    assert_eq!(ids(&data["workflow"]), ["a"]);

    let stored = body_json(get(&app, &format!("/api/v1/projects/{id}"), studio.auth()).await).await;
    assert_eq!(ids(&stored["data"]["workflow"]), ["a"]);
}

#[tokio::test]
async fn reset_restores_the_built_in_workflow() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    put_json(&app, "/api/v1/studio/workflow", studio.auth(), json!({ "steps": abc_steps() })).await;

    let response = post_empty(&app, "/api/v1/studio/workflow/reset", studio.auth()).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(ids(&data["workflow"]), DEFAULT_IDS);

    let project = create_project(&app, &studio, project_body("Hugo")).await;
    let id = project["id"].as_str().unwrap();
    put_json(&app, &format!("/api/v1/projects/{id}/workflow"), studio.auth(), json!({ "steps": abc_steps() })).await;
    let response = post_empty(&app, &format!("/api/v1/projects/{id}/workflow/reset"), studio.auth()).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(ids(&data["workflow"]), DEFAULT_IDS);
    assert_eq!(data["uses_studio_default"], false);
}

#[tokio::test]
async fn studio_default_cannot_be_emptied() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;

    let response = put_json(&app, "/api/v1/studio/workflow", studio.auth(), json!({ "steps": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get(&app, "/api/v1/studio/workflow", studio.auth()).await;
    assert_eq!(ids(&body_json(response).await["data"]), DEFAULT_IDS);
}

#[tokio::test]
async fn free_plan_keeps_stored_step_content() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;

    let steps = json!([
        { "id": "secured", "label": "Renamed", "message": "m", "content": "my private notes" },
        { "id": "fresh", "label": "Fresh", "message": "m", "content": "other notes" },
    ]);
    let response = put_json(&app, "/api/v1/studio/workflow", studio.auth(), json!({ "steps": steps })).await;
    let workflow = body_json(response).await["data"]["workflow"].clone();

    assert_eq!(workflow[0]["label"], "Renamed");
    assert_eq!(workflow[0]["content"], default_step_content("secured").unwrap());
    assert_eq!(workflow[1]["content"], "");
}

#[tokio::test]
async fn studio_workflow_requires_a_profile() {
    let app = common::build_test_app();
    let token = app.token(uuid::Uuid::new_v4());

    let response = get(&app, "/api/v1/studio/workflow", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(&app, "/api/v1/studio/workflow/reset", Some(&token), json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
