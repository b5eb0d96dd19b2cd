//! HTTP-level tests for stage transitions on a project.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_project, get, onboard, post_empty, project_body, TestApp};
use serde_json::Value;

async fn command(app: &TestApp, token: Option<&str>, uri: &str) -> Value {
    let response = post_empty(app, uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn advance_walks_the_default_workflow_to_delivery() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio Lumière").await;
    let project = create_project(&app, &studio, project_body("Camille")).await;
    let id = project["id"].as_str().unwrap();
    assert_eq!(project["current_stage"], "secured");
    assert_eq!(project["tracking"]["progress"]["percent"], 20);

    let advance = format!("/api/v1/projects/{id}/stages/advance");
    let mut last = Value::Null;
    for expected in ["culling", "editing", "export", "delivery"] {
        last = command(&app, studio.auth(), &advance).await;
        assert_eq!(last["applied"], true);
        assert_eq!(last["transition"], "advanced");
        assert_eq!(last["current_stage"], expected);
    }
    assert_eq!(last["tracking"]["progress"]["percent"], 100);
    assert_eq!(last["tracking"]["status"], "awaiting_delivery");
    assert_eq!(last["tracking"]["can_finalize"], true);

    // On the terminal stage only finalize moves forward.
    let rejected = command(&app, studio.auth(), &advance).await;
    assert_eq!(rejected["applied"], false);
    assert_eq!(rejected["reason"], "awaiting_finalize");
    assert_eq!(rejected["current_stage"], "delivery");

    let finalize = format!("/api/v1/projects/{id}/stages/finalize");
    let done = command(&app, studio.auth(), &finalize).await;
    assert_eq!(done["applied"], true);
    assert_eq!(done["transition"], "finalized");
    assert_eq!(done["is_finalized"], true);
    assert_eq!(done["tracking"]["status"], "delivered");

    let again = command(&app, studio.auth(), &finalize).await;
    assert_eq!(again["applied"], false);
    assert_eq!(again["reason"], "already_delivered");

    let response = get(&app, &format!("/api/v1/projects/{id}"), studio.auth()).await;
    let stored = body_json(response).await;
    assert_eq!(stored["data"]["current_stage"], "delivery");
    assert_eq!(stored["data"]["is_finalized"], true);
}

#[tokio::test]
async fn activating_an_earlier_stage_regresses() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(&app, &studio, project_body("Hugo")).await;
    let id = project["id"].as_str().unwrap();

    let advance = format!("/api/v1/projects/{id}/stages/advance");
    command(&app, studio.auth(), &advance).await;
    command(&app, studio.auth(), &advance).await;

    let back = command(
        &app,
        studio.auth(),
        &format!("/api/v1/projects/{id}/stages/secured/activate"),
    )
    .await;
    assert_eq!(back["applied"], true);
    assert_eq!(back["transition"], "regressed");
    assert_eq!(back["current_stage"], "secured");
    assert_eq!(back["tracking"]["progress"]["percent"], 20);
}

#[tokio::test]
async fn activating_the_current_stage_advances() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(&app, &studio, project_body("Hugo")).await;
    let id = project["id"].as_str().unwrap();

    let result = command(
        &app,
        studio.auth(),
        &format!("/api/v1/projects/{id}/stages/secured/activate"),
    )
    .await;
    assert_eq!(result["applied"], true);
    assert_eq!(result["current_stage"], "culling");
    let rows = result["tracking"]["stages"].as_array().unwrap();
    assert_eq!(rows[0]["state"], "done");
    assert_eq!(rows[1]["state"], "current");
    assert_eq!(rows[2]["state"], "pending");
}

#[tokio::test]
async fn forward_skip_and_unknown_stage_are_rejected() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(&app, &studio, project_body("Hugo")).await;
    let id = project["id"].as_str().unwrap();

    let skip = command(
        &app,
        studio.auth(),
        &format!("/api/v1/projects/{id}/stages/export/activate"),
    )
    .await;
    assert_eq!(skip["applied"], false);
    assert_eq!(skip["reason"], "forward_skip");
    assert_eq!(skip["current_stage"], "secured");

    let unknown = command(
        &app,
        studio.auth(),
        &format!("/api/v1/projects/{id}/stages/nope/activate"),
    )
    .await;
    assert_eq!(unknown["applied"], false);
    assert_eq!(unknown["reason"], "unknown_stage");
    assert!(unknown["message"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn delivered_project_can_be_reopened_on_an_earlier_stage() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(
        &app,
        &studio,
        serde_json::json!({
            "client_name": "Léa",
            "client_email": "lea@example.com",
            "stages_config": common::abc_steps(),
        }),
    )
    .await;
    let id = project["id"].as_str().unwrap();

    let advance = format!("/api/v1/projects/{id}/stages/advance");
    command(&app, studio.auth(), &advance).await;
    command(&app, studio.auth(), &advance).await;
    let done = command(&app, studio.auth(), &format!("/api/v1/projects/{id}/stages/finalize")).await;
    assert_eq!(done["is_finalized"], true);

    let reopened = command(
        &app,
        studio.auth(),
        &format!("/api/v1/projects/{id}/stages/b/activate"),
    )
    .await;
    assert_eq!(reopened["applied"], true);
    assert_eq!(reopened["transition"], "regressed");
    assert_eq!(reopened["current_stage"], "b");
    assert_eq!(reopened["is_finalized"], false);
}

#[tokio::test]
async fn finalize_before_the_last_stage_is_rejected() {
    let app = common::build_test_app();
    let studio = onboard(&app, "Studio").await;
    let project = create_project(&app, &studio, project_body("Hugo")).await;
    let id = project["id"].as_str().unwrap();

    let result = command(&app, studio.auth(), &format!("/api/v1/projects/{id}/stages/finalize")).await;
    assert_eq!(result["applied"], false);
    assert_eq!(result["reason"], "not_on_final_stage");
}

#[tokio::test]
async fn stage_commands_require_the_owner() {
    let app = common::build_test_app();
    let owner = onboard(&app, "Owner").await;
    let intruder = onboard(&app, "Intruder").await;
    let project = create_project(&app, &owner, project_body("Hugo")).await;
    let uri = format!("/api/v1/projects/{}/stages/advance", project["id"].as_str().unwrap());

    let response = post_empty(&app, &uri, intruder.auth()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_empty(&app, &uri, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}
