//! Handlers for the authenticated studio: profile, onboarding, account
//! deletion and view notifications.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use peekit_core::activity::has_unread_view;
use peekit_core::workflow::default_stages;
use peekit_db::models::profile::UpsertProfile;
use peekit_db::models::project::{CreateProject, NewProject};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::project::project_detail;
use crate::handlers::{find_profile, require_profile, studio_default};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::{ProjectDetail, StudioView, ViewNotification};

#[derive(Debug, Deserialize, Validate)]
pub struct OnboardingRequest {
    #[validate(length(min = 1, max = 200))]
    pub studio_name: String,
    #[validate(nested)]
    pub first_project: Option<CreateProject>,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub studio: StudioView,
    pub first_project: Option<ProjectDetail>,
}

/// GET /api/v1/studio
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StudioView>>> {
    let profile = require_profile(&state, user.user_id).await?;
    let workflow = studio_default(Some(&profile));
    Ok(Json(DataResponse {
        data: StudioView::build(&profile, workflow),
    }))
}

/// POST /api/v1/studio/onboarding
///
/// Creates or renames the profile and marks onboarding complete. A new
/// studio starts on the free plan with the built-in workflow. The plan and
/// a saved workflow of an existing profile are left alone. The optional
/// first project snapshots the studio default.
pub async fn onboarding(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<OnboardingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<OnboardingResponse>>)> {
    input.validate()?;
    let existing = find_profile(&state, user.user_id).await?;
    let stages_config = match existing.as_ref().and_then(|p| p.studio_stages()) {
        Some(_) => None,
        None => Some(default_stages()),
    };

    let profile = state
        .store
        .upsert_profile(
            user.user_id,
            &UpsertProfile {
                studio_name: input.studio_name,
                plan: None,
                onboarding_completed: true,
                stages_config,
            },
        )
        .await?;
    tracing::info!(user_id = %user.user_id, studio = %profile.studio_name, "Onboarding completed");

    let first_project = match input.first_project {
        Some(project) => {
            let created = state
                .store
                .create_project(&NewProject::new(
                    user.user_id,
                    project,
                    studio_default(Some(&profile)),
                ))
                .await?;
            tracing::info!(user_id = %user.user_id, project_id = %created.id, "First project created");
            Some(project_detail(&state, &created, Some(&profile)).await?)
        }
        None => None,
    };

    let studio = StudioView::build(&profile, studio_default(Some(&profile)));
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: OnboardingResponse {
                studio,
                first_project,
            },
        }),
    ))
}

/// DELETE /api/v1/studio
///
/// Deletes teasers, projects and the profile. The identity provider
/// account itself is not touched.
pub async fn delete_account(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    state.store.delete_account(user.user_id).await?;
    tracing::info!(user_id = %user.user_id, "Account data deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/studio/notifications
///
/// Projects a client has looked at since their last update, most recent
/// view first. Always empty on the free plan.
pub async fn notifications(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ViewNotification>>>> {
    let plan = find_profile(&state, user.user_id)
        .await?
        .map(|profile| profile.plan())
        .unwrap_or_default();
    if !plan.has_view_notifications() {
        return Ok(Json(DataResponse { data: Vec::new() }));
    }

    let projects = state.store.list_projects(user.user_id).await?;
    let mut data: Vec<ViewNotification> = projects
        .into_iter()
        .filter_map(|p| {
            let viewed_at = p.client_last_viewed_at?;
            has_unread_view(Some(viewed_at), p.last_update).then(|| ViewNotification {
                project_id: p.id,
                client_name: p.client_name,
                viewed_at,
            })
        })
        .collect();
    data.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));
    Ok(Json(DataResponse { data }))
}
