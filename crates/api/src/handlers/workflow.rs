//! Workflow editing for a single project and for the studio default.
//!
//! Each request opens a [`WorkflowDraft`] over the stored configuration,
//! applies the submitted edit and commits. Persisting the commit is best
//! effort: a failed write is logged and the committed workflow is still
//! returned.

use axum::extract::{Path, State};
use axum::Json;
use peekit_core::editor::{EditScope, WorkflowCommit, WorkflowDraft};
use peekit_core::source::StageSource;
use peekit_core::tracking::OwnerView;
use peekit_core::types::EntityId;
use peekit_core::workflow::{StagesConfiguration, WorkflowStep};
use peekit_db::models::profile::Profile;
use peekit_db::models::project::Project;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::{
    find_profile, now_ms, owned_project, plan_of, project_config, require_profile,
    studio_default,
};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::WorkflowResponse;

#[derive(Debug, Deserialize)]
pub struct SaveWorkflowRequest {
    pub steps: Vec<WorkflowStep>,
}

// ---------------------------------------------------------------------------
// Project scope
// ---------------------------------------------------------------------------

/// PUT /api/v1/projects/{id}/workflow
///
/// An empty step list drops the override; the project then follows the
/// studio default.
pub async fn save_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SaveWorkflowRequest>,
) -> AppResult<Json<DataResponse<WorkflowResponse>>> {
    let (project, profile, mut draft) = open_project(&state, &user, id).await?;
    draft.replace_steps(input.steps);
    let commit = draft.save(now_ms())?;
    let data = commit_project(&state, &project, profile.as_ref(), commit).await;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{id}/workflow/reset
pub async fn reset_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<WorkflowResponse>>> {
    let (project, profile, mut draft) = open_project(&state, &user, id).await?;
    let commit = draft.reset_to_default();
    let data = commit_project(&state, &project, profile.as_ref(), commit).await;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/projects/{id}/workflow/steps/{step_id}
///
/// The last remaining step cannot be removed; the response then has
/// `applied: false` and the workflow unchanged.
pub async fn remove_project_step(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, step_id)): Path<(EntityId, String)>,
) -> AppResult<Json<DataResponse<WorkflowResponse>>> {
    let (project, profile, mut draft) = open_project(&state, &user, id).await?;
    let data = match draft.remove_step(&step_id, now_ms())? {
        Some(commit) => commit_project(&state, &project, profile.as_ref(), commit).await,
        None => {
            let config = project_config(&project, profile.as_ref());
            WorkflowResponse {
                applied: false,
                uses_studio_default: !project.stage_source().is_snapshot(),
                renamed: Vec::new(),
                tracking: Some(OwnerView::build(&config, &project.stage_record())),
                workflow: config,
            }
        }
    };
    Ok(Json(DataResponse { data }))
}

async fn open_project(
    state: &AppState,
    user: &AuthUser,
    id: EntityId,
) -> AppResult<(Project, Option<Profile>, WorkflowDraft)> {
    let project = owned_project(state, user, id).await?;
    let profile = find_profile(state, user.user_id).await?;
    let draft = WorkflowDraft::open(
        EditScope::Project(id),
        plan_of(profile.as_ref()),
        &project_config(&project, profile.as_ref()),
    );
    Ok((project, profile, draft))
}

async fn commit_project(
    state: &AppState,
    project: &Project,
    profile: Option<&Profile>,
    commit: WorkflowCommit,
) -> WorkflowResponse {
    log_renamed(&commit);
    let source = commit.stage_source();
    if let Err(e) = state.store.set_stage_source(project.id, &source).await {
        tracing::error!(project_id = %project.id, error = %e, "Failed to persist project workflow");
    }
    tracing::info!(
        project_id = %project.id,
        steps = commit.config.len(),
        snapshot = source.is_snapshot(),
        "Project workflow saved"
    );

    let uses_studio_default = !source.is_snapshot();
    let config = match source {
        StageSource::Snapshot(config) => config,
        StageSource::StudioDefault => studio_default(profile),
    };
    WorkflowResponse {
        applied: true,
        uses_studio_default,
        renamed: commit.renamed,
        tracking: Some(OwnerView::build(&config, &project.stage_record())),
        workflow: config,
    }
}

// ---------------------------------------------------------------------------
// Studio scope
// ---------------------------------------------------------------------------

/// GET /api/v1/studio/workflow
pub async fn get_studio(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StagesConfiguration>>> {
    let profile = require_profile(&state, user.user_id).await?;
    Ok(Json(DataResponse {
        data: studio_default(Some(&profile)),
    }))
}

/// PUT /api/v1/studio/workflow
///
/// Projects without their own workflow pick the change up immediately.
pub async fn save_studio(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SaveWorkflowRequest>,
) -> AppResult<Json<DataResponse<WorkflowResponse>>> {
    let mut draft = open_studio(&state, &user).await?;
    draft.replace_steps(input.steps);
    let commit = draft.save(now_ms())?;
    let data = commit_studio(&state, &user, commit).await;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/studio/workflow/reset
pub async fn reset_studio(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<WorkflowResponse>>> {
    let mut draft = open_studio(&state, &user).await?;
    let commit = draft.reset_to_default();
    let data = commit_studio(&state, &user, commit).await;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/studio/workflow/steps/{step_id}
pub async fn remove_studio_step(
    user: AuthUser,
    State(state): State<AppState>,
    Path(step_id): Path<String>,
) -> AppResult<Json<DataResponse<WorkflowResponse>>> {
    let mut draft = open_studio(&state, &user).await?;
    let data = match draft.remove_step(&step_id, now_ms())? {
        Some(commit) => commit_studio(&state, &user, commit).await,
        None => WorkflowResponse {
            applied: false,
            workflow: StagesConfiguration::new(draft.steps().to_vec()),
            uses_studio_default: true,
            renamed: Vec::new(),
            tracking: None,
        },
    };
    Ok(Json(DataResponse { data }))
}

async fn open_studio(state: &AppState, user: &AuthUser) -> AppResult<WorkflowDraft> {
    let profile = require_profile(state, user.user_id).await?;
    Ok(WorkflowDraft::open(
        EditScope::Studio,
        profile.plan(),
        &studio_default(Some(&profile)),
    ))
}

async fn commit_studio(state: &AppState, user: &AuthUser, commit: WorkflowCommit) -> WorkflowResponse {
    log_renamed(&commit);
    if let Err(e) = state
        .store
        .set_studio_stages(user.user_id, &commit.config)
        .await
    {
        tracing::error!(user_id = %user.user_id, error = %e, "Failed to persist studio workflow");
    }
    tracing::info!(user_id = %user.user_id, steps = commit.config.len(), "Studio workflow saved");

    WorkflowResponse {
        applied: true,
        workflow: commit.config,
        uses_studio_default: true,
        renamed: commit.renamed,
        tracking: None,
    }
}

fn log_renamed(commit: &WorkflowCommit) {
    if !commit.renamed.is_empty() {
        tracing::warn!(scope = ?commit.scope, renamed = ?commit.renamed, "Reassigned step ids on save");
    }
}
