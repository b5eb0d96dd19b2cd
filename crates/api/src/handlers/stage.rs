//! Stage transitions on a project.
//!
//! A rejected command is not an error: the response carries
//! `applied: false` and the reason. An applied transition is returned
//! even when persisting it fails; the failure is only logged.

use axum::extract::{Path, State};
use axum::Json;
use peekit_core::tracking::OwnerView;
use peekit_core::transition::{apply, StageCommand};
use peekit_core::types::EntityId;

use crate::error::AppResult;
use crate::handlers::{find_profile, owned_project, project_config};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::StageActionResponse;

/// POST /api/v1/projects/{id}/stages/{step_id}/activate
pub async fn activate(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, step_id)): Path<(EntityId, String)>,
) -> AppResult<Json<DataResponse<StageActionResponse>>> {
    run_command(&state, &user, id, StageCommand::Activate(step_id)).await
}

/// POST /api/v1/projects/{id}/stages/advance
pub async fn advance(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<StageActionResponse>>> {
    run_command(&state, &user, id, StageCommand::Advance).await
}

/// POST /api/v1/projects/{id}/stages/finalize
pub async fn finalize(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<StageActionResponse>>> {
    run_command(&state, &user, id, StageCommand::Finalize).await
}

async fn run_command(
    state: &AppState,
    user: &AuthUser,
    id: EntityId,
    command: StageCommand,
) -> AppResult<Json<DataResponse<StageActionResponse>>> {
    let project = owned_project(state, user, id).await?;
    let profile = find_profile(state, user.user_id).await?;
    let config = project_config(&project, profile.as_ref());
    let current = project.stage_record();

    let data = match apply(&config, current.phase(&config), &command) {
        Ok(transition) => {
            if let Err(e) = state
                .store
                .record_stage(id, &transition.record, chrono::Utc::now())
                .await
            {
                tracing::error!(project_id = %id, error = %e, "Failed to persist stage transition");
            }
            tracing::info!(
                project_id = %id,
                kind = ?transition.kind,
                stage = %transition.record.current_stage,
                is_finalized = transition.record.is_finalized,
                "Stage transition applied"
            );
            StageActionResponse {
                applied: true,
                transition: Some(transition.kind),
                reason: None,
                message: None,
                tracking: OwnerView::build(&config, &transition.record),
                current_stage: transition.record.current_stage,
                is_finalized: transition.record.is_finalized,
            }
        }
        Err(rejected) => {
            tracing::debug!(project_id = %id, ?command, reason = rejected.code(), "Stage command rejected");
            StageActionResponse {
                applied: false,
                transition: None,
                reason: Some(rejected.code()),
                message: Some(rejected.to_string()),
                tracking: OwnerView::build(&config, &current),
                current_stage: current.current_stage,
                is_finalized: current.is_finalized,
            }
        }
    };
    Ok(Json(DataResponse { data }))
}
