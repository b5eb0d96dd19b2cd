//! Public tracking page, reachable without an account.
//!
//! Projects with an access password show only a locked gate until the
//! password is supplied. This applies to the owner too.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use peekit_core::access::{grants_access, is_locked};
use peekit_core::activity::should_record_client_view;
use peekit_core::error::CoreError;
use peekit_core::types::EntityId;
use peekit_db::models::profile::Profile;
use peekit_db::models::project::Project;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::project_config;
use crate::middleware::auth::OptionalAuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::{ClientTracking, DownloadManifest, LockedGate, PublicProject};

/// Header carrying the access password on gated reads.
pub const ACCESS_PASSWORD_HEADER: &str = "x-access-password";

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

/// GET /api/v1/public/projects/{id}
///
/// Records a client view unless the viewer is the signed-in owner.
pub async fn get(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<PublicProject>>> {
    let project = find_public(&state, id).await?;

    if should_record_client_view(viewer.user_id(), project.user_id) {
        if let Err(e) = state
            .store
            .mark_client_viewed(id, chrono::Utc::now())
            .await
        {
            tracing::warn!(project_id = %id, error = %e, "Failed to record client view");
        }
    }

    let profile = state.store.find_profile(project.user_id).await?;
    let data = if is_locked(project.access_password.as_deref()) {
        PublicProject::Locked(LockedGate {
            locked: true,
            client_name: project.client_name.clone(),
            studio_name: studio_name(profile.as_ref()),
        })
    } else {
        PublicProject::Open(Box::new(
            tracking(&state, &project, profile.as_ref()).await?,
        ))
    };
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/public/projects/{id}/unlock
pub async fn unlock(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UnlockRequest>,
) -> AppResult<Json<DataResponse<ClientTracking>>> {
    let project = find_public(&state, id).await?;
    check_access(&project, Some(&input.password))?;

    let profile = state.store.find_profile(project.user_id).await?;
    let data = tracking(&state, &project, profile.as_ref()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/public/projects/{id}/downloads
///
/// Gated projects need the password in the `x-access-password` header.
pub async fn downloads(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    headers: HeaderMap,
) -> AppResult<Json<DataResponse<DownloadManifest>>> {
    let project = find_public(&state, id).await?;
    let supplied = headers
        .get(ACCESS_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok());
    check_access(&project, supplied)?;

    let teasers = state.store.list_teasers(id).await?;
    Ok(Json(DataResponse {
        data: DownloadManifest::build(&teasers),
    }))
}

async fn find_public(state: &AppState, id: EntityId) -> AppResult<Project> {
    state
        .store
        .find_project(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

fn check_access(project: &Project, supplied: Option<&str>) -> AppResult<()> {
    if grants_access(project.access_password.as_deref(), supplied) {
        Ok(())
    } else {
        tracing::debug!(project_id = %project.id, "Access password rejected");
        Err(AppError::Core(CoreError::Unauthorized(
            "Incorrect access password".into(),
        )))
    }
}

async fn tracking(
    state: &AppState,
    project: &Project,
    profile: Option<&Profile>,
) -> AppResult<ClientTracking> {
    let teasers = state.store.list_teasers(project.id).await?;
    Ok(ClientTracking::build(
        project,
        studio_name(profile),
        &project_config(project, profile),
        &teasers,
    ))
}

fn studio_name(profile: Option<&Profile>) -> String {
    profile.map(|p| p.studio_name.clone()).unwrap_or_default()
}
