//! Handlers for the `/projects` resource.
//!
//! Every route is scoped to the authenticated studio. Projects owned by
//! another studio read as not found.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use peekit_core::access::normalize_password;
use peekit_core::error::CoreError;
use peekit_core::media::{cover_path, FocalPoint};
use peekit_core::types::EntityId;
use peekit_db::models::profile::Profile;
use peekit_db::models::project::{CreateProject, NewProject, Project, UpdateProject};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::{find_profile, now_ms, owned_project, project_config, studio_default};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::{ProjectDetail, ProjectSummary};

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub password: Option<String>,
}

/// Build the owner detail payload, loading the project's teasers.
pub(crate) async fn project_detail(
    state: &AppState,
    project: &Project,
    profile: Option<&Profile>,
) -> AppResult<ProjectDetail> {
    let teasers = state.store.list_teasers(project.id).await?;
    Ok(ProjectDetail::build(
        project,
        project_config(project, profile),
        &teasers,
        &state.config.public_origin,
    ))
}

async fn reload(state: &AppState, user: &AuthUser, id: EntityId) -> AppResult<ProjectDetail> {
    let project = owned_project(state, user, id).await?;
    let profile = find_profile(state, user.user_id).await?;
    project_detail(state, &project, profile.as_ref()).await
}

/// GET /api/v1/projects
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectSummary>>>> {
    let profile = find_profile(&state, user.user_id).await?;
    let projects = state.store.list_projects(user.user_id).await?;
    let plan = profile.as_ref().map(Profile::plan).unwrap_or_default();
    let data = projects
        .iter()
        .map(|p| ProjectSummary::build(p, &project_config(p, profile.as_ref()), plan))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects
///
/// Without an explicit `stages_config` the project snapshots the studio's
/// current default workflow and starts on its first stage.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectDetail>>)> {
    input.validate()?;
    let profile = find_profile(&state, user.user_id).await?;

    let config = match input.stages_config.clone().filter(|c| !c.is_empty()) {
        Some(explicit) => {
            let (config, renamed) = explicit.repaired(now_ms());
            if !renamed.is_empty() {
                tracing::warn!(user_id = %user.user_id, ?renamed, "Reassigned duplicate step ids");
            }
            config.validate()?;
            config
        }
        None => studio_default(profile.as_ref()),
    };

    let project = state
        .store
        .create_project(&NewProject::new(user.user_id, input, config))
        .await?;
    tracing::info!(user_id = %user.user_id, project_id = %project.id, "Project created");

    let data = project_detail(&state, &project, profile.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let data = reload(&state, &user, id).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    input.validate()?;
    owned_project(&state, &user, id).await?;

    let project = state
        .store
        .update_project(id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    let profile = find_profile(&state, user.user_id).await?;
    let data = project_detail(&state, &project, profile.as_ref()).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project's teasers with it.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    owned_project(&state, &user, id).await?;
    state.store.delete_project(id).await?;
    tracing::info!(user_id = %user.user_id, project_id = %id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/projects/{id}/password
///
/// A blank or missing password removes the gate.
pub async fn set_password(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SetPasswordRequest>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    owned_project(&state, &user, id).await?;
    let password = normalize_password(input.password.as_deref());
    state
        .store
        .set_access_password(id, password.as_deref())
        .await?;
    tracing::info!(project_id = %id, locked = password.is_some(), "Access password updated");

    let data = reload(&state, &user, id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{id}/cover
///
/// Multipart form with a required `file` field and optional `focal_x` /
/// `focal_y` fields (percent). The focal point defaults to the centre.
pub async fn upload_cover(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    owned_project(&state, &user, id).await?;

    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut focal = FocalPoint::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("cover").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            "focal_x" | "focal_y" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let value: f32 = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid {name}: {text}")))?;
                if name == "focal_x" {
                    focal.x = value;
                } else {
                    focal.y = value;
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    focal.validate()?;

    let path = cover_path(user.user_id, &file_name);
    let url = state
        .storage
        .upload(&path, &data, content_type.as_deref())
        .await?;
    state.store.set_cover_image(id, &url, focal).await?;
    tracing::info!(project_id = %id, %path, "Cover uploaded");

    let data = reload(&state, &user, id).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/projects/{id}/cover/focal-point
pub async fn set_focal_point(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(focal): Json<FocalPoint>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    focal.validate()?;
    owned_project(&state, &user, id).await?;
    state.store.set_focal_point(id, focal).await?;

    let data = reload(&state, &user, id).await?;
    Ok(Json(DataResponse { data }))
}
