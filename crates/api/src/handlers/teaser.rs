//! Handlers for the `/projects/{id}/teasers` resource.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use peekit_core::error::CoreError;
use peekit_core::media::{teaser_path, TeaserKind};
use peekit_core::plan::check_teaser_quota;
use peekit_core::types::EntityId;
use peekit_db::models::teaser::NewTeaser;

use crate::error::{AppError, AppResult};
use crate::handlers::{find_profile, owned_project, plan_of};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::TeaserView;

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// GET /api/v1/projects/{id}/teasers
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<TeaserView>>>> {
    owned_project(&state, &user, id).await?;
    let teasers = state.store.list_teasers(id).await?;
    Ok(Json(DataResponse {
        data: teasers.iter().map(TeaserView::from).collect(),
    }))
}

/// POST /api/v1/projects/{id}/teasers
///
/// Multipart form with one or more `file` fields. The whole batch is
/// refused when it would exceed the plan's teaser limit. Files are stored
/// one after another in submission order.
pub async fn upload(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<TeaserView>>>)> {
    owned_project(&state, &user, id).await?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("teaser").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        files.push(UploadedFile {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }
    if files.is_empty() {
        return Err(AppError::BadRequest("Missing required 'file' field".into()));
    }

    let profile = find_profile(&state, user.user_id).await?;
    let existing = state.store.list_teasers(id).await?.len();
    check_teaser_quota(plan_of(profile.as_ref()), existing, files.len())?;

    let mut created = Vec::with_capacity(files.len());
    for file in files {
        let path = teaser_path(user.user_id, id, &file.file_name);
        let url = state
            .storage
            .upload(&path, &file.data, file.content_type.as_deref())
            .await?;
        let teaser = state
            .store
            .insert_teaser(&NewTeaser {
                project_id: id,
                user_id: user.user_id,
                kind: TeaserKind::from_content_type(file.content_type.as_deref()),
                url,
                title: Some(file.file_name),
            })
            .await?;
        tracing::info!(project_id = %id, teaser_id = %teaser.id, %path, "Teaser uploaded");
        created.push(TeaserView::from(&teaser));
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// DELETE /api/v1/projects/{id}/teasers/{teaser_id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, teaser_id)): Path<(EntityId, EntityId)>,
) -> AppResult<StatusCode> {
    owned_project(&state, &user, id).await?;
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Teaser",
            id: teaser_id,
        })
    };
    let teaser = state
        .store
        .find_teaser(teaser_id)
        .await?
        .filter(|t| t.project_id == id)
        .ok_or_else(not_found)?;

    if state.store.delete_teaser(teaser.id).await? {
        tracing::info!(project_id = %id, %teaser_id, "Teaser deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
