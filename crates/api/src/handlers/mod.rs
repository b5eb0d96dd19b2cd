//! HTTP handlers, one module per resource.

pub mod project;
pub mod public;
pub mod stage;
pub mod studio;
pub mod teaser;
pub mod workflow;

use peekit_core::error::CoreError;
use peekit_core::plan::Plan;
use peekit_core::source::effective_config;
use peekit_core::types::EntityId;
use peekit_core::workflow::{default_stages, StagesConfiguration};
use peekit_db::models::profile::Profile;
use peekit_db::models::project::Project;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Load a project owned by `user`. Projects of other studios are reported
/// as not found.
pub(crate) async fn owned_project(
    state: &AppState,
    user: &AuthUser,
    id: EntityId,
) -> AppResult<Project> {
    state
        .store
        .find_project(id)
        .await?
        .filter(|p| p.user_id == user.user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

pub(crate) async fn find_profile(state: &AppState, user_id: EntityId) -> AppResult<Option<Profile>> {
    Ok(state.store.find_profile(user_id).await?)
}

pub(crate) async fn require_profile(state: &AppState, user_id: EntityId) -> AppResult<Profile> {
    find_profile(state, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id: user_id,
        }))
}

/// The studio's current default: its saved workflow, else the built-in one.
pub(crate) fn studio_default(profile: Option<&Profile>) -> StagesConfiguration {
    profile
        .and_then(Profile::studio_stages)
        .cloned()
        .unwrap_or_else(default_stages)
}

pub(crate) fn plan_of(profile: Option<&Profile>) -> Plan {
    profile.map(Profile::plan).unwrap_or_default()
}

/// Effective configuration of `project` given its owner's profile.
pub(crate) fn project_config(project: &Project, profile: Option<&Profile>) -> StagesConfiguration {
    effective_config(&project.stage_source(), Some(&studio_default(profile)))
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
