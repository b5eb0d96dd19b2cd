//! Route definitions for the authenticated studio.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{studio, workflow};
use crate::state::AppState;

/// Routes mounted at `/studio`.
///
/// ```text
/// GET    /                          -> get
/// DELETE /                          -> delete_account
/// POST   /onboarding                -> onboarding
/// GET    /notifications             -> notifications
/// GET    /workflow                  -> get_studio
/// PUT    /workflow                  -> save_studio
/// POST   /workflow/reset            -> reset_studio
/// DELETE /workflow/steps/{step_id}  -> remove_studio_step
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(studio::get).delete(studio::delete_account))
        .route("/onboarding", post(studio::onboarding))
        .route("/notifications", get(studio::notifications))
        .route(
            "/workflow",
            get(workflow::get_studio).put(workflow::save_studio),
        )
        .route("/workflow/reset", post(workflow::reset_studio))
        .route(
            "/workflow/steps/{step_id}",
            delete(workflow::remove_studio_step),
        )
}
