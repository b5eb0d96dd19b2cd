pub mod health;
pub mod project;
pub mod public;
pub mod studio;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /studio                                        profile (get), account (delete)
/// /studio/onboarding                             create profile (POST)
/// /studio/notifications                          unread client views
/// /studio/workflow                               studio default (get, put)
/// /studio/workflow/reset                         reset to built-in (POST)
/// /studio/workflow/steps/{step_id}               remove step (DELETE)
///
/// /projects                                      list, create
/// /projects/{id}                                 get, update, delete
/// /projects/{id}/password                        set or clear gate (PUT)
/// /projects/{id}/cover                           upload cover (POST, multipart)
/// /projects/{id}/cover/focal-point               set focal point (PUT)
/// /projects/{id}/stages/{step_id}/activate       activate a stage (POST)
/// /projects/{id}/stages/advance                  advance current stage (POST)
/// /projects/{id}/stages/finalize                 mark delivered (POST)
/// /projects/{id}/workflow                        save override (PUT)
/// /projects/{id}/workflow/reset                  reset override (POST)
/// /projects/{id}/workflow/steps/{step_id}        remove step (DELETE)
/// /projects/{id}/teasers                         list, upload (multipart)
/// /projects/{id}/teasers/{teaser_id}             delete
///
/// /public/projects/{id}                          tracking view or locked gate
/// /public/projects/{id}/unlock                   unlock with password (POST)
/// /public/projects/{id}/downloads                download manifest
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/studio", studio::router())
        .nest("/projects", project::router())
        // Client-facing, no session required.
        .nest("/public", public::router())
}
