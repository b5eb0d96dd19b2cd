//! Route definitions for the `/projects` resource.
//!
//! Stage transitions, the per-project workflow and teasers are nested
//! under `/projects/{id}/...`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{project, stage, teaser, workflow};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
/// PUT    /{id}/password                     -> set_password
/// POST   /{id}/cover                        -> upload_cover
/// PUT    /{id}/cover/focal-point            -> set_focal_point
///
/// POST   /{id}/stages/{step_id}/activate    -> activate
/// POST   /{id}/stages/advance               -> advance
/// POST   /{id}/stages/finalize              -> finalize
///
/// PUT    /{id}/workflow                     -> save_project
/// POST   /{id}/workflow/reset               -> reset_project
/// DELETE /{id}/workflow/steps/{step_id}     -> remove_project_step
///
/// GET    /{id}/teasers                      -> list
/// POST   /{id}/teasers                      -> upload
/// DELETE /{id}/teasers/{teaser_id}          -> delete
/// ```
pub fn router() -> Router<AppState> {
    let stage_routes = Router::new()
        .route("/{step_id}/activate", post(stage::activate))
        .route("/advance", post(stage::advance))
        .route("/finalize", post(stage::finalize));

    let workflow_routes = Router::new()
        .route("/", put(workflow::save_project))
        .route("/reset", post(workflow::reset_project))
        .route("/steps/{step_id}", delete(workflow::remove_project_step));

    let teaser_routes = Router::new()
        .route("/", get(teaser::list).post(teaser::upload))
        .route("/{teaser_id}", delete(teaser::delete));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/password", put(project::set_password))
        .route("/{id}/cover", post(project::upload_cover))
        .route("/{id}/cover/focal-point", put(project::set_focal_point))
        .nest("/{id}/stages", stage_routes)
        .nest("/{id}/workflow", workflow_routes)
        .nest("/{id}/teasers", teaser_routes)
}
