//! Route definitions for the public tracking page.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public`. No login required.
///
/// ```text
/// GET    /projects/{id}             -> get
/// POST   /projects/{id}/unlock      -> unlock
/// GET    /projects/{id}/downloads   -> downloads
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/{id}", get(public::get))
        .route("/projects/{id}/unlock", post(public::unlock))
        .route("/projects/{id}/downloads", get(public::downloads))
}
