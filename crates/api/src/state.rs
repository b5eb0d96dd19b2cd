use std::sync::Arc;

use peekit_db::store::StudioStore;

use crate::config::ServerConfig;
use crate::storage::BlobStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Project, teaser and profile persistence.
    pub store: Arc<dyn StudioStore>,
    /// Cover and teaser file storage.
    pub storage: Arc<dyn BlobStorage>,
    pub config: Arc<ServerConfig>,
}
