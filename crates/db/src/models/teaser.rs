//! Teaser (preview media) model and DTOs.

use peekit_core::media::TeaserKind;
use peekit_core::types::{EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `teasers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Teaser {
    pub id: EntityId,
    pub project_id: EntityId,
    pub user_id: EntityId,
    /// `image` or `video`, see [`TeaserKind`].
    pub kind: String,
    pub url: String,
    pub title: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Teaser {
    /// Unknown stored kinds read as images.
    pub fn teaser_kind(&self) -> TeaserKind {
        TeaserKind::from_str_db(&self.kind).unwrap_or(TeaserKind::Image)
    }
}

#[derive(Debug, Clone)]
pub struct NewTeaser {
    pub project_id: EntityId,
    pub user_id: EntityId,
    pub kind: TeaserKind,
    pub url: String,
    pub title: Option<String>,
}
