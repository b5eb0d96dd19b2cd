//! Client activity: view tracking and the public tracking link.

use crate::types::{EntityId, Timestamp};

/// Whether the client has opened the tracking page since the last stage
/// update, which the studio dashboard surfaces as a notification.
pub fn has_unread_view(client_last_viewed_at: Option<Timestamp>, last_update: Timestamp) -> bool {
    client_last_viewed_at.is_some_and(|viewed| viewed > last_update)
}

/// Only views by someone other than the owner count as client views.
pub fn should_record_client_view(viewer: Option<EntityId>, owner: EntityId) -> bool {
    viewer != Some(owner)
}

/// `<origin>/#/v/<project>`
pub fn tracking_link(public_origin: &str, project_id: EntityId) -> String {
    format!("{}/#/v/{project_id}", public_origin.trim_end_matches('/'))
}
