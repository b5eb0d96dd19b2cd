//! Studio profile model and DTOs.

use peekit_core::plan::Plan;
use peekit_core::types::{EntityId, Timestamp};
use peekit_core::workflow::StagesConfiguration;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub user_id: EntityId,
    pub studio_name: String,
    pub plan: String,
    pub onboarding_completed: bool,
    pub stages_config: Option<Json<StagesConfiguration>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    /// The studio's plan. Unrecognized values read as the free plan.
    pub fn plan(&self) -> Plan {
        Plan::from_str_db(&self.plan).unwrap_or_else(|e| {
            tracing::warn!(user_id = %self.user_id, plan = %self.plan, error = %e, "Unknown plan");
            Plan::Discovery
        })
    }

    /// The studio default workflow, if one has been saved and is non-empty.
    pub fn studio_stages(&self) -> Option<&StagesConfiguration> {
        self.stages_config
            .as_ref()
            .map(|c| &c.0)
            .filter(|c| !c.is_empty())
    }
}

/// DTO for creating or updating a profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpsertProfile {
    #[validate(length(min = 1, max = 200))]
    pub studio_name: String,
    pub plan: Option<Plan>,
    #[serde(default)]
    pub onboarding_completed: bool,
    pub stages_config: Option<StagesConfiguration>,
}
