//! Project entity model and DTOs.

use chrono::NaiveDate;
use peekit_core::media::FocalPoint;
use peekit_core::source::StageSource;
use peekit_core::transition::StageRecord;
use peekit_core::types::{EntityId, Timestamp};
use peekit_core::workflow::StagesConfiguration;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::{Validate, ValidateEmail, ValidationError};

/// Stage id stored when a project is created from an empty workflow.
pub const FALLBACK_STAGE_ID: &str = "secured";

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: EntityId,
    pub user_id: EntityId,
    pub client_name: String,
    pub client_email: String,
    pub secondary_email: Option<String>,
    pub project_type: String,
    pub date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub location: String,
    pub cover_image: Option<String>,
    pub cover_focal_x: Option<f32>,
    pub cover_focal_y: Option<f32>,
    pub current_stage: String,
    pub is_finalized: bool,
    pub stages_config: Option<Json<StagesConfiguration>>,
    pub access_password: Option<String>,
    pub last_update: Timestamp,
    pub client_last_viewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn stage_source(&self) -> StageSource {
        StageSource::from_column(self.stages_config.as_ref().map(|c| c.0.clone()))
    }

    pub fn stage_record(&self) -> StageRecord {
        StageRecord {
            current_stage: self.current_stage.clone(),
            is_finalized: self.is_finalized,
        }
    }

    /// Cover focal point, defaulting to the centre.
    pub fn focal_point(&self) -> FocalPoint {
        match (self.cover_focal_x, self.cover_focal_y) {
            (Some(x), Some(y)) => FocalPoint { x, y },
            _ => FocalPoint::default(),
        }
    }
}

/// An empty secondary e-mail means "none".
fn email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

/// DTO for creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub client_name: String,
    #[validate(email)]
    pub client_email: String,
    #[validate(custom(function = "email_or_empty"))]
    pub secondary_email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub project_type: String,
    pub date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,
    /// Explicit workflow for this project instead of the studio default.
    pub stages_config: Option<StagesConfiguration>,
}

/// DTO for editing project info. Only non-`None` fields are applied; an
/// empty `secondary_email` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub client_name: Option<String>,
    #[validate(email)]
    pub client_email: Option<String>,
    #[validate(custom(function = "email_or_empty"))]
    pub secondary_email: Option<String>,
    #[validate(length(max = 100))]
    pub project_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// A fully resolved insert: owner, info and the initial stage state.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: EntityId,
    pub client_name: String,
    pub client_email: String,
    pub secondary_email: Option<String>,
    pub project_type: String,
    pub date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub location: String,
    pub current_stage: String,
    pub stages: StageSource,
}

impl NewProject {
    /// Build the insert for `input`, snapshotting `config` as the project's
    /// own workflow and placing it on the first stage.
    pub fn new(user_id: EntityId, input: CreateProject, config: StagesConfiguration) -> Self {
        let current_stage = StageRecord::initial(&config)
            .map(|r| r.current_stage)
            .unwrap_or_else(|| FALLBACK_STAGE_ID.to_string());
        Self {
            user_id,
            client_name: input.client_name,
            client_email: input.client_email,
            secondary_email: input.secondary_email.filter(|e| !e.is_empty()),
            project_type: input.project_type,
            date: input.date,
            expected_delivery_date: input.expected_delivery_date,
            location: input.location,
            current_stage,
            stages: StageSource::from_override(config),
        }
    }

    pub fn stages_column(&self) -> Option<Json<StagesConfiguration>> {
        self.stages.clone().into_column().map(Json)
    }
}
