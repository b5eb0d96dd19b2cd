//! Where a project's stage list comes from, and effective-configuration
//! resolution.

use serde::{Deserialize, Serialize};

use crate::workflow::StagesConfiguration;

/// A project either tracks the studio default live or owns a snapshot.
///
/// Persisted as the nullable `projects.stages_config` column: `NULL` is
/// [`StageSource::StudioDefault`], an array is [`StageSource::Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "steps", rename_all = "snake_case")]
pub enum StageSource {
    StudioDefault,
    Snapshot(StagesConfiguration),
}

impl StageSource {
    /// Build from the nullable column value.
    pub fn from_column(column: Option<StagesConfiguration>) -> Self {
        match column {
            Some(config) => Self::Snapshot(config),
            None => Self::StudioDefault,
        }
    }

    /// The value to write to the nullable column.
    pub fn into_column(self) -> Option<StagesConfiguration> {
        match self {
            Self::StudioDefault => None,
            Self::Snapshot(config) => Some(config),
        }
    }

    /// Source for a committed project-level override.
    ///
    /// An empty override means the project goes back to tracking the live
    /// studio default.
    pub fn from_override(config: StagesConfiguration) -> Self {
        if config.is_empty() {
            Self::StudioDefault
        } else {
            Self::Snapshot(config)
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }
}

/// Resolve the configuration actually used for a project.
///
/// A non-empty snapshot wins; otherwise the studio default; otherwise an
/// empty configuration, which renders as "unknown / 0%".
pub fn effective_config(
    source: &StageSource,
    studio_default: Option<&StagesConfiguration>,
) -> StagesConfiguration {
    match source {
        StageSource::Snapshot(config) if !config.is_empty() => config.clone(),
        _ => studio_default.cloned().unwrap_or_default(),
    }
}
