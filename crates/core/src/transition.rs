//! Stage transition engine.
//!
//! The stage state of a project is the explicit [`Phase`]. Being positioned
//! on the terminal stage and being delivered are different phases, so an
//! "on last stage, stale finalized flag" pair cannot be represented.
//!
//! Transition rules (owner-initiated only):
//!
//! | From            | Command                 | To / outcome                         |
//! |-----------------|-------------------------|--------------------------------------|
//! | `InProgress(i)` | activate `i`, i < last  | `InProgress(i + 1)`                  |
//! | `InProgress(i)` | activate `j`, j < i     | `InProgress(j)`                      |
//! | `InProgress(i)` | activate `j`, j > i     | rejected, forward skip               |
//! | `InProgress(l)` | activate `l` (terminal) | rejected, awaiting finalize          |
//! | `InProgress(l)` | finalize                | `Delivered`                          |
//! | `Delivered`     | activate `j`, j < last  | `InProgress(j)`                      |
//! | `Unplaced`      | activate `0`            | `InProgress(1)` (or `0` if only one) |

use serde::{Deserialize, Serialize};

use crate::workflow::StagesConfiguration;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Resolved stage state of a project against its effective configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum Phase {
    /// The stored stage id does not resolve, or the workflow is empty.
    /// Displayed as the first stage at 0%.
    Unplaced,
    /// Positioned on the stage at this index, not delivered.
    InProgress(usize),
    /// On the terminal stage and explicitly finalized.
    Delivered,
}

impl Phase {
    /// Phase of a newly created project.
    pub fn initial(config: &StagesConfiguration) -> Self {
        if config.is_empty() {
            Self::Unplaced
        } else {
            Self::InProgress(0)
        }
    }

    /// Resolve the persisted `(current_stage, is_finalized)` pair.
    ///
    /// A finalized flag on a non-terminal stage is ignored.
    pub fn resolve(config: &StagesConfiguration, current_stage: &str, is_finalized: bool) -> Self {
        match config.position(current_stage) {
            None => Self::Unplaced,
            Some(index) if is_finalized && Some(index) == config.last_index() => Self::Delivered,
            Some(index) => Self::InProgress(index),
        }
    }

    /// Index of the stage shown as current. `Unplaced` displays as 0.
    pub fn display_index(&self, config: &StagesConfiguration) -> usize {
        match self {
            Self::Unplaced => 0,
            Self::InProgress(index) => *index,
            Self::Delivered => config.last_index().unwrap_or(0),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn is_placed(&self) -> bool {
        !matches!(self, Self::Unplaced)
    }

    /// The persisted form of this phase. `None` for `Unplaced`.
    pub fn record(&self, config: &StagesConfiguration) -> Option<StageRecord> {
        match self {
            Self::Unplaced => None,
            Self::InProgress(index) => config.get(*index).map(|step| StageRecord {
                current_stage: step.id.clone(),
                is_finalized: false,
            }),
            Self::Delivered => config
                .last_index()
                .and_then(|last| config.get(last))
                .map(|step| StageRecord {
                    current_stage: step.id.clone(),
                    is_finalized: true,
                }),
        }
    }
}

// ---------------------------------------------------------------------------
// StageRecord
// ---------------------------------------------------------------------------

/// The stage columns persisted on a project row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub current_stage: String,
    pub is_finalized: bool,
}

impl StageRecord {
    /// Record for a new project: first stage, not finalized.
    pub fn initial(config: &StagesConfiguration) -> Option<Self> {
        Phase::initial(config).record(config)
    }

    pub fn phase(&self, config: &StagesConfiguration) -> Phase {
        Phase::resolve(config, &self.current_stage, self.is_finalized)
    }
}

// ---------------------------------------------------------------------------
// Commands and outcomes
// ---------------------------------------------------------------------------

/// An owner action on the stage list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", content = "stage_id", rename_all = "snake_case")]
pub enum StageCommand {
    /// Click on a stage row.
    Activate(String),
    /// "Mark the current stage done", same as activating the current row.
    Advance,
    /// "Mark project complete" on the terminal stage.
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Advanced,
    Regressed,
    Placed,
    Finalized,
}

/// An applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub from: Phase,
    pub to: Phase,
    /// What to persist.
    pub record: StageRecord,
}

/// Why a command was a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejected {
    #[error("The workflow has no stages")]
    EmptyWorkflow,

    #[error("Stage '{0}' is not part of this workflow")]
    UnknownStage(String),

    #[error("Stage '{0}' is ahead of the current stage; only the current stage can be advanced")]
    ForwardSkip(String),

    #[error("Already on the final stage; mark the project complete instead")]
    AwaitingFinalize,

    #[error("The project is already delivered")]
    AlreadyDelivered,

    #[error("Only the final stage can be marked complete")]
    NotOnFinalStage,
}

impl TransitionRejected {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyWorkflow => "empty_workflow",
            Self::UnknownStage(_) => "unknown_stage",
            Self::ForwardSkip(_) => "forward_skip",
            Self::AwaitingFinalize => "awaiting_finalize",
            Self::AlreadyDelivered => "already_delivered",
            Self::NotOnFinalStage => "not_on_final_stage",
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Apply a command to a phase. Pure; the caller persists `record`.
pub fn apply(
    config: &StagesConfiguration,
    from: Phase,
    command: &StageCommand,
) -> Result<Transition, TransitionRejected> {
    let last = config
        .last_index()
        .ok_or(TransitionRejected::EmptyWorkflow)?;

    match command {
        StageCommand::Activate(stage_id) => {
            let target = config
                .position(stage_id)
                .ok_or_else(|| TransitionRejected::UnknownStage(stage_id.clone()))?;
            activate(config, from, target, last)
        }
        StageCommand::Advance => match from {
            Phase::Delivered => Err(TransitionRejected::AlreadyDelivered),
            _ => activate(config, from, from.display_index(config), last),
        },
        StageCommand::Finalize => match from {
            Phase::InProgress(index) if index == last => {
                transition(config, TransitionKind::Finalized, from, Phase::Delivered)
            }
            Phase::Delivered => Err(TransitionRejected::AlreadyDelivered),
            _ => Err(TransitionRejected::NotOnFinalStage),
        },
    }
}

fn activate(
    config: &StagesConfiguration,
    from: Phase,
    target: usize,
    last: usize,
) -> Result<Transition, TransitionRejected> {
    let forward_skip = || TransitionRejected::ForwardSkip(stage_id(config, target));

    match from {
        Phase::Unplaced => {
            if target != 0 {
                return Err(forward_skip());
            }
            if last == 0 {
                transition(config, TransitionKind::Placed, from, Phase::InProgress(0))
            } else {
                transition(config, TransitionKind::Advanced, from, Phase::InProgress(1))
            }
        }
        Phase::InProgress(current) => {
            if target < current {
                transition(config, TransitionKind::Regressed, from, Phase::InProgress(target))
            } else if target > current {
                Err(forward_skip())
            } else if current < last {
                transition(config, TransitionKind::Advanced, from, Phase::InProgress(current + 1))
            } else {
                Err(TransitionRejected::AwaitingFinalize)
            }
        }
        Phase::Delivered => {
            if target < last {
                transition(config, TransitionKind::Regressed, from, Phase::InProgress(target))
            } else {
                Err(TransitionRejected::AlreadyDelivered)
            }
        }
    }
}

fn transition(
    config: &StagesConfiguration,
    kind: TransitionKind,
    from: Phase,
    to: Phase,
) -> Result<Transition, TransitionRejected> {
    let record = to.record(config).ok_or(TransitionRejected::EmptyWorkflow)?;
    Ok(Transition { kind, from, to, record })
}

fn stage_id(config: &StagesConfiguration, index: usize) -> String {
    config
        .get(index)
        .map(|s| s.id.clone())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
