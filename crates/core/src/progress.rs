//! Stage progress calculator.
//!
//! The single source of progress math for both the owner editor and the
//! client tracker.

use serde::Serialize;

use crate::transition::Phase;
use crate::workflow::StagesConfiguration;

/// Label shown when there is no stage to describe.
pub const UNKNOWN_STAGE_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    /// 0-based position of the current stage (0 when unresolved).
    pub index: usize,
    /// Whole percent, 0..=100.
    pub percent: u8,
    pub label: String,
    pub message: String,
    /// Positioned on the last stage. Does not mean delivered.
    pub is_terminal: bool,
    /// The current stage id was found in the configuration.
    pub resolved: bool,
}

/// Progress of `current_stage_id` within `config`.
///
/// Never fails: an unknown id degrades to index 0, 0% and the first step's
/// label; an empty configuration to index 0, 0% and [`UNKNOWN_STAGE_LABEL`].
pub fn progress(config: &StagesConfiguration, current_stage_id: &str) -> StageProgress {
    match config.position(current_stage_id) {
        Some(index) => at_index(config, index),
        None => unresolved(config),
    }
}

/// Progress for an already resolved phase. Agrees with [`progress`] for
/// the record the phase was resolved from.
pub fn progress_for_phase(config: &StagesConfiguration, phase: &Phase) -> StageProgress {
    match phase {
        Phase::Unplaced => unresolved(config),
        _ if config.is_empty() => unresolved(config),
        _ => at_index(config, phase.display_index(config)),
    }
}

/// `round((index + 1) / len * 100)`, rounding halves up. 0 when `len == 0`.
pub fn percent_complete(index: usize, len: usize) -> u8 {
    if len == 0 {
        return 0;
    }
    let position = (index + 1).min(len);
    let rounded = (position * 200 + len) / (2 * len);
    rounded as u8
}

fn at_index(config: &StagesConfiguration, index: usize) -> StageProgress {
    let step = config.get(index);
    StageProgress {
        index,
        percent: percent_complete(index, config.len()),
        label: step.map(|s| s.label.clone()).unwrap_or_else(|| UNKNOWN_STAGE_LABEL.to_string()),
        message: step.map(|s| s.message.clone()).unwrap_or_default(),
        is_terminal: config.last_index() == Some(index),
        resolved: step.is_some(),
    }
}

fn unresolved(config: &StagesConfiguration) -> StageProgress {
    let first = config.first();
    StageProgress {
        index: 0,
        percent: 0,
        label: first
            .map(|s| s.label.clone())
            .unwrap_or_else(|| UNKNOWN_STAGE_LABEL.to_string()),
        message: first.map(|s| s.message.clone()).unwrap_or_default(),
        is_terminal: false,
        resolved: false,
    }
}
