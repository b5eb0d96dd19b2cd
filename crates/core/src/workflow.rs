//! Workflow definition: stage steps and the ordered stages configuration.
//!
//! A [`StagesConfiguration`] is an immutable value. Editing happens on a
//! draft (see [`crate::editor`]) that produces a new configuration on
//! commit, so a project snapshot and the studio default can never alias
//! each other.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of steps in a single configuration.
pub const MAX_STEPS: usize = 50;

/// Placeholder label for a freshly added step.
pub const NEW_STEP_LABEL: &str = "Nouvelle étape";

/// Placeholder status message for a freshly added step.
pub const NEW_STEP_MESSAGE: &str = "En attente";

/// Placeholder internal content for a freshly added step.
pub const NEW_STEP_CONTENT: &str = "Description de cette étape...";

/// Default expected duration bounds for a freshly added step.
pub const NEW_STEP_MIN_DAYS: u32 = 1;
pub const NEW_STEP_MAX_DAYS: u32 = 2;

/// Prefix of generated step ids (`step_<unix-millis>`).
pub const STEP_ID_PREFIX: &str = "step_";

// ---------------------------------------------------------------------------
// WorkflowStep
// ---------------------------------------------------------------------------

/// One stage of a delivery workflow.
///
/// Serialized with camelCase keys, the layout of the persisted
/// `stages_config` JSON blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub message: String,
    /// Client-facing note. `None` means "no note", distinct from `Some("")`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub min_days: u32,
    #[serde(default)]
    pub max_days: u32,
    /// Internal notes, editable on paid plans only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl WorkflowStep {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
        min_days: u32,
        max_days: u32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            message: message.into(),
            description: None,
            min_days,
            max_days,
            content: None,
        }
    }

    /// A placeholder step as created by "add step" in the editor.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: NEW_STEP_LABEL.to_string(),
            message: NEW_STEP_MESSAGE.to_string(),
            description: Some(String::new()),
            min_days: NEW_STEP_MIN_DAYS,
            max_days: NEW_STEP_MAX_DAYS,
            content: Some(NEW_STEP_CONTENT.to_string()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

// ---------------------------------------------------------------------------
// StagesConfiguration
// ---------------------------------------------------------------------------

/// Ordered list of steps. Index 0 is the first stage, the last index is the
/// terminal stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagesConfiguration(Vec<WorkflowStep>);

impl StagesConfiguration {
    pub fn new(steps: Vec<WorkflowStep>) -> Self {
        Self(steps)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.0
    }

    pub fn into_steps(self) -> Vec<WorkflowStep> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkflowStep> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&WorkflowStep> {
        self.0.first()
    }

    /// Index of the terminal stage, `None` when empty.
    pub fn last_index(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    /// Position of the first step with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|s| s.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&WorkflowStep> {
        self.0.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.id.as_str())
    }

    /// Ids that appear more than once, in order of their second occurrence.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for id in self.ids() {
            if !seen.insert(id) && !dups.iter().any(|d: &String| d.as_str() == id) {
                dups.push(id.to_string());
            }
        }
        dups
    }

    /// Reject configurations with repeated ids.
    pub fn validate_unique_ids(&self) -> Result<(), CoreError> {
        let dups = self.duplicate_ids();
        if dups.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Duplicate workflow step ids: {}",
                dups.join(", ")
            )))
        }
    }

    /// Structural validation: non-empty unique ids, bounded length.
    ///
    /// An empty configuration passes; use [`Self::validate_as_studio_default`]
    /// where it would become the only configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.0.len() > MAX_STEPS {
            return Err(CoreError::Validation(format!(
                "Workflow has {} steps, maximum is {MAX_STEPS}",
                self.0.len()
            )));
        }
        if self.0.iter().any(|s| s.id.trim().is_empty()) {
            return Err(CoreError::Validation(
                "Workflow step ids must not be empty".to_string(),
            ));
        }
        self.validate_unique_ids()
    }

    /// Validation for the studio default, which must never be empty.
    pub fn validate_as_studio_default(&self) -> Result<(), CoreError> {
        if self.0.is_empty() {
            return Err(CoreError::Validation(
                "The studio workflow must contain at least one step".to_string(),
            ));
        }
        self.validate()
    }

    /// Assign fresh ids to blank ids and to every repeat of an earlier id.
    ///
    /// The first occurrence of an id keeps it. Returns the repaired
    /// configuration and the `(old, new)` id pairs that were reassigned.
    pub fn repaired(self, now_ms: i64) -> (Self, Vec<(String, String)>) {
        let mut taken: HashSet<String> = self.ids().map(str::to_string).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut renamed = Vec::new();
        let mut steps = self.0;

        for step in &mut steps {
            if !step.id.trim().is_empty() && seen.insert(step.id.clone()) {
                continue;
            }
            let fresh = fresh_step_id(taken.iter().map(String::as_str), now_ms);
            taken.insert(fresh.clone());
            seen.insert(fresh.clone());
            renamed.push((std::mem::replace(&mut step.id, fresh.clone()), fresh));
        }

        (Self(steps), renamed)
    }
}

impl From<Vec<WorkflowStep>> for StagesConfiguration {
    fn from(steps: Vec<WorkflowStep>) -> Self {
        Self(steps)
    }
}

// ---------------------------------------------------------------------------
// Built-in default
// ---------------------------------------------------------------------------

/// The built-in five-stage photography workflow.
pub fn default_stages() -> StagesConfiguration {
    StagesConfiguration(vec![
        WorkflowStep::new("secured", "Sécurisation des fichiers", "Projet commencé", 0, 1),
        WorkflowStep::new("culling", "Tri", "Création en cours", 2, 5),
        WorkflowStep::new("editing", "Retouche", "C'est Ici que la magie opère", 7, 21),
        WorkflowStep::new("export", "Export & Vérification", "Finitions", 1, 3),
        WorkflowStep::new("delivery", "Livraison", "Prêt à être livré", 0, 1),
    ])
}

/// Default internal content for the well-known built-in step ids.
pub fn default_step_content(id: &str) -> Option<&'static str> {
    match id {
        "secured" => Some(
            "Sauvegarde et organisation des fichiers\n\
             Préparation de l’espace de travail\n\
             Vérification de l’intégrité des données\n\
             Cette phase garantit la sécurité et la fiabilité des fichiers avant toute modification",
        ),
        "culling" => Some(
            "Sélection des images\n\
             Affinage de la série\n\
             Choix des moments clés\n\
             Cette étape permet de construire une sélection cohérente avant le travail créatif.",
        ),
        "editing" => Some(
            "Harmonisation des couleurs\n\
             Ajustement des lumières\n\
             Affinage des détails\n\
             Cohérence visuelle de la série\n\
             Cette phase demande précision et attention pour garantir un rendu homogène sur l’ensemble du projet.",
        ),
        "export" => Some(
            "Vérifications finales\n\
             Optimisation des fichiers\n\
             Contrôle qualité\n\
             Cette étape assure que chaque fichier respecte les standards de qualité avant livraison.",
        ),
        "delivery" => Some(
            "Préparation des fichiers\n\
             Mise à disposition\n\
             Finalisation du projet\n\
             Les fichiers sont en cours de préparation pour une livraison complète et soignée.",
        ),
        _ => None,
    }
}

/// Generate a time-based step id that is not in `existing`.
///
/// Starts at `step_<now_ms>` and bumps the millisecond component until the
/// id is free.
pub fn fresh_step_id<'a>(existing: impl Iterator<Item = &'a str>, now_ms: i64) -> String {
    let taken: HashSet<&str> = existing.collect();
    let mut millis = now_ms;
    loop {
        let candidate = format!("{STEP_ID_PREFIX}{millis}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        millis += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
