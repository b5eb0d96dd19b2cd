//! Studio plan tiers and the limits they gate.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of teasers per project on the free plan.
pub const DISCOVERY_TEASER_LIMIT: usize = 3;

/// Subscription tier of a studio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Discovery,
    Pro,
    Agency,
}

impl Plan {
    /// Parse a plan string from the database.
    ///
    /// The legacy `freelance` tier reads as `discovery`.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "discovery" | "freelance" => Ok(Self::Discovery),
            "pro" => Ok(Self::Pro),
            "agency" => Ok(Self::Agency),
            _ => Err(CoreError::Validation(format!(
                "Invalid plan '{s}'. Must be one of: discovery, pro, agency"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Pro => "pro",
            Self::Agency => "agency",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Discovery)
    }

    /// Internal step content is a paid feature.
    pub fn can_edit_step_content(&self) -> bool {
        self.is_paid()
    }

    /// Alerts when a client opens the tracking page.
    pub fn has_view_notifications(&self) -> bool {
        self.is_paid()
    }

    /// Per-project teaser cap, `None` when unlimited.
    pub fn teaser_limit(&self) -> Option<usize> {
        match self {
            Self::Discovery => Some(DISCOVERY_TEASER_LIMIT),
            Self::Pro | Self::Agency => None,
        }
    }
}

/// Check that adding `incoming` teasers to a project holding `existing`
/// stays within the plan's cap.
pub fn check_teaser_quota(plan: Plan, existing: usize, incoming: usize) -> Result<(), CoreError> {
    match plan.teaser_limit() {
        Some(limit) if existing + incoming > limit => Err(CoreError::Forbidden(format!(
            "The {} plan is limited to {limit} files per project",
            plan.as_str()
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_from_str_valid() {
        assert_eq!(Plan::from_str_db("discovery").unwrap(), Plan::Discovery);
        assert_eq!(Plan::from_str_db("pro").unwrap(), Plan::Pro);
        assert_eq!(Plan::from_str_db("agency").unwrap(), Plan::Agency);
    }

    #[test]
    fn legacy_freelance_is_discovery() {
        assert_eq!(Plan::from_str_db("freelance").unwrap(), Plan::Discovery);
    }

    #[test]
    fn plan_from_str_invalid() {
        assert!(Plan::from_str_db("gold").is_err());
        assert!(Plan::from_str_db("").is_err());
    }

    #[test]
    fn plan_as_str_roundtrip() {
        for plan in [Plan::Discovery, Plan::Pro, Plan::Agency] {
            assert_eq!(Plan::from_str_db(plan.as_str()).unwrap(), plan);
        }
    }

    #[test]
    fn content_editing_is_paid_only() {
        assert!(!Plan::Discovery.can_edit_step_content());
        assert!(Plan::Pro.can_edit_step_content());
        assert!(Plan::Agency.can_edit_step_content());
    }

    #[test]
    fn view_notifications_are_paid_only() {
        assert!(!Plan::Discovery.has_view_notifications());
        assert!(Plan::Pro.has_view_notifications());
        assert!(Plan::Agency.has_view_notifications());
    }

    #[test]
    fn discovery_teaser_quota() {
        assert!(check_teaser_quota(Plan::Discovery, 0, 3).is_ok());
        assert!(check_teaser_quota(Plan::Discovery, 2, 1).is_ok());
        assert!(check_teaser_quota(Plan::Discovery, 2, 2).is_err());
        assert!(check_teaser_quota(Plan::Pro, 100, 100).is_ok());
    }
}
