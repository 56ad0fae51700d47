//! Payer model
//!
//! An insurance organization and the prior-authorization rules it applies.
//! Payers are read-only for the intake workflow: they are loaded from a
//! catalog at start-up and never mutated.

use serde::{Deserialize, Serialize};

/// Insurance payer with its authorization rules
///
/// Field names on the wire stay snake_case (`portal_url`, `auth_required`,
/// `turnaround_days`) to match the catalog format the dashboard consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    /// Unique payer identifier (e.g., "bcbs-tx")
    pub id: String,

    /// Display name
    pub name: String,

    /// Region codes served (e.g., "TX")
    #[serde(default)]
    pub states: Vec<String>,

    /// Plan-type labels (e.g., "PPO", "HMO")
    #[serde(default)]
    pub plans: Vec<String>,

    /// Provider services phone number
    #[serde(default)]
    pub phone: String,

    /// Authorization portal URL
    #[serde(default)]
    pub portal_url: String,

    /// Whether prior authorization is required
    pub auth_required: bool,

    /// Expected turnaround for a decision, in days
    #[serde(default)]
    pub turnaround_days: u32,

    /// Specialties covered by the payer's rules
    #[serde(default)]
    pub specialties: Vec<String>,

    /// Free-text notes about the payer's process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Payer {
    /// Case-insensitive membership test against `states`
    pub fn serves_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s.eq_ignore_ascii_case(state))
    }

    /// Case-insensitive membership test against `plans`
    pub fn offers_plan(&self, plan: &str) -> bool {
        self.plans.iter().any(|p| p.eq_ignore_ascii_case(plan))
    }

    /// Case-insensitive substring match against name and notes
    ///
    /// `needle_lower` must already be lowercase.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(needle_lower))
    }
}
