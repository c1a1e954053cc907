//! Goals domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Schedule,
    Revenue,
    Retention,
    Expansion,
    ProfessionalDevelopment,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 5] = [
        GoalCategory::Schedule,
        GoalCategory::Revenue,
        GoalCategory::Retention,
        GoalCategory::Expansion,
        GoalCategory::ProfessionalDevelopment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Schedule => "schedule",
            GoalCategory::Revenue => "revenue",
            GoalCategory::Retention => "retention",
            GoalCategory::Expansion => "expansion",
            GoalCategory::ProfessionalDevelopment => "professional_development",
        }
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GoalCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("unknown goal category '{}'", s)).into()
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
        }
    }
}

/// Domain model representing a practice goal of a therapist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub category: GoalCategory,
    /// Free-form unit, e.g. "sessions per week", "% attendance", "EUR monthly".
    /// Also selects the evaluation window.
    pub unit: String,
    pub current_value: f64,
    pub target_value: f64,
    pub status: GoalStatus,
    pub deadline: Option<NaiveDate>,
    /// Set once, when the goal first reaches its target.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub id: Option<String>,
    pub owner_id: String,
    pub title: String,
    pub category: GoalCategory,
    pub unit: String,
    pub target_value: f64,
    pub deadline: Option<NaiveDate>,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::MissingField("ownerId".to_string()).into());
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title".to_string()).into());
        }
        if !self.target_value.is_finite() || self.target_value <= 0.0 {
            return Err(ValidationError::InvalidInput(format!(
                "target value must be positive, got {}",
                self.target_value
            ))
            .into());
        }
        Ok(())
    }
}

/// Result of recalculating one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecalculation {
    pub id: String,
    pub previous_value: f64,
    pub current_value: f64,
    /// True only for the call that moved the goal into `completed`.
    pub completed: bool,
}
