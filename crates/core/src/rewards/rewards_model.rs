//! Patient reward domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cooldown::CooldownRule;
use crate::errors::{Error, Result};

/// Actions a patient can be rewarded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientAction {
    Task,
    Journal,
    Meditation,
    Mood,
}

impl PatientAction {
    pub const ALL: [PatientAction; 4] = [
        PatientAction::Task,
        PatientAction::Journal,
        PatientAction::Meditation,
        PatientAction::Mood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientAction::Task => "task",
            PatientAction::Journal => "journal",
            PatientAction::Meditation => "meditation",
            PatientAction::Mood => "mood",
        }
    }

    /// Cooldown gating XP for this action. Coins are never gated.
    pub fn cooldown_rule(&self) -> CooldownRule {
        match self {
            PatientAction::Task => CooldownRule::Unconditional,
            PatientAction::Journal => CooldownRule::Daily,
            PatientAction::Meditation => CooldownRule::Hourly,
            PatientAction::Mood => CooldownRule::Hourly,
        }
    }
}

impl fmt::Display for PatientAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PatientAction::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidAction(format!("unknown patient action '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(Error::InvalidAction(format!(
                "unknown task priority '{}'",
                other
            ))),
        }
    }
}

/// Optional parameters of a patient award.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardParams {
    pub priority: Option<TaskPriority>,
}

impl AwardParams {
    pub fn with_priority(priority: TaskPriority) -> Self {
        AwardParams {
            priority: Some(priority),
        }
    }
}

/// Base reward of one action, before cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub xp: i64,
    /// `None` for actions that never pay coins.
    pub coins: Option<i64>,
}

/// Static reward table. Priority is required for tasks and rejected otherwise.
pub fn reward_for(action: PatientAction, params: &AwardParams) -> Result<Reward> {
    match (action, params.priority) {
        (PatientAction::Task, Some(priority)) => {
            let amount = match priority {
                TaskPriority::Low => 10,
                TaskPriority::Medium => 20,
                TaskPriority::High => 30,
            };
            Ok(Reward {
                xp: amount,
                coins: Some(amount),
            })
        }
        (PatientAction::Task, None) => Err(Error::InvalidAction(
            "task awards require a priority".to_string(),
        )),
        (other, Some(priority)) => Err(Error::InvalidAction(format!(
            "priority '{}' is not valid for action '{}'",
            priority.as_str(),
            other
        ))),
        (PatientAction::Journal, None) => Ok(Reward {
            xp: 25,
            coins: Some(15),
        }),
        (PatientAction::Meditation, None) => Ok(Reward {
            xp: 20,
            coins: Some(10),
        }),
        (PatientAction::Mood, None) => Ok(Reward { xp: 10, coins: None }),
    }
}

/// Progression state stored on the patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProgression {
    pub actor_id: String,
    pub experience: i64,
    pub level: i32,
    pub coins: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub last_task_xp_at: Option<DateTime<Utc>>,
    pub last_journal_xp_at: Option<DateTime<Utc>>,
    pub last_meditation_xp_at: Option<DateTime<Utc>>,
    pub last_mood_xp_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token; the stored row's version at read time.
    pub version: i64,
}

impl PatientProgression {
    /// Fresh state for a newly registered patient.
    pub fn new(actor_id: impl Into<String>) -> Self {
        PatientProgression {
            actor_id: actor_id.into(),
            experience: 0,
            level: 1,
            coins: 0,
            current_streak: 0,
            longest_streak: 0,
            last_activity_at: None,
            last_task_xp_at: None,
            last_journal_xp_at: None,
            last_meditation_xp_at: None,
            last_mood_xp_at: None,
            version: 0,
        }
    }

    pub fn last_xp_award_at(&self, action: PatientAction) -> Option<DateTime<Utc>> {
        match action {
            PatientAction::Task => self.last_task_xp_at,
            PatientAction::Journal => self.last_journal_xp_at,
            PatientAction::Meditation => self.last_meditation_xp_at,
            PatientAction::Mood => self.last_mood_xp_at,
        }
    }

    pub fn stamp_xp_award(&mut self, action: PatientAction, at: DateTime<Utc>) {
        let slot = match action {
            PatientAction::Task => &mut self.last_task_xp_at,
            PatientAction::Journal => &mut self.last_journal_xp_at,
            PatientAction::Meditation => &mut self.last_meditation_xp_at,
            PatientAction::Mood => &mut self.last_mood_xp_at,
        };
        *slot = Some(at);
    }

    /// Zeroes every counter and timestamp, keeping identity and version.
    pub fn reset(&mut self) {
        let version = self.version;
        *self = PatientProgression::new(std::mem::take(&mut self.actor_id));
        self.version = version;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakInfo {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub changed: bool,
}

/// What one award call changed. Returned to the caller, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardEvent {
    pub actor_id: String,
    pub action: String,
    pub xp_awarded: i64,
    pub coins_awarded: Option<i64>,
    pub previous_level: i32,
    pub new_experience: i64,
    pub new_level: i32,
    pub level_up: bool,
    pub streak: StreakInfo,
}
