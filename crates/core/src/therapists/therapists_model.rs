//! Therapist progression domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Actions a therapist earns XP for. None of them is cooled down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TherapistAction {
    ReportCreated,
    SessionCompleted,
    TaskCreated,
    PatientOnboarded,
    GoalCompleted,
    DailyCheckIn,
}

/// Lifetime statistic bumped by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TherapistCounter {
    ReportsCreated,
    SessionsCompleted,
    TasksCreated,
    PatientsOnboarded,
    GoalsCompleted,
}

impl TherapistAction {
    pub const ALL: [TherapistAction; 6] = [
        TherapistAction::ReportCreated,
        TherapistAction::SessionCompleted,
        TherapistAction::TaskCreated,
        TherapistAction::PatientOnboarded,
        TherapistAction::GoalCompleted,
        TherapistAction::DailyCheckIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TherapistAction::ReportCreated => "report_created",
            TherapistAction::SessionCompleted => "session_completed",
            TherapistAction::TaskCreated => "task_created",
            TherapistAction::PatientOnboarded => "patient_onboarded",
            TherapistAction::GoalCompleted => "goal_completed",
            TherapistAction::DailyCheckIn => "daily_check_in",
        }
    }

    pub fn base_xp(&self) -> i64 {
        match self {
            TherapistAction::ReportCreated => 25,
            TherapistAction::SessionCompleted => 30,
            TherapistAction::TaskCreated => 10,
            TherapistAction::PatientOnboarded => 50,
            TherapistAction::GoalCompleted => 100,
            TherapistAction::DailyCheckIn => 5,
        }
    }

    pub fn counter(&self) -> Option<TherapistCounter> {
        match self {
            TherapistAction::ReportCreated => Some(TherapistCounter::ReportsCreated),
            TherapistAction::SessionCompleted => Some(TherapistCounter::SessionsCompleted),
            TherapistAction::TaskCreated => Some(TherapistCounter::TasksCreated),
            TherapistAction::PatientOnboarded => Some(TherapistCounter::PatientsOnboarded),
            TherapistAction::GoalCompleted => Some(TherapistCounter::GoalsCompleted),
            TherapistAction::DailyCheckIn => None,
        }
    }
}

impl fmt::Display for TherapistAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TherapistAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TherapistAction::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidAction(format!("unknown therapist action '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistCounters {
    pub reports_created: i64,
    pub sessions_completed: i64,
    pub tasks_created: i64,
    pub patients_onboarded: i64,
    pub goals_completed: i64,
}

impl TherapistCounters {
    pub fn increment(&mut self, counter: TherapistCounter) {
        let slot = match counter {
            TherapistCounter::ReportsCreated => &mut self.reports_created,
            TherapistCounter::SessionsCompleted => &mut self.sessions_completed,
            TherapistCounter::TasksCreated => &mut self.tasks_created,
            TherapistCounter::PatientsOnboarded => &mut self.patients_onboarded,
            TherapistCounter::GoalsCompleted => &mut self.goals_completed,
        };
        *slot += 1;
    }

    pub fn get(&self, counter: TherapistCounter) -> i64 {
        match counter {
            TherapistCounter::ReportsCreated => self.reports_created,
            TherapistCounter::SessionsCompleted => self.sessions_completed,
            TherapistCounter::TasksCreated => self.tasks_created,
            TherapistCounter::PatientsOnboarded => self.patients_onboarded,
            TherapistCounter::GoalsCompleted => self.goals_completed,
        }
    }
}

/// Therapist stats row, created lazily on the first award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistProgression {
    pub actor_id: String,
    pub experience: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub counters: TherapistCounters,
    pub version: i64,
}

impl TherapistProgression {
    pub fn new(actor_id: impl Into<String>) -> Self {
        TherapistProgression {
            actor_id: actor_id.into(),
            experience: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_at: None,
            counters: TherapistCounters::default(),
            version: 0,
        }
    }
}
