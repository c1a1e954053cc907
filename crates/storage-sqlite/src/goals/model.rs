//! Database models for goals.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use mindquest_core::goals::{Goal, GoalCategory, GoalStatus, NewGoal};

use crate::errors::StorageError;

/// Database model for goals
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub category: String,
    pub unit: String,
    pub current_value: f64,
    pub target_value: f64,
    pub status: String,
    pub deadline: Option<NaiveDate>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for creating a new goal
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct NewGoalDB {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub category: String,
    pub unit: String,
    pub current_value: f64,
    pub target_value: f64,
    pub status: String,
    pub deadline: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewGoalDB {
    pub fn from_domain(domain: NewGoal, id: String, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            owner_id: domain.owner_id,
            title: domain.title.trim().to_string(),
            category: domain.category.as_str().to_string(),
            unit: domain.unit,
            current_value: 0.0,
            target_value: domain.target_value,
            status: GoalStatus::Active.as_str().to_string(),
            deadline: domain.deadline,
            created_at,
            updated_at: created_at,
        }
    }
}

fn parse_status(value: &str) -> Result<GoalStatus, StorageError> {
    match value {
        "active" => Ok(GoalStatus::Active),
        "completed" => Ok(GoalStatus::Completed),
        other => Err(StorageError::InvalidValue(format!(
            "unknown goal status '{}'",
            other
        ))),
    }
}

impl TryFrom<GoalDB> for Goal {
    type Error = StorageError;

    fn try_from(db: GoalDB) -> Result<Self, StorageError> {
        let category = GoalCategory::from_str(&db.category)
            .map_err(|e| StorageError::InvalidValue(e.to_string()))?;
        Ok(Self {
            status: parse_status(&db.status)?,
            id: db.id,
            owner_id: db.owner_id,
            title: db.title,
            category,
            unit: db.unit,
            current_value: db.current_value,
            target_value: db.target_value,
            deadline: db.deadline,
            completed_at: db.completed_at.map(|t| t.and_utc()),
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        })
    }
}
