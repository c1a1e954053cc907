//! Database models for therapist progression.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use mindquest_core::therapists::{TherapistCounters, TherapistProgression};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::therapist_progressions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TherapistProgressionDB {
    pub actor_id: String,
    pub experience: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<NaiveDateTime>,
    pub reports_created: i64,
    pub sessions_completed: i64,
    pub tasks_created: i64,
    pub patients_onboarded: i64,
    pub goals_completed: i64,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::therapist_progressions)]
#[diesel(treat_none_as_null = true)]
pub struct TherapistProgressionChangesetDB {
    pub experience: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<NaiveDateTime>,
    pub reports_created: i64,
    pub sessions_completed: i64,
    pub tasks_created: i64,
    pub patients_onboarded: i64,
    pub goals_completed: i64,
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

impl TherapistProgressionDB {
    pub fn new_row(actor_id: &str, created_at: NaiveDateTime) -> Self {
        let fresh = TherapistProgression::new(actor_id);
        TherapistProgressionDB {
            actor_id: fresh.actor_id,
            experience: fresh.experience,
            level: fresh.level,
            current_streak: fresh.current_streak,
            longest_streak: fresh.longest_streak,
            last_activity_at: None,
            reports_created: 0,
            sessions_completed: 0,
            tasks_created: 0,
            patients_onboarded: 0,
            goals_completed: 0,
            version: fresh.version,
            created_at,
            updated_at: created_at,
        }
    }
}

impl TherapistProgressionChangesetDB {
    pub fn next_version(progression: &TherapistProgression, updated_at: NaiveDateTime) -> Self {
        let counters = &progression.counters;
        TherapistProgressionChangesetDB {
            experience: progression.experience,
            level: progression.level,
            current_streak: progression.current_streak,
            longest_streak: progression.longest_streak,
            last_activity_at: progression.last_activity_at.map(|t| t.naive_utc()),
            reports_created: counters.reports_created,
            sessions_completed: counters.sessions_completed,
            tasks_created: counters.tasks_created,
            patients_onboarded: counters.patients_onboarded,
            goals_completed: counters.goals_completed,
            version: progression.version + 1,
            updated_at,
        }
    }
}

impl From<TherapistProgressionDB> for TherapistProgression {
    fn from(db: TherapistProgressionDB) -> Self {
        Self {
            actor_id: db.actor_id,
            experience: db.experience,
            level: db.level,
            current_streak: db.current_streak,
            longest_streak: db.longest_streak,
            last_activity_at: db.last_activity_at.map(|t| t.and_utc()),
            counters: TherapistCounters {
                reports_created: db.reports_created,
                sessions_completed: db.sessions_completed,
                tasks_created: db.tasks_created,
                patients_onboarded: db.patients_onboarded,
                goals_completed: db.goals_completed,
            },
            version: db.version,
        }
    }
}
