//! Database models for patient progression.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use mindquest_core::rewards::PatientProgression;

/// Database model for the patient progression row
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::patient_progressions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PatientProgressionDB {
    pub actor_id: String,
    pub experience: i64,
    pub level: i32,
    pub coins: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<NaiveDateTime>,
    pub last_task_xp_at: Option<NaiveDateTime>,
    pub last_journal_xp_at: Option<NaiveDateTime>,
    pub last_meditation_xp_at: Option<NaiveDateTime>,
    pub last_mood_xp_at: Option<NaiveDateTime>,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Mutable columns written by a compare-and-swap save.
///
/// `None` timestamps are written as NULL so a reset clears them.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::patient_progressions)]
#[diesel(treat_none_as_null = true)]
pub struct PatientProgressionChangesetDB {
    pub experience: i64,
    pub level: i32,
    pub coins: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<NaiveDateTime>,
    pub last_task_xp_at: Option<NaiveDateTime>,
    pub last_journal_xp_at: Option<NaiveDateTime>,
    pub last_meditation_xp_at: Option<NaiveDateTime>,
    pub last_mood_xp_at: Option<NaiveDateTime>,
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

impl PatientProgressionDB {
    pub fn new_row(actor_id: &str, created_at: NaiveDateTime) -> Self {
        let fresh = PatientProgression::new(actor_id);
        PatientProgressionDB {
            actor_id: fresh.actor_id,
            experience: fresh.experience,
            level: fresh.level,
            coins: fresh.coins,
            current_streak: fresh.current_streak,
            longest_streak: fresh.longest_streak,
            last_activity_at: None,
            last_task_xp_at: None,
            last_journal_xp_at: None,
            last_meditation_xp_at: None,
            last_mood_xp_at: None,
            version: fresh.version,
            created_at,
            updated_at: created_at,
        }
    }
}

impl PatientProgressionChangesetDB {
    /// Changeset for `progression`, bumping its version by one.
    pub fn next_version(progression: &PatientProgression, updated_at: NaiveDateTime) -> Self {
        PatientProgressionChangesetDB {
            experience: progression.experience,
            level: progression.level,
            coins: progression.coins,
            current_streak: progression.current_streak,
            longest_streak: progression.longest_streak,
            last_activity_at: progression.last_activity_at.map(|t| t.naive_utc()),
            last_task_xp_at: progression.last_task_xp_at.map(|t| t.naive_utc()),
            last_journal_xp_at: progression.last_journal_xp_at.map(|t| t.naive_utc()),
            last_meditation_xp_at: progression.last_meditation_xp_at.map(|t| t.naive_utc()),
            last_mood_xp_at: progression.last_mood_xp_at.map(|t| t.naive_utc()),
            version: progression.version + 1,
            updated_at,
        }
    }
}

impl From<PatientProgressionDB> for PatientProgression {
    fn from(db: PatientProgressionDB) -> Self {
        Self {
            actor_id: db.actor_id,
            experience: db.experience,
            level: db.level,
            coins: db.coins,
            current_streak: db.current_streak,
            longest_streak: db.longest_streak,
            last_activity_at: db.last_activity_at.map(|t| t.and_utc()),
            last_task_xp_at: db.last_task_xp_at.map(|t| t.and_utc()),
            last_journal_xp_at: db.last_journal_xp_at.map(|t| t.and_utc()),
            last_meditation_xp_at: db.last_meditation_xp_at.map(|t| t.and_utc()),
            last_mood_xp_at: db.last_mood_xp_at.map(|t| t.and_utc()),
            version: db.version,
        }
    }
}
