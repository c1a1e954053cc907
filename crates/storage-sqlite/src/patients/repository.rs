use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use mindquest_core::errors::Error;
use mindquest_core::rewards::{PatientProgression, PatientProgressionRepositoryTrait};
use mindquest_core::Result;

use super::model::{PatientProgressionChangesetDB, PatientProgressionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::patient_progressions;
use crate::schema::patient_progressions::dsl::*;
use crate::utils::row_timestamp;

pub struct PatientProgressionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PatientProgressionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PatientProgressionRepository { pool, writer }
    }
}

fn find_row(conn: &mut SqliteConnection, id: &str) -> Result<Option<PatientProgressionDB>> {
    Ok(patient_progressions
        .find(id)
        .select(PatientProgressionDB::as_select())
        .first::<PatientProgressionDB>(conn)
        .optional()
        .map_err(StorageError::from)?)
}

#[async_trait]
impl PatientProgressionRepositoryTrait for PatientProgressionRepository {
    fn get_patient_progression(&self, id: &str) -> Result<Option<PatientProgression>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(find_row(&mut conn, id)?.map(PatientProgression::from))
    }

    async fn create_patient_progression(
        &self,
        id: &str,
        created: DateTime<Utc>,
    ) -> Result<PatientProgression> {
        let id = id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PatientProgression> {
                let inserted = diesel::insert_into(patient_progressions::table)
                    .values(PatientProgressionDB::new_row(&id, created.naive_utc()))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if inserted == 0 {
                    debug!("Patient progression {} already exists", id);
                }
                find_row(conn, &id)?
                    .map(PatientProgression::from)
                    .ok_or_else(|| Error::NotFound(format!("patient {}", id)))
            })
            .await
    }

    async fn save_patient_progression(
        &self,
        progression: PatientProgression,
    ) -> Result<PatientProgression> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PatientProgression> {
                let changes =
                    PatientProgressionChangesetDB::next_version(&progression, row_timestamp());
                let updated = diesel::update(
                    patient_progressions
                        .filter(actor_id.eq(&progression.actor_id))
                        .filter(version.eq(progression.version)),
                )
                .set(&changes)
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 0 {
                    return match find_row(conn, &progression.actor_id)? {
                        None => Err(Error::NotFound(format!("patient {}", progression.actor_id))),
                        Some(_) => Err(Error::ConcurrentModification(format!(
                            "patient {} changed since version {}",
                            progression.actor_id, progression.version
                        ))),
                    };
                }

                find_row(conn, &progression.actor_id)?
                    .map(PatientProgression::from)
                    .ok_or_else(|| Error::NotFound(format!("patient {}", progression.actor_id)))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use chrono::TimeZone;

    fn repo() -> (PatientProgressionRepository, crate::test_support::TestDb) {
        let db = test_db();
        let repo = PatientProgressionRepository::new(Arc::clone(&db.pool), db.writer.clone());
        (repo, db)
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, h, 15, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let (repo, _db) = repo();
        assert!(repo.get_patient_progression("p1").unwrap().is_none());

        let created = repo.create_patient_progression("p1", at(8)).await.unwrap();
        assert_eq!(created, PatientProgression::new("p1"));

        let mut saved = created.clone();
        saved.experience = 40;
        repo.save_patient_progression(saved).await.unwrap();

        let again = repo.create_patient_progression("p1", at(9)).await.unwrap();
        assert_eq!(again.experience, 40);
        assert_eq!(again.version, 1);
    }

    #[tokio::test]
    async fn test_save_round_trips_timestamps() {
        let (repo, _db) = repo();
        let mut row = repo.create_patient_progression("p1", at(8)).await.unwrap();
        row.experience = 130;
        row.level = 2;
        row.coins = 30;
        row.current_streak = 1;
        row.longest_streak = 1;
        row.last_activity_at = Some(at(10));
        row.last_task_xp_at = Some(at(10));

        let saved = repo.save_patient_progression(row.clone()).await.unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(saved.last_task_xp_at, Some(at(10)));
        assert_eq!(saved.coins, 30);
        assert_eq!(repo.get_patient_progression("p1").unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let (repo, _db) = repo();
        let read = repo.create_patient_progression("p1", at(8)).await.unwrap();

        let mut first = read.clone();
        first.experience = 10;
        repo.save_patient_progression(first).await.unwrap();

        let mut second = read;
        second.experience = 20;
        let err = repo.save_patient_progression(second).await.unwrap_err();
        assert!(matches!(err, Error::ConcurrentModification(_)));

        let stored = repo.get_patient_progression("p1").unwrap().unwrap();
        assert_eq!(stored.experience, 10);
    }

    #[tokio::test]
    async fn test_save_unknown_patient_is_not_found() {
        let (repo, _db) = repo();
        let err = repo
            .save_patient_progression(PatientProgression::new("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reset_clears_nullable_columns() {
        let (repo, _db) = repo();
        let mut row = repo.create_patient_progression("p1", at(8)).await.unwrap();
        row.last_mood_xp_at = Some(at(9));
        let mut saved = repo.save_patient_progression(row).await.unwrap();

        saved.reset();
        let cleared = repo.save_patient_progression(saved).await.unwrap();
        assert_eq!(cleared.last_mood_xp_at, None);
        assert_eq!(cleared.version, 2);
    }
}
