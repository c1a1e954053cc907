use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use mindquest_core::errors::Error;
use mindquest_core::therapists::{TherapistProgression, TherapistProgressionRepositoryTrait};
use mindquest_core::Result;

use super::model::{TherapistProgressionChangesetDB, TherapistProgressionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::therapist_progressions;
use crate::schema::therapist_progressions::dsl::*;
use crate::utils::row_timestamp;

pub struct TherapistProgressionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TherapistProgressionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TherapistProgressionRepository { pool, writer }
    }
}

fn find_row(conn: &mut SqliteConnection, id: &str) -> Result<Option<TherapistProgressionDB>> {
    Ok(therapist_progressions
        .find(id)
        .select(TherapistProgressionDB::as_select())
        .first::<TherapistProgressionDB>(conn)
        .optional()
        .map_err(StorageError::from)?)
}

#[async_trait]
impl TherapistProgressionRepositoryTrait for TherapistProgressionRepository {
    fn get_therapist_progression(&self, id: &str) -> Result<Option<TherapistProgression>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(find_row(&mut conn, id)?.map(TherapistProgression::from))
    }

    async fn get_or_create_therapist_progression(
        &self,
        id: &str,
        created: DateTime<Utc>,
    ) -> Result<TherapistProgression> {
        if let Some(existing) = self.get_therapist_progression(id)? {
            return Ok(existing);
        }

        let id = id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TherapistProgression> {
                diesel::insert_into(therapist_progressions::table)
                    .values(TherapistProgressionDB::new_row(&id, created.naive_utc()))
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(StorageError::from)?;
                find_row(conn, &id)?
                    .map(TherapistProgression::from)
                    .ok_or_else(|| Error::NotFound(format!("therapist {}", id)))
            })
            .await
    }

    async fn save_therapist_progression(
        &self,
        progression: TherapistProgression,
    ) -> Result<TherapistProgression> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TherapistProgression> {
                let changes =
                    TherapistProgressionChangesetDB::next_version(&progression, row_timestamp());
                let updated = diesel::update(
                    therapist_progressions
                        .filter(actor_id.eq(&progression.actor_id))
                        .filter(version.eq(progression.version)),
                )
                .set(&changes)
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 0 {
                    return match find_row(conn, &progression.actor_id)? {
                        None => Err(Error::NotFound(format!(
                            "therapist {}",
                            progression.actor_id
                        ))),
                        Some(_) => Err(Error::ConcurrentModification(format!(
                            "therapist {} changed since version {}",
                            progression.actor_id, progression.version
                        ))),
                    };
                }

                find_row(conn, &progression.actor_id)?
                    .map(TherapistProgression::from)
                    .ok_or_else(|| Error::NotFound(format!("therapist {}", progression.actor_id)))
            })
            .await
    }
}
