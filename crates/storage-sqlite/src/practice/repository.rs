use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use mindquest_core::errors::Error;
use mindquest_core::practice::{FinancialEntry, PracticeFactsRepositoryTrait, SessionRecord};
use mindquest_core::Result;

use super::model::{FinancialEntryDB, SessionRecordDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{financial_entries, therapy_sessions};

/// Reads sessions and ledger entries for goal recalculation.
///
/// The scheduling and billing parts of the application own these tables;
/// `record_session` and `record_financial_entry` are the upsert hooks they
/// call.
pub struct PracticeFactsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PracticeFactsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PracticeFactsRepository { pool, writer }
    }

    pub async fn record_session(&self, session: SessionRecord) -> Result<()> {
        let row = SessionRecordDB::from(&session);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(therapy_sessions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    pub async fn record_financial_entry(&self, entry: FinancialEntry) -> Result<()> {
        let row = FinancialEntryDB::from(&entry);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(financial_entries::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

impl PracticeFactsRepositoryTrait for PracticeFactsRepository {
    fn get_sessions_in_window(
        &self,
        therapist: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>> {
        use crate::schema::therapy_sessions::dsl::*;

        let mut conn = get_connection(&self.pool)?;
        let rows = therapy_sessions
            .filter(therapist_id.eq(therapist))
            .filter(scheduled_at.ge(start.naive_utc()))
            .filter(scheduled_at.lt(end.naive_utc()))
            .order(scheduled_at.asc())
            .select(SessionRecordDB::as_select())
            .load::<SessionRecordDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| SessionRecord::try_from(row).map_err(Error::from))
            .collect()
    }

    fn get_financial_entries_in_window(
        &self,
        therapist: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FinancialEntry>> {
        use crate::schema::financial_entries::dsl::*;

        let mut conn = get_connection(&self.pool)?;
        let rows = financial_entries
            .filter(therapist_id.eq(therapist))
            .filter(occurred_at.ge(start.naive_utc()))
            .filter(occurred_at.lt(end.naive_utc()))
            .order(occurred_at.asc())
            .select(FinancialEntryDB::as_select())
            .load::<FinancialEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| FinancialEntry::try_from(row).map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, TestDb};
    use chrono::{Duration, TimeZone};
    use mindquest_core::practice::{EntryKind, SessionStatus};
    use rust_decimal_macros::dec;

    fn repo() -> (PracticeFactsRepository, TestDb) {
        let db = test_db();
        let repo = PracticeFactsRepository::new(Arc::clone(&db.pool), db.writer.clone());
        (repo, db)
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn session(session_id: &str, therapist: &str, at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            id: session_id.to_string(),
            therapist_id: therapist.to_string(),
            patient_id: "p1".to_string(),
            scheduled_at: at,
            status: SessionStatus::Completed,
            price: Some(dec!(85.50)),
        }
    }

    #[tokio::test]
    async fn test_session_window_is_half_open() {
        let (repo, _db) = repo();
        let end = start() + Duration::days(7);
        repo.record_session(session("before", "t1", start() - Duration::seconds(1)))
            .await
            .unwrap();
        repo.record_session(session("at-start", "t1", start())).await.unwrap();
        repo.record_session(session("inside", "t1", start() + Duration::days(2)))
            .await
            .unwrap();
        repo.record_session(session("at-end", "t1", end)).await.unwrap();
        repo.record_session(session("other", "t2", start() + Duration::days(2)))
            .await
            .unwrap();

        let ids: Vec<String> = repo
            .get_sessions_in_window("t1", start(), end)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["at-start".to_string(), "inside".to_string()]);
    }

    #[tokio::test]
    async fn test_recording_twice_replaces_the_row() {
        let (repo, _db) = repo();
        let mut s = session("s1", "t1", start() + Duration::hours(3));
        repo.record_session(s.clone()).await.unwrap();
        s.status = SessionStatus::NoShow;
        s.price = None;
        repo.record_session(s.clone()).await.unwrap();

        let stored = repo
            .get_sessions_in_window("t1", start(), start() + Duration::days(1))
            .unwrap();
        assert_eq!(stored, vec![s]);
    }

    #[tokio::test]
    async fn test_ledger_amounts_keep_precision() {
        let (repo, _db) = repo();
        let entry = FinancialEntry {
            id: "f1".to_string(),
            therapist_id: "t1".to_string(),
            kind: EntryKind::Income,
            amount: dec!(1234.5678),
            occurred_at: start() + Duration::hours(1),
        };
        repo.record_financial_entry(entry.clone()).await.unwrap();

        let stored = repo
            .get_financial_entries_in_window("t1", start(), start() + Duration::days(1))
            .unwrap();
        assert_eq!(stored, vec![entry]);
    }
}
