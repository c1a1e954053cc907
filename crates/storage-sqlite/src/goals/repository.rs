use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use mindquest_core::errors::Error;
use mindquest_core::goals::{Goal, GoalRepositoryTrait, GoalStatus, NewGoal};
use mindquest_core::Result;
use uuid::Uuid;

use super::model::{GoalDB, NewGoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::goals;
use crate::schema::goals::dsl::*;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

fn to_goals(rows: Vec<GoalDB>) -> Result<Vec<Goal>> {
    rows.into_iter()
        .map(|row| Goal::try_from(row).map_err(Error::from))
        .collect()
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let row = goals
            .find(goal_id)
            .select(GoalDB::as_select())
            .first::<GoalDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Goal::try_from).transpose()?)
    }

    fn load_goals_for_owner(&self, owner: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals
            .filter(owner_id.eq(owner))
            .order((created_at.asc(), id.asc()))
            .select(GoalDB::as_select())
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_goals(rows)
    }

    fn load_goal_owners(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(goals
            .filter(status.eq(GoalStatus::Active.as_str()))
            .select(owner_id)
            .distinct()
            .order(owner_id.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn insert_new_goal(&self, new_goal: NewGoal, created: DateTime<Utc>) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let goal_id = new_goal
                    .id
                    .clone()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let row = NewGoalDB::from_domain(new_goal, goal_id, created.naive_utc());

                let result_db = diesel::insert_into(goals::table)
                    .values(&row)
                    .returning(GoalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Goal::try_from(result_db)?)
            })
            .await
    }

    async fn update_goal_value(
        &self,
        goal_id: &str,
        value: f64,
        updated: DateTime<Utc>,
    ) -> Result<()> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::update(goals.find(&goal_id))
                    .set((current_value.eq(value), updated_at.eq(updated.naive_utc())))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::NotFound(format!("goal {}", goal_id)));
                }
                Ok(())
            })
            .await
    }

    async fn mark_goal_completed(&self, goal_id: &str, completed: DateTime<Utc>) -> Result<bool> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let affected = diesel::update(
                    goals
                        .filter(id.eq(&goal_id))
                        .filter(status.ne(GoalStatus::Completed.as_str())),
                )
                .set((
                    status.eq(GoalStatus::Completed.as_str()),
                    completed_at.eq(Some(completed.naive_utc())),
                    updated_at.eq(completed.naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(affected == 1)
            })
            .await
    }

    async fn reopen_goal(&self, goal_id: &str) -> Result<()> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(
                    goals
                        .filter(id.eq(&goal_id))
                        .filter(status.eq(GoalStatus::Completed.as_str())),
                )
                .set((
                    status.eq(GoalStatus::Active.as_str()),
                    completed_at.eq(None::<NaiveDateTime>),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<usize> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(goals.find(goal_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, TestDb};
    use chrono::TimeZone;
    use mindquest_core::goals::GoalCategory;

    fn repo() -> (GoalRepository, TestDb) {
        let db = test_db();
        let repo = GoalRepository::new(Arc::clone(&db.pool), db.writer.clone());
        (repo, db)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap()
    }

    fn new_goal(owner: &str, goal_id: Option<&str>) -> NewGoal {
        NewGoal {
            id: goal_id.map(str::to_string),
            owner_id: owner.to_string(),
            title: "  Fill the calendar ".to_string(),
            category: GoalCategory::Schedule,
            unit: "sessions per week".to_string(),
            target_value: 15.0,
            deadline: None,
        }
    }

    #[tokio::test]
    async fn test_insert_generates_id_and_defaults() {
        let (repo, _db) = repo();
        let goal = repo.insert_new_goal(new_goal("t1", None), now()).await.unwrap();
        assert!(Uuid::parse_str(&goal.id).is_ok());
        assert_eq!(goal.title, "Fill the calendar");
        assert_eq!(goal.status, GoalStatus::Active);
        assert_eq!(goal.current_value, 0.0);
        assert_eq!(goal.created_at, now());
        assert_eq!(repo.get_goal(&goal.id).unwrap(), Some(goal));
    }

    #[tokio::test]
    async fn test_mark_completed_only_once() {
        let (repo, _db) = repo();
        let goal = repo
            .insert_new_goal(new_goal("t1", Some("g1")), now())
            .await
            .unwrap();

        assert!(repo.mark_goal_completed(&goal.id, now()).await.unwrap());
        assert!(!repo.mark_goal_completed(&goal.id, now()).await.unwrap());
        assert!(!repo.mark_goal_completed("missing", now()).await.unwrap());

        let stored = repo.get_goal("g1").unwrap().unwrap();
        assert_eq!(stored.status, GoalStatus::Completed);
        assert_eq!(stored.completed_at, Some(now()));
    }

    #[tokio::test]
    async fn test_reopen_allows_completing_again() {
        let (repo, _db) = repo();
        repo.insert_new_goal(new_goal("t1", Some("g1")), now()).await.unwrap();
        repo.mark_goal_completed("g1", now()).await.unwrap();

        repo.reopen_goal("g1").await.unwrap();
        let stored = repo.get_goal("g1").unwrap().unwrap();
        assert_eq!(stored.status, GoalStatus::Active);
        assert_eq!(stored.completed_at, None);

        assert!(repo.mark_goal_completed("g1", now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_owners_listed_only_with_active_goals() {
        let (repo, _db) = repo();
        repo.insert_new_goal(new_goal("t2", Some("g1")), now()).await.unwrap();
        repo.insert_new_goal(new_goal("t1", Some("g2")), now()).await.unwrap();
        repo.insert_new_goal(new_goal("t1", Some("g3")), now()).await.unwrap();
        repo.insert_new_goal(new_goal("t3", Some("g4")), now()).await.unwrap();
        repo.mark_goal_completed("g4", now()).await.unwrap();

        assert_eq!(
            repo.load_goal_owners().unwrap(),
            vec!["t1".to_string(), "t2".to_string()]
        );
        assert_eq!(repo.load_goals_for_owner("t1").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_value_and_delete() {
        let (repo, _db) = repo();
        repo.insert_new_goal(new_goal("t1", Some("g1")), now()).await.unwrap();

        repo.update_goal_value("g1", 7.0, now()).await.unwrap();
        assert_eq!(repo.get_goal("g1").unwrap().unwrap().current_value, 7.0);
        assert!(repo.update_goal_value("nope", 1.0, now()).await.unwrap_err().is_not_found());

        assert_eq!(repo.delete_goal("g1").await.unwrap(), 1);
        assert_eq!(repo.delete_goal("g1").await.unwrap(), 0);
        assert!(repo.get_goal("g1").unwrap().is_none());
    }
}
