use crate::errors::Result;
use crate::goals::goals_model::{Goal, GoalCategory, GoalRecalculation, NewGoal};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for goal repository operations
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>>;
    fn load_goals_for_owner(&self, owner_id: &str) -> Result<Vec<Goal>>;
    /// Distinct owners with at least one active goal.
    fn load_goal_owners(&self) -> Result<Vec<String>>;
    async fn insert_new_goal(&self, new_goal: NewGoal, created_at: DateTime<Utc>) -> Result<Goal>;
    async fn update_goal_value(
        &self,
        goal_id: &str,
        current_value: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
    /// Moves the goal to `completed` only if it is not completed yet.
    /// Returns whether this call performed the transition.
    async fn mark_goal_completed(&self, goal_id: &str, completed_at: DateTime<Utc>)
        -> Result<bool>;
    /// Puts a completed goal back to `active` when its completion bonus could not be paid,
    /// so the next pass completes it again.
    async fn reopen_goal(&self, goal_id: &str) -> Result<()>;
    async fn delete_goal(&self, goal_id: &str) -> Result<usize>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    /// Computes the goal's current value from practice facts without writing it.
    fn recalculate_goal(&self, goal: &Goal) -> Result<f64>;
    async fn recalculate_all_goals(&self, owner_id: &str) -> Result<Vec<GoalRecalculation>>;
    async fn recalculate_goals_by_category(
        &self,
        owner_id: &str,
        category: GoalCategory,
    ) -> Result<Vec<GoalRecalculation>>;
    fn get_goals(&self, owner_id: &str) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: &str) -> Result<()>;
    fn list_goal_owners(&self) -> Result<Vec<String>>;
}
