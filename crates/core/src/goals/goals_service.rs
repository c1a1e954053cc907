use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use log::{debug, error, info, warn};

use super::goals_calculator::{
    attendance_rate, completed_session_count, distinct_patient_count, evaluation_window,
    is_percentage_unit, revenue_total, UNIMPLEMENTED_CATEGORY_VALUE,
};
use super::goals_model::{Goal, GoalCategory, GoalRecalculation, GoalStatus, NewGoal};
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::clock::Clock;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::practice::PracticeFactsRepositoryTrait;
use crate::therapists::{TherapistAction, TherapistRewardServiceTrait};

/// Values closer than this are treated as unchanged and not written back.
const VALUE_EPSILON: f64 = 1e-9;

/// Tries per completion bonus before the pass gives up on a contended therapist row.
const AWARD_ATTEMPTS: usize = 3;

pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    facts_repo: Arc<dyn PracticeFactsRepositoryTrait>,
    therapist_rewards: Arc<dyn TherapistRewardServiceTrait>,
    clock: Arc<dyn Clock>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl GoalService {
    pub fn new(
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        facts_repo: Arc<dyn PracticeFactsRepositoryTrait>,
        therapist_rewards: Arc<dyn TherapistRewardServiceTrait>,
        clock: Arc<dyn Clock>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        GoalService {
            goal_repo,
            facts_repo,
            therapist_rewards,
            clock,
            event_sink,
        }
    }

    fn compute_value(&self, goal: &Goal, now: DateTime<Utc>) -> Result<f64> {
        let window = evaluation_window(&goal.unit, now, self.clock.timezone());
        let owner = goal.owner_id.as_str();

        let value = match goal.category {
            GoalCategory::Schedule => {
                let sessions =
                    self.facts_repo
                        .get_sessions_in_window(owner, window.start, window.end)?;
                if is_percentage_unit(&goal.unit) {
                    attendance_rate(&sessions)
                } else {
                    completed_session_count(&sessions)
                }
            }
            GoalCategory::Revenue => {
                let entries = self.facts_repo.get_financial_entries_in_window(
                    owner,
                    window.start,
                    window.end,
                )?;
                let sessions =
                    self.facts_repo
                        .get_sessions_in_window(owner, window.start, window.end)?;
                revenue_total(&entries, &sessions)
            }
            GoalCategory::Expansion => {
                let sessions =
                    self.facts_repo
                        .get_sessions_in_window(owner, window.start, window.end)?;
                distinct_patient_count(&sessions)
            }
            GoalCategory::Retention | GoalCategory::ProfessionalDevelopment => {
                debug!(
                    "No formula for {} goals, reporting {} for goal {}",
                    goal.category, UNIMPLEMENTED_CATEGORY_VALUE, goal.id
                );
                UNIMPLEMENTED_CATEGORY_VALUE
            }
        };
        Ok(value)
    }

    /// Recomputes one goal and writes the value back when it moved.
    async fn refresh_value(&self, goal: &Goal, now: DateTime<Utc>) -> Result<GoalRecalculation> {
        let current_value = self.compute_value(goal, now)?;
        let previous_value = goal.current_value;

        if (current_value - previous_value).abs() > VALUE_EPSILON {
            self.goal_repo
                .update_goal_value(&goal.id, current_value, now)
                .await?;
        } else {
            debug!("Goal {} unchanged at {}", goal.id, current_value);
        }

        Ok(GoalRecalculation {
            id: goal.id.clone(),
            previous_value,
            current_value,
            completed: false,
        })
    }

    /// Pays the owner's completion bonus, re-reading the therapist row when a
    /// concurrent award moved its version.
    async fn award_completion(&self, goal: &Goal) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self
                .therapist_rewards
                .award_therapist(&goal.owner_id, TherapistAction::GoalCompleted, 1)
                .await
            {
                Ok(_) => return Ok(()),
                Err(Error::ConcurrentModification(row)) if attempt < AWARD_ATTEMPTS => {
                    warn!(
                        "Completion bonus of goal {} hit a concurrent update of {}, retrying",
                        goal.id, row
                    );
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to award goal completion of {} to {}: {}",
                        goal.id, goal.owner_id, e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Flips each goal that reached its target to completed and pays its bonus.
    ///
    /// Bonuses for one owner all update the same therapist row, so they run one
    /// after another. A bonus that cannot be paid reopens its goal.
    async fn complete_reached_goals(
        &self,
        goals: &[Goal],
        results: &mut [GoalRecalculation],
        now: DateTime<Utc>,
        completions: &mut Vec<DomainEvent>,
    ) -> Result<()> {
        for (goal, result) in goals.iter().zip(results.iter_mut()) {
            if goal.status == GoalStatus::Completed || result.current_value < goal.target_value {
                continue;
            }
            if !self.goal_repo.mark_goal_completed(&goal.id, now).await? {
                continue;
            }

            if let Err(e) = self.award_completion(goal).await {
                self.goal_repo.reopen_goal(&goal.id).await?;
                return Err(e);
            }

            info!(
                "Goal {} of {} completed ({} >= {})",
                goal.id, goal.owner_id, result.current_value, goal.target_value
            );
            result.completed = true;
            completions.push(DomainEvent::goal_completed(
                &goal.id,
                &goal.owner_id,
                goal.category,
            ));
        }
        Ok(())
    }

    async fn refresh_goals(&self, goals: Vec<Goal>) -> Result<Vec<GoalRecalculation>> {
        let now = self.clock.now();
        let mut results =
            try_join_all(goals.iter().map(|goal| self.refresh_value(goal, now))).await?;

        let mut completions = Vec::new();
        let outcome = self
            .complete_reached_goals(&goals, &mut results, now, &mut completions)
            .await;
        // Bonuses already paid stay paid, so their events go out even on failure.
        self.event_sink.emit_batch(completions);
        outcome.map(|_| results)
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn recalculate_goal(&self, goal: &Goal) -> Result<f64> {
        self.compute_value(goal, self.clock.now())
    }

    async fn recalculate_all_goals(&self, owner_id: &str) -> Result<Vec<GoalRecalculation>> {
        let goals = self.goal_repo.load_goals_for_owner(owner_id)?;
        debug!("Recalculating {} goals for {}", goals.len(), owner_id);
        self.refresh_goals(goals).await
    }

    async fn recalculate_goals_by_category(
        &self,
        owner_id: &str,
        category: GoalCategory,
    ) -> Result<Vec<GoalRecalculation>> {
        let goals: Vec<Goal> = self
            .goal_repo
            .load_goals_for_owner(owner_id)?
            .into_iter()
            .filter(|g| g.category == category)
            .collect();
        self.refresh_goals(goals).await
    }

    fn get_goals(&self, owner_id: &str) -> Result<Vec<Goal>> {
        self.goal_repo.load_goals_for_owner(owner_id)
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goal_repo
            .get_goal(goal_id)?
            .ok_or_else(|| Error::NotFound(format!("goal {}", goal_id)))
    }

    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        new_goal.validate()?;
        let goal = self
            .goal_repo
            .insert_new_goal(new_goal, self.clock.now())
            .await?;
        info!("Created {} goal {} for {}", goal.category, goal.id, goal.owner_id);
        Ok(goal)
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<()> {
        match self.goal_repo.delete_goal(goal_id).await? {
            0 => Err(Error::NotFound(format!("goal {}", goal_id))),
            _ => Ok(()),
        }
    }

    fn list_goal_owners(&self) -> Result<Vec<String>> {
        self.goal_repo.load_goal_owners()
    }
}
