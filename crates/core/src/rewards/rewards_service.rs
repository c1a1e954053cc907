use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::rewards_model::{
    reward_for, AwardEvent, AwardParams, PatientAction, PatientProgression, StreakInfo,
};
use super::rewards_traits::{PatientProgressionRepositoryTrait, RewardServiceTrait};
use crate::clock::Clock;
use crate::cooldown::can_award;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::progression::{ActorKind, ProgressionInfo, PATIENT_CURVE};
use crate::streaks::update_streak;

/// Patient award engine.
pub struct RewardService {
    repository: Arc<dyn PatientProgressionRepositoryTrait>,
    clock: Arc<dyn Clock>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl RewardService {
    pub fn new(
        repository: Arc<dyn PatientProgressionRepositoryTrait>,
        clock: Arc<dyn Clock>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        RewardService {
            repository,
            clock,
            event_sink,
        }
    }

    fn load(&self, actor_id: &str) -> Result<PatientProgression> {
        self.repository
            .get_patient_progression(actor_id)?
            .ok_or_else(|| Error::NotFound(format!("patient '{}'", actor_id)))
    }

    async fn save(&self, progression: PatientProgression) -> Result<PatientProgression> {
        let actor_id = progression.actor_id.clone();
        self.repository
            .save_patient_progression(progression)
            .await
            .inspect_err(|e| {
                if matches!(e, Error::ConcurrentModification(_)) {
                    warn!("Concurrent update of patient {} rejected: {}", actor_id, e);
                }
            })
    }
}

#[async_trait]
impl RewardServiceTrait for RewardService {
    async fn award(
        &self,
        actor_id: &str,
        action: PatientAction,
        params: AwardParams,
    ) -> Result<AwardEvent> {
        let reward = reward_for(action, &params)?;
        let current = self.load(actor_id)?;

        let now = self.clock.now();
        let previous_level = current.level;
        let mut next = current.clone();

        let eligible = can_award(
            action.cooldown_rule(),
            current.last_xp_award_at(action),
            now,
            self.clock.timezone(),
        );
        let xp_awarded = if eligible {
            next.experience += reward.xp;
            next.level = PATIENT_CURVE.level_from_xp(next.experience);
            next.stamp_xp_award(action, now);
            reward.xp
        } else {
            debug!(
                "XP for '{}' withheld from patient {} ({} cooldown)",
                action,
                actor_id,
                action.cooldown_rule().as_str()
            );
            0
        };

        // Coins are paid even when the XP cooldown denied the award.
        if let Some(coins) = reward.coins {
            next.coins += coins;
        }

        let streak = update_streak(
            current.last_activity_at.map(|at| self.clock.civil_date(at)),
            current.current_streak,
            current.longest_streak,
            self.clock.civil_date(now),
        );
        next.current_streak = streak.new_streak;
        next.longest_streak = streak.new_longest_streak;
        next.last_activity_at = Some(now);

        let saved = self.save(next).await?;

        let level_up = saved.level > previous_level;
        if level_up {
            info!(
                "Patient {} reached level {} (was {})",
                actor_id, saved.level, previous_level
            );
            self.event_sink.emit(DomainEvent::level_up(
                actor_id,
                ActorKind::Patient,
                previous_level,
                saved.level,
            ));
        }

        Ok(AwardEvent {
            actor_id: saved.actor_id.clone(),
            action: action.as_str().to_string(),
            xp_awarded,
            coins_awarded: reward.coins,
            previous_level,
            new_experience: saved.experience,
            new_level: saved.level,
            level_up,
            streak: StreakInfo {
                current_streak: saved.current_streak,
                longest_streak: saved.longest_streak,
                changed: streak.changed,
            },
        })
    }

    fn get_progression(&self, actor_id: &str) -> Result<PatientProgression> {
        self.load(actor_id)
    }

    fn get_progression_info(&self, actor_id: &str) -> Result<ProgressionInfo> {
        let progression = self.load(actor_id)?;
        Ok(PATIENT_CURVE.info(progression.experience))
    }

    async fn register_patient(&self, actor_id: &str) -> Result<PatientProgression> {
        if actor_id.trim().is_empty() {
            return Err(ValidationError::MissingField("actorId".to_string()).into());
        }
        self.repository
            .create_patient_progression(actor_id, self.clock.now())
            .await
    }

    async fn redeem_coins(&self, actor_id: &str, amount: i64) -> Result<PatientProgression> {
        if amount <= 0 {
            return Err(ValidationError::InvalidInput(format!(
                "redemption amount must be positive, got {}",
                amount
            ))
            .into());
        }

        let mut progression = self.load(actor_id)?;
        if progression.coins < amount {
            return Err(Error::InsufficientCoins {
                requested: amount,
                available: progression.coins,
            });
        }
        progression.coins -= amount;

        let saved = self.save(progression).await?;
        self.event_sink.emit(DomainEvent::coins_redeemed(
            actor_id,
            amount,
            saved.coins,
        ));
        Ok(saved)
    }

    async fn reset_progression(&self, actor_id: &str) -> Result<PatientProgression> {
        let mut progression = self.load(actor_id)?;
        progression.reset();
        let saved = self.save(progression).await?;
        info!("Progression of patient {} was reset", actor_id);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::events::MockDomainEventSink;
    use crate::rewards::TaskPriority;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use chrono_tz::Tz;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const TZ: Tz = chrono_tz::Europe::Berlin;

    #[derive(Default)]
    struct MockPatientRepository {
        rows: Mutex<HashMap<String, PatientProgression>>,
        conflict_on_save: Mutex<bool>,
    }

    impl MockPatientRepository {
        fn with_patient(progression: PatientProgression) -> Self {
            let repo = Self::default();
            repo.rows
                .lock()
                .unwrap()
                .insert(progression.actor_id.clone(), progression);
            repo
        }

        fn stored(&self, actor_id: &str) -> PatientProgression {
            self.rows.lock().unwrap().get(actor_id).cloned().unwrap()
        }
    }

    #[async_trait]
    impl PatientProgressionRepositoryTrait for MockPatientRepository {
        fn get_patient_progression(&self, actor_id: &str) -> Result<Option<PatientProgression>> {
            Ok(self.rows.lock().unwrap().get(actor_id).cloned())
        }

        async fn create_patient_progression(
            &self,
            actor_id: &str,
            _created_at: DateTime<Utc>,
        ) -> Result<PatientProgression> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .entry(actor_id.to_string())
                .or_insert_with(|| PatientProgression::new(actor_id))
                .clone())
        }

        async fn save_patient_progression(
            &self,
            mut progression: PatientProgression,
        ) -> Result<PatientProgression> {
            if *self.conflict_on_save.lock().unwrap() {
                return Err(Error::ConcurrentModification(progression.actor_id));
            }
            let mut rows = self.rows.lock().unwrap();
            let stored = rows
                .get(&progression.actor_id)
                .ok_or_else(|| Error::NotFound(progression.actor_id.clone()))?;
            if stored.version != progression.version {
                return Err(Error::ConcurrentModification(progression.actor_id));
            }
            progression.version += 1;
            rows.insert(progression.actor_id.clone(), progression.clone());
            Ok(progression)
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        TZ.with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn setup(
        progression: PatientProgression,
        start: DateTime<Utc>,
    ) -> (
        RewardService,
        Arc<MockPatientRepository>,
        FixedClock,
        MockDomainEventSink,
    ) {
        let repo = Arc::new(MockPatientRepository::with_patient(progression));
        let clock = FixedClock::new(start, TZ);
        let sink = MockDomainEventSink::new();
        let service = RewardService::new(
            repo.clone(),
            Arc::new(clock.clone()),
            Arc::new(sink.clone()),
        );
        (service, repo, clock, sink)
    }

    #[tokio::test]
    async fn test_high_priority_task_grants_xp_and_coins() {
        let (service, repo, _clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));

        let event = service
            .award("p1", PatientAction::Task, AwardParams::with_priority(TaskPriority::High))
            .await
            .unwrap();

        assert_eq!(event.xp_awarded, 30);
        assert_eq!(event.coins_awarded, Some(30));
        assert_eq!(event.new_experience, 30);
        assert_eq!(event.new_level, 1);
        assert!(!event.level_up);

        let stored = repo.stored("p1");
        assert_eq!(stored.coins, 30);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_tasks_are_never_cooled_down() {
        let (service, _repo, _clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));
        for _ in 0..3 {
            let event = service
                .award("p1", PatientAction::Task, AwardParams::with_priority(TaskPriority::Low))
                .await
                .unwrap();
            assert_eq!(event.xp_awarded, 10);
        }
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let (service, _repo, _clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));
        let err = service
            .award("ghost", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_action_params_rejected_before_load() {
        let (service, repo, _clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));
        let err = service
            .award("p1", PatientAction::Task, AwardParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAction(_)));
        assert_eq!(repo.stored("p1").version, 0);
    }

    #[tokio::test]
    async fn test_mood_hourly_cooldown() {
        let (service, _repo, clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));

        let first = service
            .award("p1", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap();
        assert_eq!(first.xp_awarded, 10);

        clock.advance(Duration::minutes(30));
        let second = service
            .award("p1", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap();
        assert_eq!(second.xp_awarded, 0);
        assert_eq!(second.new_experience, 10);
        assert_eq!(second.coins_awarded, None);

        clock.advance(Duration::minutes(30));
        let third = service
            .award("p1", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap();
        assert_eq!(third.xp_awarded, 10);
        assert_eq!(third.new_experience, 20);
    }

    #[tokio::test]
    async fn test_journal_daily_cooldown_across_midnight() {
        let (service, _repo, clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 23, 59, 59));

        let late = service
            .award("p1", PatientAction::Journal, AwardParams::default())
            .await
            .unwrap();
        clock.set(local(2025, 3, 4, 0, 0, 1));
        let early = service
            .award("p1", PatientAction::Journal, AwardParams::default())
            .await
            .unwrap();

        assert_eq!(late.xp_awarded, 25);
        assert_eq!(early.xp_awarded, 25);
    }

    #[tokio::test]
    async fn test_journal_twice_same_day_awards_xp_once_but_coins_twice() {
        let (service, repo, clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 10, 0, 0));

        let first = service
            .award("p1", PatientAction::Journal, AwardParams::default())
            .await
            .unwrap();
        clock.set(local(2025, 3, 3, 10, 5, 0));
        let second = service
            .award("p1", PatientAction::Journal, AwardParams::default())
            .await
            .unwrap();

        assert_eq!(first.xp_awarded, 25);
        assert_eq!(second.xp_awarded, 0);
        assert_eq!(second.coins_awarded, Some(15));

        let stored = repo.stored("p1");
        assert_eq!(stored.experience, 25);
        assert_eq!(stored.coins, 30);
        assert_eq!(stored.last_journal_xp_at, Some(local(2025, 3, 3, 10, 0, 0)));
    }

    #[tokio::test]
    async fn test_level_up_detected_once_per_crossing() {
        let mut progression = PatientProgression::new("p1");
        progression.experience = 90;
        let (service, _repo, _clock, sink) = setup(progression, local(2025, 3, 3, 9, 0, 0));

        let crossing = service
            .award("p1", PatientAction::Task, AwardParams::with_priority(TaskPriority::High))
            .await
            .unwrap();
        assert!(crossing.level_up);
        assert_eq!(crossing.previous_level, 1);
        assert_eq!(crossing.new_level, 2);

        let after = service
            .award("p1", PatientAction::Task, AwardParams::with_priority(TaskPriority::High))
            .await
            .unwrap();
        assert!(!after.level_up);
        assert_eq!(after.new_level, 2);

        assert_eq!(
            sink.events(),
            vec![DomainEvent::level_up("p1", ActorKind::Patient, 1, 2)]
        );
    }

    #[tokio::test]
    async fn test_streak_follows_civil_days() {
        let (service, _repo, clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 20, 0, 0));

        let day_one = service
            .award("p1", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap();
        assert_eq!(day_one.streak.current_streak, 1);
        assert!(day_one.streak.changed);

        clock.set(local(2025, 3, 3, 22, 0, 0));
        let same_day = service
            .award("p1", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap();
        assert!(!same_day.streak.changed);

        clock.set(local(2025, 3, 4, 8, 0, 0));
        let day_two = service
            .award("p1", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap();
        assert_eq!(day_two.streak.current_streak, 2);
        assert_eq!(day_two.streak.longest_streak, 2);

        clock.set(local(2025, 3, 7, 8, 0, 0));
        let after_gap = service
            .award("p1", PatientAction::Mood, AwardParams::default())
            .await
            .unwrap();
        assert_eq!(after_gap.streak.current_streak, 1);
        assert_eq!(after_gap.streak.longest_streak, 2);
    }

    #[tokio::test]
    async fn test_lost_race_surfaces_conflict() {
        let (service, repo, _clock, sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));
        *repo.conflict_on_save.lock().unwrap() = true;

        let err = service
            .award("p1", PatientAction::Task, AwardParams::with_priority(TaskPriority::High))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConcurrentModification(_)));
        assert_eq!(repo.stored("p1").experience, 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_redeem_coins() {
        let mut progression = PatientProgression::new("p1");
        progression.coins = 40;
        let (service, _repo, _clock, sink) = setup(progression, local(2025, 3, 3, 9, 0, 0));

        let err = service.redeem_coins("p1", 50).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientCoins {
                requested: 50,
                available: 40
            }
        ));
        assert!(matches!(
            service.redeem_coins("p1", 0).await.unwrap_err(),
            Error::Validation(_)
        ));

        let saved = service.redeem_coins("p1", 25).await.unwrap();
        assert_eq!(saved.coins, 15);
        assert_eq!(sink.events(), vec![DomainEvent::coins_redeemed("p1", 25, 15)]);
    }

    #[tokio::test]
    async fn test_reset_clears_progression_and_cooldowns() {
        let (service, _repo, _clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));
        service
            .award("p1", PatientAction::Journal, AwardParams::default())
            .await
            .unwrap();

        let reset = service.reset_progression("p1").await.unwrap();
        assert_eq!(reset.experience, 0);
        assert_eq!(reset.level, 1);
        assert_eq!(reset.last_journal_xp_at, None);

        // Cooldown is cleared, so the same-day journal awards XP again.
        let again = service
            .award("p1", PatientAction::Journal, AwardParams::default())
            .await
            .unwrap();
        assert_eq!(again.xp_awarded, 25);
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let (service, _repo, _clock, _sink) =
            setup(PatientProgression::new("p1"), local(2025, 3, 3, 9, 0, 0));
        service
            .award("p1", PatientAction::Task, AwardParams::with_priority(TaskPriority::Low))
            .await
            .unwrap();

        let existing = service.register_patient("p1").await.unwrap();
        assert_eq!(existing.experience, 10);

        let fresh = service.register_patient("p2").await.unwrap();
        assert_eq!(fresh, PatientProgression::new("p2"));
        assert!(service.register_patient("  ").await.is_err());
    }

    #[tokio::test]
    async fn test_progression_info() {
        let mut progression = PatientProgression::new("p1");
        progression.experience = 250;
        progression.level = 3;
        let (service, _repo, _clock, _sink) = setup(progression, local(2025, 3, 3, 9, 0, 0));

        let info = service.get_progression_info("p1").unwrap();
        assert_eq!(info.level, 3);
        assert_eq!(info.xp_in_current_level, 50);
        assert_eq!(info.xp_to_next_level, 50);
    }
}
