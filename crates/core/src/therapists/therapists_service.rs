use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use super::therapists_model::{TherapistAction, TherapistProgression};
use super::therapists_traits::{TherapistProgressionRepositoryTrait, TherapistRewardServiceTrait};
use crate::clock::Clock;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::progression::{ActorKind, ProgressionInfo, THERAPIST_CURVE};
use crate::rewards::{AwardEvent, StreakInfo};
use crate::streaks::update_streak;

/// Therapist award engine: no cooldowns, streak on every call, lifetime counters.
pub struct TherapistRewardService {
    repository: Arc<dyn TherapistProgressionRepositoryTrait>,
    clock: Arc<dyn Clock>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl TherapistRewardService {
    pub fn new(
        repository: Arc<dyn TherapistProgressionRepositoryTrait>,
        clock: Arc<dyn Clock>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        TherapistRewardService {
            repository,
            clock,
            event_sink,
        }
    }
}

#[async_trait]
impl TherapistRewardServiceTrait for TherapistRewardService {
    async fn award_therapist(
        &self,
        actor_id: &str,
        action: TherapistAction,
        multiplier: u32,
    ) -> Result<AwardEvent> {
        if multiplier == 0 {
            return Err(
                ValidationError::InvalidInput("multiplier must be at least 1".to_string()).into(),
            );
        }

        let now = self.clock.now();
        let current = self
            .repository
            .get_or_create_therapist_progression(actor_id, now)
            .await?;

        let previous_level = current.level;
        let xp_awarded = action.base_xp() * i64::from(multiplier);

        let mut next = current.clone();
        next.experience += xp_awarded;
        next.level = THERAPIST_CURVE.level_from_xp(next.experience);
        if let Some(counter) = action.counter() {
            next.counters.increment(counter);
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

        let saved = self
            .repository
            .save_therapist_progression(next)
            .await
            .inspect_err(|e| {
                if matches!(e, Error::ConcurrentModification(_)) {
                    warn!("Concurrent update of therapist {} rejected: {}", actor_id, e);
                }
            })?;

        let level_up = saved.level > previous_level;
        if level_up {
            info!(
                "Therapist {} reached level {} (was {})",
                actor_id, saved.level, previous_level
            );
            self.event_sink.emit(DomainEvent::level_up(
                actor_id,
                ActorKind::Therapist,
                previous_level,
                saved.level,
            ));
        }

        Ok(AwardEvent {
            actor_id: saved.actor_id.clone(),
            action: action.as_str().to_string(),
            xp_awarded,
            coins_awarded: None,
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

    /// A therapist without a row reads as a zeroed progression; nothing is written.
    async fn get_therapist_progression(&self, actor_id: &str) -> Result<TherapistProgression> {
        Ok(self
            .repository
            .get_therapist_progression(actor_id)?
            .unwrap_or_else(|| TherapistProgression::new(actor_id)))
    }

    async fn get_therapist_progression_info(&self, actor_id: &str) -> Result<ProgressionInfo> {
        let progression = self.get_therapist_progression(actor_id).await?;
        Ok(THERAPIST_CURVE.info(progression.experience))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::events::MockDomainEventSink;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockTherapistRepository {
        rows: Mutex<HashMap<String, TherapistProgression>>,
        creations: Mutex<usize>,
    }

    #[async_trait]
    impl TherapistProgressionRepositoryTrait for MockTherapistRepository {
        fn get_therapist_progression(
            &self,
            actor_id: &str,
        ) -> Result<Option<TherapistProgression>> {
            Ok(self.rows.lock().unwrap().get(actor_id).cloned())
        }

        async fn get_or_create_therapist_progression(
            &self,
            actor_id: &str,
            _created_at: DateTime<Utc>,
        ) -> Result<TherapistProgression> {
            let mut rows = self.rows.lock().unwrap();
            if !rows.contains_key(actor_id) {
                *self.creations.lock().unwrap() += 1;
                rows.insert(actor_id.to_string(), TherapistProgression::new(actor_id));
            }
            Ok(rows[actor_id].clone())
        }

        async fn save_therapist_progression(
            &self,
            mut progression: TherapistProgression,
        ) -> Result<TherapistProgression> {
            let mut rows = self.rows.lock().unwrap();
            let stored_version = rows
                .get(&progression.actor_id)
                .map(|r| r.version)
                .ok_or_else(|| Error::NotFound(progression.actor_id.clone()))?;
            if stored_version != progression.version {
                return Err(Error::ConcurrentModification(progression.actor_id));
            }
            progression.version += 1;
            rows.insert(progression.actor_id.clone(), progression.clone());
            Ok(progression)
        }
    }

    fn setup() -> (
        TherapistRewardService,
        Arc<MockTherapistRepository>,
        FixedClock,
        MockDomainEventSink,
    ) {
        let repo = Arc::new(MockTherapistRepository::default());
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 14, 0, 0).unwrap(),
            chrono_tz::Europe::Vienna,
        );
        let sink = MockDomainEventSink::new();
        let service = TherapistRewardService::new(
            repo.clone(),
            Arc::new(clock.clone()),
            Arc::new(sink.clone()),
        );
        (service, repo, clock, sink)
    }

    #[tokio::test]
    async fn test_first_award_creates_row_once() {
        let (service, repo, _clock, _sink) = setup();

        let event = service
            .award_therapist("t1", TherapistAction::ReportCreated, 1)
            .await
            .unwrap();
        service
            .award_therapist("t1", TherapistAction::ReportCreated, 1)
            .await
            .unwrap();

        assert_eq!(event.xp_awarded, 25);
        assert_eq!(event.coins_awarded, None);
        assert_eq!(*repo.creations.lock().unwrap(), 1);
        let stored = repo.get_therapist_progression("t1").unwrap().unwrap();
        assert_eq!(stored.counters.reports_created, 2);
        assert_eq!(stored.experience, 50);
    }

    #[tokio::test]
    async fn test_multiplier_scales_xp_not_counter() {
        let (service, repo, _clock, _sink) = setup();
        let event = service
            .award_therapist("t1", TherapistAction::SessionCompleted, 3)
            .await
            .unwrap();
        assert_eq!(event.xp_awarded, 90);
        let stored = repo.get_therapist_progression("t1").unwrap().unwrap();
        assert_eq!(stored.counters.sessions_completed, 1);
    }

    #[tokio::test]
    async fn test_zero_multiplier_rejected() {
        let (service, repo, _clock, _sink) = setup();
        let err = service
            .award_therapist("t1", TherapistAction::TaskCreated, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(repo.get_therapist_progression("t1").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_uncounted_action_leaves_counters() {
        let (service, repo, _clock, _sink) = setup();
        service
            .award_therapist("t1", TherapistAction::DailyCheckIn, 1)
            .await
            .unwrap();
        let stored = repo.get_therapist_progression("t1").unwrap().unwrap();
        assert_eq!(stored.counters, Default::default());
        assert_eq!(stored.experience, 5);
    }

    #[tokio::test]
    async fn test_no_cooldown_and_level_up_at_150() {
        let (service, _repo, _clock, sink) = setup();
        let first = service
            .award_therapist("t1", TherapistAction::GoalCompleted, 1)
            .await
            .unwrap();
        assert!(!first.level_up);

        let second = service
            .award_therapist("t1", TherapistAction::ReportCreated, 2)
            .await
            .unwrap();
        assert_eq!(second.new_experience, 150);
        assert!(second.level_up);
        assert_eq!(second.new_level, 2);
        assert_eq!(
            sink.events(),
            vec![DomainEvent::level_up("t1", ActorKind::Therapist, 1, 2)]
        );
    }

    #[tokio::test]
    async fn test_streak_updates_on_every_action_type() {
        let (service, _repo, clock, _sink) = setup();
        let day_one = service
            .award_therapist("t1", TherapistAction::DailyCheckIn, 1)
            .await
            .unwrap();
        assert_eq!(day_one.streak.current_streak, 1);

        clock.advance(Duration::days(1));
        let day_two = service
            .award_therapist("t1", TherapistAction::TaskCreated, 1)
            .await
            .unwrap();
        assert_eq!(day_two.streak.current_streak, 2);
        assert!(day_two.streak.changed);

        clock.advance(Duration::hours(1));
        let same_day = service
            .award_therapist("t1", TherapistAction::SessionCompleted, 1)
            .await
            .unwrap();
        assert_eq!(same_day.streak.current_streak, 2);
        assert!(!same_day.streak.changed);
    }

    #[tokio::test]
    async fn test_reading_unknown_therapist_creates_no_row() {
        let (service, repo, _clock, _sink) = setup();
        let progression = service.get_therapist_progression("t9").await.unwrap();
        assert_eq!(progression, TherapistProgression::new("t9"));

        let info = service.get_therapist_progression_info("t9").await.unwrap();
        assert_eq!(info.level, 1);
        assert_eq!(*repo.creations.lock().unwrap(), 0);
        assert!(repo.get_therapist_progression("t9").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_progression_info_uses_therapist_curve() {
        let (service, _repo, _clock, _sink) = setup();
        service
            .award_therapist("t1", TherapistAction::GoalCompleted, 1)
            .await
            .unwrap();
        let info = service.get_therapist_progression_info("t1").await.unwrap();
        assert_eq!(info.level, 1);
        assert_eq!(info.xp_to_next_level, 50);
    }
}
