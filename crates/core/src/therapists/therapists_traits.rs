use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::progression::ProgressionInfo;
use crate::rewards::AwardEvent;
use crate::therapists::therapists_model::{TherapistAction, TherapistProgression};

/// Trait for therapist stats persistence.
#[async_trait]
pub trait TherapistProgressionRepositoryTrait: Send + Sync {
    fn get_therapist_progression(&self, actor_id: &str) -> Result<Option<TherapistProgression>>;

    /// Idempotent: inserts a zeroed row only if none exists, then returns the stored row.
    async fn get_or_create_therapist_progression(
        &self,
        actor_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<TherapistProgression>;

    /// Compare-and-swap save keyed on `progression.version`, see
    /// `PatientProgressionRepositoryTrait::save_patient_progression`.
    async fn save_therapist_progression(
        &self,
        progression: TherapistProgression,
    ) -> Result<TherapistProgression>;
}

/// Trait for the therapist award engine.
#[async_trait]
pub trait TherapistRewardServiceTrait: Send + Sync {
    async fn award_therapist(
        &self,
        actor_id: &str,
        action: TherapistAction,
        multiplier: u32,
    ) -> Result<AwardEvent>;
    async fn get_therapist_progression(&self, actor_id: &str) -> Result<TherapistProgression>;
    async fn get_therapist_progression_info(&self, actor_id: &str) -> Result<ProgressionInfo>;
}
