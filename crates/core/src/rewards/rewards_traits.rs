use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::progression::ProgressionInfo;
use crate::rewards::rewards_model::{AwardEvent, AwardParams, PatientAction, PatientProgression};

/// Trait for patient progression persistence.
#[async_trait]
pub trait PatientProgressionRepositoryTrait: Send + Sync {
    fn get_patient_progression(&self, actor_id: &str) -> Result<Option<PatientProgression>>;

    /// Creates the zeroed row if missing and returns the stored row either way.
    async fn create_patient_progression(
        &self,
        actor_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<PatientProgression>;

    /// Compare-and-swap save.
    ///
    /// `progression.version` must be the version that was read. The write
    /// succeeds only if the stored row still has that version, and the
    /// returned row carries the incremented version. A lost race yields
    /// `Error::ConcurrentModification`.
    async fn save_patient_progression(
        &self,
        progression: PatientProgression,
    ) -> Result<PatientProgression>;
}

/// Trait for the patient award engine.
#[async_trait]
pub trait RewardServiceTrait: Send + Sync {
    async fn award(
        &self,
        actor_id: &str,
        action: PatientAction,
        params: AwardParams,
    ) -> Result<AwardEvent>;
    fn get_progression(&self, actor_id: &str) -> Result<PatientProgression>;
    fn get_progression_info(&self, actor_id: &str) -> Result<ProgressionInfo>;
    async fn register_patient(&self, actor_id: &str) -> Result<PatientProgression>;
    async fn redeem_coins(&self, actor_id: &str, amount: i64) -> Result<PatientProgression>;
    async fn reset_progression(&self, actor_id: &str) -> Result<PatientProgression>;
}
