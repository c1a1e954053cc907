use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::practice::practice_model::{FinancialEntry, SessionRecord};

/// Read-only access to raw practice facts.
///
/// Windows are half-open: `start <= t < end`.
pub trait PracticeFactsRepositoryTrait: Send + Sync {
    fn get_sessions_in_window(
        &self,
        therapist_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>>;

    fn get_financial_entries_in_window(
        &self,
        therapist_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FinancialEntry>>;
}
