use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::civil_date_from_utc;

/// How often an action may award XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownRule {
    /// Always eligible.
    Unconditional,
    /// Eligible once at least one hour has passed since the last award.
    Hourly,
    /// Eligible once per civil day in the configured timezone.
    Daily,
}

impl CooldownRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            CooldownRule::Unconditional => "unconditional",
            CooldownRule::Hourly => "hourly",
            CooldownRule::Daily => "daily",
        }
    }
}

/// Returns whether XP may be awarded under `rule`.
///
/// Pure: no state or timestamp is touched. A missing `last_award_at` is
/// always eligible. The hourly boundary is inclusive. Daily compares civil
/// dates in `tz`, so 23:59 and 00:01 fall on different days.
pub fn can_award(
    rule: CooldownRule,
    last_award_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    tz: Tz,
) -> bool {
    let Some(last) = last_award_at else {
        return true;
    };

    match rule {
        CooldownRule::Unconditional => true,
        CooldownRule::Hourly => now.signed_duration_since(last) >= Duration::hours(1),
        CooldownRule::Daily => civil_date_from_utc(last, tz) != civil_date_from_utc(now, tz),
    }
}
