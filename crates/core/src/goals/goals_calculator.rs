//! Pure aggregation of practice facts into goal values.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::practice::{EntryKind, FinancialEntry, SessionRecord, SessionStatus};
use crate::utils::time_utils::{start_of_month, start_of_week};

/// Value reported for categories without a defined formula
/// (`retention`, `professional_development`).
pub const UNIMPLEMENTED_CATEGORY_VALUE: f64 = 0.0;

/// Half-open `[start, end)` evaluation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Picks the window from the goal unit: "week" means week-to-date starting
/// Monday 00:00 local, everything else (including "month"/"monthly") means
/// calendar month-to-date.
pub fn evaluation_window(unit: &str, now: DateTime<Utc>, tz: Tz) -> EvaluationWindow {
    let unit = unit.to_ascii_lowercase();
    let start = if unit.contains("week") {
        start_of_week(now, tz)
    } else {
        start_of_month(now, tz)
    };
    EvaluationWindow { start, end: now }
}

pub fn is_percentage_unit(unit: &str) -> bool {
    let unit = unit.to_ascii_lowercase();
    unit.contains('%') || unit.contains("percent")
}

pub fn completed_session_count(sessions: &[SessionRecord]) -> f64 {
    sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .count() as f64
}

/// `(total - no_show) / total * 100`, or 0 without sessions.
pub fn attendance_rate(sessions: &[SessionRecord]) -> f64 {
    let total = sessions.len();
    if total == 0 {
        return 0.0;
    }
    let no_show = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::NoShow)
        .count();
    (total - no_show) as f64 / total as f64 * 100.0
}

/// Ledger income plus the price of completed sessions.
pub fn revenue_total(entries: &[FinancialEntry], sessions: &[SessionRecord]) -> f64 {
    let income: Decimal = entries
        .iter()
        .filter(|e| e.kind == EntryKind::Income)
        .map(|e| e.amount)
        .sum();
    let session_value: Decimal = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .filter_map(|s| s.price)
        .sum();
    (income + session_value).to_f64().unwrap_or(0.0)
}

pub fn distinct_patient_count(sessions: &[SessionRecord]) -> f64 {
    sessions
        .iter()
        .map(|s| s.patient_id.as_str())
        .collect::<HashSet<_>>()
        .len() as f64
}
