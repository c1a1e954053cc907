use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::days_between;

/// Outcome of feeding one day of activity into a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub new_streak: i32,
    pub new_longest_streak: i32,
    pub changed: bool,
}

/// Applies activity on `today` to a streak last extended on `last_activity`.
///
/// Dates are civil dates in the fixed timezone. A `last_activity` in the
/// future is treated like the same day.
pub fn update_streak(
    last_activity: Option<NaiveDate>,
    current_streak: i32,
    longest_streak: i32,
    today: NaiveDate,
) -> StreakUpdate {
    let Some(last) = last_activity else {
        return StreakUpdate {
            new_streak: 1,
            new_longest_streak: longest_streak.max(1),
            changed: true,
        };
    };

    match days_between(last, today) {
        gap if gap <= 0 => StreakUpdate {
            new_streak: current_streak,
            new_longest_streak: longest_streak,
            changed: false,
        },
        1 => {
            let new_streak = current_streak.saturating_add(1);
            StreakUpdate {
                new_streak,
                new_longest_streak: longest_streak.max(new_streak),
                changed: true,
            }
        }
        _ => StreakUpdate {
            new_streak: 1,
            new_longest_streak: longest_streak.max(1),
            changed: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        assert_eq!(
            update_streak(None, 0, 0, today()),
            StreakUpdate {
                new_streak: 1,
                new_longest_streak: 1,
                changed: true
            }
        );
    }

    #[test]
    fn test_consecutive_day_extends() {
        assert_eq!(
            update_streak(Some(today() - Duration::days(1)), 5, 10, today()),
            StreakUpdate {
                new_streak: 6,
                new_longest_streak: 10,
                changed: true
            }
        );
    }

    #[test]
    fn test_same_day_is_unchanged() {
        assert_eq!(
            update_streak(Some(today()), 5, 10, today()),
            StreakUpdate {
                new_streak: 5,
                new_longest_streak: 10,
                changed: false
            }
        );
    }

    #[test]
    fn test_gap_resets_but_keeps_longest() {
        assert_eq!(
            update_streak(Some(today() - Duration::days(3)), 5, 10, today()),
            StreakUpdate {
                new_streak: 1,
                new_longest_streak: 10,
                changed: true
            }
        );
    }

    #[test]
    fn test_extension_raises_longest() {
        let update = update_streak(Some(today() - Duration::days(1)), 10, 10, today());
        assert_eq!(update.new_streak, 11);
        assert_eq!(update.new_longest_streak, 11);
    }

    #[test]
    fn test_future_last_activity_is_ignored() {
        let update = update_streak(Some(today() + Duration::days(1)), 3, 4, today());
        assert!(!update.changed);
        assert_eq!(update.new_streak, 3);
    }
}
