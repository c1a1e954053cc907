//! Streak module - consecutive civil-day activity tracking.

mod streak_accumulator;

pub use streak_accumulator::{update_streak, StreakUpdate};
