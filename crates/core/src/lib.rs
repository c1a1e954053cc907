//! MindQuest Core - progression rules, services, and traits.
//!
//! This crate contains the gamification logic for patients and therapists:
//! XP and levels, coins, day-based streaks, cooldown-gated rewards and
//! goal recalculation. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod clock;
pub mod cooldown;
pub mod errors;
pub mod events;
pub mod goals;
pub mod practice;
pub mod progression;
pub mod rewards;
pub mod streaks;
pub mod therapists;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
