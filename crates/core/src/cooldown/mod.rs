//! Cooldown module - decides whether an action may award XP right now.

mod cooldown_policy;

pub use cooldown_policy::{can_award, CooldownRule};
