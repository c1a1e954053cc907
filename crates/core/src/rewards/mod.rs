//! Rewards module - the patient award engine.

mod rewards_model;
mod rewards_service;
mod rewards_traits;

pub use rewards_model::{
    reward_for, AwardEvent, AwardParams, PatientAction, PatientProgression, Reward, StreakInfo,
    TaskPriority,
};
pub use rewards_service::RewardService;
pub use rewards_traits::{PatientProgressionRepositoryTrait, RewardServiceTrait};
