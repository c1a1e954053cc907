//! Therapists module - the therapist award engine and lifetime stats.

mod therapists_model;
mod therapists_service;
mod therapists_traits;

pub use therapists_model::{
    TherapistAction, TherapistCounter, TherapistCounters, TherapistProgression,
};
pub use therapists_service::TherapistRewardService;
pub use therapists_traits::{TherapistProgressionRepositoryTrait, TherapistRewardServiceTrait};
