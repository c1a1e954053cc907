//! Progression module - XP to level math shared by patients and therapists.

mod progression_model;

pub use progression_model::{
    ActorKind, ProgressionCurve, ProgressionInfo, PATIENT_CURVE, PATIENT_XP_PER_LEVEL,
    THERAPIST_CURVE, THERAPIST_XP_PER_LEVEL,
};
