//! Goals module - practice goals and their recalculation from raw facts.

mod goals_calculator;
mod goals_model;
mod goals_service;
mod goals_traits;

pub use goals_calculator::{
    attendance_rate, completed_session_count, distinct_patient_count, evaluation_window,
    is_percentage_unit, revenue_total, EvaluationWindow, UNIMPLEMENTED_CATEGORY_VALUE,
};
pub use goals_model::{Goal, GoalCategory, GoalRecalculation, GoalStatus, NewGoal};
pub use goals_service::GoalService;
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
