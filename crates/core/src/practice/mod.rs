//! Practice facts - sessions and ledger entries owned by other parts of the
//! application and read by the goal recalculator.

mod practice_model;
mod practice_traits;

pub use practice_model::{EntryKind, FinancialEntry, SessionRecord, SessionStatus};
pub use practice_traits::PracticeFactsRepositoryTrait;
