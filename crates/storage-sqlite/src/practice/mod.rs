//! SQLite storage for practice facts (therapy sessions and the financial ledger).

mod model;
mod repository;

pub use model::{FinancialEntryDB, SessionRecordDB};
pub use repository::PracticeFactsRepository;
