//! SQLite storage implementation for patient progression.

mod model;
mod repository;

pub use model::{PatientProgressionChangesetDB, PatientProgressionDB};
pub use repository::PatientProgressionRepository;
