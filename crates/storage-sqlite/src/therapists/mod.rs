//! SQLite storage implementation for therapist progression.

mod model;
mod repository;

pub use model::{TherapistProgressionChangesetDB, TherapistProgressionDB};
pub use repository::TherapistProgressionRepository;
