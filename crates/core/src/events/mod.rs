//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after successful progression mutations. Runtime adapters implement the
//! sink to turn level-ups and completed goals into notifications.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
