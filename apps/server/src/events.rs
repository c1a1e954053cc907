//! Domain event sink for the web server.
//!
//! Forwards level-ups, goal completions and redemptions to the tracing
//! pipeline, where log shippers and notification hooks pick them up.

use mindquest_core::events::{DomainEvent, DomainEventSink};

#[derive(Clone, Default)]
pub struct TracingDomainEventSink;

impl DomainEventSink for TracingDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(target: "mindquest::events", %payload, "domain event"),
            Err(e) => tracing::warn!("Failed to serialize domain event {:?}: {}", event, e),
        }
    }
}
