// src/events/mod.rs
//
// Internal Event System - Public API
//
// The state surface is the only emitter. Presentation code subscribes.

pub mod bus;
pub mod types;

pub use types::DomainEvent;

pub use types::{
    ItemsReplaced, ListsReplaced, MediaAddedToList, MediaRemovedFromList, RequestFailed, Stream,
};

pub use bus::{EventBus, EventLogEntry};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
