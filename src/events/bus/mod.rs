// events/bus/mod.rs

pub mod event_bus;

pub use event_bus::{EventBus, EventLogEntry};
