// events/types.rs
//
// Surface events.
// Each event is a fact about the observable state that has already happened.
//
// RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! domain_event {
    ($name:ident) => {
        impl DomainEvent for $name {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &'static str {
                stringify!($name)
            }
        }
    };
}

/// Which half of the surface a request writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Items,
    Lists,
}

impl Stream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Items => "items",
            Stream::Lists => "lists",
        }
    }
}

// ============================================================================
// SNAPSHOT EVENTS
// ============================================================================

/// Emitted when a request replaces the surface items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsReplaced {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub item_count: usize,
    pub generation: u64,
}

impl ItemsReplaced {
    pub fn new(item_count: usize, generation: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            item_count,
            generation,
        }
    }
}

domain_event!(ItemsReplaced);

/// Emitted when the user's lists are reloaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListsReplaced {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub list_count: usize,
    pub generation: u64,
}

impl ListsReplaced {
    pub fn new(list_count: usize, generation: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            list_count,
            generation,
        }
    }
}

domain_event!(ListsReplaced);

/// Emitted when a request's failure lands in `last_error`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub stream: Stream,
    pub message: String,
}

impl RequestFailed {
    pub fn new(stream: Stream, message: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            stream,
            message,
        }
    }
}

domain_event!(RequestFailed);

// ============================================================================
// LIST MEMBERSHIP EVENTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAddedToList {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub list_id: String,
    pub media_id: String,
    pub user_id: String,
}

impl MediaAddedToList {
    pub fn new(list_id: String, media_id: String, user_id: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            list_id,
            media_id,
            user_id,
        }
    }
}

domain_event!(MediaAddedToList);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRemovedFromList {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub list_id: String,
    pub media_id: String,
    pub user_id: String,
}

impl MediaRemovedFromList {
    pub fn new(list_id: String, media_id: String, user_id: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            list_id,
            media_id,
            user_id,
        }
    }
}

domain_event!(MediaRemovedFromList);
