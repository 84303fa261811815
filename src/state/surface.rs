// src/state/surface.rs
//
// Observable state surface.
//
// RULES:
// - The catalog and list services are the only writers
// - Every read request goes through a ticket; stale tickets write nothing
// - Store writes hold a WriteGuard instead; their failures are always recorded
// - last_error is cleared when a request or a store write starts
// - Events are emitted after the lock is released

use serde::Serialize;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{Media, UserList};
use crate::error::AppError;
use crate::events::{EventBus, ItemsReplaced, ListsReplaced, RequestFailed, Stream};
use crate::state::generation::{RequestGeneration, RequestOutcome, RequestTicket};

/// Cloned view handed to readers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurfaceSnapshot {
    pub items: Vec<Media>,
    pub lists: Vec<UserList>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    items: Vec<Media>,
    lists: Vec<UserList>,
    last_error: Option<String>,
    items_generation: RequestGeneration,
    lists_generation: RequestGeneration,
    pending_writes: usize,
}

impl SurfaceState {
    fn generation_mut(&mut self, stream: Stream) -> &mut RequestGeneration {
        match stream {
            Stream::Items => &mut self.items_generation,
            Stream::Lists => &mut self.lists_generation,
        }
    }

    fn generation(&self, stream: Stream) -> &RequestGeneration {
        match stream {
            Stream::Items => &self.items_generation,
            Stream::Lists => &self.lists_generation,
        }
    }

    fn is_loading(&self) -> bool {
        self.items_generation.in_flight()
            || self.lists_generation.in_flight()
            || self.pending_writes > 0
    }
}

/// Keeps the surface loading while a store write is in flight
pub struct WriteGuard<'a> {
    surface: &'a StateSurface,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.surface.write();
        state.pending_writes = state.pending_writes.saturating_sub(1);
    }
}

pub struct StateSurface {
    state: RwLock<SurfaceState>,
    events: EventBus,
}

impl StateSurface {
    pub fn new(events: EventBus) -> Self {
        Self {
            state: RwLock::new(SurfaceState::default()),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SurfaceState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SurfaceState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Starts a request: sets loading, clears the last error, supersedes
    /// whatever was in flight on the same stream
    pub fn begin(&self, stream: Stream) -> RequestTicket {
        let mut state = self.write();
        state.last_error = None;
        let generation = state.generation_mut(stream).advance();
        log::debug!("Request {}#{} started", stream.as_str(), generation);
        RequestTicket { stream, generation }
    }

    /// Starts a store write. Writes are not superseded by later requests,
    /// so no generation is advanced.
    pub fn begin_write(&self) -> WriteGuard<'_> {
        let mut state = self.write();
        state.last_error = None;
        state.pending_writes += 1;
        WriteGuard { surface: self }
    }

    /// Records a failed store write on `stream`, whatever requests have
    /// started since. Items and lists are left alone.
    pub fn record_write_failure(&self, stream: Stream, error: &AppError) -> RequestOutcome {
        let message = error.to_string();
        self.write().last_error = Some(message.clone());
        log::error!("Write on {} failed: {}", stream.as_str(), message);
        self.events.emit(RequestFailed::new(stream, message));
        RequestOutcome::Failed
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.read().generation(ticket.stream).is_current(ticket.generation)
    }

    /// Replaces the items if the ticket is still current
    pub fn complete_items(&self, ticket: RequestTicket, items: Vec<Media>) -> RequestOutcome {
        let count = items.len();
        {
            let mut state = self.write();
            if !state.generation_mut(Stream::Items).settle(ticket.generation) {
                return superseded(&ticket);
            }
            state.items = items;
        }
        self.events.emit(ItemsReplaced::new(count, ticket.generation));
        RequestOutcome::Applied(count)
    }

    /// Replaces the lists if the ticket is still current
    pub fn complete_lists(&self, ticket: RequestTicket, lists: Vec<UserList>) -> RequestOutcome {
        let count = lists.len();
        {
            let mut state = self.write();
            if !state.generation_mut(Stream::Lists).settle(ticket.generation) {
                return superseded(&ticket);
            }
            state.lists = lists;
        }
        self.events.emit(ListsReplaced::new(count, ticket.generation));
        RequestOutcome::Applied(count)
    }

    /// Records the failure if the ticket is still current.
    /// Prior items and lists stay as they were.
    pub fn fail(&self, ticket: RequestTicket, error: &AppError) -> RequestOutcome {
        let message = error.to_string();
        {
            let mut state = self.write();
            if !state.generation_mut(ticket.stream).settle(ticket.generation) {
                return superseded(&ticket);
            }
            state.last_error = Some(message.clone());
        }
        log::error!("Request {}#{} failed: {}", ticket.stream.as_str(), ticket.generation, message);
        self.events.emit(RequestFailed::new(ticket.stream, message));
        RequestOutcome::Failed
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        let state = self.read();
        SurfaceSnapshot {
            items: state.items.clone(),
            lists: state.lists.clone(),
            is_loading: state.is_loading(),
            last_error: state.last_error.clone(),
        }
    }

    pub fn items(&self) -> Vec<Media> {
        self.read().items.clone()
    }

    pub fn lists(&self) -> Vec<UserList> {
        self.read().lists.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    pub fn generation(&self, stream: Stream) -> u64 {
        self.read().generation(stream).current()
    }
}

fn superseded(ticket: &RequestTicket) -> RequestOutcome {
    log::debug!(
        "Request {}#{} superseded, discarding its result",
        ticket.stream.as_str(),
        ticket.generation
    );
    RequestOutcome::Superseded
}
