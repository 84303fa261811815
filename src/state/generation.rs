// src/state/generation.rs
//
// Per-stream request generations.
// A request takes a ticket when it starts; only the newest ticket of a
// stream may write results, errors or clear the loading flag.

use serde::Serialize;

use crate::events::Stream;

/// Proof of having started a request on a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub stream: Stream,
    pub generation: u64,
}

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "count", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Results were written; carries the number of entries now on the surface
    Applied(usize),
    /// The error was written to `last_error`
    Failed,
    /// A newer request on the same stream started first; nothing was written
    Superseded,
}

impl RequestOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RequestOutcome::Applied(_))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RequestGeneration {
    current: u64,
    in_flight: bool,
}

impl RequestGeneration {
    /// Starts a new request, superseding any in flight
    pub(crate) fn advance(&mut self) -> u64 {
        self.current += 1;
        self.in_flight = true;
        self.current
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.current == generation
    }

    /// Ends the request if it is still the current one
    pub(crate) fn settle(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.in_flight = false;
        true
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn current(&self) -> u64 {
        self.current
    }
}
