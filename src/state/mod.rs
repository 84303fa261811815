// src/state/mod.rs
//
// Observable state: what the presentation layer reads.

pub mod generation;
pub mod surface;

pub use generation::{RequestOutcome, RequestTicket};
pub use surface::{StateSurface, SurfaceSnapshot, WriteGuard};
