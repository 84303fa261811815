//! Search value objects.
//!
//! Nothing here is persisted: filters and moods only shape what the
//! catalog returns.

pub mod filters;
pub mod mood;

pub use filters::SearchFilters;
pub use mood::Mood;
