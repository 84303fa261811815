// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod media;
pub mod search;
pub mod user_list;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Media Domain (Catalog Records)
pub use media::{normalize_rating, validate_media, Media, MediaKind, RATING_SCALE_MAX};

// User List Domain
pub use user_list::{derive_list_id, resolve_list_name, validate_user_list, ListKind, UserList};

// Search (transient value objects)
pub use search::{Mood, SearchFilters};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl DomainError {
    /// Name of the offending field, when the error is tied to one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DomainError::InvalidField { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
