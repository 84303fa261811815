//! Critical User List Invariants:
//!
//! 1. The list id is a pure function of (owner, kind, name)
//! 2. Members form a set: adding a present id or removing an absent one is a no-op
//! 3. Lists only reference catalog records, they never own them
//! 4. Owner and name cannot be empty

pub mod entity;

pub use entity::{derive_list_id, resolve_list_name, ListKind, UserList};

use crate::domain::{DomainError, DomainResult};

/// Validates UserList invariants
pub fn validate_user_list(list: &UserList) -> DomainResult<()> {
    if list.name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "List name cannot be empty".to_string(),
        ));
    }
    if list.owner_user_id.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "List owner cannot be empty".to_string(),
        ));
    }
    Ok(())
}
