use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::DomainError;

/// Namespace for deterministic list identifiers (UUID v5)
const LIST_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b75_726f_6c69_7374_8000_0000_0000_0001);

/// A named, user-owned set of catalog record identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    /// Derived from (owner, kind, name) so creation is idempotent
    pub id: String,

    pub name: String,

    pub kind: ListKind,

    /// Catalog record identifiers (a set: no duplicates, order irrelevant)
    pub member_ids: BTreeSet<String>,

    /// Session identity that owns the list
    pub owner_user_id: String,

    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: Option<DateTime<Utc>>,
}

/// Lifecycle bucket of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Watching,
    Completed,
    Planned,
    Custom,
}

impl ListKind {
    pub const ALL: [ListKind; 4] = [
        ListKind::Watching,
        ListKind::Completed,
        ListKind::Planned,
        ListKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Watching => "watching",
            ListKind::Completed => "completed",
            ListKind::Planned => "planned",
            ListKind::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ListKind::Watching => "Watching",
            ListKind::Completed => "Completed",
            ListKind::Planned => "Planned",
            ListKind::Custom => "Custom",
        }
    }
}

impl FromStr for ListKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownVariant {
                kind: "list kind",
                value: s.to_string(),
            })
    }
}

/// Name a list is stored under: the trimmed custom name when one is given,
/// otherwise the kind's display name
pub fn resolve_list_name(kind: ListKind, custom_name: Option<&str>) -> String {
    match custom_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => kind.display_name().to_string(),
    }
}

/// Deterministic list identifier.
/// The same (owner, kind, name) always yields the same id.
pub fn derive_list_id(owner_user_id: &str, kind: ListKind, name: &str) -> String {
    // Unit separator keeps ("a_b", "c") and ("a", "b_c") apart
    let key = format!("{}\u{1f}{}\u{1f}{}", owner_user_id, kind.as_str(), name);
    Uuid::new_v5(&LIST_ID_NAMESPACE, key.as_bytes()).to_string()
}

impl UserList {
    pub fn contains(&self, media_id: &str) -> bool {
        self.member_ids.contains(media_id)
    }

    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for UserList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
