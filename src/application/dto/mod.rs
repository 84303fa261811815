// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::{Media, UserList};
use crate::state::SurfaceSnapshot;

// ============================================================================
// MEDIA DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDto {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub genres: Vec<String>,
    pub episodes: Option<u32>,
    pub rating: Option<f64>,
    pub status: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Search input. Every filter field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequestDto {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub min_rating: Option<f64>,
    pub status: Option<String>,
}

// ============================================================================
// LIST DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub media_items: Vec<String>,
    pub user_id: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToListDto {
    pub media_id: String,
    /// "watching" | "completed" | "planned" | "custom"
    pub list_type: String,
    pub custom_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveFromListDto {
    pub media_id: String,
    pub list_id: String,
}

// ============================================================================
// SURFACE DTOs
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDto {
    pub items: Vec<MediaDto>,
    pub lists: Vec<UserListDto>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

// ============================================================================
// CONVERSIONS (Domain → DTO)
// ============================================================================

impl From<Media> for MediaDto {
    fn from(media: Media) -> Self {
        Self {
            id: media.id,
            title: media.title,
            year: media.year,
            description: media.description,
            image_url: media.image_url,
            kind: media.kind.as_str().to_string(),
            genres: media.genres,
            episodes: media.episode_count,
            rating: media.rating,
            status: media.status,
            created_at: media.created_at.map(|d| d.to_rfc3339()),
            updated_at: media.updated_at.map(|d| d.to_rfc3339()),
        }
    }
}

impl From<UserList> for UserListDto {
    fn from(list: UserList) -> Self {
        Self {
            id: list.id,
            name: list.name,
            kind: list.kind.as_str().to_string(),
            media_items: list.member_ids.into_iter().collect(),
            user_id: list.owner_user_id,
            created_at: list.created_at.map(|d| d.to_rfc3339()),
            updated_at: list.updated_at.map(|d| d.to_rfc3339()),
        }
    }
}

impl From<SurfaceSnapshot> for SnapshotDto {
    fn from(snapshot: SurfaceSnapshot) -> Self {
        Self {
            items: snapshot.items.into_iter().map(MediaDto::from).collect(),
            lists: snapshot.lists.into_iter().map(UserListDto::from).collect(),
            is_loading: snapshot.is_loading,
            last_error: snapshot.last_error,
        }
    }
}
