use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::DomainError;

/// One catalog entry (anime, manga or manhwa).
/// Records are read-only from the client's side: the backend assigns the
/// identifier and both timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Backend-assigned identifier, immutable once assigned
    pub id: String,

    pub title: String,

    pub year: i32,

    pub description: String,

    /// Cover art location (if any)
    pub image_url: Option<String>,

    pub kind: MediaKind,

    /// Free-text tags in backend order, not deduplicated
    pub genres: Vec<String>,

    /// Episodes (anime) or chapters (manga/manhwa).
    /// `None` means ongoing/unknown, which is not the same as zero.
    pub episode_count: Option<u32>,

    /// Canonical 0-10 scale. `None` means unrated.
    pub rating: Option<f64>,

    /// Lifecycle label ("Completed", "Ongoing", ...)
    pub status: String,

    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: Option<DateTime<Utc>>,
}

/// Closed set of media kinds the catalog knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Anime,
    Manga,
    Manhwa,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Anime, MediaKind::Manga, MediaKind::Manhwa];

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Anime => "anime",
            MediaKind::Manga => "manga",
            MediaKind::Manhwa => "manhwa",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MediaKind::Anime => "Anime",
            MediaKind::Manga => "Manga",
            MediaKind::Manhwa => "Manhwa",
        }
    }
}

impl FromStr for MediaKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownVariant {
                kind: "media kind",
                value: s.to_string(),
            })
    }
}

impl Media {
    pub fn is_rated(&self) -> bool {
        self.rating.is_some()
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}
