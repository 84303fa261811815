use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::media::Media;
use crate::domain::DomainError;

/// Browsing lens that groups genres by the feeling they evoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Contemplative,
    Energetic,
    Melancholic,
    Uplifting,
    Mysterious,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Contemplative,
        Mood::Energetic,
        Mood::Melancholic,
        Mood::Uplifting,
        Mood::Mysterious,
    ];

    /// Genres that put a record in this mood (any one is enough)
    pub fn genres(&self) -> &'static [&'static str] {
        match self {
            Mood::Contemplative => &["Drama", "Psychological", "Mystery"],
            Mood::Energetic => &["Action", "Sports", "Adventure"],
            Mood::Melancholic => &["Drama", "Romance", "Slice of Life"],
            Mood::Uplifting => &["Comedy", "Adventure", "Music"],
            Mood::Mysterious => &["Thriller", "Horror", "Supernatural", "Mystery"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mood::Contemplative => "Contemplative",
            Mood::Energetic => "Energetic",
            Mood::Melancholic => "Melancholic",
            Mood::Uplifting => "Uplifting",
            Mood::Mysterious => "Mysterious",
        }
    }

    pub fn matches(&self, media: &Media) -> bool {
        self.genres().iter().any(|genre| media.has_genre(genre))
    }
}

impl FromStr for Mood {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownVariant {
                kind: "mood",
                value: s.to_string(),
            })
    }
}
