use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::domain::media::{Media, MediaKind};

/// Transient predicate bundle applied to a catalog query.
///
/// Every field is optional: an absent field leaves that dimension
/// unconstrained, it never means "match nothing". `genres` uses OR
/// semantics, and an empty list is the same as no genre filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub kind: Option<MediaKind>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub year_range: Option<RangeInclusive<i32>>,
    pub min_rating: Option<f64>,
    pub status: Option<String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year_range(mut self, years: RangeInclusive<i32>) -> Self {
        self.year_range = Some(years);
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// True when no field constrains the result
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.genres.is_empty()
            && self.year_range.is_none()
            && self.min_rating.is_none()
            && self.status.is_none()
    }

    /// Evaluates every populated field against a decoded record.
    /// An unrated record never satisfies a minimum rating.
    pub fn matches(&self, media: &Media) -> bool {
        if let Some(kind) = self.kind {
            if media.kind != kind {
                return false;
            }
        }
        if !self.genres.is_empty() && !self.genres.iter().any(|g| media.has_genre(g)) {
            return false;
        }
        if let Some(years) = &self.year_range {
            if !years.contains(&media.year) {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            match media.rating {
                Some(rating) if rating >= min => {}
                _ => return false,
            }
        }
        if let Some(status) = &self.status {
            if &media.status != status {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(year: i32, rating: Option<f64>, genres: &[&str]) -> Media {
        Media {
            id: format!("m-{}", year),
            title: "Title".to_string(),
            year,
            description: String::new(),
            image_url: None,
            kind: MediaKind::Anime,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            episode_count: None,
            rating,
            status: "Completed".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let filters = SearchFilters::new();
        assert!(filters.is_empty());
        assert!(filters.matches(&media(1989, None, &[])));
    }

    #[test]
    fn test_genres_use_or_semantics() {
        let filters = SearchFilters::new().with_genres(["Action", "Romance"]);
        assert!(filters.matches(&media(2016, None, &["Romance", "Drama"])));
        assert!(!filters.matches(&media(2016, None, &["Drama"])));
    }

    #[test]
    fn test_year_range_is_inclusive() {
        let filters = SearchFilters::new().with_year_range(2010..=2020);
        assert!(filters.matches(&media(2010, None, &[])));
        assert!(filters.matches(&media(2020, None, &[])));
        assert!(!filters.matches(&media(2021, None, &[])));
    }

    #[test]
    fn test_unrated_never_meets_minimum_rating() {
        let filters = SearchFilters::new().with_min_rating(0.0);
        assert!(!filters.matches(&media(2000, None, &[])));
        assert!(filters.matches(&media(2000, Some(0.0), &[])));
    }

    #[test]
    fn test_kind_and_status_are_exact() {
        let filters = SearchFilters::new()
            .with_kind(MediaKind::Manga)
            .with_status("Completed");
        assert!(!filters.matches(&media(2000, None, &[])));

        let mut manga = media(2000, None, &[]);
        manga.kind = MediaKind::Manga;
        assert!(filters.matches(&manga));
        manga.status = "completed".to_string();
        assert!(!filters.matches(&manga));
    }
}
