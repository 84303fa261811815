use super::entity::Media;
use crate::domain::{DomainError, DomainResult};

/// Upper bound of the canonical rating scale
pub const RATING_SCALE_MAX: f64 = 10.0;

/// Upper bound of the legacy percentage scale some catalog rows still use
const LEGACY_SCALE_MAX: f64 = 100.0;

/// Validates all Media invariants
pub fn validate_media(media: &Media) -> DomainResult<()> {
    validate_title(&media.title)?;
    validate_rating(media.rating)?;
    Ok(())
}

/// Title cannot be blank
fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field: "title",
            reason: "cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// A present rating must already be on the canonical scale
fn validate_rating(rating: Option<f64>) -> DomainResult<()> {
    if let Some(r) = rating {
        if !(0.0..=RATING_SCALE_MAX).contains(&r) {
            return Err(DomainError::InvalidField {
                field: "rating",
                reason: format!("{} is outside 0-{}", r, RATING_SCALE_MAX),
            });
        }
    }
    Ok(())
}

/// Maps a raw backend rating onto the canonical 0-10 scale.
///
/// - `0..=10` is taken as-is
/// - `(10, 100]` is the legacy percentage scale and is divided by ten
/// - anything else (negative, NaN, above 100) is not a rating at all
pub fn normalize_rating(raw: f64) -> Option<f64> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    if raw <= RATING_SCALE_MAX {
        Some(raw)
    } else if raw <= LEGACY_SCALE_MAX {
        Some(raw / 10.0)
    } else {
        None
    }
}

/// Invariants that must hold true for the Media domain:
///
/// 1. Identity is assigned by the backend and never changes
/// 2. Title cannot be blank
/// 3. Missing episode count means "unknown", never zero
/// 4. Missing rating means "unrated", never zero
/// 5. Ratings are stored on the 0-10 scale
