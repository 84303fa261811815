pub mod entity;
pub mod invariants;

pub use entity::{Media, MediaKind};
pub use invariants::{normalize_rating, validate_media, RATING_SCALE_MAX};
