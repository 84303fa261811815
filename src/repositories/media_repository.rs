// src/repositories/media_repository.rs
//
// Catalog record persistence over the `media` collection.
// Mapping only: no business logic, no events.

use serde_json::Value;
use std::sync::Arc;

use crate::domain::{normalize_rating, validate_media, Media, MediaKind};
use crate::error::AppResult;
use crate::repositories::decode::{
    as_whole_number, invalid, optional_str, optional_timestamp, required, required_str,
    DecodeError, DecodeObserver,
};
use crate::store::{DocumentStore, Fields, RawDocument, StoreQuery, MEDIA_COLLECTION};

/// Stored field names of the `media` collection
pub mod fields {
    pub const TITLE: &str = "title";
    pub const YEAR: &str = "year";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE_URL: &str = "image_url";
    pub const TYPE: &str = "type";
    pub const GENRES: &str = "genres";
    pub const EPISODES: &str = "episodes";
    pub const STATUS: &str = "status";
    pub const RATING: &str = "rating";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Status used when a document carries none
pub const DEFAULT_STATUS: &str = "Unknown";

/// Decodes one `media` document.
///
/// Required: title, year, description, type, genres.
/// Optional fields of the wrong type read as absent.
pub fn decode_media(doc: &RawDocument) -> Result<Media, DecodeError> {
    let title = required_str(doc, fields::TITLE)?.to_string();

    let year_value = required(doc, fields::YEAR)?;
    let year = as_whole_number(year_value)
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| invalid(doc, fields::YEAR, format!("expected a whole year, got {}", year_value)))?;

    let description = required_str(doc, fields::DESCRIPTION)?.to_string();

    let kind_raw = required_str(doc, fields::TYPE)?;
    let kind: MediaKind = kind_raw
        .parse()
        .map_err(|e: crate::domain::DomainError| invalid(doc, fields::TYPE, e.to_string()))?;

    let genres = match required(doc, fields::GENRES)? {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(doc, fields::GENRES, "genre is not a string"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(invalid(doc, fields::GENRES, "expected an array")),
    };

    let episode_count = doc
        .get(fields::EPISODES)
        .and_then(as_whole_number)
        .and_then(|n| u32::try_from(n).ok());

    let rating = doc.get(fields::RATING).and_then(Value::as_f64).and_then(|raw| {
        let normalized = normalize_rating(raw);
        if normalized.is_none() {
            log::warn!("Rating {} on '{}' is out of range, treating as unrated", raw, doc.id);
        }
        normalized
    });

    let media = Media {
        id: doc.id.clone(),
        title,
        year,
        description,
        image_url: optional_str(doc, fields::IMAGE_URL).map(str::to_string),
        kind,
        genres,
        episode_count,
        rating,
        status: optional_str(doc, fields::STATUS)
            .unwrap_or(DEFAULT_STATUS)
            .to_string(),
        created_at: optional_timestamp(doc, fields::CREATED_AT),
        updated_at: optional_timestamp(doc, fields::UPDATED_AT),
    };

    validate_media(&media)
        .map_err(|e| invalid(doc, e.field().unwrap_or("record"), e.to_string()))?;

    Ok(media)
}

/// Field map written for a record. Timestamps are left to the store.
pub fn encode_media(media: &Media) -> Fields {
    let mut body = Fields::new();
    body.insert(fields::TITLE.into(), Value::from(media.title.as_str()));
    body.insert(fields::YEAR.into(), Value::from(media.year));
    body.insert(fields::DESCRIPTION.into(), Value::from(media.description.as_str()));
    if let Some(url) = &media.image_url {
        body.insert(fields::IMAGE_URL.into(), Value::from(url.as_str()));
    }
    body.insert(fields::TYPE.into(), Value::from(media.kind.as_str()));
    body.insert(
        fields::GENRES.into(),
        Value::Array(media.genres.iter().map(|g| Value::from(g.as_str())).collect()),
    );
    if let Some(episodes) = media.episode_count {
        body.insert(fields::EPISODES.into(), Value::from(episodes));
    }
    body.insert(fields::STATUS.into(), Value::from(media.status.as_str()));
    if let Some(rating) = media.rating {
        body.insert(fields::RATING.into(), Value::from(rating));
    }
    body
}

pub struct MediaRepository {
    store: Arc<dyn DocumentStore>,
    observer: Arc<dyn DecodeObserver>,
}

impl MediaRepository {
    pub fn new(store: Arc<dyn DocumentStore>, observer: Arc<dyn DecodeObserver>) -> Self {
        Self { store, observer }
    }

    /// Runs the query and decodes every document, dropping the ones that fail
    pub async fn query(&self, query: &StoreQuery) -> AppResult<Vec<Media>> {
        let documents = self.store.list_records(query).await?;
        let total = documents.len();

        let records: Vec<Media> = documents
            .iter()
            .filter_map(|doc| match decode_media(doc) {
                Ok(media) => Some(media),
                Err(e) => {
                    self.observer.record_dropped(MEDIA_COLLECTION, &e);
                    None
                }
            })
            .collect();

        if records.len() < total {
            log::debug!("Decoded {} of {} media documents", records.len(), total);
        }
        Ok(records)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<Media>> {
        let Some(doc) = self.store.get_document(MEDIA_COLLECTION, id).await? else {
            return Ok(None);
        };
        match decode_media(&doc) {
            Ok(media) => Ok(Some(media)),
            Err(e) => {
                self.observer.record_dropped(MEDIA_COLLECTION, &e);
                Ok(None)
            }
        }
    }

    pub async fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.store.get_document(MEDIA_COLLECTION, id).await?.is_some())
    }

    /// Overwrites the record under its id
    pub async fn save(&self, media: &Media) -> AppResult<()> {
        self.store
            .set_document(MEDIA_COLLECTION, &media.id, encode_media(media), false)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::decode::LoggingDecodeObserver;
    use crate::store::InMemoryDocumentStore;
    use serde_json::json;

    fn doc(value: Value) -> RawDocument {
        RawDocument::new("m1", value.as_object().cloned().unwrap())
    }

    fn complete() -> Value {
        json!({
            "title": "Your Name",
            "year": 2016,
            "description": "Body swap across time.",
            "type": "anime",
            "genres": ["Romance", "Drama"],
            "episodes": 1,
            "rating": 8.4,
            "status": "Completed",
            "image_url": "https://example.org/your-name.jpg",
            "created_at": "2024-01-02T00:00:00.000000Z"
        })
    }

    #[test]
    fn test_decode_complete_document() {
        let media = decode_media(&doc(complete())).unwrap();
        assert_eq!(media.id, "m1");
        assert_eq!(media.kind, MediaKind::Anime);
        assert_eq!(media.genres, vec!["Romance", "Drama"]);
        assert_eq!(media.episode_count, Some(1));
        assert_eq!(media.rating, Some(8.4));
        assert_eq!(media.image_url.as_deref(), Some("https://example.org/your-name.jpg"));
        assert!(media.created_at.is_some());
        assert!(media.updated_at.is_none());
    }

    #[test]
    fn test_each_required_field_is_required() {
        for field in ["title", "year", "description", "type", "genres"] {
            let mut value = complete();
            value.as_object_mut().unwrap().remove(field);
            let err = decode_media(&doc(value)).unwrap_err();
            assert_eq!(err.field(), field);
            assert!(matches!(err, DecodeError::MissingField { .. }));
        }
    }

    #[test]
    fn test_unknown_type_is_invalid() {
        let mut value = complete();
        value["type"] = json!("novel");
        let err = decode_media(&doc(value)).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "type", .. }));
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let mut value = complete();
        value["title"] = json!("   ");
        let err = decode_media(&doc(value)).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "title", .. }));
    }

    #[test]
    fn test_optional_fields_default() {
        let mut value = complete();
        let body = value.as_object_mut().unwrap();
        body.remove("episodes");
        body.remove("rating");
        body.remove("status");
        body.remove("image_url");

        let media = decode_media(&doc(value)).unwrap();
        assert_eq!(media.episode_count, None);
        assert_eq!(media.rating, None);
        assert_eq!(media.status, "Unknown");
        assert_eq!(media.image_url, None);
    }

    #[test]
    fn test_zero_episodes_is_not_unknown() {
        let mut value = complete();
        value["episodes"] = json!(0);
        assert_eq!(decode_media(&doc(value)).unwrap().episode_count, Some(0));
    }

    #[test]
    fn test_rating_scale_normalization() {
        let mut value = complete();
        value["rating"] = json!(87);
        assert_eq!(decode_media(&doc(value.clone())).unwrap().rating, Some(8.7));

        value["rating"] = json!(-1);
        assert_eq!(decode_media(&doc(value.clone())).unwrap().rating, None);

        value["rating"] = json!(250);
        assert_eq!(decode_media(&doc(value.clone())).unwrap().rating, None);

        value["rating"] = json!("9.0");
        assert_eq!(decode_media(&doc(value)).unwrap().rating, None);
    }

    #[test]
    fn test_encode_then_decode_keeps_fields() {
        let media = decode_media(&doc(complete())).unwrap();
        let encoded = encode_media(&media);
        assert!(!encoded.contains_key("created_at"));

        let decoded = decode_media(&RawDocument::new("m1", encoded)).unwrap();
        assert_eq!(decoded.title, media.title);
        assert_eq!(decoded.rating, media.rating);
        assert_eq!(decoded.episode_count, media.episode_count);
    }

    #[tokio::test]
    async fn test_query_drops_and_reports_bad_documents() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert_raw("media", "good", complete());
        store.insert_raw("media", "bad", json!({ "title": "No year" }));

        let observer = Arc::new(LoggingDecodeObserver::new());
        let repo = MediaRepository::new(store, observer.clone());

        let records = repo.query(&StoreQuery::collection("media")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "good");
        assert_eq!(observer.dropped_count(), 1);
    }
}
