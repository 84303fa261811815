// src/query/builder.rs
//
// Turns a SearchFilters value plus free text into a CatalogQuery.
//
// RULES:
// - Each populated filter field adds exactly one predicate (year range adds two bounds)
// - Free text never becomes a backend predicate; it is matched after decoding
// - Non-empty text raises the effective limit to the scan limit
// - No error conditions

use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_SCAN_LIMIT};
use crate::domain::{Media, SearchFilters};
use crate::repositories::media_repository::fields;
use crate::store::{OrderBy, Predicate, StoreQuery};

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    filters: SearchFilters,
    text: String,
    limit: usize,
    scan_limit: usize,
    order_by: Option<OrderBy>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            filters: SearchFilters::default(),
            text: String::new(),
            limit: DEFAULT_PAGE_SIZE,
            scan_limit: DEFAULT_SEARCH_SCAN_LIMIT,
            order_by: None,
        }
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: &SearchFilters) -> Self {
        self.filters = filters.clone();
        self
    }

    /// Whitespace-only text counts as no text
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.trim().to_string();
        self
    }

    /// Page size; 0 is clamped to 1
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit.max(1);
        self
    }

    pub fn ordered_by(mut self, field: &str, descending: bool) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            descending,
        });
        self
    }

    pub fn build(self) -> CatalogQuery {
        let predicates = predicates_for(&self.filters);

        let (text, limit) = if self.text.is_empty() {
            (None, self.limit)
        } else {
            (Some(self.text.to_lowercase()), self.scan_limit)
        };

        CatalogQuery {
            filters: self.filters,
            predicates,
            text,
            limit,
            order_by: self.order_by,
        }
    }
}

fn predicates_for(filters: &SearchFilters) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(kind) = filters.kind {
        predicates.push(Predicate::equals(fields::TYPE, kind.as_str()));
    }
    if !filters.genres.is_empty() {
        predicates.push(Predicate::array_contains_any(
            fields::GENRES,
            filters.genres.iter().cloned(),
        ));
    }
    if let Some(years) = &filters.year_range {
        predicates.push(Predicate::greater_or_equal(fields::YEAR, *years.start()));
        predicates.push(Predicate::less_or_equal(fields::YEAR, *years.end()));
    }
    if let Some(min) = filters.min_rating {
        predicates.push(Predicate::greater_or_equal(fields::RATING, min));
    }
    if let Some(status) = &filters.status {
        predicates.push(Predicate::equals(fields::STATUS, status.as_str()));
    }

    predicates
}

/// Backend query descriptor. Only the catalog service consumes it.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub(crate) filters: SearchFilters,
    pub(crate) predicates: Vec<Predicate>,
    /// Lowercased, trimmed; `None` when empty
    pub(crate) text: Option<String>,
    pub(crate) limit: usize,
    pub(crate) order_by: Option<OrderBy>,
}

impl CatalogQuery {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn text_filter(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn to_store_query(&self, collection: &str) -> StoreQuery {
        let mut query = StoreQuery::collection(collection).limit(self.limit);
        query.order_by = self.order_by.clone();
        query.predicates = self.predicates.clone();
        query
    }

    /// Client-side pass over a decoded record: filters again on the
    /// canonical values, then the free-text match
    pub fn accepts(&self, media: &Media) -> bool {
        self.filters.matches(media) && self.matches_text(media)
    }

    /// Case-insensitive substring over title, description and genres
    pub fn matches_text(&self, media: &Media) -> bool {
        let Some(needle) = self.text.as_deref() else {
            return true;
        };
        media.title.to_lowercase().contains(needle)
            || media.description.to_lowercase().contains(needle)
            || media
                .genres
                .iter()
                .any(|genre| genre.to_lowercase().contains(needle))
    }
}
