// src/services/catalog_service.rs
//
// Catalog reads: recent listing, search, genre browsing, the user's lists.
//
// RULES:
// - No error crosses this boundary: failures land in last_error
// - Results are written only through a current ticket
// - Filters are checked again on decoded records (canonical rating scale)

use std::sync::Arc;

use crate::config::CoreConfig;
use crate::domain::{Media, Mood, SearchFilters};
use crate::error::AppError;
use crate::events::Stream;
use crate::query::{CatalogQuery, QueryBuilder};
use crate::repositories::media_repository::fields;
use crate::repositories::{MediaRepository, UserListRepository};
use crate::session::SessionProvider;
use crate::state::{RequestOutcome, RequestTicket, StateSurface};
use crate::store::MEDIA_COLLECTION;

/// Outcome of the two loads run at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialLoadOutcome {
    pub items: RequestOutcome,
    pub lists: RequestOutcome,
}

pub struct CatalogService {
    media_repo: Arc<MediaRepository>,
    list_repo: Arc<UserListRepository>,
    session: Arc<dyn SessionProvider>,
    surface: Arc<StateSurface>,
    config: CoreConfig,
}

impl CatalogService {
    pub fn new(
        media_repo: Arc<MediaRepository>,
        list_repo: Arc<UserListRepository>,
        session: Arc<dyn SessionProvider>,
        surface: Arc<StateSurface>,
        config: CoreConfig,
    ) -> Self {
        Self {
            media_repo,
            list_repo,
            session,
            surface,
            config,
        }
    }

    pub fn surface(&self) -> &Arc<StateSurface> {
        &self.surface
    }

    /// Newest records first, capped at `limit`
    pub async fn fetch_recent(&self, limit: usize) -> RequestOutcome {
        let ticket = self.surface.begin(Stream::Items);
        let query = QueryBuilder::new()
            .with_limit(limit)
            .ordered_by(fields::CREATED_AT, true)
            .build();
        self.run_items_query(ticket, &query).await
    }

    /// Empty (or whitespace) text: the backend-filtered page.
    /// Otherwise: the filtered set up to the scan limit, narrowed to
    /// records whose title, description or a genre contains the text.
    pub async fn search(&self, text: &str, filters: &SearchFilters) -> RequestOutcome {
        let ticket = self.surface.begin(Stream::Items);
        let query = QueryBuilder::new()
            .with_filters(filters)
            .with_text(text)
            .with_limit(self.config.page_size)
            .with_scan_limit(self.config.search_scan_limit)
            .build();
        self.run_items_query(ticket, &query).await
    }

    /// Records tagged with `genre`, best rated first
    pub async fn browse_by_genre(&self, genre: &str) -> RequestOutcome {
        let ticket = self.surface.begin(Stream::Items);
        let filters = SearchFilters::new().with_genres([genre.trim()]);
        let query = QueryBuilder::new()
            .with_filters(&filters)
            .with_limit(self.config.page_size)
            .ordered_by(fields::RATING, true)
            .build();
        self.run_items_query(ticket, &query).await
    }

    /// Lists owned by the signed-in user
    pub async fn load_user_lists(&self) -> RequestOutcome {
        let ticket = self.surface.begin(Stream::Lists);
        let Some(user_id) = self.session.current_user_id() else {
            return self.surface.fail(ticket, &AppError::Unauthenticated);
        };

        match self.list_repo.list_for_owner(&user_id).await {
            Ok(lists) => {
                log::info!("Loaded {} lists for {}", lists.len(), user_id);
                self.surface.complete_lists(ticket, lists)
            }
            Err(e) => self.surface.fail(ticket, &e),
        }
    }

    /// Recent records, then the user's lists
    pub async fn load_initial_data(&self) -> InitialLoadOutcome {
        let items = self.fetch_recent(self.config.recent_limit).await;
        let lists = self.load_user_lists().await;
        InitialLoadOutcome { items, lists }
    }

    /// Current surface items that fit the mood. No backend call.
    pub fn items_for_mood(&self, mood: Mood) -> Vec<Media> {
        self.surface
            .items()
            .into_iter()
            .filter(|media| mood.matches(media))
            .collect()
    }

    async fn run_items_query(&self, ticket: RequestTicket, query: &CatalogQuery) -> RequestOutcome {
        let store_query = query.to_store_query(MEDIA_COLLECTION);
        log::debug!(
            "Items query: {} predicates, limit {}, text {:?}",
            store_query.predicates.len(),
            query.limit(),
            query.text_filter()
        );

        match self.media_repo.query(&store_query).await {
            Ok(records) => {
                let items: Vec<Media> = records.into_iter().filter(|m| query.accepts(m)).collect();
                let outcome = self.surface.complete_items(ticket, items);
                if let RequestOutcome::Applied(count) = outcome {
                    log::info!("Loaded {} catalog records", count);
                }
                outcome
            }
            Err(e) => self.surface.fail(ticket, &e),
        }
    }
}
