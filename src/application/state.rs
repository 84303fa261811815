// src/application/state.rs
//
// Application state: explicit wiring of the store, the session and the
// services. No global client: every dependency is injected here.

use serde::Serialize;
use std::sync::Arc;

use crate::config::CoreConfig;
use crate::db::{get_connection, get_database_stats, ConnectionPool, DatabaseStats};
use crate::error::AppResult;
use crate::events::{create_event_bus, EventBus, Stream};
use crate::repositories::{
    DecodeObserver, LoggingDecodeObserver, MediaRepository, UserListRepository,
};
use crate::services::{CatalogService, ListService, SeedService};
use crate::session::SessionProvider;
use crate::state::StateSurface;
use crate::store::{DocumentStore, StoreQuery, MEDIA_COLLECTION};

/// Shared state handed to every command.
/// All fields are Arc-wrapped for sharing across tasks.
pub struct AppState {
    pub config: CoreConfig,
    pub store: Arc<dyn DocumentStore>,
    pub session: Arc<dyn SessionProvider>,
    pub surface: Arc<StateSurface>,
    pub decode_observer: Arc<dyn DecodeObserver>,
    pub catalog_service: Arc<CatalogService>,
    pub list_service: Arc<ListService>,
    pub seed_service: Arc<SeedService>,
    pool: Option<Arc<ConnectionPool>>,
}

/// Health report for the running core
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub store_reachable: bool,
    pub store_error: Option<String>,
    pub signed_in: bool,
    pub item_count: usize,
    pub list_count: usize,
    pub items_generation: u64,
    pub lists_generation: u64,
    pub dropped_records: u64,
    pub database: Option<DatabaseStats>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        session: Arc<dyn SessionProvider>,
        config: CoreConfig,
    ) -> Self {
        Self::with_observer(store, session, config, Arc::new(LoggingDecodeObserver::new()))
    }

    pub fn with_observer(
        store: Arc<dyn DocumentStore>,
        session: Arc<dyn SessionProvider>,
        config: CoreConfig,
        decode_observer: Arc<dyn DecodeObserver>,
    ) -> Self {
        // 1. REPOSITORIES
        let media_repo = Arc::new(MediaRepository::new(store.clone(), decode_observer.clone()));
        let list_repo = Arc::new(UserListRepository::new(
            store.clone(),
            decode_observer.clone(),
        ));

        // 2. OBSERVABLE STATE
        let surface = Arc::new(StateSurface::new(create_event_bus()));

        // 3. SERVICES
        let catalog_service = Arc::new(CatalogService::new(
            media_repo.clone(),
            list_repo.clone(),
            session.clone(),
            surface.clone(),
            config.clone(),
        ));
        let list_service = Arc::new(ListService::new(
            list_repo,
            catalog_service.clone(),
            session.clone(),
            surface.clone(),
        ));
        let seed_service = Arc::new(SeedService::new(
            media_repo,
            list_service.clone(),
            session.clone(),
        ));

        Self {
            config,
            store,
            session,
            surface,
            decode_observer,
            catalog_service,
            list_service,
            seed_service,
            pool: None,
        }
    }

    /// Attaches the local database so diagnostics can report its stats
    pub fn with_pool(mut self, pool: Arc<ConnectionPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn events(&self) -> &EventBus {
        self.surface.events()
    }

    pub async fn diagnostics(&self) -> Diagnostics {
        let probe = StoreQuery::collection(MEDIA_COLLECTION).limit(1);
        let store_error = match self.store.list_records(&probe).await {
            Ok(_) => None,
            Err(e) => {
                log::warn!("Store probe failed: {}", e);
                Some(e.to_string())
            }
        };

        let database = match &self.pool {
            Some(pool) => match database_stats(pool.clone()).await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    log::warn!("Could not read database stats: {}", e);
                    None
                }
            },
            None => None,
        };

        let snapshot = self.surface.snapshot();
        Diagnostics {
            store_reachable: store_error.is_none(),
            store_error,
            signed_in: self.session.current_user_id().is_some(),
            item_count: snapshot.items.len(),
            list_count: snapshot.lists.len(),
            items_generation: self.surface.generation(Stream::Items),
            lists_generation: self.surface.generation(Stream::Lists),
            dropped_records: self.decode_observer.dropped_count(),
            database,
        }
    }
}

async fn database_stats(pool: Arc<ConnectionPool>) -> AppResult<DatabaseStats> {
    tokio::task::spawn_blocking(move || -> AppResult<DatabaseStats> {
        let conn = get_connection(&pool)?;
        get_database_stats(&conn)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::error::AppError;
    use crate::session::StaticSession;
    use crate::store::{InMemoryDocumentStore, MockDocumentStore, SqliteDocumentStore};
    use serde_json::json;

    #[tokio::test]
    async fn test_diagnostics_in_memory() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert_raw(MEDIA_COLLECTION, "broken", json!({"year": 2000}));
        let state = AppState::new(
            store,
            Arc::new(StaticSession::signed_in("u1")),
            CoreConfig::default(),
        );

        state.catalog_service.fetch_recent(10).await;
        let report = state.diagnostics().await;

        assert!(report.store_reachable);
        assert!(report.signed_in);
        assert_eq!(report.item_count, 0);
        assert_eq!(report.dropped_records, 1);
        assert_eq!(report.items_generation, 1);
        assert!(report.database.is_none());
    }

    #[tokio::test]
    async fn test_diagnostics_unreachable_store() {
        let mut mock = MockDocumentStore::new();
        mock.expect_list_records()
            .returning(|_| Err(AppError::Backend("offline".to_string())));
        let state = AppState::new(
            Arc::new(mock),
            Arc::new(StaticSession::signed_out()),
            CoreConfig::default(),
        );

        let report = state.diagnostics().await;
        assert!(!report.store_reachable);
        assert!(report.store_error.unwrap().contains("offline"));
        assert!(!report.signed_in);
    }

    #[tokio::test]
    async fn test_diagnostics_with_database_stats() {
        let pool = Arc::new(create_memory_pool().unwrap());
        let store = Arc::new(SqliteDocumentStore::open(pool.clone()).unwrap());
        let state = AppState::new(
            store,
            Arc::new(StaticSession::signed_in("u1")),
            CoreConfig::default(),
        )
        .with_pool(pool);

        state.seed_service.seed_sample_data().await.unwrap();
        let report = state.diagnostics().await;

        let db = report.database.unwrap();
        assert_eq!(db.media_count, 9);
        assert_eq!(db.list_count, 3);
        assert_eq!(report.list_count, 3);
    }
}
