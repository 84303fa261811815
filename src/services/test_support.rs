// src/services/test_support.rs
//
// Shared wiring and fixtures for service tests.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::CoreConfig;
use crate::events::EventBus;
use crate::repositories::{LoggingDecodeObserver, MediaRepository, UserListRepository};
use crate::services::{CatalogService, ListService};
use crate::session::{SessionProvider, StaticSession};
use crate::state::StateSurface;
use crate::store::{DocumentStore, InMemoryDocumentStore};

pub(crate) const USER: &str = "user-1";

pub(crate) struct Wired {
    pub surface: Arc<StateSurface>,
    pub catalog: Arc<CatalogService>,
    pub lists: Arc<ListService>,
    pub media_repo: Arc<MediaRepository>,
    pub observer: Arc<LoggingDecodeObserver>,
}

pub(crate) fn wire(store: Arc<dyn DocumentStore>, session: Arc<dyn SessionProvider>) -> Wired {
    let observer = Arc::new(LoggingDecodeObserver::new());
    let media_repo = Arc::new(MediaRepository::new(store.clone(), observer.clone()));
    let list_repo = Arc::new(UserListRepository::new(store, observer.clone()));
    let surface = Arc::new(StateSurface::new(EventBus::new()));

    let catalog = Arc::new(CatalogService::new(
        media_repo.clone(),
        list_repo.clone(),
        session.clone(),
        surface.clone(),
        CoreConfig::default(),
    ));
    let lists = Arc::new(ListService::new(
        list_repo,
        catalog.clone(),
        session,
        surface.clone(),
    ));

    Wired {
        surface,
        catalog,
        lists,
        media_repo,
        observer,
    }
}

/// In-memory store plus a signed-in session
pub(crate) fn signed_in(store: &Arc<InMemoryDocumentStore>) -> Wired {
    wire(store.clone(), Arc::new(StaticSession::signed_in(USER)))
}

pub(crate) fn signed_out(store: &Arc<InMemoryDocumentStore>) -> Wired {
    wire(store.clone(), Arc::new(StaticSession::signed_out()))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn media_doc(
    title: &str,
    year: i32,
    description: &str,
    kind: &str,
    genres: &[&str],
    rating: Option<f64>,
    created_at: &str,
) -> Value {
    let mut doc = json!({
        "title": title,
        "year": year,
        "description": description,
        "type": kind,
        "genres": genres,
        "status": "Completed",
        "created_at": created_at,
    });
    if let Some(rating) = rating {
        doc["rating"] = json!(rating);
    }
    doc
}

/// The two-record catalog: "a" (Your Name) and "b" (Berserk)
pub(crate) fn two_record_store() -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    store.insert_raw(
        "media",
        "a",
        media_doc(
            "Your Name",
            2016,
            "Two teenagers swap bodies across time.",
            "anime",
            &["Romance", "Drama"],
            Some(8.4),
            "2024-01-02T00:00:00.000000Z",
        ),
    );
    store.insert_raw(
        "media",
        "b",
        media_doc(
            "Berserk",
            1989,
            "A lone mercenary in a dark medieval world.",
            "manga",
            &["Dark Fantasy", "Action"],
            Some(9.4),
            "2024-01-01T00:00:00.000000Z",
        ),
    );
    store
}

pub(crate) fn item_ids(wired: &Wired) -> Vec<String> {
    wired.surface.items().into_iter().map(|m| m.id).collect()
}
