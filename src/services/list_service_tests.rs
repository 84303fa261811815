// src/services/list_service_tests.rs
//
// List manager behaviour:
// - Add and remove are idempotent
// - Removing from a missing list is a no-op
// - Without a session nothing is written
// - Failed writes are always reported and leave no partial list
// - Only the owner can remove from a list

#[cfg(test)]
mod membership {
    use crate::domain::{derive_list_id, ListKind};
    use crate::events::{MediaAddedToList, MediaRemovedFromList};
    use crate::services::test_support::*;
    use crate::state::RequestOutcome;
    use crate::store::InMemoryDocumentStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn members(wired: &Wired, list_id: &str) -> Vec<String> {
        wired
            .surface
            .lists()
            .into_iter()
            .find(|l| l.id == list_id)
            .map(|l| l.member_ids.into_iter().collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_add_twice_is_idempotent() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);
        let list_id = derive_list_id(USER, ListKind::Watching, "Watching");

        let first = wired.lists.add_to_list("x", ListKind::Watching, None).await;
        assert_eq!(first, RequestOutcome::Applied(1));
        let after_first = members(&wired, &list_id);

        wired.lists.add_to_list("x", ListKind::Watching, None).await;
        assert_eq!(members(&wired, &list_id), after_first);
        assert_eq!(after_first, vec!["x"]);
    }

    #[tokio::test]
    async fn test_remove_absent_member_leaves_list_unchanged() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);
        wired.lists.add_to_list("a", ListKind::Completed, None).await;
        let list_id = wired.lists.list_id_for(ListKind::Completed, None).unwrap();

        let outcome = wired.lists.remove_from_list("zzz", &list_id).await;
        assert_eq!(outcome, RequestOutcome::Applied(1));
        assert_eq!(members(&wired, &list_id), vec!["a"]);
        assert!(wired.surface.last_error().is_none());
    }

    #[tokio::test]
    async fn test_add_add_remove_leaves_member_absent() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);

        wired.lists.add_to_list("x", ListKind::Watching, None).await;
        wired.lists.add_to_list("x", ListKind::Watching, None).await;
        let list_id = wired.lists.list_id_for(ListKind::Watching, None).unwrap();
        wired.lists.remove_from_list("x", &list_id).await;

        assert!(members(&wired, &list_id).is_empty());
        assert_eq!(wired.surface.lists().len(), 1, "the list itself stays");
    }

    #[tokio::test]
    async fn test_remove_from_missing_list_is_noop() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);

        let outcome = wired.lists.remove_from_list("x", "no-such-list").await;
        assert_eq!(outcome, RequestOutcome::Applied(0));
        assert!(wired.surface.last_error().is_none());
        assert_eq!(store.document_count("user_lists"), 0);
    }

    #[tokio::test]
    async fn test_custom_names_get_their_own_lists() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);

        wired
            .lists
            .add_to_list("a", ListKind::Custom, Some("  Rainy Day  "))
            .await;
        wired
            .lists
            .add_to_list("b", ListKind::Custom, Some("Comfort"))
            .await;

        let rainy = wired
            .lists
            .list_id_for(ListKind::Custom, Some("Rainy Day"))
            .unwrap();
        assert_eq!(rainy, derive_list_id(USER, ListKind::Custom, "Rainy Day"));
        assert_eq!(members(&wired, &rainy), vec!["a"]);
        assert_eq!(wired.surface.lists().len(), 2);
    }

    #[tokio::test]
    async fn test_membership_events() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);
        let added = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&added);
        wired
            .surface
            .events()
            .subscribe::<MediaAddedToList, _>(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            });
        let r = Arc::clone(&removed);
        wired
            .surface
            .events()
            .subscribe::<MediaRemovedFromList, _>(move |_| {
                r.fetch_add(1, Ordering::SeqCst);
            });

        wired.lists.add_to_list("x", ListKind::Planned, None).await;
        let list_id = wired.lists.list_id_for(ListKind::Planned, None).unwrap();
        wired.lists.remove_from_list("x", &list_id).await;
        wired.lists.remove_from_list("x", "missing").await;

        assert_eq!(added.load(Ordering::SeqCst), 1);
        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod without_session {
    use crate::domain::ListKind;
    use crate::services::test_support::*;
    use crate::state::RequestOutcome;
    use crate::store::InMemoryDocumentStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_without_session_writes_nothing() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_out(&store);

        let outcome = wired.lists.add_to_list("x", ListKind::Watching, None).await;

        assert_eq!(outcome, RequestOutcome::Failed);
        assert_eq!(store.document_count("user_lists"), 0);
        assert!(wired.surface.last_error().is_some());
        assert!(!wired.surface.is_loading());
        assert!(wired.lists.list_id_for(ListKind::Watching, None).is_none());
    }

    #[tokio::test]
    async fn test_remove_without_session_is_reported() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_out(&store);

        let outcome = wired.lists.remove_from_list("x", "some-list").await;
        assert_eq!(outcome, RequestOutcome::Failed);
        assert!(wired.surface.last_error().is_some());
    }

    #[tokio::test]
    async fn test_blank_media_id_is_rejected() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);

        let outcome = wired.lists.add_to_list("   ", ListKind::Watching, None).await;
        assert_eq!(outcome, RequestOutcome::Failed);
        assert_eq!(store.document_count("user_lists"), 0);
    }
}

#[cfg(test)]
mod write_failures {
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Notify;

    use crate::domain::ListKind;
    use crate::error::{AppError, AppResult};
    use crate::services::test_support::*;
    use crate::session::StaticSession;
    use crate::state::RequestOutcome;
    use crate::store::{
        DocumentStore, FieldUpdate, Fields, InMemoryDocumentStore, RawDocument, StoreQuery,
    };

    /// Rejects every upsert. With `hold`, the upsert first waits for the gate.
    struct RejectingStore {
        inner: Arc<InMemoryDocumentStore>,
        hold: bool,
        entered: Notify,
        gate: Notify,
    }

    impl RejectingStore {
        fn new(hold: bool) -> Arc<Self> {
            Arc::new(Self {
                inner: Arc::new(InMemoryDocumentStore::new()),
                hold,
                entered: Notify::new(),
                gate: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl DocumentStore for RejectingStore {
        async fn list_records(&self, query: &StoreQuery) -> AppResult<Vec<RawDocument>> {
            self.inner.list_records(query).await
        }

        async fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<RawDocument>> {
            self.inner.get_document(collection, id).await
        }

        async fn set_document(
            &self,
            collection: &str,
            id: &str,
            fields: Fields,
            merge: bool,
        ) -> AppResult<()> {
            self.inner.set_document(collection, id, fields, merge).await
        }

        async fn update_fields(
            &self,
            collection: &str,
            id: &str,
            updates: Vec<FieldUpdate>,
        ) -> AppResult<()> {
            self.inner.update_fields(collection, id, updates).await
        }

        async fn upsert_fields(
            &self,
            _collection: &str,
            _id: &str,
            _updates: Vec<FieldUpdate>,
        ) -> AppResult<()> {
            if self.hold {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            Err(AppError::Backend("write rejected".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_add_is_reported_after_newer_refresh() {
        let store = RejectingStore::new(true);
        let wired = wire(store.clone(), Arc::new(StaticSession::signed_in(USER)));

        let lists = wired.lists.clone();
        let add = tokio::spawn(async move { lists.add_to_list("x", ListKind::Watching, None).await });
        store.entered.notified().await;

        let refresh = wired.catalog.load_user_lists().await;
        assert_eq!(refresh, RequestOutcome::Applied(0));
        assert!(wired.surface.is_loading(), "the add is still writing");

        store.gate.notify_one();
        let outcome = add.await.unwrap();

        assert_eq!(outcome, RequestOutcome::Failed);
        assert!(wired.surface.last_error().unwrap().contains("write rejected"));
        assert!(!wired.surface.is_loading());
    }

    #[tokio::test]
    async fn test_rejected_add_leaves_no_empty_list() {
        let store = RejectingStore::new(false);
        let wired = wire(store.clone(), Arc::new(StaticSession::signed_in(USER)));

        let outcome = wired.lists.add_to_list("x", ListKind::Planned, None).await;

        assert_eq!(outcome, RequestOutcome::Failed);
        assert_eq!(store.inner.document_count("user_lists"), 0);
        assert!(wired.surface.lists().is_empty());

        wired.catalog.load_user_lists().await;
        assert!(wired.surface.lists().is_empty());
    }
}

#[cfg(test)]
mod ownership {
    use serde_json::json;
    use std::sync::Arc;

    use crate::domain::ListKind;
    use crate::services::test_support::*;
    use crate::session::StaticSession;
    use crate::state::RequestOutcome;
    use crate::store::{DocumentStore, InMemoryDocumentStore};

    #[tokio::test]
    async fn test_cannot_remove_from_another_users_list() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let owner = signed_in(&store);
        owner.lists.add_to_list("x", ListKind::Watching, None).await;
        let list_id = owner.lists.list_id_for(ListKind::Watching, None).unwrap();

        let intruder = wire(store.clone(), Arc::new(StaticSession::signed_in("user-2")));
        let outcome = intruder.lists.remove_from_list("x", &list_id).await;

        assert_eq!(outcome, RequestOutcome::Failed);
        assert!(intruder
            .surface
            .last_error()
            .unwrap()
            .contains("belongs to another user"));

        let doc = store.get_document("user_lists", &list_id).await.unwrap().unwrap();
        assert_eq!(doc.get("media_items"), Some(&json!(["x"])));
    }

    #[tokio::test]
    async fn test_owner_can_remove() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let owner = signed_in(&store);
        owner.lists.add_to_list("x", ListKind::Watching, None).await;
        let list_id = owner.lists.list_id_for(ListKind::Watching, None).unwrap();

        let outcome = owner.lists.remove_from_list("x", &list_id).await;

        assert_eq!(outcome, RequestOutcome::Applied(1));
        assert!(owner.surface.lists()[0].is_empty());
        assert!(owner.surface.last_error().is_none());
    }
}

#[cfg(test)]
mod seeding {
    use crate::services::test_support::*;
    use crate::services::SeedService;
    use crate::session::{SessionProvider, StaticSession};
    use crate::store::InMemoryDocumentStore;
    use std::sync::Arc;

    fn seeder(wired: &Wired, session: Arc<dyn SessionProvider>) -> SeedService {
        SeedService::new(wired.media_repo.clone(), wired.lists.clone(), session)
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_in(&store);
        let seed = seeder(&wired, Arc::new(StaticSession::signed_in(USER)));

        let first = seed.seed_sample_data().await.unwrap();
        assert_eq!(first.media_written, SeedService::sample_size());
        assert_eq!(first.list_memberships, 9);

        let second = seed.seed_sample_data().await.unwrap();
        assert_eq!(second.media_written, 0);
        assert_eq!(second.media_skipped, SeedService::sample_size());

        assert_eq!(store.document_count("media"), 9);
        assert_eq!(store.document_count("user_lists"), 3);

        let lists = wired.surface.lists();
        let total: usize = lists.iter().map(|l| l.len()).sum();
        assert_eq!(total, 9);
    }

    #[tokio::test]
    async fn test_seeded_catalog_decodes() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let wired = signed_out(&store);
        let seed = seeder(&wired, Arc::new(StaticSession::signed_out()));

        let report = seed.seed_sample_data().await.unwrap();
        assert_eq!(report.list_memberships, 0);

        wired.catalog.fetch_recent(50).await;
        assert_eq!(wired.surface.items().len(), 9);
        assert!(wired.surface.last_error().is_none());
    }
}
