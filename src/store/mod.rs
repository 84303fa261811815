// src/store/mod.rs
//
// Document store boundary
//
// The catalog and list services only ever see this trait. Adapters:
// - InMemoryDocumentStore: fake backend for tests and offline sessions
// - SqliteDocumentStore: durable local store over r2d2/rusqlite

use async_trait::async_trait;

use crate::error::AppResult;

pub mod document;
pub mod memory_store;
pub mod sqlite_store;

pub use document::{
    FieldOp, FieldUpdate, Fields, OrderBy, Predicate, RawDocument, StoreQuery, CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
};
pub use memory_store::InMemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;

pub const MEDIA_COLLECTION: &str = "media";
pub const USER_LISTS_COLLECTION: &str = "user_lists";

/// Queryable collection store.
///
/// The store owns `created_at` / `updated_at`: both are stamped on every
/// write and caller-supplied values are ignored.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_records(&self, query: &StoreQuery) -> AppResult<Vec<RawDocument>>;

    async fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<RawDocument>>;

    /// Creates or overwrites a document. With `merge`, existing fields not
    /// named in `fields` survive.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> AppResult<()>;

    /// Applies field operations to an existing document.
    /// Returns `AppError::NotFound` if the document does not exist.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> AppResult<()>;

    /// Applies field operations in one write, creating the document first
    /// when it does not exist (merge-set semantics).
    async fn upsert_fields(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> AppResult<()>;
}
