// src/store/memory_store.rs
//
// In-process document store.
// Used as the fake backend in tests and for offline sessions.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::error::{AppError, AppResult};
use crate::store::document::{
    apply_updates, compare_values, merge_fields, preserved_created_at, server_timestamp,
    stamp_timestamps, FieldUpdate, Fields, RawDocument, StoreQuery,
};
use crate::store::DocumentStore;

type Collection = BTreeMap<String, Fields>;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document verbatim, bypassing server timestamps.
    /// Meant for fixtures that need exact `created_at` values.
    pub fn insert_raw(&self, collection: &str, id: &str, document: Value) {
        let Value::Object(fields) = document else {
            log::warn!("Ignoring non-object fixture {}/{}", collection, id);
            return;
        };
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn document_count(&self, collection: &str) -> usize {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_records(&self, query: &StoreQuery) -> AppResult<Vec<RawDocument>> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let Some(collection) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        // BTreeMap iteration gives id order, which the stable sort keeps for ties
        let mut documents: Vec<RawDocument> = collection
            .iter()
            .filter(|(_, fields)| query.matches(fields))
            .map(|(id, fields)| RawDocument::new(id.clone(), fields.clone()))
            .collect();

        if let Some(order) = &query.order_by {
            documents.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.field), b.get(&order.field));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }

        Ok(documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<RawDocument>> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| RawDocument::new(id, fields.clone())))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> AppResult<()> {
        let now = server_timestamp();
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let documents = collections.entry(collection.to_string()).or_default();

        let existing = documents.remove(id);
        let created_at = preserved_created_at(existing.as_ref(), &now);

        let mut body = match existing {
            Some(doc) if merge => doc,
            _ => Fields::new(),
        };
        merge_fields(&mut body, fields);
        stamp_timestamps(&mut body, &created_at, &now);

        documents.insert(id.to_string(), body);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> AppResult<()> {
        let now = server_timestamp();
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let body = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or(AppError::NotFound)?;

        let created_at = preserved_created_at(Some(&*body), &now);

        apply_updates(body, &updates);
        stamp_timestamps(body, &created_at, &now);
        Ok(())
    }

    async fn upsert_fields(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> AppResult<()> {
        let now = server_timestamp();
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let body = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();

        let created_at = preserved_created_at(Some(&*body), &now);

        apply_updates(body, &updates);
        stamp_timestamps(body, &created_at, &now);
        Ok(())
    }
}
