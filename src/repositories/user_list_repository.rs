// src/repositories/user_list_repository.rs
//
// List persistence over the `user_lists` collection.
// Membership changes are field operations, so replays are harmless.

use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{DomainError, ListKind, UserList};
use crate::error::AppResult;
use crate::repositories::decode::{
    id_from_value, invalid, optional_str, optional_timestamp, required_str, DecodeError,
    DecodeObserver,
};
use crate::store::{
    DocumentStore, FieldUpdate, Predicate, RawDocument, StoreQuery, USER_LISTS_COLLECTION,
};

/// Stored field names of the `user_lists` collection
pub mod fields {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const USER_ID: &str = "user_id";
    pub const MEDIA_ITEMS: &str = "media_items";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Decodes one `user_lists` document.
///
/// Required: type, user_id. A missing name falls back to the kind's
/// display name. Member ids that are neither strings nor integers are skipped.
pub fn decode_user_list(doc: &RawDocument) -> Result<UserList, DecodeError> {
    let kind: ListKind = required_str(doc, fields::TYPE)?
        .parse()
        .map_err(|e: DomainError| invalid(doc, fields::TYPE, e.to_string()))?;

    let owner_user_id = required_str(doc, fields::USER_ID)?;
    if owner_user_id.trim().is_empty() {
        return Err(invalid(doc, fields::USER_ID, "owner is blank"));
    }

    let name = match optional_str(doc, fields::NAME).map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => kind.display_name().to_string(),
    };

    let member_ids: BTreeSet<String> = match doc.get(fields::MEDIA_ITEMS) {
        Some(Value::Array(items)) => items.iter().filter_map(id_from_value).collect(),
        _ => BTreeSet::new(),
    };

    Ok(UserList {
        id: doc.id.clone(),
        name,
        kind,
        member_ids,
        owner_user_id: owner_user_id.to_string(),
        created_at: optional_timestamp(doc, fields::CREATED_AT),
        updated_at: optional_timestamp(doc, fields::UPDATED_AT),
    })
}

pub struct UserListRepository {
    store: Arc<dyn DocumentStore>,
    observer: Arc<dyn DecodeObserver>,
}

impl UserListRepository {
    pub fn new(store: Arc<dyn DocumentStore>, observer: Arc<dyn DecodeObserver>) -> Self {
        Self { store, observer }
    }

    /// Every list owned by `user_id`, ordered by list id
    pub async fn list_for_owner(&self, user_id: &str) -> AppResult<Vec<UserList>> {
        let query = StoreQuery::collection(USER_LISTS_COLLECTION)
            .filter(Predicate::equals(fields::USER_ID, user_id));
        let documents = self.store.list_records(&query).await?;

        Ok(documents
            .iter()
            .filter_map(|doc| match decode_user_list(doc) {
                Ok(list) => Some(list),
                Err(e) => {
                    self.observer.record_dropped(USER_LISTS_COLLECTION, &e);
                    None
                }
            })
            .collect())
    }

    pub async fn get_by_id(&self, list_id: &str) -> AppResult<Option<UserList>> {
        let Some(doc) = self.store.get_document(USER_LISTS_COLLECTION, list_id).await? else {
            return Ok(None);
        };
        match decode_user_list(&doc) {
            Ok(list) => Ok(Some(list)),
            Err(e) => {
                self.observer.record_dropped(USER_LISTS_COLLECTION, &e);
                Ok(None)
            }
        }
    }

    /// Adds `media_id` to the list in a single store write, creating the
    /// list with the given header when it does not exist yet.
    pub async fn add_member(
        &self,
        list_id: &str,
        name: &str,
        kind: ListKind,
        owner_user_id: &str,
        media_id: &str,
    ) -> AppResult<()> {
        self.store
            .upsert_fields(
                USER_LISTS_COLLECTION,
                list_id,
                vec![
                    FieldUpdate::set(fields::NAME, name),
                    FieldUpdate::set(fields::TYPE, kind.as_str()),
                    FieldUpdate::set(fields::USER_ID, owner_user_id),
                    FieldUpdate::array_union(fields::MEDIA_ITEMS, vec![Value::from(media_id)]),
                ],
            )
            .await
    }

    /// `AppError::NotFound` when the list does not exist
    pub async fn remove_member(&self, list_id: &str, media_id: &str) -> AppResult<()> {
        self.store
            .update_fields(
                USER_LISTS_COLLECTION,
                list_id,
                vec![FieldUpdate::array_remove(
                    fields::MEDIA_ITEMS,
                    vec![Value::from(media_id)],
                )],
            )
            .await
    }
}
