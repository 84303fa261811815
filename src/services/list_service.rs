// src/services/list_service.rs
//
// Per-user list management.
//
// RULES:
// - No session: nothing is written, the error goes to the surface
// - Add and remove are idempotent (array union / array remove)
// - Adding is a single upsert: list header and member land together
// - Only the owner may remove from a list
// - Every successful mutation is followed by a list refresh

use std::sync::Arc;

use crate::domain::{derive_list_id, resolve_list_name, DomainError, ListKind};
use crate::error::{AppError, AppResult};
use crate::events::{MediaAddedToList, MediaRemovedFromList, Stream};
use crate::repositories::UserListRepository;
use crate::services::CatalogService;
use crate::session::SessionProvider;
use crate::state::{RequestOutcome, StateSurface};

pub struct ListService {
    list_repo: Arc<UserListRepository>,
    catalog: Arc<CatalogService>,
    session: Arc<dyn SessionProvider>,
    surface: Arc<StateSurface>,
}

impl ListService {
    pub fn new(
        list_repo: Arc<UserListRepository>,
        catalog: Arc<CatalogService>,
        session: Arc<dyn SessionProvider>,
        surface: Arc<StateSurface>,
    ) -> Self {
        Self {
            list_repo,
            catalog,
            session,
            surface,
        }
    }

    /// Id of the signed-in user's list for (kind, name)
    pub fn list_id_for(&self, kind: ListKind, custom_name: Option<&str>) -> Option<String> {
        let user_id = self.session.current_user_id()?;
        let name = resolve_list_name(kind, custom_name);
        Some(derive_list_id(&user_id, kind, &name))
    }

    /// Adds `media_id` to the (kind, name) list, creating the list if needed
    pub async fn add_to_list(
        &self,
        media_id: &str,
        kind: ListKind,
        custom_name: Option<&str>,
    ) -> RequestOutcome {
        let write = self.surface.begin_write();
        let Some(user_id) = self.session.current_user_id() else {
            return self.write_failed(&AppError::Unauthenticated);
        };
        let media_id = media_id.trim();
        if media_id.is_empty() {
            return self.write_failed(&blank_media_id());
        }

        let name = resolve_list_name(kind, custom_name);
        let list_id = derive_list_id(&user_id, kind, &name);

        if let Err(e) = self
            .list_repo
            .add_member(&list_id, &name, kind, &user_id, media_id)
            .await
        {
            return self.write_failed(&e);
        }

        log::info!("Added {} to list '{}' ({})", media_id, name, list_id);
        self.surface.events().emit(MediaAddedToList::new(
            list_id,
            media_id.to_string(),
            user_id,
        ));

        drop(write);
        self.catalog.load_user_lists().await
    }

    /// Removes `media_id` from one of the signed-in user's lists.
    /// Absent member or absent list is a no-op; someone else's list is refused.
    pub async fn remove_from_list(&self, media_id: &str, list_id: &str) -> RequestOutcome {
        let write = self.surface.begin_write();
        let Some(user_id) = self.session.current_user_id() else {
            return self.write_failed(&AppError::Unauthenticated);
        };
        let media_id = media_id.trim();
        if media_id.is_empty() {
            return self.write_failed(&blank_media_id());
        }

        if let Err(e) = self.remove_owned_member(list_id, media_id, &user_id).await {
            return self.write_failed(&e);
        }

        drop(write);
        self.catalog.load_user_lists().await
    }

    async fn remove_owned_member(
        &self,
        list_id: &str,
        media_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let Some(list) = self.list_repo.get_by_id(list_id).await? else {
            log::debug!("List {} does not exist, nothing to remove", list_id);
            return Ok(());
        };
        if list.owner_user_id != user_id {
            return Err(AppError::Forbidden(list_id.to_string()));
        }

        match self.list_repo.remove_member(list_id, media_id).await {
            Ok(()) => {
                log::info!("Removed {} from list {}", media_id, list_id);
                self.surface.events().emit(MediaRemovedFromList::new(
                    list_id.to_string(),
                    media_id.to_string(),
                    user_id.to_string(),
                ));
                Ok(())
            }
            // deleted between the ownership check and the write
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Write failures are reported even if a newer list refresh started meanwhile
    fn write_failed(&self, error: &AppError) -> RequestOutcome {
        self.surface.record_write_failure(Stream::Lists, error)
    }
}

fn blank_media_id() -> AppError {
    AppError::Domain(DomainError::InvariantViolation(
        "Media id cannot be empty".to_string(),
    ))
}
