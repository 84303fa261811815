// src/application/commands/list_commands.rs
//
// List Command Handlers

use crate::application::{dto::*, error_handling::ErrorResponse, state::AppState};
use crate::domain::ListKind;
use crate::state::RequestOutcome;

fn parse_list_kind(raw: &str) -> Result<ListKind, String> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|_| ErrorResponse::validation(format!("Invalid list type: {}", raw)).to_json())
}

pub async fn load_user_lists(state: &AppState) -> Result<Vec<UserListDto>, String> {
    state.catalog_service.load_user_lists().await;
    Ok(state
        .surface
        .lists()
        .into_iter()
        .map(UserListDto::from)
        .collect())
}

pub async fn add_to_list(state: &AppState, dto: AddToListDto) -> Result<RequestOutcome, String> {
    let kind = parse_list_kind(&dto.list_type)?;
    if kind == ListKind::Custom
        && dto
            .custom_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
    {
        return Err(ErrorResponse::validation("Custom lists need a name").to_json());
    }

    Ok(state
        .list_service
        .add_to_list(&dto.media_id, kind, dto.custom_name.as_deref())
        .await)
}

pub async fn remove_from_list(
    state: &AppState,
    dto: RemoveFromListDto,
) -> Result<RequestOutcome, String> {
    if dto.list_id.trim().is_empty() {
        return Err(ErrorResponse::validation("List id cannot be empty").to_json());
    }
    Ok(state
        .list_service
        .remove_from_list(&dto.media_id, dto.list_id.trim())
        .await)
}

/// Id the signed-in user's (type, name) list has or would have
pub async fn list_id_for(
    state: &AppState,
    list_type: String,
    custom_name: Option<String>,
) -> Result<String, String> {
    let kind = parse_list_kind(&list_type)?;
    state
        .list_service
        .list_id_for(kind, custom_name.as_deref())
        .ok_or_else(|| {
            ErrorResponse::from_app_error(&crate::error::AppError::Unauthenticated).to_json()
        })
}
