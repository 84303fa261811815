// src/application/commands/catalog_commands.rs
//
// Catalog Command Handlers
//
// RULES:
// - Accept DTOs, return DTOs
// - Errors only for rejected input; load failures land on the surface

use std::ops::RangeInclusive;

use crate::application::{dto::*, error_handling::ErrorResponse, state::AppState, Diagnostics};
use crate::domain::{DomainError, MediaKind, Mood, SearchFilters, RATING_SCALE_MAX};
use crate::services::SeedReport;
use crate::state::RequestOutcome;

/// Current items, lists, loading flag and last error
pub async fn get_snapshot(state: &AppState) -> Result<SnapshotDto, String> {
    Ok(SnapshotDto::from(state.surface.snapshot()))
}

/// Newest records first. Defaults to the configured recent limit.
pub async fn fetch_recent(state: &AppState, limit: Option<usize>) -> Result<RequestOutcome, String> {
    let limit = limit.unwrap_or(state.config.recent_limit);
    if limit == 0 {
        return Err(ErrorResponse::validation("Limit must be at least 1").to_json());
    }
    Ok(state.catalog_service.fetch_recent(limit).await)
}

pub async fn search_catalog(
    state: &AppState,
    request: SearchRequestDto,
) -> Result<RequestOutcome, String> {
    let filters = parse_filters(&request).map_err(|e| e.to_json())?;
    Ok(state.catalog_service.search(&request.text, &filters).await)
}

pub async fn browse_by_genre(state: &AppState, genre: String) -> Result<RequestOutcome, String> {
    if genre.trim().is_empty() {
        return Err(ErrorResponse::validation("Genre cannot be empty").to_json());
    }
    Ok(state.catalog_service.browse_by_genre(&genre).await)
}

/// Recent records plus the user's lists
pub async fn load_initial_data(state: &AppState) -> Result<SnapshotDto, String> {
    state.catalog_service.load_initial_data().await;
    Ok(SnapshotDto::from(state.surface.snapshot()))
}

/// Items currently on the surface that fit the mood
pub async fn items_for_mood(state: &AppState, mood: String) -> Result<Vec<MediaDto>, String> {
    let mood: Mood = mood
        .parse()
        .map_err(|e: DomainError| ErrorResponse::validation(e.to_string()).to_json())?;

    Ok(state
        .catalog_service
        .items_for_mood(mood)
        .into_iter()
        .map(MediaDto::from)
        .collect())
}

pub async fn seed_sample_data(state: &AppState) -> Result<SeedReport, String> {
    crate::handle_command!(state.seed_service.seed_sample_data().await)
}

pub async fn get_diagnostics(state: &AppState) -> Result<Diagnostics, String> {
    Ok(state.diagnostics().await)
}

fn parse_filters(request: &SearchRequestDto) -> Result<SearchFilters, ErrorResponse> {
    let mut filters = SearchFilters::new();

    if let Some(kind) = request.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        let kind: MediaKind = kind
            .to_lowercase()
            .parse()
            .map_err(|_| ErrorResponse::validation(format!("Invalid media type: {}", kind)))?;
        filters = filters.with_kind(kind);
    }

    let genres: Vec<String> = request
        .genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();
    if !genres.is_empty() {
        filters = filters.with_genres(genres);
    }

    if let Some(years) = year_range(request.year_from, request.year_to)? {
        filters = filters.with_year_range(years);
    }

    if let Some(rating) = request.min_rating {
        if !rating.is_finite() || !(0.0..=RATING_SCALE_MAX).contains(&rating) {
            return Err(ErrorResponse::validation(format!(
                "Minimum rating must be between 0 and {}",
                RATING_SCALE_MAX
            )));
        }
        filters = filters.with_min_rating(rating);
    }

    if let Some(status) = request.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        filters = filters.with_status(status);
    }

    Ok(filters)
}

fn year_range(
    from: Option<i32>,
    to: Option<i32>,
) -> Result<Option<RangeInclusive<i32>>, ErrorResponse> {
    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) if from > to => Err(ErrorResponse::validation(format!(
            "Invalid year range: {} > {}",
            from, to
        ))),
        (from, to) => Ok(Some(from.unwrap_or(i32::MIN)..=to.unwrap_or(i32::MAX))),
    }
}
