// src/lib.rs
// Kuro - catalog search and list-management core
//
// Architecture:
// - Domain-centric: passive entities plus explicit invariants
// - Store-agnostic: services only see the DocumentStore trait
// - Observable: one state surface, written through request tickets
// - Explicit wiring: no global client, AppState injects everything

// ============================================================================
// CORE
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod query;
pub mod repositories;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    derive_list_id,
    normalize_rating,
    resolve_list_name,
    validate_media,
    validate_user_list,
    DomainError,
    ListKind,
    // Catalog
    Media,
    MediaKind,
    // Search
    Mood,
    SearchFilters,
    // Lists
    UserList,
};

// ============================================================================
// PUBLIC API - Errors & Config
// ============================================================================

pub use config::CoreConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus, DomainEvent, EventBus, EventLogEntry, ItemsReplaced, ListsReplaced,
    MediaAddedToList, MediaRemovedFromList, RequestFailed, Stream,
};

// ============================================================================
// PUBLIC API - Storage
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};
pub use store::{DocumentStore, InMemoryDocumentStore, SqliteDocumentStore, StoreQuery};

// ============================================================================
// PUBLIC API - Repositories, Services, State
// ============================================================================

pub use repositories::{
    decode_media, decode_user_list, DecodeError, DecodeObserver, LoggingDecodeObserver,
    MediaRepository, UserListRepository,
};

pub use services::{
    CatalogService, InitialLoadOutcome, ListService, SeedReport, SeedService,
};

pub use query::{CatalogQuery, QueryBuilder};
pub use session::{AnonymousSession, SessionProvider, StaticSession};
pub use state::{RequestOutcome, RequestTicket, StateSurface, SurfaceSnapshot};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, Diagnostics};

pub use application::commands;
pub use application::dto;
