// src/config.rs
//
// Core configuration
//
// PRINCIPLES:
// - Plain values with sensible defaults
// - No hidden global state: the config is passed to whoever needs it

use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default page size for listings and text-free searches
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Upper bound on records scanned for a client-side text search
pub const DEFAULT_SEARCH_SCAN_LIMIT: usize = 500;

/// Environment override for the local database location
pub const DATABASE_PATH_ENV: &str = "KURO_DATABASE_PATH";

const SESSION_FILE_NAME: &str = "anonymous_user";

#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub page_size: usize,
    pub search_scan_limit: usize,
    /// Cap used by the initial "recent" load
    pub recent_limit: usize,
    /// `None` resolves to `{APP_DATA}/kuro/kuro.db`
    pub database_path: Option<PathBuf>,
    pub pool_max_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_scan_limit: DEFAULT_SEARCH_SCAN_LIMIT,
            recent_limit: DEFAULT_PAGE_SIZE,
            database_path: None,
            pool_max_size: 15,
        }
    }
}

impl CoreConfig {
    /// Defaults plus `KURO_DATABASE_PATH` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(DATABASE_PATH_ENV) {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }
        config
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_search_scan_limit(mut self, limit: usize) -> Self {
        self.search_scan_limit = limit.max(1);
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit.max(1);
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Resolves the database file path, creating its directory if needed.
    ///
    /// Path structure: {APP_DATA}/kuro/kuro.db
    pub fn resolve_database_path(&self) -> AppResult<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?
                .join("kuro")
                .join("kuro.db"),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(path)
    }

    /// File holding the anonymous user id, next to the database
    pub fn resolve_session_path(&self) -> AppResult<PathBuf> {
        Ok(self.resolve_database_path()?.with_file_name(SESSION_FILE_NAME))
    }
}
