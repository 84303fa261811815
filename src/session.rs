// src/session.rs
//
// Session identity seam.
// List operations need an owner; catalog reads do not.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::error::AppResult;

/// Source of the current user identity
pub trait SessionProvider: Send + Sync {
    /// `None` when nobody is signed in
    fn current_user_id(&self) -> Option<String>;
}

/// Anonymous sign-in: a v4 id kept until sign-out.
///
/// A persistent session stores the id in a file, so the same anonymous
/// user (and their lists) comes back on the next launch.
#[derive(Debug, Default)]
pub struct AnonymousSession {
    user_id: RwLock<Option<String>>,
    identity_file: Option<PathBuf>,
}

impl AnonymousSession {
    /// Session whose id lives only as long as the process
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose id is restored from (and saved to) `identity_file`
    pub fn persistent(identity_file: impl Into<PathBuf>) -> Self {
        Self {
            user_id: RwLock::new(None),
            identity_file: Some(identity_file.into()),
        }
    }

    /// Signs in if needed and returns the active user id
    pub fn sign_in(&self) -> AppResult<String> {
        let mut user_id = self.user_id.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = user_id.as_ref() {
            return Ok(existing.clone());
        }

        if let Some(restored) = self.restore()? {
            log::info!("Restored anonymous session {}", restored);
            *user_id = Some(restored.clone());
            return Ok(restored);
        }

        let minted = Uuid::new_v4().to_string();
        self.persist(&minted)?;
        log::info!("Signed in anonymously as {}", minted);
        *user_id = Some(minted.clone());
        Ok(minted)
    }

    /// Forgets the id, including its saved copy
    pub fn sign_out(&self) {
        let mut user_id = self.user_id.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = user_id.take() {
            log::info!("Signed out {}", previous);
        }
        if let Some(path) = &self.identity_file {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("Could not remove {}: {}", path.display(), e);
                }
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn restore(&self) -> AppResult<Option<String>> {
        let Some(path) = &self.identity_file else {
            return Ok(None);
        };
        let saved = match fs::read_to_string(path) {
            Ok(saved) => saved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match Uuid::parse_str(saved.trim()) {
            Ok(id) => Ok(Some(id.to_string())),
            Err(e) => {
                log::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn persist(&self, user_id: &str) -> AppResult<()> {
        let Some(path) = &self.identity_file else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, user_id)?;
        Ok(())
    }
}

impl SessionProvider for AnonymousSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Fixed identity (or none)
#[derive(Debug, Clone, Default)]
pub struct StaticSession(Option<String>);

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self(Some(user_id.into()))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }
}

impl SessionProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}
