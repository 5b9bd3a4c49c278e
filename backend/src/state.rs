//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction. Every external
//! client is constructed once at startup and injected here.

use crate::auth::{MemorySessionStore, PasswordService, SessionCookies, SessionStore};
use crate::config::AppConfig;
use crate::repositories::{PostRepository, Repositories, UserRepository};
use std::sync::Arc;

/// Shared application state
///
/// All fields are `Arc`s or cheap handles, so cloning per request is O(1).
#[derive(Clone)]
pub struct AppState {
    /// Document store repositories
    pub repositories: Repositories,
    /// Session store client
    pub sessions: Arc<dyn SessionStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    cookies: SessionCookies,
    passwords: PasswordService,
}

impl AppState {
    /// Create a new application state from already-connected stores
    pub fn new(
        repositories: Repositories,
        sessions: Arc<dyn SessionStore>,
        config: AppConfig,
    ) -> Self {
        let cookies = SessionCookies::from_config(&config.session);
        let passwords = PasswordService::new(config.auth.bcrypt_cost);

        Self {
            repositories,
            sessions,
            config: Arc::new(config),
            cookies,
            passwords,
        }
    }

    /// State backed entirely by in-process stores
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            Repositories::in_memory(),
            Arc::new(MemorySessionStore::default()),
            config,
        )
    }

    #[inline]
    pub fn users(&self) -> &dyn UserRepository {
        self.repositories.users.as_ref()
    }

    #[inline]
    pub fn posts(&self) -> &dyn PostRepository {
        self.repositories.posts.as_ref()
    }

    #[inline]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    /// Whether failures are flattened to the legacy response shapes
    #[inline]
    pub fn compat_mode(&self) -> bool {
        self.config.api.compat_mode
    }

    /// Close store connections during shutdown
    pub async fn close(&self) {
        self.repositories.close().await;
    }
}
