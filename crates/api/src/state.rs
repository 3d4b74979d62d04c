//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::auth::JwtKeys;
use crate::services::mirror::{MirrorClient, MirrorHandle, spawn_mirror_worker};
use crate::services::notify::Notifier;
use crate::services::profanity::{DenylistFilter, ProfanityFilter};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    jwt_keys: JwtKeys,
    mirror: MirrorHandle,
    notifier: Option<Notifier>,
    profanity: Box<dyn ProfanityFilter>,
}

impl AppState {
    /// Create the application state and spawn the mirror worker when the
    /// mirror is configured.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let jwt_keys = JwtKeys::from_secret(&config.session_secret);

        let mirror = config.mirror.as_ref().map_or_else(MirrorHandle::disabled, |m| {
            let client = MirrorClient::new(m.base_url.clone(), m.api_key.clone());
            spawn_mirror_worker(pool.clone(), client)
        });

        let notifier = config
            .push
            .as_ref()
            .map(|p| Notifier::new(p.endpoint.clone(), p.server_key.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                jwt_keys,
                mirror,
                notifier,
                profanity: Box::new(DenylistFilter::default()),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the token signing keys.
    #[must_use]
    pub fn jwt_keys(&self) -> &JwtKeys {
        &self.inner.jwt_keys
    }

    /// Get the mirror enqueue handle.
    #[must_use]
    pub fn mirror(&self) -> &MirrorHandle {
        &self.inner.mirror
    }

    /// Get the push notifier, when configured.
    #[must_use]
    pub fn notifier(&self) -> Option<&Notifier> {
        self.inner.notifier.as_ref()
    }

    /// Get the review profanity filter.
    #[must_use]
    pub fn profanity(&self) -> &dyn ProfanityFilter {
        self.inner.profanity.as_ref()
    }
}
