use std::sync::Arc;

use sonora::{
    AppConfig, CatalogStore, CredentialHasher, Database, GoogleProvider, IdentityProvider,
    Metrics, OAuth2Error, SessionManager, SqlSessionStore, UserStore,
};

/// Everything a handler needs, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
    pub users: UserStore,
    pub catalog: CatalogStore,
    pub sessions: SessionManager,
    pub hasher: CredentialHasher,
    /// `None` when Google sign-in is not configured.
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    /// Wires the stores over `db`. Google sign-in is enabled when the config carries
    /// client credentials.
    pub fn new(config: AppConfig, db: Database) -> Result<Self, OAuth2Error> {
        let identity_provider = match config.google.clone() {
            Some(google) => {
                Some(Arc::new(GoogleProvider::new(google)?) as Arc<dyn IdentityProvider>)
            }
            None => None,
        };

        Ok(Self {
            metrics: db.metrics().clone(),
            users: UserStore::new(db.clone()),
            catalog: CatalogStore::new(db.clone()),
            sessions: SessionManager::new(Arc::new(SqlSessionStore::new(db))),
            hasher: CredentialHasher::new(),
            identity_provider,
            config: Arc::new(config),
        })
    }

    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub fn with_sessions(mut self, sessions: SessionManager) -> Self {
        self.sessions = sessions;
        self
    }

    pub(crate) fn secure_cookies(&self) -> bool {
        self.config.secure_cookies()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("google_enabled", &self.identity_provider.is_some())
            .finish_non_exhaustive()
    }
}
