//! Wiring of the client pieces around one shared session.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::events::SessionBus;
use crate::guard::RouteGuard;
use crate::router::Router;
use crate::routes::RouteTable;
use crate::session::SessionStore;
use crate::storage::{FileStorage, MemoryStorage, SessionStorage};

/// Application state handed to every consumer (UI, CLI, tests).
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub auth: AuthClient,
    pub router: Arc<Router>,
    pub events: Arc<SessionBus>,
}

impl AppState {
    /// Storage follows the configuration: a JSON file when `session_file` is
    /// set, process memory otherwise.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let storage: Arc<dyn SessionStorage> = match &config.session_file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using file-backed session storage");
                Arc::new(FileStorage::new(path))
            }
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> ClientResult<Self> {
        let events = Arc::new(SessionBus::new());
        let api = ApiClient::new(&config, storage, SessionStore::new(), events.clone())?;
        let auth = AuthClient::new(api);
        let router = Arc::new(Router::new(
            RouteTable::default(),
            RouteGuard::new(auth.clone()),
        ));

        Ok(Self {
            config,
            auth,
            router,
            events,
        })
    }

    pub fn session(&self) -> &SessionStore {
        self.auth.session()
    }
}
