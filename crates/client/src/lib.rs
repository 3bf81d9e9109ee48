//! `sara-client`: client-side session, authentication and route guarding for
//! the SARA inventory application.
//!
//! The crate is a thin layer over the SARA HTTP API:
//! - [`SessionStore`]: who is logged in, shared by every consumer
//! - [`AuthClient`]: login, registration, session validation, logout
//! - [`ApiClient`]: bearer-authenticated requests with central 401 handling
//! - [`RouteGuard`] / [`Router`]: per-navigation authentication and role checks
//!
//! Side effects that a browser would perform directly (navigation, full
//! reloads) are published as [`SessionEvent`]s instead.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;

pub use api::{ApiClient, RequestOptions};
pub use auth::{AuthClient, CanRegister, InitOutcome, LoginResponse};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use events::{SessionBus, SessionEvent};
pub use guard::{GuardDecision, RouteGuard};
pub use router::{Navigation, NavigationError, Router};
pub use routes::{Location, ResolvedRoute, RouteMeta, RouteRecord, RouteTable};
pub use session::SessionStore;
pub use state::AppState;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
