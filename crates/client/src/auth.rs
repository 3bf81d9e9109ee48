//! Credential exchange with the backend.
//!
//! The auth client is the only writer of the session store (apart from the
//! request helper's 401 handling) and keeps it consistent with persisted
//! storage.

use reqwest::header::{ACCEPT, HeaderValue};
use sara_auth::{Role, User};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::{ApiClient, RequestOptions, backend_message, is_html};
use crate::error::{
    BACKEND_HTML, ClientError, ClientResult, DEFAULT_LOGIN_ERROR, DEFAULT_REGISTER_ERROR,
    REGISTRATION_CHECK_FAILED, SERVER_UNREACHABLE,
};
use crate::events::{SessionEvent, publish};
use crate::routes::LOGIN_PATH;
use crate::session::SessionStore;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

/// Successful login payload. Fields beyond `token` and `user` are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Answer of `GET /auth/can-register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanRegister {
    pub can_register: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CanRegister {
    fn denied(message: &str) -> Self {
        Self {
            can_register: false,
            message: Some(message.to_string()),
        }
    }
}

/// How the session came back at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// A well-formed user record was found; no network call was made.
    Restored,
    /// Only a token was stored; the backend confirmed the identity.
    Revalidated,
    /// Nothing was stored.
    Anonymous,
    /// The stored session was unreadable; persisted state was cleared.
    Corrupted,
    /// Only a token was stored and the backend rejected it; state was cleared.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Rebuild the session from persisted storage. Call once at start-up.
    pub async fn initialize(&self) -> InitOutcome {
        let persistence = self.api.persistence();

        if let Err(err) = persistence.verify() {
            tracing::warn!(error = %err, "session storage is corrupt; clearing session");
            return self.discard_corrupt_session();
        }

        if let Some(raw) = persistence.user_record() {
            return match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, role = %user.role, "session restored");
                    self.session().set_user(user);
                    InitOutcome::Restored
                }
                Err(err) => {
                    tracing::warn!(error = %err, "persisted user record is corrupt; clearing session");
                    self.discard_corrupt_session()
                }
            };
        }

        if persistence.token().is_none() {
            return InitOutcome::Anonymous;
        }

        match self.fetch_identity().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session rebuilt from token");
                self.adopt(user);
                InitOutcome::Revalidated
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored token rejected; clearing session");
                persistence.clear();
                self.session().clear();
                InitOutcome::Rejected
            }
        }
    }

    /// `POST /auth/login`. On success the token and user are persisted and the
    /// session is updated; on failure the session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let _loading = self.session().begin_loading();

        let resp = self
            .api
            .http()
            .post(self.api.url("/auth/login"))
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(ClientError::connectivity)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = backend_message(resp)
                .await
                .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string());
            tracing::info!(status, "login rejected");
            return Err(ClientError::InvalidCredentials(message));
        }

        let payload: LoginResponse = resp.json().await.map_err(ClientError::decode)?;

        if let Err(err) = self.api.persistence().save(&payload.token, &payload.user) {
            self.api.persistence().clear();
            return Err(err.into());
        }
        self.session().set_user(payload.user.clone());
        publish(
            self.api.events(),
            SessionEvent::LoggedIn {
                user_id: payload.user.id,
            },
        );
        tracing::info!(user_id = %payload.user.id, role = %payload.user.role, "logged in");

        Ok(payload)
    }

    /// `POST /auth/register`. Registration does not log the user in.
    ///
    /// `role` is omitted from the request when `None`, leaving the choice to
    /// the backend's default policy.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> ClientResult<Value> {
        let _loading = self.session().begin_loading();

        let resp = self
            .api
            .http()
            .post(self.api.url("/auth/register"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&Registration {
                name,
                email,
                password,
                role,
            })
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "registration request failed");
                ClientError::Connectivity(SERVER_UNREACHABLE.to_string())
            })?;

        if is_html(&resp) {
            tracing::warn!(status = resp.status().as_u16(), "registration answered with HTML");
            return Err(ClientError::BackendUnavailable(BACKEND_HTML.to_string()));
        }

        if !resp.status().is_success() {
            let message = backend_message(resp)
                .await
                .unwrap_or_else(|| DEFAULT_REGISTER_ERROR.to_string());
            return Err(ClientError::RegistrationFailed(message));
        }

        let payload: Value = resp.json().await.map_err(ClientError::decode)?;
        tracing::info!(email, "registration accepted");
        Ok(payload)
    }

    /// `GET /auth/can-register`. Never fails: every failure path degrades to
    /// `can_register: false` with a diagnostic message.
    pub async fn can_register(&self) -> CanRegister {
        let resp = match self
            .api
            .http()
            .get(self.api.url("/auth/can-register"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(error = %err, "registration check failed");
                return CanRegister::denied(SERVER_UNREACHABLE);
            }
        };

        if is_html(&resp) {
            return CanRegister::denied(BACKEND_HTML);
        }
        if !resp.status().is_success() {
            return CanRegister::denied(REGISTRATION_CHECK_FAILED);
        }

        match resp.json::<CanRegister>().await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!(error = %err, "registration check returned an unexpected body");
                CanRegister::denied(REGISTRATION_CHECK_FAILED)
            }
        }
    }

    /// Re-check the session against `GET /auth/me`.
    ///
    /// Returns `false` (after logging out) when there is no token or the
    /// backend does not confirm the identity; never surfaces the error.
    pub async fn validate_session(&self) -> bool {
        if self.api.persistence().token().is_none() {
            self.logout();
            return false;
        }

        match self.fetch_identity().await {
            Ok(user) => {
                self.adopt(user);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "session validation failed");
                self.logout();
                false
            }
        }
    }

    /// Clear persisted and in-memory session state, then navigate to login.
    /// Idempotent.
    pub fn logout(&self) {
        self.api.persistence().clear();
        self.session().clear();
        publish(self.api.events(), SessionEvent::LoggedOut);
        publish(self.api.events(), SessionEvent::Navigate(LOGIN_PATH.to_string()));
        tracing::info!("logged out");
    }

    fn discard_corrupt_session(&self) -> InitOutcome {
        self.api.persistence().clear();
        self.session().clear();
        publish(self.api.events(), SessionEvent::StorageCorrupted);
        InitOutcome::Corrupted
    }

    async fn fetch_identity(&self) -> ClientResult<User> {
        self.api.request("/auth/me", RequestOptions::get()).await
    }

    fn adopt(&self, user: User) {
        if let Err(err) = self.api.persistence().save_user(&user) {
            tracing::warn!(error = %err, "failed to persist refreshed user record");
        }
        self.session().set_user(user);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::ClientConfig;
    use crate::events::SessionBus;
    use crate::storage::{MemoryStorage, SessionStorage, StorageError, TOKEN_KEY, USER_KEY};
    use sara_events::{EventBus, Subscription};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server_uri: String) -> (AuthClient, Arc<MemoryStorage>, Subscription<SessionEvent>) {
        let config = ClientConfig::new(server_uri).unwrap();
        let storage = Arc::new(MemoryStorage::new());
        let events = Arc::new(SessionBus::new());
        let subscription = events.subscribe();
        let api = ApiClient::new(&config, storage.clone(), SessionStore::new(), events).unwrap();
        (AuthClient::new(api), storage, subscription)
    }

    fn user_json(role: &str) -> Value {
        json!({"id": 5, "name": "Aminata", "email": "aminata@example.com", "role": role})
    }

    async fn mount_me(server: &MockServer, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_persists_token_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "aminata@example.com", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-1",
                "user": user_json("gestionnaire"),
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let (auth, storage, events) = client(server.uri());
        let payload = auth.login("aminata@example.com", "pw").await.unwrap();

        assert_eq!(payload.token, "tok-1");
        assert_eq!(payload.extra.get("expires_in"), Some(&json!(3600)));
        assert!(auth.session().is_authenticated());
        assert_eq!(auth.session().role(), Some(Role::Manager));
        assert!(!auth.session().is_loading());
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        let stored: User = serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, payload.user);
        assert!(matches!(events.drain().as_slice(), [SessionEvent::LoggedIn { .. }]));
    }

    #[tokio::test]
    async fn login_rejection_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "wrong password"})),
            )
            .mount(&server)
            .await;

        let (auth, storage, _) = client(server.uri());
        let err = auth.login("a@example.com", "nope").await.unwrap_err();

        assert!(matches!(&err, ClientError::InvalidCredentials(m) if m == "wrong password"));
        assert!(!auth.session().is_authenticated());
        assert!(!auth.session().is_loading());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn login_rejection_without_message_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(422).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let (auth, _, _) = client(server.uri());
        let err = auth.login("a@example.com", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_LOGIN_ERROR);
    }

    #[tokio::test]
    async fn login_reports_loading_while_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "tok-2", "user": user_json("admin")}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let (auth, _, _) = client(server.uri());
        let pending = tokio::spawn({
            let auth = auth.clone();
            async move { auth.login("aminata@example.com", "pw").await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(auth.session().is_loading());
        assert!(!auth.session().is_authenticated());

        pending.await.unwrap().unwrap();
        assert!(!auth.session().is_loading());
        assert!(auth.session().is_authenticated());
    }

    #[tokio::test]
    async fn login_transport_failure_is_connectivity() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let (auth, storage, _) = client(uri);
        let err = auth.login("a@example.com", "pw").await.unwrap_err();

        assert!(matches!(err, ClientError::Connectivity(_)));
        assert!(!auth.session().is_loading());
        assert!(!auth.session().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    /// Accepts the token but refuses to store a user record.
    #[derive(Debug, Default)]
    struct UserWriteFails(MemoryStorage);

    impl SessionStorage for UserWriteFails {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY {
                return Err(StorageError::Poisoned);
            }
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
    }

    #[tokio::test]
    async fn login_persistence_failure_leaves_no_token_behind() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "tok-3", "user": user_json("observateur")})),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new(server.uri()).unwrap();
        let storage = Arc::new(UserWriteFails::default());
        let api = ApiClient::new(
            &config,
            storage.clone(),
            SessionStore::new(),
            Arc::new(SessionBus::new()),
        )
        .unwrap();
        let auth = AuthClient::new(api);

        let err = auth.login("a@example.com", "pw").await.unwrap_err();

        assert!(matches!(err, ClientError::Storage(StorageError::Poisoned)));
        assert!(!auth.session().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn register_omits_absent_role_and_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({
                "name": "Aminata",
                "email": "aminata@example.com",
                "password": "pw"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "created"})))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, storage, _) = client(server.uri());
        let payload = auth
            .register("Aminata", "aminata@example.com", "pw", None)
            .await
            .unwrap();

        assert_eq!(payload["message"], "created");
        assert!(!auth.session().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn register_sends_role_when_given() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({
                "name": "Oumar",
                "email": "oumar@example.com",
                "password": "pw",
                "role": "observateur"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 8})))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, _, _) = client(server.uri());
        auth.register("Oumar", "oumar@example.com", "pw", Some(Role::Observer))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_html_response_means_backend_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<!DOCTYPE html><html></html>", "text/html; charset=UTF-8"),
            )
            .mount(&server)
            .await;

        let (auth, _, _) = client(server.uri());
        let err = auth.register("A", "a@example.com", "pw", None).await.unwrap_err();
        assert!(matches!(err, ClientError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn register_rejection_uses_backend_message_or_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({"name": "A", "email": "taken@example.com", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "email already taken"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({"name": "B", "email": "b@example.com", "password": "pw"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .mount(&server)
            .await;

        let (auth, _, _) = client(server.uri());

        let err = auth.register("A", "taken@example.com", "pw", None).await.unwrap_err();
        assert!(matches!(&err, ClientError::RegistrationFailed(m) if m == "email already taken"));

        let err = auth.register("B", "b@example.com", "pw", None).await.unwrap_err();
        assert!(matches!(&err, ClientError::RegistrationFailed(m) if m == DEFAULT_REGISTER_ERROR));
    }

    #[tokio::test]
    async fn register_transport_failure_is_connectivity() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let (auth, _, _) = client(uri);
        let err = auth.register("A", "a@example.com", "pw", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Connectivity(_)));
        assert!(!auth.session().is_loading());
    }

    #[tokio::test]
    async fn can_register_passes_backend_answer_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/can-register"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"can_register": true})))
            .mount(&server)
            .await;

        let (auth, _, _) = client(server.uri());
        assert_eq!(
            auth.can_register().await,
            CanRegister {
                can_register: true,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn can_register_degrades_on_network_failure() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let (auth, _, _) = client(uri);
        let answer = auth.can_register().await;
        assert!(!answer.can_register);
        assert!(answer.message.is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn can_register_degrades_on_html_and_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/can-register"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (auth, _, _) = client(server.uri());
        let answer = auth.can_register().await;
        assert_eq!(answer, CanRegister::denied(REGISTRATION_CHECK_FAILED));

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/auth/can-register"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;
        assert_eq!(auth.can_register().await, CanRegister::denied(BACKEND_HTML));
    }

    #[tokio::test]
    async fn initialize_restores_well_formed_record_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json("admin")))
            .expect(0)
            .mount(&server)
            .await;

        let (auth, storage, _) = client(server.uri());
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, &user_json("observateur").to_string()).unwrap();

        assert_eq!(auth.initialize().await, InitOutcome::Restored);
        assert_eq!(auth.session().role(), Some(Role::Observer));
    }

    #[tokio::test]
    async fn initialize_clears_corrupt_record() {
        let server = MockServer::start().await;
        let (auth, storage, events) = client(server.uri());
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();

        assert_eq!(auth.initialize().await, InitOutcome::Corrupted);
        assert!(!auth.session().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(events.drain(), vec![SessionEvent::StorageCorrupted]);
    }

    #[tokio::test]
    async fn initialize_rebuilds_session_from_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json("admin")))
            .mount(&server)
            .await;

        let (auth, storage, _) = client(server.uri());
        storage.set(TOKEN_KEY, "tok").unwrap();

        assert_eq!(auth.initialize().await, InitOutcome::Revalidated);
        assert!(auth.session().can_manage_users());
        assert!(storage.get(USER_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn initialize_clears_rejected_token() {
        let server = MockServer::start().await;
        mount_me(&server, 500, json!({})).await;

        let (auth, storage, _) = client(server.uri());
        storage.set(TOKEN_KEY, "stale").unwrap();

        assert_eq!(auth.initialize().await, InitOutcome::Rejected);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn initialize_with_nothing_stored_is_anonymous() {
        let server = MockServer::start().await;
        let (auth, _, _) = client(server.uri());
        assert_eq!(auth.initialize().await, InitOutcome::Anonymous);
    }

    #[tokio::test]
    async fn validate_session_without_token_logs_out() {
        let server = MockServer::start().await;
        let (auth, _, events) = client(server.uri());

        assert!(!auth.validate_session().await);
        assert_eq!(
            events.drain(),
            vec![
                SessionEvent::LoggedOut,
                SessionEvent::Navigate(LOGIN_PATH.to_string())
            ]
        );
    }

    #[tokio::test]
    async fn validate_session_refreshes_user_record() {
        let server = MockServer::start().await;
        mount_me(&server, 200, user_json("gestionnaire")).await;

        let (auth, storage, _) = client(server.uri());
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, &user_json("observateur").to_string()).unwrap();
        auth.initialize().await;
        assert_eq!(auth.session().role(), Some(Role::Observer));

        assert!(auth.validate_session().await);
        assert_eq!(auth.session().role(), Some(Role::Manager));
        let stored: User = serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.role, Role::Manager);
    }

    #[tokio::test]
    async fn validate_session_failure_logs_out() {
        let server = MockServer::start().await;
        mount_me(&server, 401, json!({"message": "expired"})).await;

        let (auth, storage, events) = client(server.uri());
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, &user_json("admin").to_string()).unwrap();
        auth.initialize().await;

        assert!(!auth.validate_session().await);
        assert!(!auth.session().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);

        let events = events.drain();
        assert!(events.contains(&SessionEvent::Reload(LOGIN_PATH.to_string())));
        assert!(events.contains(&SessionEvent::Navigate(LOGIN_PATH.to_string())));
    }

    #[tokio::test]
    async fn validate_session_malformed_body_logs_out() {
        let server = MockServer::start().await;
        mount_me(&server, 200, json!({"unexpected": true})).await;

        let (auth, storage, _) = client(server.uri());
        storage.set(TOKEN_KEY, "tok").unwrap();

        assert!(!auth.validate_session().await);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let server = MockServer::start().await;
        let (auth, storage, _) = client(server.uri());
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, &user_json("admin").to_string()).unwrap();
        auth.initialize().await;

        auth.logout();
        auth.logout();

        assert!(!auth.session().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
