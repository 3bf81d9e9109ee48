//! Authenticated request helper.
//!
//! Every call against the API goes through here so bearer-token attachment and
//! 401 handling live in one place. A 401 wipes the persisted session and
//! announces a hard redirect on the event bus; navigation itself is the
//! subscriber's business.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::{SessionBus, SessionEvent, publish};
use crate::routes::LOGIN_PATH;
use crate::session::SessionStore;
use crate::storage::{SessionPersistence, SessionStorage};

/// Caller-supplied request options, merged with the helper's defaults.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self::with_body(Method::POST, body)
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Backend-supplied `message`, if the body is JSON and carries a non-empty one.
pub(crate) async fn backend_message(resp: Response) -> Option<String> {
    resp.json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

pub(crate) fn is_html(resp: &Response) -> bool {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
}

/// HTTP access to the API plus the shared session plumbing.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    download_dir: PathBuf,
    persistence: SessionPersistence,
    session: SessionStore,
    events: Arc<SessionBus>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn SessionStorage>,
        session: SessionStore,
        events: Arc<SessionBus>,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            download_dir: config.download_dir.clone(),
            persistence: SessionPersistence::new(storage),
            session,
            events,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn events(&self) -> &Arc<SessionBus> {
        &self.events
    }

    pub(crate) fn persistence(&self) -> &SessionPersistence {
        &self.persistence
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue an authenticated JSON request against `path` (relative to the API base).
    ///
    /// `Content-Type: application/json` is always sent (callers may override it);
    /// `Authorization: Bearer <token>` is added whenever a token is persisted.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);
        self.attach_token(&mut headers);

        let mut req = self
            .http
            .request(options.method.clone(), self.url(path))
            .headers(headers);
        if let Some(body) = &options.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(ClientError::connectivity)?;
        self.check_unauthorized(&resp, path)?;

        let status = resp.status();
        if !status.is_success() {
            let message = backend_message(resp)
                .await
                .unwrap_or_else(|| format!("API error ({})", status.as_u16()));
            tracing::debug!(path, status = status.as_u16(), %message, "API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<T>().await.map_err(ClientError::decode)
    }

    /// Download `path` as an opaque blob and save it as `filename` in the
    /// configured download directory. Returns the saved file's path.
    ///
    /// Error bodies are not parsed: binary endpoints are not assumed to return
    /// structured errors.
    pub async fn download(&self, path: &str, filename: &str) -> ClientResult<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ClientError::InvalidFilename(filename.to_string()))?
            .to_os_string();

        let mut headers = HeaderMap::new();
        self.attach_token(&mut headers);

        let resp = self
            .http
            .get(self.url(path))
            .headers(headers)
            .send()
            .await
            .map_err(ClientError::connectivity)?;
        self.check_unauthorized(&resp, path)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Download {
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(ClientError::connectivity)?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let target = self.download_dir.join(&name);
        let mut partial_name = name.clone();
        partial_name.push(".part");
        let partial = self.download_dir.join(partial_name);

        // The temporary file is released whether or not the save succeeds.
        let saved = async {
            tokio::fs::write(&partial, &bytes).await?;
            tokio::fs::rename(&partial, &target).await
        }
        .await;
        if let Err(err) = saved {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(err.into());
        }

        tracing::info!(path, file = %target.display(), bytes = bytes.len(), "download saved");
        Ok(target)
    }

    fn attach_token(&self, headers: &mut HeaderMap) {
        let Some(token) = self.persistence.token() else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("persisted token is not a valid header value; sending request without it"),
        }
    }

    fn check_unauthorized(&self, resp: &Response, path: &str) -> ClientResult<()> {
        if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "API answered 401; ending session");
            self.expire_session();
            return Err(ClientError::SessionExpired);
        }
        Ok(())
    }

    /// Drop every trace of the session and announce a hard redirect to login.
    pub(crate) fn expire_session(&self) {
        self.persistence.clear();
        self.session.clear();
        publish(&self.events, SessionEvent::Expired);
        publish(&self.events, SessionEvent::Reload(LOGIN_PATH.to_string()));
    }
}
