//! Scribe HTTP client
//!
//! A thin wrapper over `reqwest` that owns the session's token pair,
//! attaches the access token to outgoing requests, and transparently
//! refreshes it once when the service reports it expired.

pub mod auth;
pub mod envelope;
pub mod error;
mod session;
pub mod transcriptions;

use envelope::ApiEnvelope;
use error::ClientError;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use scribe_core::store::{MemoryStore, SessionStore};
use scribe_core::types::{RefreshRequest, TokenData, TokenPair};
use serde_json::Value as JsonValue;
use session::SessionHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Scribe API client
///
/// Clones share the same session and refresh gate, so a clone handed to
/// another task behaves like the original.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
    refresh_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a client with default configuration and in-memory session storage
    pub async fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build().await
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Currently held access token, if any
    pub async fn access_token(&self) -> Option<String> {
        self.session.access_token().await
    }

    /// Currently held refresh token, if any
    pub async fn refresh_token(&self) -> Option<String> {
        self.session.refresh_token().await
    }

    /// Issue a JSON request through the authenticated pipeline
    ///
    /// The held access token is attached as a bearer header unless `headers`
    /// already carries an `Authorization` entry. When the service answers
    /// 401 with its expired-token marker, the token pair is refreshed and
    /// the request re-issued exactly once; that retried response's envelope
    /// is returned as-is, success or failure. Any other non-success status
    /// maps to [`ClientError::Api`].
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&JsonValue>,
        headers: &[(&str, &str)],
    ) -> Result<ApiEnvelope, ClientError> {
        self.send(|| {
            let mut request = self
                .client
                .request(method.clone(), format!("{}{}", self.base_url, endpoint));
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            request
        })
        .await
    }

    /// Serialize `body` and issue it through [`Self::request`]
    pub(crate) async fn send_json<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiEnvelope, ClientError>
    where
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(method, endpoint, Some(&body), &[]).await
    }

    /// Exchange the refresh token for a new token pair
    ///
    /// Returns false without touching the network when no refresh token is
    /// held. On any refresh failure the whole session is cleared. Concurrent
    /// callers coalesce into a single exchange.
    pub async fn refresh_access_token(&self) -> bool {
        let epoch = self.session.epoch().await;
        self.refresh_at(epoch).await
    }

    /// Refresh on behalf of an attempt that observed `observed_epoch`
    ///
    /// If the pair has rotated since, the exchange already happened on
    /// another task and its outcome is read from the session instead.
    async fn refresh_at(&self, observed_epoch: u64) -> bool {
        let (refresh_token, current_epoch) = self.session.refresh_snapshot().await;
        if current_epoch != observed_epoch {
            return self.session.is_authenticated().await;
        }
        let Some(refresh_token) = refresh_token else {
            return false;
        };

        let _gate = self.refresh_gate.lock().await;
        if self.session.epoch().await != observed_epoch {
            return self.session.is_authenticated().await;
        }

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(tokens) => {
                self.session.install_tokens(&tokens).await;
                debug!("Access token refreshed");
                true
            }
            Err(err) => {
                warn!("Token refresh failed: {err}");
                self.session.clear().await;
                false
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&request)
            .send()
            .await?;
        let envelope = read_envelope(response).await?;
        if !envelope.is_success() {
            return Err(ClientError::Api {
                status: envelope.status,
                message: envelope.message_or_status(),
            });
        }
        let data: TokenData = envelope.data_as()?;
        Ok(data.tokens)
    }

    /// Run one request, following the expired-token branch at most once
    pub(crate) async fn send<F>(&self, build: F) -> Result<ApiEnvelope, ClientError>
    where
        F: Fn() -> RequestBuilder,
    {
        let (token, epoch) = self.session.access_snapshot().await;
        let envelope = self.dispatch(&build, token.as_deref(), false).await?;

        if envelope.is_token_expired() {
            debug!("Access token rejected as expired, refreshing");
            if self.refresh_at(epoch).await {
                let Some(fresh) = self.session.access_token().await else {
                    return Err(ClientError::SessionExpired);
                };
                // The retried response is final, whatever its status.
                return self.dispatch(&build, Some(&fresh), true).await;
            }
            self.session.clear().await;
            return Err(ClientError::SessionExpired);
        }

        if !envelope.is_success() {
            return Err(ClientError::Api {
                status: envelope.status,
                message: envelope.message_or_status(),
            });
        }
        Ok(envelope)
    }

    /// Send one attempt; `force` makes `token` override any Authorization
    /// header already on the request
    async fn dispatch<F>(
        &self,
        build: &F,
        token: Option<&str>,
        force: bool,
    ) -> Result<ApiEnvelope, ClientError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut request = build().build()?;
        if let Some(token) = token {
            if force || !request.headers().contains_key(header::AUTHORIZATION) {
                request
                    .headers_mut()
                    .insert(header::AUTHORIZATION, bearer(token)?);
            }
        }

        let response = self.client.execute(request).await?;
        read_envelope(response).await
    }
}

fn bearer(token: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ClientError::Configuration("access token is not a valid header value".into()))
}

async fn read_envelope(response: reqwest::Response) -> Result<ApiEnvelope, ClientError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    let mut envelope: ApiEnvelope = serde_json::from_str(&body)?;
    envelope.status = status;
    Ok(envelope)
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    store: Option<Arc<dyn SessionStore>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the durable store the session persists through
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client and restore any persisted session
    ///
    /// Both token keys must be present in the store for a session to be
    /// restored; a lone token is ignored.
    pub async fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("scribe-client/", env!("CARGO_PKG_VERSION")).to_string());
        let client = client_builder.user_agent(user_agent).build()?;

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let session = SessionHandle::new(store);
        session.restore().await?;

        Ok(ApiClient {
            client,
            base_url,
            session,
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }
}
