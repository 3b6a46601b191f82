//! Authenticated API client with one-shot refresh-and-retry.
//!
//! ARCHITECTURE
//! ============
//! Every request reads the current access token from the [`TokenStore`] and
//! sends it as a bearer credential. A `401` on a request that opted into
//! refresh triggers exactly one recovery attempt:
//!
//! 1. If the stored access token changed since the request was sent (another
//!    request already refreshed), retry with the current token.
//! 2. Otherwise exchange the refresh token at `POST /auth/refresh`, store the
//!    new access token, and retry once.
//!
//! The retried response is final; a second `401` propagates to the caller.
//!
//! Replies may arrive wrapped in the backend's `{status, message, data}`
//! envelope. A failing envelope `status` is an error even under HTTP 200, and
//! JSON decoding reads `data`.
//!
//! CONCURRENCY
//! ===========
//! Concurrent `401`s share one in-flight refresh future, so the refresh
//! endpoint sees one call per expiry no matter how many requests raced.
//! Each session start/end bumps an epoch; a refresh that resolves under a
//! stale epoch is discarded so logout cannot be undone by a late response.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::token_store::{TokenKind, TokenStore};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::types::{Envelope, RefreshResponse};

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const SIGNUP_ENDPOINT: &str = "/auth/signup";
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";
pub const PROFILE_ENDPOINT: &str = "/auth/profile";

/// Per-request behavior switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestOptions {
    /// Attempt refresh-and-retry when the backend answers `401`.
    pub refresh_on_unauthorized: bool,
}

impl RequestOptions {
    /// For the credential endpoints themselves: a `401` there means bad
    /// credentials, not an expired access token.
    pub const CREDENTIALS: Self = Self { refresh_on_unauthorized: false };
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { refresh_on_unauthorized: true }
    }
}

type RefreshFuture = Shared<LocalBoxFuture<'static, Result<String, ClientError>>>;
type ExpiryListener<T> = Rc<dyn Fn(&ApiClient<T>)>;

struct ClientInner<T> {
    config: ClientConfig,
    tokens: TokenStore,
    transport: T,
    epoch: Cell<u64>,
    refresh_inflight: RefCell<Option<RefreshFuture>>,
    expiry_listeners: RefCell<Vec<ExpiryListener<T>>>,
}

/// Shared handle to the request pipeline. Clones share tokens and state.
pub struct ApiClient<T> {
    inner: Rc<ClientInner<T>>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: Transport + 'static> ApiClient<T> {
    pub fn new(config: ClientConfig, tokens: TokenStore, transport: T) -> Self {
        Self {
            inner: Rc::new(ClientInner {
                config,
                tokens,
                transport,
                epoch: Cell::new(0),
                refresh_inflight: RefCell::new(None),
                expiry_listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Register a callback fired when a `401` cannot be recovered because the
    /// refresh token is missing or was rejected.
    pub fn on_session_expired(&self, listener: impl Fn(&Self) + 'static) {
        self.inner.expiry_listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Persist a freshly issued token pair and start a new epoch.
    pub fn start_session(&self, access_token: &str, refresh_token: &str) {
        self.advance_epoch();
        self.inner.tokens.set(TokenKind::Access, access_token);
        self.inner.tokens.set(TokenKind::Refresh, refresh_token);
    }

    /// Clear both tokens and orphan any in-flight refresh. Idempotent.
    pub fn end_session(&self) {
        self.advance_epoch();
        self.inner.tokens.clear_all();
    }

    /// Send a request and return the raw response on 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] for non-2xx responses (after at most
    /// one refresh-and-retry), [`ClientError::Transport`] when no response was
    /// received, or the refresh error when recovery failed.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<HttpResponse, ClientError> {
        let mut request = HttpRequest::new(method, self.inner.config.endpoint(path));
        request.body = body;

        let epoch = self.inner.epoch.get();
        let sent_token = self.inner.tokens.get(TokenKind::Access);
        let response = self
            .inner
            .transport
            .send(request.clone().with_bearer(sent_token.clone()))
            .await?;
        if response.status != 401 || !options.refresh_on_unauthorized {
            return into_result(response);
        }

        // Past this point the request counts as retried.
        let token = self.recover_access_token(epoch, sent_token.as_deref(), response).await?;
        tracing::debug!(method = method.as_str(), %path, "retrying request with refreshed access token");
        let retried = self.inner.transport.send(request.with_bearer(Some(token))).await?;
        into_result(retried)
    }

    /// `GET` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also [`ClientError::Decode`] for bad JSON.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let response = self.send(Method::Get, path, None, RequestOptions::default()).await?;
        decode(&response.body)
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also [`ClientError::Decode`] for bad JSON.
    pub async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let response = self.send(Method::Post, path, Some(encode(body)?), options).await?;
        decode(&response.body)
    }

    /// `POST` a JSON body, ignoring the response payload.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<B: Serialize>(&self, path: &str, body: &B, options: RequestOptions) -> Result<(), ClientError> {
        self.send(Method::Post, path, Some(encode(body)?), options).await?;
        Ok(())
    }

    fn advance_epoch(&self) {
        self.inner.epoch.set(self.inner.epoch.get() + 1);
        self.inner.refresh_inflight.borrow_mut().take();
    }

    fn notify_expired(&self) {
        let listeners: Vec<_> = self.inner.expiry_listeners.borrow().clone();
        for listener in listeners {
            listener(self);
        }
    }

    async fn recover_access_token(
        &self,
        epoch: u64,
        sent_token: Option<&str>,
        original: HttpResponse,
    ) -> Result<String, ClientError> {
        // Never retry a request from an ended session with a newer session's token.
        if self.inner.epoch.get() != epoch {
            tracing::debug!("401 arrived after the session ended; not retrying");
            return Err(ClientError::SessionEnded);
        }
        if let Some(current) = self.inner.tokens.get(TokenKind::Access) {
            if sent_token != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.inner.tokens.get(TokenKind::Refresh) else {
            tracing::debug!("401 with no refresh token; session cannot be recovered");
            self.notify_expired();
            return Err(ClientError::Status { status: original.status, body: original.body });
        };

        let existing = self.inner.refresh_inflight.borrow().clone();
        let refresh = match existing {
            Some(refresh) => refresh,
            None => {
                let refresh = self.start_refresh(refresh_token);
                *self.inner.refresh_inflight.borrow_mut() = Some(refresh.clone());
                refresh
            }
        };
        refresh.await
    }

    fn start_refresh(&self, refresh_token: String) -> RefreshFuture {
        let client = self.clone();
        let epoch = self.inner.epoch.get();
        async move {
            tracing::debug!("refreshing access token");
            let result = client.request_refresh(refresh_token).await;

            if client.inner.epoch.get() != epoch {
                tracing::debug!("discarding refresh result from an ended session");
                return Err(ClientError::SessionEnded);
            }
            client.inner.refresh_inflight.borrow_mut().take();

            match result {
                Ok((access, rotated)) => {
                    client.inner.tokens.set(TokenKind::Access, &access);
                    if let Some(refresh) = rotated {
                        client.inner.tokens.set(TokenKind::Refresh, &refresh);
                    }
                    Ok(access)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "access token refresh failed");
                    client.notify_expired();
                    Err(e)
                }
            }
        }
        .boxed_local()
        .shared()
    }

    async fn request_refresh(&self, refresh_token: String) -> Result<(String, Option<String>), ClientError> {
        let request = HttpRequest::new(Method::Post, self.inner.config.endpoint(REFRESH_ENDPOINT))
            .with_bearer(Some(refresh_token))
            .with_body(serde_json::json!({}));
        let response = into_result(self.inner.transport.send(request).await?)?;
        let (access, rotated) = decode::<RefreshResponse>(&response.body)?.into_tokens();
        if access.is_empty() {
            return Err(ClientError::MissingField("accessToken"));
        }
        Ok((access, rotated.filter(|token| !token.is_empty())))
    }
}

/// Non-2xx HTTP status, or a 2xx carrying an envelope with a failing
/// `status`, becomes [`ClientError::Status`].
fn into_result(response: HttpResponse) -> Result<HttpResponse, ClientError> {
    if !response.is_success() {
        return Err(ClientError::Status { status: response.status, body: response.body });
    }
    match Envelope::parse(&response.body) {
        Some(envelope) if !envelope.is_success() => {
            tracing::debug!(status = envelope.status, message = %envelope.message, "backend reported failure in body");
            Err(ClientError::Status { status: envelope.status, body: response.body })
        }
        _ => Ok(response),
    }
}

fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, ClientError> {
    if let Some(envelope) = Envelope::parse(body) {
        return serde_json::from_value(envelope.into_data()).map_err(|e| ClientError::Decode(e.to_string()));
    }
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}
