//!
//! # Transport
//!
//! HTTP access to the remote service: a `reqwest` client bound to a fixed
//! base endpoint, with cross-cutting behavior expressed as an explicit,
//! composed [`Middleware`] pipeline rather than hidden hooks.
//!
//! Two middlewares cover the session concerns:
//! - [`BearerAuth`] attaches the current session token to every outgoing
//!   request (requests go out unmodified while the session is anonymous);
//! - [`Deauthorizer`] watches incoming statuses and, on an authorization
//!   failure, forces the session back to anonymous exactly once per response.
//!   The failure is still propagated to the caller afterwards.
//!
//! The transport performs no retries and no per-call timeout tuning; every
//! failure is terminal for that call.

use futures::future::BoxFuture;
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::navigation::{Navigator, Route};
use crate::session::SharedSession;
use crate::storage::CredentialStore;

/// A stage in the request pipeline.
///
/// `on_request` may rewrite the outgoing request; `on_response` observes the
/// status of every received response, exactly once per response, before the
/// result is handed to the caller.
pub trait Middleware: Send + Sync {
    fn on_request(&self, req: RequestBuilder) -> RequestBuilder {
        req
    }

    fn on_response(&self, _status: StatusCode) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

/// Attaches the session token as a bearer credential on outgoing requests.
pub struct BearerAuth {
    session: SharedSession,
}

impl BearerAuth {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl Middleware for BearerAuth {
    fn on_request(&self, req: RequestBuilder) -> RequestBuilder {
        let token = self.session.read().token.clone();
        match token {
            Some(token) if !token.is_empty() => req.bearer_auth(token),
            _ => req,
        }
    }
}

/// Forces de-authentication when a response reports an authorization failure.
///
/// Clears the in-memory session, clears the durable store, and signals the
/// login route. The navigation signal fires only when a session was actually
/// active, so a caller's own `logout` on the same failure does not signal a
/// second time.
pub struct Deauthorizer {
    session: SharedSession,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl Deauthorizer {
    pub fn new(
        session: SharedSession,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            store,
            navigator,
        }
    }
}

impl Middleware for Deauthorizer {
    fn on_response(&self, status: StatusCode) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if status != StatusCode::UNAUTHORIZED {
                return;
            }
            let was_active = {
                let mut session = self.session.write();
                let had_token = session.is_authenticated();
                session.token = None;
                session.user = None;
                had_token
            };
            self.store.clear();
            if was_active {
                log::warn!("authorization failure, session cleared");
                self.navigator.navigate(Route::Login);
            }
        })
    }
}

/// HTTP client bound to a fixed base endpoint.
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Transport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            middleware: Vec::new(),
        }
    }

    /// Appends a stage to the pipeline. Stages run in insertion order.
    pub fn with(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.execute(self.client.get(self.url(path))).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.execute(self.client.post(self.url(path)).json(body))
            .await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.execute(self.client.put(self.url(path)).json(body))
            .await
    }

    /// POSTs an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<Response, ApiError> {
        self.execute(self.client.post(self.url(path)).form(fields))
            .await
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Response, ApiError> {
        self.execute(self.client.post(self.url(path)).multipart(form))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, ApiError> {
        self.execute(self.client.delete(self.url(path))).await
    }

    /// Runs a request through the pipeline.
    ///
    /// Success statuses yield the raw response for the caller to decode.
    /// Failure statuses are classified into [`ApiError`] with the normalized
    /// `detail` message; transport-level failures map to `ApiError::Network`.
    async fn execute(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let mut req = req;
        for middleware in &self.middleware {
            req = middleware.on_request(req);
        }

        let response = req.send().await?;
        let status = response.status();
        for middleware in &self.middleware {
            middleware.on_response(status).await;
        }

        if status.is_success() {
            return Ok(response);
        }

        log::debug!("request failed with status {}", status);
        let body: Option<Value> = response.json().await.ok();
        Err(ApiError::from_status(status, body.as_ref()))
    }
}
