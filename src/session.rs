//!
//! # Session Management
//!
//! Owns the in-memory session state (token and user profile) and drives the
//! login / profile-fetch / logout lifecycle: `Anonymous → Authenticating →
//! Authenticated`, falling back to `Anonymous` on logout, on a login failure,
//! or on a profile-fetch failure.
//!
//! The token is rehydrated from the durable store at construction time and
//! persisted on every successful login; the user profile is only ever held in
//! memory. Login and the follow-up profile fetch are two independent steps,
//! not one transaction: a successful login whose profile fetch fails still
//! reports success, and the fetch failure independently forces the session back to
//! anonymous. This yields a brief authenticated-with-no-user window, which is
//! the documented contract rather than an oversight.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{TokenResponse, UserProfile};
use crate::navigation::{Navigator, Route};
use crate::storage::CredentialStore;
use crate::transport::Transport;

const LOGIN_PATH: &str = "/login/access-token";
const PROFILE_PATH: &str = "/users/me";

/// The in-memory pairing of credential and user profile for this process.
#[derive(Debug, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    /// Authenticated means a non-empty token is present. The profile may
    /// lag behind (see the module docs); the token alone is the gate an
    /// external router consults.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Session state shared between the manager and the transport middleware.
pub type SharedSession = Arc<RwLock<Session>>;

/// Drives login, profile fetch and logout against the remote service.
pub struct SessionManager {
    session: SharedSession,
    store: Arc<dyn CredentialStore>,
    transport: Arc<Transport>,
    navigator: Arc<dyn Navigator>,
}

impl SessionManager {
    pub fn new(
        session: SharedSession,
        store: Arc<dyn CredentialStore>,
        transport: Arc<Transport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            store,
            transport,
            navigator,
        }
    }

    /// The requires-authentication gate consulted by an external router.
    /// Computed solely from token presence; no local expiry check.
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    /// The current session token, if any.
    pub fn token(&self) -> Option<String> {
        self.session.read().token.clone()
    }

    /// The current user profile, if it has been fetched.
    pub fn user(&self) -> Option<UserProfile> {
        self.session.read().user.clone()
    }

    /// Authenticates against the token endpoint with form-encoded
    /// credentials.
    ///
    /// On success the returned token is stored in memory and in the durable
    /// store, a profile fetch is attempted, and the dashboard route is
    /// signalled. A failing profile fetch does not fail the login; its own
    /// failure path already forced the session back to anonymous. On failure
    /// nothing is mutated and the normalized error is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .transport
            .post_form(LOGIN_PATH, &[("username", email), ("password", password)])
            .await?;
        let token: TokenResponse = response.json().await.map_err(ApiError::from)?;

        self.session.write().token = Some(token.access_token.clone());
        if let Err(err) = self.store.save(&token.access_token) {
            log::warn!("failed to persist session token: {}", err);
        }

        if let Err(err) = self.fetch_user().await {
            log::warn!("profile fetch after login failed: {}", err);
        }

        self.navigator.navigate(Route::Dashboard);
        Ok(())
    }

    /// Fetches the user profile for the current token.
    ///
    /// A no-op while anonymous. On failure the session is logged out, which
    /// guarantees an invalid token never remains the active session token.
    pub async fn fetch_user(&self) -> Result<(), ApiError> {
        if !self.is_authenticated() {
            return Ok(());
        }
        match self.request_profile().await {
            Ok(profile) => {
                self.session.write().user = Some(profile);
                Ok(())
            }
            Err(err) => {
                log::warn!("profile fetch failed, ending session: {}", err);
                self.logout();
                Err(err)
            }
        }
    }

    async fn request_profile(&self) -> Result<UserProfile, ApiError> {
        let response = self.transport.get(PROFILE_PATH).await?;
        response.json::<UserProfile>().await.map_err(ApiError::from)
    }

    /// Clears the in-memory session and the durable store entry.
    ///
    /// Idempotent: with no active session this only re-clears the store, and
    /// in particular does not signal navigation again. That keeps the login
    /// route signal at exactly one per authorization failure even when both
    /// the transport middleware and a caller's error path run.
    pub fn logout(&self) {
        let was_active = {
            let mut session = self.session.write();
            let had_token = session.is_authenticated();
            session.token = None;
            session.user = None;
            had_token
        };
        self.store.clear();
        if was_active {
            log::info!("session ended");
            self.navigator.navigate(Route::Login);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authenticated_requires_non_empty_token() {
        let session = Session::default();
        assert!(!session.is_authenticated());

        let session = Session {
            token: Some("".to_string()),
            user: None,
        };
        assert!(!session.is_authenticated());

        let session = Session {
            token: Some("T".to_string()),
            user: None,
        };
        assert!(session.is_authenticated());
    }
}
