use serde::{Deserialize, Serialize};

/// The user profile returned by the remote service.
///
/// The client carries the profile as an opaque blob: it is stored, exposed to
/// the embedding application, and never interpreted here.
pub type UserProfile = serde_json::Value;

/// Response of the token endpoint on a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token for the authenticated session.
    pub access_token: String,
    /// Token scheme reported by the server, normally `"bearer"`.
    #[serde(default)]
    pub token_type: String,
}
