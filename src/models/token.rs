use std::collections::HashMap;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A first-party session credential identifying an end user.
///
/// Tokens are issued at login elsewhere in the platform and persisted in
/// the token store; admission only reads and validates them.
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq, Eq)]
pub struct AuthenticationToken {
    pub access_token: String,
    pub username: String,
    /// Epoch seconds at which the token was granted.
    pub granted: i64,
    /// Epoch seconds at which the token expires.
    pub expires: i64,
    /// Set when the token has been explicitly revoked, e.g. on logout.
    #[serde(default)]
    pub invalidated: bool,
}

impl AuthenticationToken {
    /// Create a token for `username` that is valid for `lifetime_secs`
    /// from now. A fresh access-token string (UUID) is generated.
    pub fn new(username: impl Into<String>, lifetime_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        AuthenticationToken {
            access_token: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            granted: now,
            expires: now + lifetime_secs,
            invalidated: false,
        }
    }

    /// A token is valid while it has not been revoked and has not expired.
    pub fn is_valid(&self) -> bool {
        !self.invalidated && Utc::now().timestamp() < self.expires
    }
}

/// A third-party (OAuth-style) bearer credential granting scoped access
/// on a user's behalf.
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationToken {
    pub access_token: String,
    /// The third-party client the token was issued to.
    pub client_id: String,
    /// The user on whose behalf access was granted.
    pub username: String,
    /// A map from service to the scopes granted on it.
    #[serde(default)]
    pub scopes: HashMap<String, Vec<String>>,
    pub granted: i64,
    pub expires: i64,
}

impl AuthorizationToken {
    /// Create a token for `client_id` acting on behalf of `username`,
    /// valid for `lifetime_secs` from now.
    pub fn new(
        client_id: impl Into<String>,
        username: impl Into<String>,
        scopes: HashMap<String, Vec<String>>,
        lifetime_secs: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        AuthorizationToken {
            access_token: uuid::Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            username: username.into(),
            scopes,
            granted: now,
            expires: now + lifetime_secs,
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now().timestamp() < self.expires
    }
}
