use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::base::TokenStore;
use crate::models::{AuthenticationToken, AuthorizationToken};

/// Seed data for the in-memory store, declared directly in the config
/// file. Suited to development and tests; tokens do not survive restarts.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Default)]
pub struct MemoryConfig {
    #[serde(default)]
    pub authentication_tokens: Vec<AuthenticationToken>,
    #[serde(default)]
    pub authorization_tokens: Vec<AuthorizationToken>,
}

/// A `TokenStore` backed by process-local maps keyed by access token.
pub struct MemoryStore {
    authentication: RwLock<HashMap<String, AuthenticationToken>>,
    authorization: RwLock<HashMap<String, AuthorizationToken>>,
}

impl MemoryStore {
    pub fn new(config: &MemoryConfig) -> Self {
        let authentication = config
            .authentication_tokens
            .iter()
            .map(|token| (token.access_token.clone(), token.clone()))
            .collect();
        let authorization = config
            .authorization_tokens
            .iter()
            .map(|token| (token.access_token.clone(), token.clone()))
            .collect();

        MemoryStore {
            authentication: RwLock::new(authentication),
            authorization: RwLock::new(authorization),
        }
    }

    /// Insert or replace an authentication token. Token issuance lives
    /// elsewhere in the platform; this exists for fixtures and tests.
    pub fn put_authentication_token(&self, token: AuthenticationToken) {
        self.authentication
            .write()
            .expect("authentication token map lock poisoned")
            .insert(token.access_token.clone(), token);
    }

    /// Insert or replace an authorization token.
    pub fn put_authorization_token(&self, token: AuthorizationToken) {
        self.authorization
            .write()
            .expect("authorization token map lock poisoned")
            .insert(token.access_token.clone(), token);
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn authentication_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticationToken>, String> {
        Ok(self
            .authentication
            .read()
            .expect("authentication token map lock poisoned")
            .get(access_token)
            .cloned())
    }

    async fn authorization_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthorizationToken>, String> {
        Ok(self
            .authorization
            .read()
            .expect("authorization token map lock poisoned")
            .get(access_token)
            .cloned())
    }
}
