use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::base::TokenStore;
use crate::models::{AuthenticationToken, AuthorizationToken};

/// The config struct for MongoDB connections.
/// Contains the URI and database name.
#[derive(Deserialize, Serialize, JsonSchema, Debug)]
pub struct MongoDBConfig {
    pub uri: String,
    pub database: String,
}

/// A concrete `TokenStore` implementation that uses MongoDB.
///
/// Each token kind lives in its own collection, keyed by the opaque
/// access-token string:
/// - `authentication_tokens`: first-party session tokens
/// - `authorization_tokens`: third-party bearer tokens
pub struct MongoDBStore {
    authentication_tokens: Collection<AuthenticationToken>,
    authorization_tokens: Collection<AuthorizationToken>,
}

impl MongoDBStore {
    /// Creates a new `MongoDBStore` from the given config.
    /// It initializes client connections, sets up indexes, etc.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, String> {
        info!("Connecting to MongoDB at URI: {}", config.uri);

        // Parse the connection string from the config
        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| format!("Failed to parse MongoDB URI: {}", e))?;

        // Optionally set the client application name
        client_options.app_name = Some("Admit-O-Tron".to_string());

        // Create a new MongoDB client
        let client = Client::with_options(client_options)
            .map_err(|e| format!("Failed to create MongoDB client: {}", e))?;

        info!("MongoDB connection established successfully.");

        // Retrieve the specified database and relevant collections
        let database = client.database(&config.database);
        let authentication_tokens =
            database.collection::<AuthenticationToken>("authentication_tokens");
        let authorization_tokens =
            database.collection::<AuthorizationToken>("authorization_tokens");

        // Lookups are always by access token, so both collections carry a
        // unique index on it.
        let mut unique_on_authentication = IndexModel::default();
        unique_on_authentication.keys = doc! { "access_token": 1 };
        unique_on_authentication.options = Some(IndexOptions::builder().unique(true).build());

        authentication_tokens
            .create_index(unique_on_authentication, None)
            .await
            .map_err(|e| {
                format!(
                    "Failed to create unique index on authentication access_token: {}",
                    e
                )
            })?;

        let mut unique_on_authorization = IndexModel::default();
        unique_on_authorization.keys = doc! { "access_token": 1 };
        unique_on_authorization.options = Some(IndexOptions::builder().unique(true).build());

        authorization_tokens
            .create_index(unique_on_authorization, None)
            .await
            .map_err(|e| {
                format!(
                    "Failed to create unique index on authorization access_token: {}",
                    e
                )
            })?;

        Ok(Self {
            authentication_tokens,
            authorization_tokens,
        })
    }
}

#[async_trait]
impl TokenStore for MongoDBStore {
    /// Given an access-token string, returns the stored authentication
    /// token, if any.
    async fn authentication_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticationToken>, String> {
        self.authentication_tokens
            .find_one(doc! { "access_token": access_token }, None)
            .await
            .map_err(|e| format!("Failed to query authentication token: {}", e))
    }

    /// Given an access-token string, returns the stored authorization
    /// token, if any.
    async fn authorization_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthorizationToken>, String> {
        self.authorization_tokens
            .find_one(doc! { "access_token": access_token }, None)
            .await
            .map_err(|e| format!("Failed to query authorization token: {}", e))
    }
}
