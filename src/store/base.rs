use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{memory_store::MemoryStore, mongodb_store::MongoDBStore};
use crate::config::StoreConfig;
use crate::models::{AuthenticationToken, AuthorizationToken};

/// The TokenStore trait abstracts read-only lookup over the two
/// independent token kinds (first-party session tokens and third-party
/// bearer tokens), each keyed by its opaque access-token string.
///
/// Implementations must support concurrent lookups; admission never
/// writes token state through this interface.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn authentication_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticationToken>, String>;

    async fn authorization_token(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthorizationToken>, String>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub async fn create_store(config: &StoreConfig) -> Arc<dyn TokenStore> {
    match config {
        StoreConfig::MongoDB(mongo_config) => match MongoDBStore::new(mongo_config).await {
            Ok(store) => {
                info!("Successfully created MongoDB token store.");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to create MongoDB token store: {}", e);
                std::process::exit(1);
            }
        },
        StoreConfig::Memory(memory_config) => {
            info!(
                "Using in-memory token store ({} authentication, {} authorization tokens seeded).",
                memory_config.authentication_tokens.len(),
                memory_config.authorization_tokens.len()
            );
            Arc::new(MemoryStore::new(memory_config))
        }
    }
}
