use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::memory_store::MemoryConfig;
use crate::store::mongodb_store::MongoDBConfig;

/// The token store backend admission reads from. We differentiate the
/// backends via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreConfig {
    #[serde(rename = "mongo")]
    MongoDB(MongoDBConfig),
    #[serde(rename = "memory")]
    Memory(MemoryConfig),
}
