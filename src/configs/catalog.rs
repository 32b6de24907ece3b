use serde::{Deserialize, Serialize};

/// Credentials for the external music-catalog API.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    pub client_id: String,
    pub client_secret: String,
}
