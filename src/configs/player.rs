use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayerConfig {
    /// Hard caps for bulk imports.
    #[serde(default = "default_max_playlist_import")]
    pub max_playlist_import: usize,
    #[serde(default = "default_max_album_import")]
    pub max_album_import: usize,
    #[serde(default = "default_max_link_list_import")]
    pub max_link_list_import: usize,

    /// Character budget per page of the queue listing.
    #[serde(default = "default_queue_page_chars")]
    pub queue_page_chars: usize,
    /// Idle seconds before a paginated queue view stops accepting input.
    #[serde(default = "default_queue_view_ttl_secs")]
    pub queue_view_ttl_secs: u64,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReconnectConfig {
    #[serde(default = "default_reconnect_enabled")]
    pub enabled: bool,
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_playlist_import: default_max_playlist_import(),
            max_album_import: default_max_album_import(),
            max_link_list_import: default_max_link_list_import(),
            queue_page_chars: default_queue_page_chars(),
            queue_view_ttl_secs: default_queue_view_ttl_secs(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: default_reconnect_enabled(),
            max_delay_secs: default_reconnect_max_delay_secs(),
        }
    }
}

fn default_max_playlist_import() -> usize {
    500
}

fn default_max_album_import() -> usize {
    100
}

fn default_max_link_list_import() -> usize {
    200
}

fn default_queue_page_chars() -> usize {
    1024
}

fn default_queue_view_ttl_secs() -> u64 {
    180
}

fn default_reconnect_enabled() -> bool {
    true
}

fn default_reconnect_max_delay_secs() -> u64 {
    5
}
