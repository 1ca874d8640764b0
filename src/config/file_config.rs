use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub bot_token: Option<String>,
    pub catalog_url: Option<String>,
    pub catalog_token: Option<String>,
    pub catalog_web_url: Option<String>,
    pub library_section: Option<u32>,
    pub music_root: Option<String>,
    pub holding_dir: Option<String>,
    pub channel: Option<String>,
    pub http_timeout_sec: Option<u64>,
    pub allowed_user_ids: Option<Vec<u64>>,

    // Feature configs
    pub publishing: Option<PublishingConfig>,
    pub path_rewrite: Option<PathRewriteConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PublishingConfig {
    /// Seconds to wait after a refresh request before announcing the newest album.
    pub refresh_settle_secs: Option<u64>,
    /// Milliseconds to wait for the remaining items of a grouped upload.
    pub media_group_settle_ms: Option<u64>,
    /// Send the album's tracks after the cover message of `/post`.
    pub attach_tracks: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathRewriteConfig {
    /// Path prefix as reported by the catalog service.
    pub catalog_prefix: String,
    /// Local path that replaces `catalog_prefix`.
    pub local_prefix: String,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
