mod file_config;

pub use file_config::{FileConfig, PathRewriteConfig, PublishingConfig};

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub bot_token: Option<String>,
    pub catalog_url: Option<String>,
    pub catalog_token: Option<String>,
    pub catalog_web_url: Option<String>,
    pub library_section: u32,
    pub music_root: Option<PathBuf>,
    pub holding_dir: Option<PathBuf>,
    pub channel: Option<String>,
    pub http_timeout_sec: u64,
    pub allowed_user_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Credentials
    pub bot_token: String,
    pub catalog_token: String,

    // Catalog service
    pub catalog_url: String,
    pub catalog_web_url: String,
    pub library_section: u32,
    pub http_timeout_sec: u64,

    // Library layout
    pub music_root: PathBuf,
    pub holding_dir: PathBuf,
    pub path_rewrite: Option<PathRewrite>,

    // Chat
    pub channel: String,
    pub allowed_user_ids: Vec<u64>,

    // Feature configs (with defaults)
    pub publishing: PublishingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub catalog_prefix: String,
    pub local_prefix: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PublishingSettings {
    pub refresh_settle_secs: u64,
    pub media_group_settle_ms: u64,
    pub attach_tracks: bool,
}

impl Default for PublishingSettings {
    fn default() -> Self {
        Self {
            refresh_settle_secs: 5,
            media_group_settle_ms: 1500,
            attach_tracks: false,
        }
    }
}

impl PublishingSettings {
    pub fn refresh_settle(&self) -> Duration {
        Duration::from_secs(self.refresh_settle_secs)
    }

    pub fn media_group_settle(&self) -> Duration {
        Duration::from_millis(self.media_group_settle_ms)
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let bot_token = file
            .bot_token
            .or_else(|| cli.bot_token.clone())
            .ok_or_else(|| anyhow!("bot_token must be specified via --bot-token or in config file"))?;

        let catalog_url = file
            .catalog_url
            .or_else(|| cli.catalog_url.clone())
            .ok_or_else(|| {
                anyhow!("catalog_url must be specified via --catalog-url or in config file")
            })?;
        let catalog_url = catalog_url.trim_end_matches('/').to_string();

        let catalog_token = file
            .catalog_token
            .or_else(|| cli.catalog_token.clone())
            .ok_or_else(|| {
                anyhow!("catalog_token must be specified via --catalog-token or in config file")
            })?;

        let catalog_web_url = file
            .catalog_web_url
            .or_else(|| cli.catalog_web_url.clone())
            .unwrap_or_else(|| format!("{}/web/index.html#!", catalog_url));

        let music_root = file
            .music_root
            .map(PathBuf::from)
            .or_else(|| cli.music_root.clone())
            .ok_or_else(|| {
                anyhow!("music_root must be specified via --music-root or in config file")
            })?;

        // Validate music_root exists
        if !music_root.exists() {
            bail!("Music root does not exist: {:?}", music_root);
        }
        if !music_root.is_dir() {
            bail!("music_root is not a directory: {:?}", music_root);
        }

        let holding_dir = file
            .holding_dir
            .map(PathBuf::from)
            .or_else(|| cli.holding_dir.clone())
            .unwrap_or_else(|| default_holding_dir(&music_root));

        if holding_dir.starts_with(&music_root) {
            bail!(
                "holding_dir {:?} must live outside of music_root {:?}",
                holding_dir,
                music_root
            );
        }

        let channel = file
            .channel
            .or_else(|| cli.channel.clone())
            .ok_or_else(|| anyhow!("channel must be specified via --channel or in config file"))?;

        let library_section = file.library_section.unwrap_or(cli.library_section);
        let http_timeout_sec = file.http_timeout_sec.unwrap_or(cli.http_timeout_sec);
        let allowed_user_ids = file
            .allowed_user_ids
            .unwrap_or_else(|| cli.allowed_user_ids.clone());

        // Publishing settings - merge file config with defaults
        let defaults = PublishingSettings::default();
        let publishing_file = file.publishing.unwrap_or_default();
        let publishing = PublishingSettings {
            refresh_settle_secs: publishing_file
                .refresh_settle_secs
                .unwrap_or(defaults.refresh_settle_secs),
            media_group_settle_ms: publishing_file
                .media_group_settle_ms
                .unwrap_or(defaults.media_group_settle_ms),
            attach_tracks: publishing_file
                .attach_tracks
                .unwrap_or(defaults.attach_tracks),
        };

        let path_rewrite = file.path_rewrite.map(|rewrite| PathRewrite {
            catalog_prefix: rewrite.catalog_prefix,
            local_prefix: PathBuf::from(rewrite.local_prefix),
        });

        Ok(Self {
            bot_token,
            catalog_token,
            catalog_url,
            catalog_web_url,
            library_section,
            http_timeout_sec,
            music_root,
            holding_dir,
            path_rewrite,
            channel,
            allowed_user_ids,
            publishing,
        })
    }
}

/// Files that can't be placed in the library wait next to it, never inside it,
/// so the catalog scanner doesn't pick them up.
fn default_holding_dir(music_root: &std::path::Path) -> PathBuf {
    match music_root.parent() {
        Some(parent) => parent.join("unsorted"),
        None => PathBuf::from("/unsorted"),
    }
}
