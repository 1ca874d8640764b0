use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::Bot;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_courier::acquisition::{AcquisitionService, AlbumPackager};
use catalog_courier::bot::{run_dispatcher, CommandRouter, MediaGroupCollector};
use catalog_courier::browse::BrowseStateMachine;
use catalog_courier::caption::CaptionComposer;
use catalog_courier::config::{AppConfig, CliConfig, FileConfig};
use catalog_courier::pipeline::{IngestionPipeline, TracingErrorSink};
use catalog_courier::publisher::{AlbumAnnouncer, Publisher};
use catalog_courier::transport::{ChatTarget, TelegramTransport};
use catalog_courier::{Catalog, ChatTransport, PlexCatalogClient};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in it override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Telegram bot token.
    #[clap(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Base URL of the catalog service.
    #[clap(long, env = "CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Credential attached to every catalog request.
    #[clap(long, env = "CATALOG_TOKEN", hide_env_values = true)]
    pub catalog_token: Option<String>,

    /// Root of the catalog's web UI, used for links in captions.
    #[clap(long)]
    pub catalog_web_url: Option<String>,

    /// Catalog library section holding the music.
    #[clap(long, default_value_t = 1)]
    pub library_section: u32,

    /// Root of the on-disk music library.
    #[clap(long, value_parser = parse_path)]
    pub music_root: Option<PathBuf>,

    /// Where untagged audio waits for sorting. Must be outside the music root.
    #[clap(long, value_parser = parse_path)]
    pub holding_dir: Option<PathBuf>,

    /// Broadcast channel, e.g. "@my_channel".
    #[clap(long)]
    pub channel: Option<String>,

    /// Timeout in seconds for catalog requests.
    #[clap(long, default_value_t = 30)]
    pub http_timeout_sec: u64,

    /// Telegram user ids allowed to use the bot. Empty allows everyone.
    #[clap(long, value_delimiter = ',')]
    pub allowed_user_ids: Vec<u64>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            bot_token: self.bot_token.clone(),
            catalog_url: self.catalog_url.clone(),
            catalog_token: self.catalog_token.clone(),
            catalog_web_url: self.catalog_web_url.clone(),
            library_section: self.library_section,
            music_root: self.music_root.clone(),
            holding_dir: self.holding_dir.clone(),
            channel: self.channel.clone(),
            http_timeout_sec: self.http_timeout_sec,
            allowed_user_ids: self.allowed_user_ids.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let channel = ChatTarget::parse(&config.channel)
        .ok_or_else(|| anyhow!("Invalid channel: {}", config.channel))?;

    info!("Connecting to catalog at {}...", config.catalog_url);
    let catalog: Arc<dyn Catalog> = Arc::new(
        PlexCatalogClient::new(
            config.catalog_url.clone(),
            config.catalog_token.clone(),
            config.library_section,
            config.http_timeout_sec,
        )?
        .with_path_rewrite(config.path_rewrite.clone()),
    );

    let bot = Bot::new(config.bot_token.clone());
    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));

    let composer = CaptionComposer::new(config.catalog_web_url.clone());
    let publisher = Arc::new(Publisher::new(transport.clone()));
    let announcer = Arc::new(AlbumAnnouncer::new(
        catalog.clone(),
        composer.clone(),
        publisher.clone(),
        channel,
        config.publishing.attach_tracks,
    ));

    let packager = AlbumPackager::new(config.holding_dir.join(".packages"));
    let browse = Arc::new(BrowseStateMachine::new(
        catalog.clone(),
        transport.clone(),
        publisher,
        packager,
        composer,
    ));

    let acquisition = Arc::new(AcquisitionService::new(
        transport.clone(),
        config.music_root.clone(),
        config.holding_dir.clone(),
    )?);
    let pipeline = Arc::new(IngestionPipeline::new(
        acquisition,
        catalog,
        transport.clone(),
        announcer.clone(),
        Arc::new(TracingErrorSink),
        config.publishing.refresh_settle(),
    ));

    let router = Arc::new(CommandRouter::new(
        config.allowed_user_ids.clone(),
        announcer,
        browse,
        pipeline,
        transport,
        MediaGroupCollector::new(config.publishing.media_group_settle()),
    ));

    info!(
        "Music root {:?}, holding dir {:?}, channel {}",
        config.music_root, config.holding_dir, config.channel
    );
    run_dispatcher(bot, router).await;
    Ok(())
}
