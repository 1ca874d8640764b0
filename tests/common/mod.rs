//! Common test infrastructure
//!
//! End-to-end tests run the real catalog client, pipeline and browse
//! machine against a fake catalog service, with a chat transport that only
//! records. Tests should only import from this module.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{Harness, ALBUM_ID};
//!
//! #[tokio::test]
//! async fn test_post_album() {
//!     let harness = Harness::spawn().await;
//!     harness.announcer.announce_by_id(ALBUM_ID).await.unwrap();
//! }
//! ```

mod constants;
mod fixtures;
mod server;
mod transport;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{album_zip, corrupt_zip, create_local_album};
pub use server::TestServer;
pub use transport::{RecordingTransport, Sent};

use catalog_courier::acquisition::{AcquisitionService, AlbumPackager};
use catalog_courier::bot::{CommandRouter, MediaGroupCollector};
use catalog_courier::browse::BrowseStateMachine;
use catalog_courier::caption::CaptionComposer;
use catalog_courier::config::PathRewrite;
use catalog_courier::pipeline::{IngestionPipeline, MemoryErrorSink};
use catalog_courier::publisher::{AlbumAnnouncer, Publisher};
use catalog_courier::transport::ChatTarget;
use catalog_courier::PlexCatalogClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const USER_CHAT: i64 = 4242;

/// Catalog client pointed at `server`, with catalog paths mapped under
/// `library_root`.
pub fn catalog_client(server: &TestServer, library_root: Option<PathBuf>) -> PlexCatalogClient {
    PlexCatalogClient::new(server.base_url.clone(), TEST_TOKEN.to_string(), SECTION_ID, 5)
        .expect("Failed to create catalog client")
        .with_path_rewrite(library_root.map(|local_prefix| PathRewrite {
            catalog_prefix: CATALOG_PREFIX.to_string(),
            local_prefix,
        }))
}

/// Everything a running courier has, wired to the fake catalog.
#[allow(dead_code)]
pub struct Harness {
    pub server: TestServer,
    pub transport: Arc<RecordingTransport>,
    pub sink: Arc<MemoryErrorSink>,
    pub announcer: Arc<AlbumAnnouncer>,
    pub browse: Arc<BrowseStateMachine>,
    pub pipeline: Arc<IngestionPipeline>,
    pub router: CommandRouter,
    pub music_root: PathBuf,
    pub holding_dir: PathBuf,
    pub package_dir: PathBuf,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl Harness {
    pub async fn spawn() -> Self {
        Self::spawn_with_users(Vec::new()).await
    }

    pub async fn spawn_with_users(allowed_user_ids: Vec<u64>) -> Self {
        let server = TestServer::spawn().await;
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let music_root = temp_dir.path().join("music");
        let holding_dir = temp_dir.path().join("holding");
        let package_dir = temp_dir.path().join("packages");
        std::fs::create_dir_all(&music_root).unwrap();
        std::fs::create_dir_all(&holding_dir).unwrap();

        let catalog = Arc::new(catalog_client(&server, Some(music_root.clone())));
        let transport = Arc::new(RecordingTransport::default());
        let sink = Arc::new(MemoryErrorSink::new());
        let composer = CaptionComposer::new("http://catalog.test/web");
        let publisher = Arc::new(Publisher::new(transport.clone()));

        let announcer = Arc::new(AlbumAnnouncer::new(
            catalog.clone(),
            composer.clone(),
            publisher.clone(),
            ChatTarget::Channel(CHANNEL.to_string()),
            true,
        ));
        let browse = Arc::new(BrowseStateMachine::new(
            catalog.clone(),
            transport.clone(),
            publisher,
            AlbumPackager::new(&package_dir),
            composer,
        ));
        let acquisition = Arc::new(
            AcquisitionService::new(transport.clone(), music_root.clone(), holding_dir.clone())
                .expect("Failed to create acquisition service"),
        );
        let pipeline = Arc::new(IngestionPipeline::new(
            acquisition,
            catalog,
            transport.clone(),
            announcer.clone(),
            sink.clone(),
            Duration::ZERO,
        ));
        let router = CommandRouter::new(
            allowed_user_ids,
            announcer.clone(),
            browse.clone(),
            pipeline.clone(),
            transport.clone(),
            MediaGroupCollector::new(Duration::from_millis(50)),
        );

        Self {
            server,
            transport,
            sink,
            announcer,
            browse,
            pipeline,
            router,
            music_root,
            holding_dir,
            package_dir,
            _temp_dir: temp_dir,
        }
    }

    pub fn user_chat(&self) -> ChatTarget {
        ChatTarget::Chat(USER_CHAT)
    }

    pub fn channel(&self) -> ChatTarget {
        ChatTarget::Channel(CHANNEL.to_string())
    }
}
