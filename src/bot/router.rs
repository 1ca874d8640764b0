//! Maps inbound messages and button presses onto the courier's components.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::commands::{Command, HELP_TEXT};
use super::media_groups::MediaGroupCollector;
use crate::acquisition::{
    artist_from_filename, AcquisitionSource, DirectLink, UNKNOWN_PERFORMER,
};
use crate::browse::BrowseStateMachine;
use crate::pipeline::{AcquisitionJob, IngestionPipeline};
use crate::publisher::AlbumAnnouncer;
use crate::transport::{
    AudioAttachment, ChatTarget, ChatTransport, DocumentAttachment, InboundCallback,
    InboundMessage,
};

/// What an inbound message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    DirectLink(DirectLink),
    Document(DocumentAttachment),
    Audio {
        attachment: AudioAttachment,
        media_group_id: Option<String>,
    },
    /// A `/` message that did not parse; the text is the reason.
    Invalid(String),
    Ignored,
}

impl Inbound {
    pub fn classify(msg: &InboundMessage) -> Self {
        if let Some(audio) = &msg.audio {
            return Inbound::Audio {
                attachment: audio.clone(),
                media_group_id: msg.media_group_id.clone(),
            };
        }
        if let Some(document) = &msg.document {
            return Inbound::Document(document.clone());
        }
        let Some(text) = msg.text.as_deref() else {
            return Inbound::Ignored;
        };
        match Command::parse(text) {
            Ok(Some(command)) => Inbound::Command(command),
            Err(e) => Inbound::Invalid(e.to_string()),
            Ok(None) => DirectLink::parse(text)
                .map(Inbound::DirectLink)
                .unwrap_or(Inbound::Ignored),
        }
    }
}

pub struct CommandRouter {
    allowed_user_ids: Vec<u64>,
    announcer: Arc<AlbumAnnouncer>,
    browse: Arc<BrowseStateMachine>,
    pipeline: Arc<IngestionPipeline>,
    transport: Arc<dyn ChatTransport>,
    media_groups: MediaGroupCollector,
}

impl CommandRouter {
    pub fn new(
        allowed_user_ids: Vec<u64>,
        announcer: Arc<AlbumAnnouncer>,
        browse: Arc<BrowseStateMachine>,
        pipeline: Arc<IngestionPipeline>,
        transport: Arc<dyn ChatTransport>,
        media_groups: MediaGroupCollector,
    ) -> Self {
        Self {
            allowed_user_ids,
            announcer,
            browse,
            pipeline,
            transport,
            media_groups,
        }
    }

    /// An empty allow-list lets everyone in.
    pub fn is_allowed(&self, user_id: Option<u64>) -> bool {
        if self.allowed_user_ids.is_empty() {
            return true;
        }
        user_id.is_some_and(|id| self.allowed_user_ids.contains(&id))
    }

    pub async fn handle_message(&self, msg: InboundMessage) -> Result<()> {
        if !self.is_allowed(msg.user_id) {
            debug!("Ignoring message from user {:?}", msg.user_id);
            return Ok(());
        }
        let chat = ChatTarget::Chat(msg.chat_id);

        match Inbound::classify(&msg) {
            Inbound::Command(command) => {
                if let Err(e) = self.run_command(&chat, command).await {
                    error!("Command failed in {}: {:#}", chat, e);
                    let text = format!("Failed: {}", teloxide::utils::html::escape(&e.to_string()));
                    self.transport.send_text(&chat, &text, None).await?;
                }
            }
            Inbound::DirectLink(link) => {
                let mut job = AcquisitionJob::single(
                    AcquisitionSource::Url(link.url),
                    link.artist,
                    chat,
                );
                self.pipeline.run_archive(&mut job).await;
            }
            Inbound::Document(document) => {
                let artist = document
                    .file_name
                    .as_deref()
                    .map(artist_from_filename)
                    .filter(|artist| !artist.is_empty())
                    .unwrap_or_else(|| UNKNOWN_PERFORMER.to_string());
                let mut job = AcquisitionJob::single(
                    AcquisitionSource::Attachment {
                        file_id: document.file_id,
                        file_name: document.file_name,
                    },
                    artist,
                    chat,
                );
                self.pipeline.run_archive(&mut job).await;
            }
            Inbound::Audio {
                attachment,
                media_group_id: Some(group_id),
            } => {
                let pipeline = self.pipeline.clone();
                let id = group_id.clone();
                self.media_groups
                    .push(&group_id, chat, attachment, move |chat, items| async move {
                        let mut job = AcquisitionJob::audio_group(id, items.len(), chat);
                        pipeline.run_grouped_audio(&mut job, &items).await;
                    });
            }
            Inbound::Audio {
                attachment,
                media_group_id: None,
            } => {
                let mut job = AcquisitionJob::audio_group(attachment.file_id.clone(), 1, chat);
                self.pipeline
                    .run_grouped_audio(&mut job, std::slice::from_ref(&attachment))
                    .await;
            }
            Inbound::Invalid(reason) => {
                self.transport
                    .send_text(&chat, &teloxide::utils::html::escape(&reason), None)
                    .await?;
            }
            Inbound::Ignored => debug!("Ignoring message in {}", chat),
        }
        Ok(())
    }

    pub async fn handle_callback(&self, callback: InboundCallback) -> Result<()> {
        if !self.is_allowed(Some(callback.user_id)) {
            debug!("Ignoring callback from user {}", callback.user_id);
            return Ok(());
        }
        let chat = ChatTarget::Chat(callback.chat_id);
        let state = self.browse.handle_token(&chat, &callback.data).await?;
        debug!("Callback '{}' in {} -> {:?}", callback.data, chat, state);
        Ok(())
    }

    async fn run_command(&self, chat: &ChatTarget, command: Command) -> Result<()> {
        info!("Command {:?} in {}", command, chat);
        match command {
            Command::Help => {
                self.transport
                    .send_text(chat, &teloxide::utils::html::escape(HELP_TEXT), None)
                    .await?;
            }
            Command::Last(n) => {
                let posted = self.announcer.announce_recent(n).await?;
                self.transport
                    .send_text(
                        chat,
                        &format!("Posted {} album(s) to {}", posted, self.announcer.channel()),
                        None,
                    )
                    .await?;
            }
            Command::Post(id) => {
                let album = self.announcer.announce_by_id(&id).await?;
                self.transport
                    .send_text(
                        chat,
                        &format!(
                            "Posted {} to {}",
                            teloxide::utils::html::escape(&album.title),
                            self.announcer.channel()
                        ),
                        None,
                    )
                    .await?;
            }
            Command::Discography(id) => {
                self.announcer.announce_discography(&id).await?;
                self.transport
                    .send_text(
                        chat,
                        &format!("Posted discography to {}", self.announcer.channel()),
                        None,
                    )
                    .await?;
            }
            Command::Search(query) => {
                self.browse.search(chat, &query).await?;
            }
        }
        Ok(())
    }
}
