//! Chat transport seam.
//!
//! Everything that talks to users or the channel goes through
//! [`ChatTransport`], so the publisher, browse flow and pipeline can be
//! exercised without a live bot. The Telegram implementation lives in
//! [`telegram`].

pub mod telegram;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use telegram::TelegramTransport;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Chat request failed: {0}")]
    Request(String),

    #[error("Attachment {0} could not be resolved")]
    MissingAttachment(String),

    #[error("Invalid media source: {0}")]
    InvalidSource(String),
}

/// Where a message goes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChatTarget {
    Chat(i64),
    /// Public channel username, including the leading `@`.
    Channel(String),
}

impl ChatTarget {
    /// `@name` is a channel, anything numeric is a chat id.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('@') && s.len() > 1 {
            return Some(Self::Channel(s.to_string()));
        }
        s.parse::<i64>().ok().map(Self::Chat)
    }
}

impl std::fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatTarget::Chat(id) => write!(f, "{}", id),
            ChatTarget::Channel(name) => f.write_str(name),
        }
    }
}

/// Payload of a photo, audio or document message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaSource {
    Url(String),
    File(PathBuf),
    Bytes { file_name: String, data: Vec<u8> },
}

/// One audio entry of a media batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaItem {
    pub source: MediaSource,
    /// HTML caption, only the first item of a batch carries one.
    pub caption: Option<String>,
    pub title: Option<String>,
    pub performer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Inline keyboard, one `Vec` per row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row.
    pub fn column(buttons: Vec<Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }
}

/// A document posted to the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentAttachment {
    pub file_id: String,
    pub file_name: Option<String>,
}

/// An audio file posted to the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioAttachment {
    pub file_id: String,
    pub file_name: Option<String>,
    pub performer: Option<String>,
    pub title: Option<String>,
}

/// Transport-neutral view of an incoming message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub user_id: Option<u64>,
    pub text: Option<String>,
    pub document: Option<DocumentAttachment>,
    pub audio: Option<AudioAttachment>,
    pub media_group_id: Option<String>,
}

/// Transport-neutral view of a button press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundCallback {
    pub chat_id: i64,
    pub user_id: u64,
    pub data: String,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send an HTML text message, optionally with an inline keyboard.
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        target: &ChatTarget,
        photo: MediaSource,
        caption: Option<String>,
    ) -> Result<(), TransportError>;

    async fn send_document(
        &self,
        target: &ChatTarget,
        document: MediaSource,
    ) -> Result<(), TransportError>;

    /// Send one batch of audio items. A single-item batch is sent as a plain
    /// audio message since media groups need at least two entries.
    async fn send_media_group(
        &self,
        target: &ChatTarget,
        items: Vec<MediaItem>,
    ) -> Result<(), TransportError>;

    /// Turn an attachment id into a URL it can be downloaded from.
    async fn resolve_attachment(&self, file_id: &str) -> Result<String, TransportError>;
}
