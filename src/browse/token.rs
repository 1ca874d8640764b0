//! Callback tokens: `"<action>|<primaryId>|<secondaryId?>"`.
//!
//! Tokens are the only state a button carries. They must fit in Telegram's
//! callback data, which is capped at 64 bytes.

use thiserror::Error;

pub const TOKEN_SEPARATOR: char = '|';

/// Telegram's limit on callback data.
pub const MAX_TOKEN_BYTES: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Empty callback token")]
    Empty,

    #[error("Unknown callback action: {0}")]
    UnknownAction(String),

    #[error("Callback token has no primary id")]
    MissingPrimaryId,

    #[error("Callback token has too many parts: {0}")]
    TooManyParts(usize),

    #[error("Id contains the token separator: {0}")]
    InvalidCharacter(String),

    #[error("Callback token is {0} bytes, limit is 64")]
    TooLong(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowseAction {
    ArtistById,
    AlbumById,
    DownloadArchive,
    DownloadSong,
}

impl BrowseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowseAction::ArtistById => "artistById",
            BrowseAction::AlbumById => "albumById",
            BrowseAction::DownloadArchive => "downloadArchive",
            BrowseAction::DownloadSong => "downloadSong",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "artistById" => Some(BrowseAction::ArtistById),
            "albumById" => Some(BrowseAction::AlbumById),
            "downloadArchive" => Some(BrowseAction::DownloadArchive),
            "downloadSong" => Some(BrowseAction::DownloadSong),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackToken {
    pub action: BrowseAction,
    pub primary_id: String,
    pub secondary_id: Option<String>,
}

impl CallbackToken {
    pub fn new(action: BrowseAction, primary_id: impl Into<String>) -> Self {
        Self {
            action,
            primary_id: primary_id.into(),
            secondary_id: None,
        }
    }

    pub fn with_secondary(mut self, secondary_id: impl Into<String>) -> Self {
        self.secondary_id = Some(secondary_id.into());
        self
    }

    pub fn encode(&self) -> Result<String, TokenError> {
        for id in std::iter::once(&self.primary_id).chain(self.secondary_id.as_ref()) {
            if id.contains(TOKEN_SEPARATOR) {
                return Err(TokenError::InvalidCharacter(id.clone()));
            }
        }
        if self.primary_id.is_empty() {
            return Err(TokenError::MissingPrimaryId);
        }

        let mut encoded = format!("{}{}{}", self.action.as_str(), TOKEN_SEPARATOR, self.primary_id);
        if let Some(secondary) = &self.secondary_id {
            encoded.push(TOKEN_SEPARATOR);
            encoded.push_str(secondary);
        }

        if encoded.len() > MAX_TOKEN_BYTES {
            return Err(TokenError::TooLong(encoded.len()));
        }
        Ok(encoded)
    }

    /// Parse a token. An empty trailing secondary id decodes as `None`.
    pub fn decode(raw: &str) -> Result<Self, TokenError> {
        if raw.is_empty() {
            return Err(TokenError::Empty);
        }

        let parts: Vec<&str> = raw.split(TOKEN_SEPARATOR).collect();
        if parts.len() > 3 {
            return Err(TokenError::TooManyParts(parts.len()));
        }

        let action = BrowseAction::parse(parts[0])
            .ok_or_else(|| TokenError::UnknownAction(parts[0].to_string()))?;
        let primary_id = parts
            .get(1)
            .filter(|id| !id.is_empty())
            .ok_or(TokenError::MissingPrimaryId)?
            .to_string();
        let secondary_id = parts
            .get(2)
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string());

        Ok(Self {
            action,
            primary_id,
            secondary_id,
        })
    }
}
