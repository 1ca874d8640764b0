//! [`ChatTransport`] over the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia,
    InputMediaAudio, Message, ParseMode, Recipient,
};
use tracing::debug;

use super::{
    AudioAttachment, ChatTarget, ChatTransport, DocumentAttachment, InboundCallback,
    InboundMessage, Keyboard, MediaItem, MediaSource, TransportError,
};

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn recipient(target: &ChatTarget) -> Recipient {
    match target {
        ChatTarget::Chat(id) => Recipient::Id(ChatId(*id)),
        ChatTarget::Channel(name) => Recipient::ChannelUsername(name.clone()),
    }
}

fn input_file(source: MediaSource) -> Result<InputFile, TransportError> {
    match source {
        MediaSource::Url(url) => {
            let url = reqwest::Url::parse(&url)
                .map_err(|e| TransportError::InvalidSource(format!("{}: {}", url, e)))?;
            Ok(InputFile::url(url))
        }
        MediaSource::File(path) => Ok(InputFile::file(path)),
        MediaSource::Bytes { file_name, data } => Ok(InputFile::memory(data).file_name(file_name)),
    }
}

fn inline_keyboard(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.label, button.payload))
            .collect::<Vec<_>>()
    }))
}

fn audio_media(item: MediaItem) -> Result<InputMedia, TransportError> {
    let mut media = InputMediaAudio::new(input_file(item.source)?);
    if let Some(caption) = item.caption {
        media = media.caption(caption).parse_mode(ParseMode::Html);
    }
    if let Some(title) = item.title {
        media = media.title(title);
    }
    if let Some(performer) = item.performer {
        media = media.performer(performer);
    }
    Ok(InputMedia::Audio(media))
}

fn request_error(e: teloxide::RequestError) -> TransportError {
    TransportError::Request(e.to_string())
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError> {
        let request = self
            .bot
            .send_message(recipient(target), text)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true);
        match keyboard.filter(|k| !k.is_empty()) {
            Some(keyboard) => request.reply_markup(inline_keyboard(keyboard)).await,
            None => request.await,
        }
        .map_err(request_error)?;
        Ok(())
    }

    async fn send_photo(
        &self,
        target: &ChatTarget,
        photo: MediaSource,
        caption: Option<String>,
    ) -> Result<(), TransportError> {
        let request = self.bot.send_photo(recipient(target), input_file(photo)?);
        match caption {
            Some(caption) => request.caption(caption).parse_mode(ParseMode::Html).await,
            None => request.await,
        }
        .map_err(request_error)?;
        Ok(())
    }

    async fn send_document(
        &self,
        target: &ChatTarget,
        document: MediaSource,
    ) -> Result<(), TransportError> {
        self.bot
            .send_document(recipient(target), input_file(document)?)
            .await
            .map_err(request_error)?;
        Ok(())
    }

    async fn send_media_group(
        &self,
        target: &ChatTarget,
        mut items: Vec<MediaItem>,
    ) -> Result<(), TransportError> {
        debug!("Sending batch of {} audio items to {}", items.len(), target);

        if items.len() == 1 {
            let item = items.remove(0);
            let mut request = self.bot.send_audio(recipient(target), input_file(item.source)?);
            if let Some(caption) = item.caption {
                request = request.caption(caption).parse_mode(ParseMode::Html);
            }
            if let Some(title) = item.title {
                request = request.title(title);
            }
            if let Some(performer) = item.performer {
                request = request.performer(performer);
            }
            request.await.map_err(request_error)?;
            return Ok(());
        }

        let media = items
            .into_iter()
            .map(audio_media)
            .collect::<Result<Vec<_>, _>>()?;
        self.bot
            .send_media_group(recipient(target), media)
            .await
            .map_err(request_error)?;
        Ok(())
    }

    async fn resolve_attachment(&self, file_id: &str) -> Result<String, TransportError> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|_| TransportError::MissingAttachment(file_id.to_string()))?;
        Ok(format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        ))
    }
}

/// Convert an incoming Telegram message. `None` for messages without a sender.
pub fn inbound_message(msg: &Message) -> Option<InboundMessage> {
    let user = msg.from()?;
    Some(InboundMessage {
        chat_id: msg.chat.id.0,
        user_id: Some(user.id.0),
        text: msg.text().map(|t| t.to_string()),
        document: msg.document().map(|doc| DocumentAttachment {
            file_id: doc.file.id.clone(),
            file_name: doc.file_name.clone(),
        }),
        audio: msg.audio().map(|audio| AudioAttachment {
            file_id: audio.file.id.clone(),
            file_name: audio.file_name.clone(),
            performer: audio.performer.clone(),
            title: audio.title.clone(),
        }),
        media_group_id: msg.media_group_id().map(|id| id.to_string()),
    })
}

/// Convert a button press. `None` when it carries no data or message.
pub fn inbound_callback(q: &CallbackQuery) -> Option<InboundCallback> {
    let message = q.message.as_ref()?;
    let data = q.data.as_ref()?;
    Some(InboundCallback {
        chat_id: message.chat.id.0,
        user_id: q.from.id.0,
        data: data.clone(),
    })
}
