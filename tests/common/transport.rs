//! Chat transport that records what would have been sent.

use async_trait::async_trait;
use catalog_courier::transport::{
    ChatTarget, ChatTransport, Keyboard, MediaItem, MediaSource, TransportError,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String, Option<Keyboard>),
    Photo(MediaSource, Option<String>),
    Document(MediaSource),
    Group(Vec<MediaItem>),
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(ChatTarget, Sent)>>,
    attachments: Mutex<HashMap<String, String>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    /// Make `file_id` resolve to `url`.
    pub fn register_attachment(&self, file_id: &str, url: &str) {
        self.attachments
            .lock()
            .unwrap()
            .insert(file_id.to_string(), url.to_string());
    }

    pub fn sent_to(&self, target: &ChatTarget) -> Vec<Sent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn texts_to(&self, target: &ChatTarget) -> Vec<String> {
        self.sent_to(target)
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(text, _) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn total(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn record(&self, target: &ChatTarget, sent: Sent) {
        self.sent.lock().unwrap().push((target.clone(), sent));
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError> {
        self.record(target, Sent::Text(text.to_string(), keyboard));
        Ok(())
    }

    async fn send_photo(
        &self,
        target: &ChatTarget,
        photo: MediaSource,
        caption: Option<String>,
    ) -> Result<(), TransportError> {
        self.record(target, Sent::Photo(photo, caption));
        Ok(())
    }

    async fn send_document(
        &self,
        target: &ChatTarget,
        document: MediaSource,
    ) -> Result<(), TransportError> {
        self.record(target, Sent::Document(document));
        Ok(())
    }

    async fn send_media_group(
        &self,
        target: &ChatTarget,
        items: Vec<MediaItem>,
    ) -> Result<(), TransportError> {
        self.record(target, Sent::Group(items));
        Ok(())
    }

    async fn resolve_attachment(&self, file_id: &str) -> Result<String, TransportError> {
        self.attachments
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| TransportError::MissingAttachment(file_id.to_string()))
    }
}
