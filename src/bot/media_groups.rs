//! Collects the separate updates of one Telegram media group.
//!
//! Telegram sends each file of an album upload as its own message sharing a
//! `media_group_id`. The first file opens a window; when it closes the whole
//! group is handed over at once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use crate::transport::{AudioAttachment, ChatTarget};

struct PendingGroup {
    chat: ChatTarget,
    items: Vec<AudioAttachment>,
}

#[derive(Clone)]
pub struct MediaGroupCollector {
    pending: Arc<Mutex<HashMap<String, PendingGroup>>>,
    settle: Duration,
}

impl MediaGroupCollector {
    pub fn new(settle: Duration) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            settle,
        }
    }

    /// Add a file to its group. The first file of a group schedules
    /// `on_ready`, which runs once after the settle delay with every file
    /// collected by then. Returns whether this call scheduled it.
    ///
    /// The flush runs on its own task: updates from one chat are handled in
    /// order, so waiting inline would hold back the rest of the group.
    pub fn push<F, Fut>(
        &self,
        group_id: &str,
        chat: ChatTarget,
        attachment: AudioAttachment,
        on_ready: F,
    ) -> bool
    where
        F: FnOnce(ChatTarget, Vec<AudioAttachment>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let first = {
            let Ok(mut pending) = self.pending.lock() else {
                return false;
            };
            match pending.get_mut(group_id) {
                Some(group) => {
                    group.items.push(attachment);
                    false
                }
                None => {
                    pending.insert(
                        group_id.to_string(),
                        PendingGroup {
                            chat,
                            items: vec![attachment],
                        },
                    );
                    true
                }
            }
        };

        if first {
            let pending = self.pending.clone();
            let settle = self.settle;
            let group_id = group_id.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(settle).await;
                let group = pending
                    .lock()
                    .ok()
                    .and_then(|mut pending| pending.remove(&group_id));
                if let Some(group) = group {
                    debug!("Media group {} closed with {} files", group_id, group.items.len());
                    on_ready(group.chat, group.items).await;
                }
            });
        }
        first
    }

    /// Number of groups still collecting.
    pub fn open_groups(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}
