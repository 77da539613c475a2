pub mod telegram;

use anyhow::Result;

use crate::rules::PostRecord;

pub const ORIGIN_LABEL: &str = "🌏";
pub const FULL_LABEL: &str = "⤵";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub url: String,
}

/// A photo with caption and inline link buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMessage {
    pub photo: String,
    pub caption: String,
    pub actions: Vec<Action>,
}

impl From<&PostRecord> for PhotoMessage {
    fn from(p: &PostRecord) -> Self {
        Self {
            photo: p.preview_url.clone(),
            caption: p.caption.clone(),
            actions: vec![
                Action {
                    label: ORIGIN_LABEL.to_string(),
                    url: p.origin_url.clone(),
                },
                Action {
                    label: FULL_LABEL.to_string(),
                    url: p.full_url.clone(),
                },
            ],
        }
    }
}

#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, msg: &PhotoMessage) -> Result<()>;
    fn name(&self) -> &'static str;
}

// --- Test helper ---
/// Records every message; optionally fails each send after recording it.
pub struct RecordingMessenger {
    pub sent: std::sync::Mutex<Vec<PhotoMessage>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(vec![]),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: std::sync::Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn captions(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.caption.clone())
            .collect()
    }
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, msg: &PhotoMessage) -> Result<()> {
        self.sent.lock().unwrap().push(msg.clone());
        if self.fail {
            anyhow::bail!("recording messenger configured to fail");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_maps_to_photo_with_origin_then_full() {
        let p = PostRecord {
            preview_url: "https://i.pximg.net/x.jpg".into(),
            full_url: "https://pixiv.cat/1.jpg".into(),
            caption: "cap".into(),
            origin_url: "https://www.pixiv.net/artworks/1".into(),
        };
        let m = PhotoMessage::from(&p);
        assert_eq!(m.photo, "https://i.pximg.net/x.jpg");
        assert_eq!(m.actions[0].url, "https://www.pixiv.net/artworks/1");
        assert_eq!(m.actions[1].url, "https://pixiv.cat/1.jpg");
        assert_eq!(m.actions[0].label, ORIGIN_LABEL);
    }
}
