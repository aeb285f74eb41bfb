//! Wire types for upstream provider B, a messaging-platform export (spec.md
//! §6): a JSON blob with a `chatId` and ordered `messages[]`, each message
//! carrying at most one of `ExportText` / `ExportVideo` / `ExportOtherRaw`.
//! Raw media metadata is passed through unmodified into the pipeline; this
//! module owns no cleaning logic beyond deserialization.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramExport {
    #[serde(rename = "chatId")]
    pub chat_id: i64,
    pub messages: Vec<ExportMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportMessage {
    #[serde(rename = "messageId")]
    pub message_id: i64,
    #[serde(rename = "ExportText", default)]
    pub export_text: Option<ExportText>,
    #[serde(rename = "ExportVideo", default)]
    pub export_video: Option<ExportMedia>,
    #[serde(rename = "ExportOtherRaw", default)]
    pub export_other_raw: Option<ExportMedia>,
}

impl ExportMessage {
    /// The media payload for this message, if any — `ExportVideo` takes
    /// priority over `ExportOtherRaw` when (incorrectly) both are present.
    #[must_use]
    pub fn media(&self) -> Option<&ExportMedia> {
        self.export_video.as_ref().or(self.export_other_raw.as_ref())
    }

    /// Title selection at the ingest boundary (spec.md §6):
    /// `title > episodeTitle > caption > fileName > "Untitled Media <messageId>"`.
    #[must_use]
    pub fn resolved_title(&self) -> String {
        let media = self.media();
        media
            .and_then(|m| m.title.clone())
            .filter(|s| !s.is_empty())
            .or_else(|| media.and_then(|m| m.episode_title.clone()).filter(|s| !s.is_empty()))
            .or_else(|| {
                media
                    .and_then(|m| m.caption.clone())
                    .or_else(|| self.export_text.as_ref().and_then(|t| t.caption.clone()))
                    .filter(|s| !s.is_empty())
            })
            .or_else(|| media.and_then(|m| m.file_name.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| format!("Untitled Media {}", self.message_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportText {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportMedia {
    #[serde(rename = "fileId", default)]
    pub file_id: Option<i64>,
    #[serde(rename = "remoteId", default)]
    pub remote_id: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "episodeTitle", default)]
    pub episode_title: Option<String>,
    #[serde(rename = "durationSecs", default)]
    pub duration_secs: Option<i64>,
    #[serde(rename = "dateMs", default)]
    pub date_ms: Option<i64>,
}

impl ExportMedia {
    /// The validity rule from spec.md §6: a usable URI needs at least one
    /// of `fileId>0` or a non-empty `remoteId`.
    #[must_use]
    pub fn has_retrievable_handle(&self) -> bool {
        self.file_id.is_some_and(|id| id > 0) || self.remote_id.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Builds the `tg://file/<fileId>?chatId=<c>&messageId=<m>[&remoteId=…][&mimeType=…]`
/// URI (spec.md §6). Returns `None` if the validity rule isn't met.
#[must_use]
pub fn build_media_uri(chat_id: i64, message_id: i64, media: &ExportMedia) -> Option<String> {
    if !media.has_retrievable_handle() {
        return None;
    }
    let file_id = media.file_id.unwrap_or(0);
    let mut uri = format!("tg://file/{file_id}?chatId={chat_id}&messageId={message_id}");
    if let Some(remote_id) = media.remote_id.as_deref().filter(|s| !s.is_empty()) {
        uri.push_str("&remoteId=");
        uri.push_str(remote_id);
    }
    if let Some(mime_type) = media.mime_type.as_deref().filter(|s| !s.is_empty()) {
        uri.push_str("&mimeType=");
        uri.push_str(mime_type);
    }
    Some(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_falls_back_through_tiers() {
        let msg = ExportMessage {
            message_id: 42,
            export_text: None,
            export_video: Some(ExportMedia {
                file_name: Some("ep01.mp4".to_string()),
                ..Default::default()
            }),
            export_other_raw: None,
        };
        assert_eq!(msg.resolved_title(), "ep01.mp4");
    }

    #[test]
    fn title_falls_back_to_untitled_when_nothing_usable() {
        let msg = ExportMessage {
            message_id: 7,
            export_text: None,
            export_video: Some(ExportMedia::default()),
            export_other_raw: None,
        };
        assert_eq!(msg.resolved_title(), "Untitled Media 7");
    }

    #[test]
    fn uri_requires_retrievable_handle() {
        let media = ExportMedia::default();
        assert_eq!(build_media_uri(1, 2, &media), None);

        let media = ExportMedia {
            remote_id: Some("abc".to_string()),
            mime_type: Some("video/mp4".to_string()),
            ..Default::default()
        };
        let uri = build_media_uri(1, 2, &media).unwrap();
        assert_eq!(uri, "tg://file/0?chatId=1&messageId=2&remoteId=abc&mimeType=video/mp4");
    }
}
