//! `CatalogSource`/`UrlBuilder` adapter for upstream provider B, a
//! messaging-platform message export (spec.md §4.6, §6). The export is a
//! JSON blob addressed by `SourceAccount.endpoint` (a filesystem path, not
//! a URL — this provider has no live API to poll); `scan` parses it fresh
//! on every call, there being no incremental export format to speak of.

use async_trait::async_trait;
use futures::stream;

use nx_core::models::{ExternalIds, PlaybackHints, RawRecord, RawRecordCommon, WorkSourceRef};
use nx_core::models::source_ref::PlaybackMethod;
use nx_core::provider::{CatalogSource, ProviderContext, RawRecordStream, UrlBuilder};
use nx_core::repository::SourceAccountRepository;
use nx_core::Result;

use super::types::{build_media_uri, TelegramExport};

pub const SOURCE_TYPE: &str = "tg";

pub struct TelegramSource {
    accounts: SourceAccountRepository,
}

impl TelegramSource {
    #[must_use]
    pub fn new(accounts: SourceAccountRepository) -> Self {
        Self { accounts }
    }

    fn source_id(chat_id: i64, message_id: i64) -> String {
        format!("{chat_id}:{message_id}")
    }
}

#[async_trait]
impl CatalogSource for TelegramSource {
    fn name(&self) -> &'static str {
        SOURCE_TYPE
    }

    /// No season/series structure exists in a message export, so every
    /// media message is ingested on the `vod` phase; `live`/`series`/
    /// `episode` phases simply yield nothing for this provider.
    async fn scan(
        &self,
        ctx: &ProviderContext<'_>,
        content_type: &str,
        _since_ms: Option<i64>,
    ) -> Result<RawRecordStream> {
        if content_type != "vod" {
            return Ok(Box::pin(stream::iter(Vec::new())));
        }

        let account = self
            .accounts
            .get(ctx.account_key)
            .await?
            .ok_or_else(|| nx_core::Error::NotFound(format!("source account {}", ctx.account_key)))?;

        let bytes = tokio::fs::read(&account.endpoint)
            .await
            .map_err(|e| nx_core::Error::InvalidInput(format!("reading export {}: {e}", account.endpoint)))?;
        let export: TelegramExport = serde_json::from_slice(&bytes)?;
        let account_key = ctx.account_key.to_string();

        let records: Vec<Result<RawRecord>> = export
            .messages
            .into_iter()
            .filter_map(|msg| {
                let media = msg.media()?;
                if !media.has_retrievable_handle() {
                    return None;
                }
                let url_hint = build_media_uri(export.chat_id, msg.message_id, media)?;
                let title = msg.resolved_title();
                let common = RawRecordCommon {
                    original_title: title,
                    year: None,
                    duration_ms: media.duration_secs.map(|s| s * 1000),
                    external_ids: ExternalIds::default(),
                    source_type: SOURCE_TYPE.to_string(),
                    account_key: account_key.clone(),
                    source_id: Self::source_id(export.chat_id, msg.message_id),
                    added_at_ms: media.date_ms,
                    playback_hints: PlaybackHints {
                        method: PlaybackMethod::Direct,
                        url_hint,
                        container: None,
                        codec: None,
                        bitrate: None,
                        language: "und".to_string(),
                        quality: "sd".to_string(),
                    },
                };
                Some(Ok(RawRecord::Vod(common)))
            })
            .collect();

        Ok(Box::pin(stream::iter(records)))
    }
}

impl UrlBuilder for TelegramSource {
    fn name(&self) -> &'static str {
        SOURCE_TYPE
    }

    /// `remoteId`/`fileId` are not part of the persisted `WorkSourceRef` —
    /// only `provider_item_id` (`<chatId>:<messageId>`) survives — so this
    /// path cannot reconstruct a URI that satisfies spec.md §6's "at least
    /// one of `fileId>0` or non-empty `remoteId`" invariant. Rather than
    /// fabricate an always-invalid `file/0` URI, this errors; the
    /// authoritative URI is the one already captured in the `WorkVariant`
    /// at ingest time, which callers should use instead.
    fn build_url(&self, source_ref: &WorkSourceRef, _quality_tag: &str) -> Result<String> {
        let _ = source_ref
            .provider_item_id
            .split_once(':')
            .ok_or_else(|| nx_core::Error::ParseError("malformed tg provider_item_id".to_string()))?;
        Err(nx_core::Error::NotFound(format!(
            "tg source {} has no reconstructable file handle; use the ingested WorkVariant url_hint",
            source_ref.source_key
        )))
    }
}
