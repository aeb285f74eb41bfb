//! Upstream provider B: a messaging-platform message export (spec.md §6).

pub mod source;
pub mod types;

pub use source::{TelegramSource, SOURCE_TYPE};
pub use types::{build_media_uri, ExportMedia, ExportMessage, ExportText, TelegramExport};
