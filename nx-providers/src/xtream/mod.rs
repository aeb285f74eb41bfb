//! Upstream provider A: an xtream-style HTTP catalog API (spec.md §6).

pub mod client;
pub mod source;
pub mod types;

pub use client::{redact_url, XtreamClient, XtreamConnection};
pub use source::{XtreamCredentialsResolver, XtreamSource, SOURCE_TYPE};
