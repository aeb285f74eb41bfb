//! Catalog-source and detail-source adapters for the two upstream
//! providers the catalog aggregation engine ingests from (spec.md §6):
//!
//! - `xtream`: an HTTP catalog API (`player_api.php?action=…`).
//! - `telegram`: a messaging-platform message export.
//!
//! Each adapter implements the capability traits defined in
//! `nx_core::provider` and is registered into a `ProviderRegistry` by
//! source-type name at startup; nothing in `nx-core` knows these adapters
//! exist.

pub mod error;
pub mod telegram;
pub mod xtream;

pub use error::ProviderClientError;
