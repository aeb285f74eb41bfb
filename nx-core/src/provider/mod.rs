//! Provider capability seams (spec.md §4.6, §9).
//!
//! Concrete adapters (xtream-style HTTP clients, telegram-export parsers)
//! live in the `nx-providers` crate and are registered here by source-type
//! name at startup; this module only defines the trait contracts and the
//! registry that looks instances up by that name.

pub mod context;
pub mod registry;
pub mod traits;

pub use context::*;
pub use registry::*;
pub use traits::*;

/// Parse a `serde_json::Value` into a typed source config.
///
/// Shared by the `nx-providers` adapters' `TryFrom<&Value>` implementations.
pub fn parse_source_config<T: serde::de::DeserializeOwned>(
    value: &serde_json::Value,
    provider_name: &str,
) -> crate::Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| {
        crate::Error::InvalidInput(format!("failed to parse {provider_name} source config: {e}"))
    })
}
