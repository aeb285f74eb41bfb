//! Execution context passed to every `CatalogSource`/`DetailSource` call.

/// Per-call context: which account is being scanned/enriched, and a trace id
/// for correlating the resulting log lines with one sync run.
#[derive(Debug, Clone)]
pub struct ProviderContext<'a> {
    pub account_key: &'a str,
    pub trace_id: &'a str,
}

impl<'a> ProviderContext<'a> {
    #[must_use]
    pub const fn new(account_key: &'a str, trace_id: &'a str) -> Self {
        Self {
            account_key,
            trace_id,
        }
    }
}
