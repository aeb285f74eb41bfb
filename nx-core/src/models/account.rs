use serde::{Deserialize, Serialize};

/// `accountKey` is the tuple `(provider, account-identity)` — mandatory on
/// every source-scoped entity (INV-13).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAccount {
    pub account_key: String,
    pub provider_type: String,
    pub endpoint: String,
    pub credentials_handle: String,
    pub capabilities: SourceCapabilities,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceCapabilities {
    pub supports_native_incremental_sync: bool,
    pub supports_catchup: bool,
}

/// `(accountKey, sourceType, sourceCategoryId)` unique. Selection here
/// drives scoped sync: unselected categories are not scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub account_key: String,
    pub source_type: String,
    pub source_category_id: String,
    pub display_name: String,
    pub parent_id: Option<String>,
    pub sort_order: i32,
    pub is_selected: bool,
}

impl Category {
    #[must_use]
    pub fn category_key(&self) -> String {
        format!("{}:{}:{}", self.account_key, self.source_type, self.source_category_id)
    }
}

/// `(workKey, categoryKey)` many-to-many edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkCategoryRef {
    pub work_key: String,
    pub category_key: String,
}
