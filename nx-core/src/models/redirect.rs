use serde::{Deserialize, Serialize};

/// Records a canonical merge: `obsolete_work_key` is superseded by
/// `target_work_key`. Resolved transitively by the entity store, capped at
/// `crate::key::redirect_hop_cap()` hops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRedirect {
    pub obsolete_work_key: String,
    pub target_work_key: String,
    pub created_at_ms: i64,
}
