use serde::{Deserialize, Serialize};

/// `(workKey, model, version)` unique. Kept separate from `Work` so that
/// re-embedding does not churn the Work change stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkEmbedding {
    pub work_key: String,
    pub model: String,
    pub version: u32,
    pub vector: Vec<u8>,
    pub updated_at_ms: i64,
}
