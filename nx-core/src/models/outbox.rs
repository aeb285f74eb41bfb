use serde_json::Value as JsonValue;

/// A queued event awaiting delivery to an external (cloud) transport; that
/// transport is out of scope here — this entity only models the queue.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CloudOutboxEvent {
    pub id: i64,
    pub kind: String,
    pub payload: JsonValue,
    pub created_at_ms: i64,
    pub attempts: u32,
}
