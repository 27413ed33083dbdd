use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured event value relayed from the local player or media
/// element to remote sessions.
///
/// `fields` carries the event-specific payload (position, error detail,
/// ...) and is flattened into the encoded map next to `eventType` and
/// `targetName`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    pub event_type: String,
    pub target_name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl RemoteEvent {
    pub fn new(event_type: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            target_name: target_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}
