//! Envelopes for the RPC namespace.
//!
//! Inbound messages drive the receiver-side player; outbound messages
//! keep the remote sessions' view of playback state in sync. The
//! `asyncComplete` reply is the only private (non-broadcast) message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound RPC message, tagged by its `type` field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RpcRequest {
    Init {
        init_state: InitState,
        #[serde(default)]
        app_data: Value,
    },
    AppData {
        app_data: Value,
    },
    Set {
        target_name: String,
        property: String,
        value: Value,
    },
    Call {
        target_name: String,
        method_name: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    AsyncCall {
        /// Caller-supplied correlation id, treated as opaque and echoed
        /// back verbatim in the `asyncComplete` reply.
        id: Value,
        target_name: String,
        method_name: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

/// Nested configuration carried by an `init` message.
///
/// `player` is applied synchronously while the message is being
/// handled; `post_load_player` and `video` are applied asynchronously
/// afterwards. Each player section maps a method name onto its single
/// argument; the `video` section maps element property names onto
/// values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitState {
    #[serde(default)]
    pub player: BTreeMap<String, Value>,
    #[serde(default)]
    pub post_load_player: BTreeMap<String, Value>,
    #[serde(default)]
    pub video: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
}

/// Outbound RPC message.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RpcPush {
    /// Periodic state snapshot, broadcast to every session.
    Update { update: Value },
    /// Relayed local event, broadcast to every session.
    Event { target_name: String, event: Value },
    /// Settlement of an `asyncCall`, sent only to the originating
    /// session. `error` is null on success.
    AsyncComplete { id: Value, error: Value },
}
