//! Seam to the transport/session-manager collaborator.

use serde_json::Value;

use crate::errors::BusError;

/// Opaque identifier of a connected remote session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical sub-channel of the message bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The structured RPC protocol (init/set/call/...).
    Rpc,
    /// The generic media-control vocabulary (PLAY/PAUSE/LOAD/...).
    Media,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Rpc => "urn:x-cast:pmo.cast.rpc",
            Namespace::Media => "urn:x-cast:pmo.cast.media",
        }
    }
}

/// Outbound half of the transport. Send failures are the transport's
/// responsibility; the bridge logs them and moves on.
pub trait MessageBus: Send + Sync {
    /// Sends to every currently connected session.
    fn broadcast(&self, namespace: Namespace, payload: Value) -> Result<(), BusError>;

    /// Sends to one specific session's private channel.
    fn send(&self, session: &SessionId, namespace: Namespace, payload: Value)
        -> Result<(), BusError>;
}

/// Input to the bridge worker: transport notices plus shutdown.
#[derive(Debug)]
pub enum BridgeCommand {
    /// One or more sessions joined.
    SessionsConnected(Vec<SessionId>),
    /// One session left.
    SessionDisconnected(SessionId),
    /// An inbound envelope from one session.
    Message {
        sender: SessionId,
        namespace: Namespace,
        payload: Value,
    },
    /// Begin scoped teardown.
    Shutdown,
}
