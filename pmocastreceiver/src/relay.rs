//! Relaying of local player events to remote sessions.

use serde_json::json;
use tracing::warn;

use pmocastproto::rpc::RpcPush;
use pmocastproto::value::{encode, ProtocolValue};
use pmocastproto::RemoteEvent;

use crate::bus::{MessageBus, Namespace};
use crate::player::PlayerEvent;

/// Maps a local event onto its wire representation. Element lifecycle
/// events target `video`; engine errors target `player`.
pub fn remote_event(event: &PlayerEvent) -> RemoteEvent {
    match event {
        PlayerEvent::LoadStart => RemoteEvent::new("loadstart", "video"),
        PlayerEvent::Loaded { content_id, duration } => {
            let mut ev = RemoteEvent::new("loadedmetadata", "video")
                .with_field("contentId", json!(content_id));
            if let Some(duration) = duration {
                ev = ev.with_field("duration", json!(duration));
            }
            ev
        }
        PlayerEvent::Playing => RemoteEvent::new("playing", "video"),
        PlayerEvent::Paused => RemoteEvent::new("pause", "video"),
        PlayerEvent::Ended => RemoteEvent::new("ended", "video"),
        PlayerEvent::Abort => RemoteEvent::new("abort", "video"),
        PlayerEvent::TimeUpdate { current_time } => {
            RemoteEvent::new("timeupdate", "video").with_field("currentTime", json!(current_time))
        }
        PlayerEvent::Error(err) => RemoteEvent::new("error", "player")
            .with_field("error", encode(&ProtocolValue::Error(err.clone()))),
    }
}

/// Broadcasts one relayed event to every connected session.
pub fn broadcast_event(bus: &dyn MessageBus, event: &PlayerEvent) {
    let remote = remote_event(event);
    let target_name = remote.target_name.clone();
    let payload = RpcPush::Event {
        target_name,
        event: encode(&ProtocolValue::Event(remote)),
    };
    match serde_json::to_value(&payload) {
        Ok(raw) => {
            if let Err(err) = bus.broadcast(Namespace::Rpc, raw) {
                warn!("Event broadcast failed: {err}");
            }
        }
        Err(err) => warn!("Event serialization failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmocastproto::{ErrorCategory, ErrorSeverity, RemoteError};

    #[test]
    fn lifecycle_events_target_the_video_element() {
        let ev = remote_event(&PlayerEvent::Ended);
        assert_eq!(ev.event_type, "ended");
        assert_eq!(ev.target_name, "video");
    }

    #[test]
    fn errors_target_the_player() {
        let err = RemoteError::new(ErrorSeverity::Critical, ErrorCategory::Media, 7);
        let ev = remote_event(&PlayerEvent::Error(err));
        assert_eq!(ev.event_type, "error");
        assert_eq!(ev.target_name, "player");
        assert!(ev.fields.contains_key("error"));
    }
}
