//! End-to-end codec checks against raw JSON as a sender would emit it.

use serde_json::json;

use pmocastproto::media::{MediaRequest, MediaStatusEntry, MediaStatusMessage};
use pmocastproto::rpc::{RpcPush, RpcRequest};
use pmocastproto::{decode, encode, ProtocolValue, RemoteError, RemoteEvent};
use pmocastproto::{ErrorCategory, ErrorSeverity, MediaInformation, StreamType};

#[test]
fn full_init_envelope_parses() -> anyhow::Result<()> {
    let raw = r#"{
        "type": "init",
        "initState": {
            "player": {"configure": {"streaming": {"bufferingGoal": 30}}},
            "postLoadPlayer": {"setTextTrackVisibility": false},
            "video": {"playbackRate": 1.0, "muted": false},
            "manifest": "https://cdn.example/stream.mpd",
            "startTime": 12.5
        },
        "appData": {"userId": "u-1"}
    }"#;

    let message: RpcRequest = serde_json::from_str(raw)?;
    match message {
        RpcRequest::Init { init_state, app_data } => {
            assert_eq!(init_state.player.len(), 1);
            assert_eq!(init_state.manifest.as_deref(), Some("https://cdn.example/stream.mpd"));
            assert_eq!(init_state.start_time, Some(12.5));
            assert_eq!(app_data["userId"], "u-1");
        }
        other => anyhow::bail!("unexpected message: {other:?}"),
    }
    Ok(())
}

#[test]
fn tagged_values_survive_an_envelope_round_trip() -> anyhow::Result<()> {
    let error = RemoteError::new(ErrorSeverity::Critical, ErrorCategory::Drm, 6001)
        .with_auxiliary_data(json!({"keySystem": "com.widevine.alpha"}));
    let event = RemoteEvent::new("error", "player")
        .with_field("error", encode(&ProtocolValue::Error(error.clone())));

    let wire = serde_json::to_string(&encode(&ProtocolValue::Event(event.clone())))?;
    let parsed: serde_json::Value = serde_json::from_str(&wire)?;

    match decode(&parsed) {
        ProtocolValue::Event(back) => {
            assert_eq!(back.event_type, "error");
            let nested = back.fields.get("error").expect("nested error field");
            assert_eq!(decode(nested), ProtocolValue::Error(error));
        }
        other => anyhow::bail!("expected an event, got {other:?}"),
    }
    Ok(())
}

#[test]
fn media_status_message_matches_the_generic_sender_shape() -> anyhow::Result<()> {
    let entry = MediaStatusEntry {
        media: Some(MediaInformation {
            content_id: "https://cdn.example/stream.mpd".to_string(),
            content_type: "application/dash+xml".to_string(),
            stream_type: StreamType::Buffered,
            duration: Some(3600.0),
        }),
        player_state: "PLAYING".to_string(),
        current_time: 42.0,
        playback_rate: 1.0,
        paused: false,
        muted: false,
        volume: 0.8,
        supported_media_commands: 15,
    };
    let raw = serde_json::to_value(MediaStatusMessage::new(3, vec![entry]))?;

    assert_eq!(raw["type"], "MEDIA_STATUS");
    assert_eq!(raw["requestId"], 3);
    assert_eq!(raw["status"][0]["playerState"], "PLAYING");
    assert_eq!(raw["status"][0]["media"]["streamType"], "BUFFERED");
    assert_eq!(raw["status"][0]["supportedMediaCommands"], 15);
    Ok(())
}

#[test]
fn generic_request_parsing_tolerates_extra_fields() {
    let raw = json!({
        "type": "PAUSE",
        "requestId": 7,
        "mediaSessionId": 1,
        "customData": {"origin": "phone"},
    });
    let request = MediaRequest::parse(&raw).expect("valid envelope");
    assert_eq!(request.request_id, 7);
}

#[test]
fn async_complete_wire_shape_is_stable() -> anyhow::Result<()> {
    let push = RpcPush::AsyncComplete {
        id: json!({"seq": 4}),
        error: encode(&ProtocolValue::Error(RemoteError::new(
            ErrorSeverity::Recoverable,
            ErrorCategory::Media,
            1001,
        ))),
    };
    let raw = serde_json::to_value(&push)?;
    assert_eq!(raw["type"], "asyncComplete");
    assert_eq!(raw["id"], json!({"seq": 4}));
    assert_eq!(raw["error"]["type"], "ERROR");
    assert_eq!(raw["error"]["code"], 1001);
    Ok(())
}
