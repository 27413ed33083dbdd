//! Envelopes for the generic media-control namespace.
//!
//! These are the standardized remote-control commands (uppercase
//! `type` strings) any generic sender can issue without knowing the
//! RPC vocabulary. Requests are parsed in two steps so that an
//! unrecognized command still yields its `requestId` for the
//! `INVALID_REQUEST` reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the content is delivered, as reported in media information.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamType {
    Buffered,
    Live,
    #[default]
    None,
}

/// Description of a piece of content, both in LOAD requests and in
/// MEDIA_STATUS pushes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInformation {
    pub content_id: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub stream_type: StreamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Whether playback should run after a SEEK lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResumeState {
    PlaybackStart,
    PlaybackPause,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRequest {
    #[serde(default)]
    pub level: Option<f64>,
    #[serde(default)]
    pub muted: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeekPayload {
    #[serde(default)]
    current_time: Option<f64>,
    #[serde(default)]
    resume_state: Option<ResumeState>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadPayload {
    media: MediaInformation,
    #[serde(default)]
    current_time: Option<f64>,
    #[serde(default)]
    autoplay: Option<bool>,
}

/// A parsed generic request: correlation id plus command.
#[derive(Clone, Debug)]
pub struct MediaRequest {
    pub request_id: i64,
    pub command: MediaCommand,
}

#[derive(Clone, Debug)]
pub enum MediaCommand {
    GetStatus,
    Play,
    Pause,
    Seek {
        current_time: Option<f64>,
        resume_state: Option<ResumeState>,
    },
    Stop,
    Volume {
        level: Option<f64>,
        muted: Option<bool>,
    },
    Load {
        media: MediaInformation,
        current_time: Option<f64>,
        autoplay: bool,
    },
    /// Recognized envelope, unsupported command type.
    Unknown(String),
}

impl MediaRequest {
    /// Parses a raw envelope. Returns `None` when the payload has no
    /// string `type` field at all (a protocol error, not a command
    /// error).
    pub fn parse(raw: &Value) -> Option<Self> {
        let kind = raw.get("type")?.as_str()?.to_string();
        let request_id = raw.get("requestId").and_then(Value::as_i64).unwrap_or(0);
        let command = match kind.as_str() {
            "GET_STATUS" => MediaCommand::GetStatus,
            "PLAY" => MediaCommand::Play,
            "PAUSE" => MediaCommand::Pause,
            "STOP" => MediaCommand::Stop,
            "SEEK" => {
                let payload: SeekPayload =
                    serde_json::from_value(raw.clone()).unwrap_or(SeekPayload {
                        current_time: None,
                        resume_state: None,
                    });
                MediaCommand::Seek {
                    current_time: payload.current_time,
                    resume_state: payload.resume_state,
                }
            }
            "VOLUME" => {
                let volume: VolumeRequest = raw
                    .get("volume")
                    .cloned()
                    .and_then(|v| serde_json::from_value(v).ok())
                    .unwrap_or_default();
                MediaCommand::Volume {
                    level: volume.level,
                    muted: volume.muted,
                }
            }
            "LOAD" => match serde_json::from_value::<LoadPayload>(raw.clone()) {
                Ok(payload) => MediaCommand::Load {
                    media: payload.media,
                    current_time: payload.current_time,
                    autoplay: payload.autoplay.unwrap_or(true),
                },
                Err(_) => MediaCommand::Unknown(kind.clone()),
            },
            _ => MediaCommand::Unknown(kind.clone()),
        };
        Some(Self { request_id, command })
    }
}

/// One entry of a MEDIA_STATUS push.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStatusEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInformation>,
    pub player_state: String,
    pub current_time: f64,
    pub playback_rate: f64,
    pub paused: bool,
    pub muted: bool,
    pub volume: f64,
    pub supported_media_commands: u32,
}

/// Outbound MEDIA_STATUS broadcast. `request_id` is 0 for unsolicited
/// pushes.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStatusMessage {
    pub request_id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: Vec<MediaStatusEntry>,
}

impl MediaStatusMessage {
    pub fn new(request_id: i64, status: Vec<MediaStatusEntry>) -> Self {
        Self {
            request_id,
            kind: "MEDIA_STATUS",
            status,
        }
    }
}

/// Outbound INVALID_REQUEST broadcast.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRequestMessage {
    pub request_id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub reason: &'static str,
}

impl InvalidRequestMessage {
    pub fn invalid_command(request_id: i64) -> Self {
        Self {
            request_id,
            kind: "INVALID_REQUEST",
            reason: "INVALID_COMMAND",
        }
    }
}
