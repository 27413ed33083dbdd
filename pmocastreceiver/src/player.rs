//! Collaborator seams for the local playback engine.
//!
//! The bridge never owns the player or the media element; it drives
//! them through these traits and observes them through an event
//! subscription handed out by [`Player::subscribe`]. Remote-supplied
//! method and property names are resolved against the explicit
//! capability tables below ([`PlayerCall`], [`PlayerAsyncCall`],
//! [`PlayerGetter`], [`LiveGetter`], [`VideoProperty`]); a name outside
//! the tables is rejected at resolution time, never reflected over.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use pmocastproto::{RemoteError, StreamType};

use crate::errors::{DispatchError, PlayerError};

/// High-level playback state, mirrored into status pushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Buffering,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "IDLE",
            PlaybackState::Buffering => "BUFFERING",
            PlaybackState::Playing => "PLAYING",
            PlaybackState::Paused => "PAUSED",
        }
    }
}

/// Parameters of a deferred load.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    pub content_id: String,
    pub start_time: Option<f64>,
}

/// Lifecycle and error events emitted by the playback engine.
#[derive(Clone, Debug)]
pub enum PlayerEvent {
    LoadStart,
    Loaded {
        content_id: String,
        duration: Option<f64>,
    },
    Playing,
    Paused,
    Ended,
    /// Content is being unloaded.
    Abort,
    TimeUpdate {
        current_time: f64,
    },
    Error(RemoteError),
}

/// Subscription handle for player events.
///
/// Dropping the handle detaches the listener; the bridge drops it
/// during teardown so no events are observed afterwards.
///
/// ```
/// use tokio::sync::mpsc;
/// use pmocastreceiver::player::{EventSubscription, PlayerEvent};
///
/// # tokio_test::block_on(async {
/// let (tx, rx) = mpsc::unbounded_channel();
/// let mut events = EventSubscription::new(rx);
/// tx.send(PlayerEvent::Playing).unwrap();
/// assert!(matches!(events.recv().await, Some(PlayerEvent::Playing)));
/// # });
/// ```
pub struct EventSubscription {
    receiver: mpsc::UnboundedReceiver<PlayerEvent>,
}

impl EventSubscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<PlayerEvent>) -> Self {
        Self { receiver }
    }

    pub async fn recv(&mut self) -> Option<PlayerEvent> {
        self.receiver.recv().await
    }
}

/// The local playback engine.
///
/// Synchronous methods either succeed immediately or fail with a
/// [`PlayerError`]; `load` and `preload` are deferred results that
/// settle exactly once.
#[async_trait]
pub trait Player: Send + Sync {
    fn play(&self) -> Result<(), PlayerError>;
    fn pause(&self) -> Result<(), PlayerError>;
    fn seek(&self, seconds: f64) -> Result<(), PlayerError>;
    fn unload(&self) -> Result<(), PlayerError>;
    fn set_playback_rate(&self, rate: f64) -> Result<(), PlayerError>;
    fn set_text_track_visibility(&self, visible: bool) -> Result<(), PlayerError>;
    fn configure(&self, settings: Value) -> Result<(), PlayerError>;

    fn state(&self) -> PlaybackState;
    fn content_id(&self) -> Option<String>;
    fn content_type(&self) -> Option<String>;
    fn stream_type(&self) -> StreamType;
    fn duration(&self) -> Option<f64>;

    /// Valid only while the loaded content is a live stream.
    fn seekable_range(&self) -> Option<(f64, f64)>;
    /// Valid only while the loaded content is a live stream.
    fn program_time(&self) -> Option<DateTime<Utc>>;

    async fn load(&self, request: LoadRequest) -> Result<(), PlayerError>;
    async fn preload(&self, content_id: String) -> Result<(), PlayerError>;

    fn subscribe(&self) -> EventSubscription;
    async fn teardown(&self);
}

/// The media element under the player: a property bag with a few
/// read-only attributes.
pub trait MediaElement: Send + Sync {
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    fn duration(&self) -> f64;
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;
    fn seeking(&self) -> bool;
    fn volume(&self) -> f64;
    fn set_volume(&self, level: f64);
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    fn autoplay(&self) -> bool;
    fn set_autoplay(&self, autoplay: bool);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
}

/// Platform system-volume API. Remote writes to the media element's
/// `volume`/`muted` are redirected here.
pub trait SystemVolume: Send + Sync {
    fn set_level(&self, level: f64);
    fn set_muted(&self, muted: bool);
}

/// Message target addressed by `targetName`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetName {
    Video,
    Player,
}

impl TargetName {
    pub fn from_name(name: &str) -> Result<Self, DispatchError> {
        match name {
            "video" => Ok(TargetName::Video),
            "player" => Ok(TargetName::Player),
            other => Err(DispatchError::UnknownTarget(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetName::Video => "video",
            TargetName::Player => "player",
        }
    }
}

fn arg_f64(name: &str, args: &[Value], index: usize) -> Result<f64, DispatchError> {
    args.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| DispatchError::BadArguments(name.to_string(), format!("argument {index} must be a number")))
}

fn arg_bool(name: &str, args: &[Value], index: usize) -> Result<bool, DispatchError> {
    args.get(index)
        .and_then(Value::as_bool)
        .ok_or_else(|| DispatchError::BadArguments(name.to_string(), format!("argument {index} must be a boolean")))
}

fn arg_str(name: &str, args: &[Value], index: usize) -> Result<String, DispatchError> {
    args.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DispatchError::BadArguments(name.to_string(), format!("argument {index} must be a string")))
}

/// Void-returning player methods, with their arguments already parsed.
#[derive(Clone, Debug)]
pub enum PlayerCall {
    Play,
    Pause,
    Seek(f64),
    Unload,
    SetPlaybackRate(f64),
    SetTextTrackVisibility(bool),
    Configure(Value),
}

impl PlayerCall {
    pub fn resolve(name: &str, args: &[Value]) -> Result<Self, DispatchError> {
        match name {
            "play" => Ok(PlayerCall::Play),
            "pause" => Ok(PlayerCall::Pause),
            "seek" => Ok(PlayerCall::Seek(arg_f64(name, args, 0)?)),
            "unload" => Ok(PlayerCall::Unload),
            "setPlaybackRate" => Ok(PlayerCall::SetPlaybackRate(arg_f64(name, args, 0)?)),
            "setTextTrackVisibility" => {
                Ok(PlayerCall::SetTextTrackVisibility(arg_bool(name, args, 0)?))
            }
            "configure" => Ok(PlayerCall::Configure(
                args.first().cloned().unwrap_or(Value::Null),
            )),
            other => Err(DispatchError::UnsupportedMethod(other.to_string(), "player")),
        }
    }

    pub fn apply(&self, player: &dyn Player) -> Result<(), PlayerError> {
        match self {
            PlayerCall::Play => player.play(),
            PlayerCall::Pause => player.pause(),
            PlayerCall::Seek(seconds) => player.seek(*seconds),
            PlayerCall::Unload => player.unload(),
            PlayerCall::SetPlaybackRate(rate) => player.set_playback_rate(*rate),
            PlayerCall::SetTextTrackVisibility(visible) => {
                player.set_text_track_visibility(*visible)
            }
            PlayerCall::Configure(settings) => player.configure(settings.clone()),
        }
    }
}

/// Deferred-result player methods.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerAsyncCall {
    Load(LoadRequest),
    Preload(String),
}

impl PlayerAsyncCall {
    pub fn resolve(name: &str, args: &[Value]) -> Result<Self, DispatchError> {
        match name {
            "load" => Ok(PlayerAsyncCall::Load(LoadRequest {
                content_id: arg_str(name, args, 0)?,
                start_time: args.get(1).and_then(Value::as_f64),
            })),
            "preload" => Ok(PlayerAsyncCall::Preload(arg_str(name, args, 0)?)),
            other => Err(DispatchError::UnsupportedMethod(other.to_string(), "player")),
        }
    }

    pub async fn apply(self, player: &dyn Player) -> Result<(), PlayerError> {
        match self {
            PlayerAsyncCall::Load(request) => player.load(request).await,
            PlayerAsyncCall::Preload(content_id) => player.preload(content_id).await,
        }
    }
}

/// Always-available player state accessors.
#[derive(Clone, Copy, Debug)]
pub enum PlayerGetter {
    State,
    ContentId,
    ContentType,
    StreamType,
    Duration,
}

impl PlayerGetter {
    pub const ALL: [PlayerGetter; 5] = [
        PlayerGetter::State,
        PlayerGetter::ContentId,
        PlayerGetter::ContentType,
        PlayerGetter::StreamType,
        PlayerGetter::Duration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlayerGetter::State => "state",
            PlayerGetter::ContentId => "contentId",
            PlayerGetter::ContentType => "contentType",
            PlayerGetter::StreamType => "streamType",
            PlayerGetter::Duration => "duration",
        }
    }

    pub fn read(&self, player: &dyn Player) -> Value {
        match self {
            PlayerGetter::State => Value::String(player.state().as_str().to_string()),
            PlayerGetter::ContentId => json_opt_string(player.content_id()),
            PlayerGetter::ContentType => json_opt_string(player.content_type()),
            PlayerGetter::StreamType => {
                serde_json::to_value(player.stream_type()).unwrap_or(Value::Null)
            }
            PlayerGetter::Duration => json_opt_f64(player.duration()),
        }
    }
}

/// Player state accessors valid only for live streams.
#[derive(Clone, Copy, Debug)]
pub enum LiveGetter {
    SeekableRangeStart,
    SeekableRangeEnd,
    ProgramTime,
}

impl LiveGetter {
    pub const ALL: [LiveGetter; 3] = [
        LiveGetter::SeekableRangeStart,
        LiveGetter::SeekableRangeEnd,
        LiveGetter::ProgramTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LiveGetter::SeekableRangeStart => "seekableRangeStart",
            LiveGetter::SeekableRangeEnd => "seekableRangeEnd",
            LiveGetter::ProgramTime => "programTime",
        }
    }

    pub fn read(&self, player: &dyn Player) -> Value {
        match self {
            LiveGetter::SeekableRangeStart => {
                json_opt_f64(player.seekable_range().map(|(start, _)| start))
            }
            LiveGetter::SeekableRangeEnd => {
                json_opt_f64(player.seekable_range().map(|(_, end)| end))
            }
            LiveGetter::ProgramTime => player
                .program_time()
                .map(|ts| Value::from(ts.timestamp_millis()))
                .unwrap_or(Value::Null),
        }
    }
}

/// Media-element properties addressable over the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoProperty {
    CurrentTime,
    Duration,
    Paused,
    Ended,
    Seeking,
    Volume,
    Muted,
    Autoplay,
    PlaybackRate,
}

impl VideoProperty {
    /// Properties included in the `video` namespace of a snapshot.
    pub const READABLE: [VideoProperty; 9] = [
        VideoProperty::CurrentTime,
        VideoProperty::Duration,
        VideoProperty::Paused,
        VideoProperty::Ended,
        VideoProperty::Seeking,
        VideoProperty::Volume,
        VideoProperty::Muted,
        VideoProperty::Autoplay,
        VideoProperty::PlaybackRate,
    ];

    pub fn from_name(name: &str) -> Result<Self, DispatchError> {
        match name {
            "currentTime" => Ok(VideoProperty::CurrentTime),
            "duration" => Ok(VideoProperty::Duration),
            "paused" => Ok(VideoProperty::Paused),
            "ended" => Ok(VideoProperty::Ended),
            "seeking" => Ok(VideoProperty::Seeking),
            "volume" => Ok(VideoProperty::Volume),
            "muted" => Ok(VideoProperty::Muted),
            "autoplay" => Ok(VideoProperty::Autoplay),
            "playbackRate" => Ok(VideoProperty::PlaybackRate),
            other => Err(DispatchError::UnsupportedProperty(other.to_string(), "video")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VideoProperty::CurrentTime => "currentTime",
            VideoProperty::Duration => "duration",
            VideoProperty::Paused => "paused",
            VideoProperty::Ended => "ended",
            VideoProperty::Seeking => "seeking",
            VideoProperty::Volume => "volume",
            VideoProperty::Muted => "muted",
            VideoProperty::Autoplay => "autoplay",
            VideoProperty::PlaybackRate => "playbackRate",
        }
    }

    pub fn read(&self, element: &dyn MediaElement) -> Value {
        match self {
            VideoProperty::CurrentTime => json_f64(element.current_time()),
            VideoProperty::Duration => json_f64(element.duration()),
            VideoProperty::Paused => Value::Bool(element.paused()),
            VideoProperty::Ended => Value::Bool(element.ended()),
            VideoProperty::Seeking => Value::Bool(element.seeking()),
            VideoProperty::Volume => json_f64(element.volume()),
            VideoProperty::Muted => Value::Bool(element.muted()),
            VideoProperty::Autoplay => Value::Bool(element.autoplay()),
            VideoProperty::PlaybackRate => json_f64(element.playback_rate()),
        }
    }

    pub fn write(&self, element: &dyn MediaElement, value: &Value) -> Result<(), DispatchError> {
        let name = self.name();
        match self {
            VideoProperty::CurrentTime => {
                element.set_current_time(value_f64(name, value)?);
            }
            VideoProperty::Volume => element.set_volume(value_f64(name, value)?),
            VideoProperty::Muted => element.set_muted(value_bool(name, value)?),
            VideoProperty::Autoplay => element.set_autoplay(value_bool(name, value)?),
            VideoProperty::PlaybackRate => element.set_playback_rate(value_f64(name, value)?),
            VideoProperty::Duration | VideoProperty::Paused | VideoProperty::Ended
            | VideoProperty::Seeking => {
                return Err(DispatchError::UnsupportedProperty(name.to_string(), "video"));
            }
        }
        Ok(())
    }
}

fn value_f64(name: &str, value: &Value) -> Result<f64, DispatchError> {
    value
        .as_f64()
        .ok_or_else(|| DispatchError::BadArguments(name.to_string(), "expected a number".into()))
}

fn value_bool(name: &str, value: &Value) -> Result<bool, DispatchError> {
    value
        .as_bool()
        .ok_or_else(|| DispatchError::BadArguments(name.to_string(), "expected a boolean".into()))
}

fn json_f64(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn json_opt_f64(value: Option<f64>) -> Value {
    value.map(json_f64).unwrap_or(Value::Null)
}

fn json_opt_string(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}
