//! Runs the bridge against in-memory stand-ins and prints every
//! outbound message, useful for eyeballing the wire traffic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use pmocastproto::StreamType;
use pmocastreceiver::errors::{BusError, PlayerError};
use pmocastreceiver::player::{
    EventSubscription, LoadRequest, MediaElement, PlaybackState, Player, PlayerEvent, SystemVolume,
};
use pmocastreceiver::{BridgeCommand, BridgeConfig, CastBridge, MessageBus, Namespace, SessionId, Targets};

struct StubPlayer {
    state: Mutex<PlaybackState>,
    content_id: Mutex<Option<String>>,
    events: Mutex<Option<mpsc::UnboundedSender<PlayerEvent>>>,
}

impl StubPlayer {
    fn new() -> Self {
        Self {
            state: Mutex::new(PlaybackState::Idle),
            content_id: Mutex::new(None),
            events: Mutex::new(None),
        }
    }

    fn emit(&self, event: PlayerEvent) {
        if let Some(tx) = self.events.lock().as_ref() {
            let _ = tx.send(event);
        }
    }
}

#[async_trait]
impl Player for StubPlayer {
    fn play(&self) -> Result<(), PlayerError> {
        *self.state.lock() = PlaybackState::Playing;
        self.emit(PlayerEvent::Playing);
        Ok(())
    }
    fn pause(&self) -> Result<(), PlayerError> {
        *self.state.lock() = PlaybackState::Paused;
        self.emit(PlayerEvent::Paused);
        Ok(())
    }
    fn seek(&self, _seconds: f64) -> Result<(), PlayerError> {
        Ok(())
    }
    fn unload(&self) -> Result<(), PlayerError> {
        *self.state.lock() = PlaybackState::Idle;
        *self.content_id.lock() = None;
        self.emit(PlayerEvent::Abort);
        Ok(())
    }
    fn set_playback_rate(&self, _rate: f64) -> Result<(), PlayerError> {
        Ok(())
    }
    fn set_text_track_visibility(&self, _visible: bool) -> Result<(), PlayerError> {
        Ok(())
    }
    fn configure(&self, _settings: Value) -> Result<(), PlayerError> {
        Ok(())
    }
    fn state(&self) -> PlaybackState {
        *self.state.lock()
    }
    fn content_id(&self) -> Option<String> {
        self.content_id.lock().clone()
    }
    fn content_type(&self) -> Option<String> {
        self.content_id.lock().as_ref().map(|_| "video/mp4".to_string())
    }
    fn stream_type(&self) -> StreamType {
        if self.content_id.lock().is_some() {
            StreamType::Buffered
        } else {
            StreamType::None
        }
    }
    fn duration(&self) -> Option<f64> {
        self.content_id.lock().as_ref().map(|_| 60.0)
    }
    fn seekable_range(&self) -> Option<(f64, f64)> {
        None
    }
    fn program_time(&self) -> Option<DateTime<Utc>> {
        None
    }
    async fn load(&self, request: LoadRequest) -> Result<(), PlayerError> {
        self.emit(PlayerEvent::LoadStart);
        *self.content_id.lock() = Some(request.content_id.clone());
        *self.state.lock() = PlaybackState::Paused;
        self.emit(PlayerEvent::Loaded {
            content_id: request.content_id,
            duration: Some(60.0),
        });
        Ok(())
    }
    async fn preload(&self, _content_id: String) -> Result<(), PlayerError> {
        Ok(())
    }
    fn subscribe(&self) -> EventSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock() = Some(tx);
        EventSubscription::new(rx)
    }
    async fn teardown(&self) {}
}

struct StubElement {
    volume: Mutex<f64>,
    muted: Mutex<bool>,
    rate: Mutex<f64>,
}

impl StubElement {
    fn new() -> Self {
        Self {
            volume: Mutex::new(1.0),
            muted: Mutex::new(false),
            rate: Mutex::new(1.0),
        }
    }
}

impl MediaElement for StubElement {
    fn current_time(&self) -> f64 {
        0.0
    }
    fn set_current_time(&self, _seconds: f64) {}
    fn duration(&self) -> f64 {
        60.0
    }
    fn paused(&self) -> bool {
        true
    }
    fn ended(&self) -> bool {
        false
    }
    fn seeking(&self) -> bool {
        false
    }
    fn volume(&self) -> f64 {
        *self.volume.lock()
    }
    fn set_volume(&self, level: f64) {
        *self.volume.lock() = level;
    }
    fn muted(&self) -> bool {
        *self.muted.lock()
    }
    fn set_muted(&self, muted: bool) {
        *self.muted.lock() = muted;
    }
    fn autoplay(&self) -> bool {
        true
    }
    fn set_autoplay(&self, _autoplay: bool) {}
    fn playback_rate(&self) -> f64 {
        *self.rate.lock()
    }
    fn set_playback_rate(&self, rate: f64) {
        *self.rate.lock() = rate;
    }
}

struct StubVolume;

impl SystemVolume for StubVolume {
    fn set_level(&self, level: f64) {
        println!("[system] volume level -> {level}");
    }
    fn set_muted(&self, muted: bool) {
        println!("[system] muted -> {muted}");
    }
}

struct PrintBus;

impl MessageBus for PrintBus {
    fn broadcast(&self, namespace: Namespace, payload: Value) -> Result<(), BusError> {
        println!("[broadcast {}] {payload}", namespace.as_str());
        Ok(())
    }
    fn send(&self, session: &SessionId, namespace: Namespace, payload: Value) -> Result<(), BusError> {
        println!("[to {session} {}] {payload}", namespace.as_str());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let targets = Targets {
        player: Arc::new(StubPlayer::new()),
        element: Arc::new(StubElement::new()),
        system_volume: Arc::new(StubVolume),
    };
    let (bridge, tx) = CastBridge::spawn(
        targets,
        Arc::new(PrintBus),
        Arc::new(|data| println!("[appData] {data}")),
        BridgeConfig::default(),
    );

    let session = SessionId::new("demo");
    tx.send(BridgeCommand::SessionsConnected(vec![session.clone()])).await?;
    tx.send(BridgeCommand::Message {
        sender: session.clone(),
        namespace: Namespace::Rpc,
        payload: json!({
            "type": "init",
            "initState": {
                "video": {"playbackRate": 1.0},
                "manifest": "https://cdn.example/demo.mpd",
            },
            "appData": {"demo": true},
        }),
    })
    .await?;
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    tx.send(BridgeCommand::Message {
        sender: session.clone(),
        namespace: Namespace::Media,
        payload: json!({"type": "GET_STATUS", "requestId": 1}),
    })
    .await?;
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    tx.send(BridgeCommand::Shutdown).await?;
    bridge.join().await;
    Ok(())
}
