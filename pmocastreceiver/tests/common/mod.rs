#![allow(dead_code)]

//! Shared fakes for bridge integration tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, Notify};

use pmocastproto::StreamType;
use pmocastreceiver::bus::{MessageBus, Namespace, SessionId};
use pmocastreceiver::errors::{BusError, PlayerError};
use pmocastreceiver::player::{
    EventSubscription, LoadRequest, MediaElement, PlaybackState, Player, PlayerEvent, SystemVolume,
};

/// Ordered log of observable side effects, shared between the fakes
/// and the app-data handler so tests can assert sequencing.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

#[derive(Debug)]
struct FakePlayerInner {
    state: PlaybackState,
    content_id: Option<String>,
    content_type: Option<String>,
    stream_type: StreamType,
    duration: Option<f64>,
    load_results: VecDeque<Result<(), PlayerError>>,
    torn_down: bool,
}

/// Scriptable playback engine.
pub struct FakePlayer {
    inner: Mutex<FakePlayerInner>,
    journal: Journal,
    events: Mutex<Option<mpsc::UnboundedSender<PlayerEvent>>>,
    /// When set, `load` parks until the notify fires (it never does in
    /// the tests that use it; the future is dropped at teardown).
    hold_loads: std::sync::atomic::AtomicBool,
    hold_gate: Notify,
}

impl FakePlayer {
    pub fn new(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(FakePlayerInner {
                state: PlaybackState::Idle,
                content_id: None,
                content_type: None,
                stream_type: StreamType::None,
                duration: None,
                load_results: VecDeque::new(),
                torn_down: false,
            }),
            journal,
            events: Mutex::new(None),
            hold_loads: std::sync::atomic::AtomicBool::new(false),
            hold_gate: Notify::new(),
        })
    }

    /// Queues the outcome of the next `load`; unscripted loads succeed.
    pub fn script_load(&self, result: Result<(), PlayerError>) {
        self.inner.lock().load_results.push_back(result);
    }

    pub fn hold_loads(&self) {
        self.hold_loads.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set_live(&self) {
        self.inner.lock().stream_type = StreamType::Live;
    }

    /// Pushes a lifecycle event into the bridge, as the real engine
    /// would.
    pub fn emit(&self, event: PlayerEvent) {
        if let Some(tx) = self.events.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn torn_down(&self) -> bool {
        self.inner.lock().torn_down
    }

    fn log(&self, entry: impl Into<String>) {
        self.journal.lock().push(entry.into());
    }
}

#[async_trait]
impl Player for FakePlayer {
    fn play(&self) -> Result<(), PlayerError> {
        self.log("play");
        self.inner.lock().state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.log("pause");
        self.inner.lock().state = PlaybackState::Paused;
        Ok(())
    }

    fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.log(format!("seek:{seconds}"));
        Ok(())
    }

    fn unload(&self) -> Result<(), PlayerError> {
        self.log("unload");
        let mut inner = self.inner.lock();
        inner.state = PlaybackState::Idle;
        inner.content_id = None;
        inner.content_type = None;
        inner.duration = None;
        inner.stream_type = StreamType::None;
        Ok(())
    }

    fn set_playback_rate(&self, rate: f64) -> Result<(), PlayerError> {
        self.log(format!("setPlaybackRate:{rate}"));
        Ok(())
    }

    fn set_text_track_visibility(&self, visible: bool) -> Result<(), PlayerError> {
        self.log(format!("setTextTrackVisibility:{visible}"));
        Ok(())
    }

    fn configure(&self, _settings: Value) -> Result<(), PlayerError> {
        self.log("configure");
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        self.inner.lock().state
    }

    fn content_id(&self) -> Option<String> {
        self.inner.lock().content_id.clone()
    }

    fn content_type(&self) -> Option<String> {
        self.inner.lock().content_type.clone()
    }

    fn stream_type(&self) -> StreamType {
        self.inner.lock().stream_type
    }

    fn duration(&self) -> Option<f64> {
        self.inner.lock().duration
    }

    fn seekable_range(&self) -> Option<(f64, f64)> {
        match self.inner.lock().stream_type {
            StreamType::Live => Some((0.0, 600.0)),
            _ => None,
        }
    }

    fn program_time(&self) -> Option<DateTime<Utc>> {
        None
    }

    async fn load(&self, request: LoadRequest) -> Result<(), PlayerError> {
        self.log(format!(
            "load:{}@{}",
            request.content_id,
            request.start_time.unwrap_or(0.0)
        ));
        if self.hold_loads.load(std::sync::atomic::Ordering::SeqCst) {
            self.hold_gate.notified().await;
        }
        let result = self
            .inner
            .lock()
            .load_results
            .pop_front()
            .unwrap_or(Ok(()));
        if result.is_ok() {
            let mut inner = self.inner.lock();
            inner.state = PlaybackState::Paused;
            inner.content_id = Some(request.content_id);
            inner.content_type = Some("video/mp4".to_string());
            inner.stream_type = StreamType::Buffered;
            inner.duration = Some(120.0);
        }
        result
    }

    async fn preload(&self, content_id: String) -> Result<(), PlayerError> {
        self.log(format!("preload:{content_id}"));
        Ok(())
    }

    fn subscribe(&self) -> EventSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock() = Some(tx);
        EventSubscription::new(rx)
    }

    async fn teardown(&self) {
        self.log("teardown");
        self.inner.lock().torn_down = true;
    }
}

#[derive(Debug, Default)]
struct FakeElementInner {
    current_time: f64,
    duration: f64,
    paused: bool,
    ended: bool,
    seeking: bool,
    volume: f64,
    muted: bool,
    autoplay: bool,
    playback_rate: f64,
}

#[derive(Default)]
pub struct FakeElement {
    inner: Mutex<FakeElementInner>,
}

impl FakeElement {
    pub fn new() -> Arc<Self> {
        let element = Self::default();
        {
            let mut inner = element.inner.lock();
            inner.paused = true;
            inner.volume = 1.0;
            inner.playback_rate = 1.0;
        }
        Arc::new(element)
    }

    pub fn with_autoplay() -> Arc<Self> {
        let element = Self::new();
        element.inner.lock().autoplay = true;
        element
    }
}

impl MediaElement for FakeElement {
    fn current_time(&self) -> f64 {
        self.inner.lock().current_time
    }
    fn set_current_time(&self, seconds: f64) {
        self.inner.lock().current_time = seconds;
    }
    fn duration(&self) -> f64 {
        self.inner.lock().duration
    }
    fn paused(&self) -> bool {
        self.inner.lock().paused
    }
    fn ended(&self) -> bool {
        self.inner.lock().ended
    }
    fn seeking(&self) -> bool {
        self.inner.lock().seeking
    }
    fn volume(&self) -> f64 {
        self.inner.lock().volume
    }
    fn set_volume(&self, level: f64) {
        self.inner.lock().volume = level;
    }
    fn muted(&self) -> bool {
        self.inner.lock().muted
    }
    fn set_muted(&self, muted: bool) {
        self.inner.lock().muted = muted;
    }
    fn autoplay(&self) -> bool {
        self.inner.lock().autoplay
    }
    fn set_autoplay(&self, autoplay: bool) {
        self.inner.lock().autoplay = autoplay;
    }
    fn playback_rate(&self) -> f64 {
        self.inner.lock().playback_rate
    }
    fn set_playback_rate(&self, rate: f64) {
        self.inner.lock().playback_rate = rate;
    }
}

#[derive(Default)]
pub struct FakeSystemVolume {
    pub level: Mutex<Option<f64>>,
    pub muted: Mutex<Option<bool>>,
}

impl FakeSystemVolume {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl SystemVolume for FakeSystemVolume {
    fn set_level(&self, level: f64) {
        *self.level.lock() = Some(level);
    }
    fn set_muted(&self, muted: bool) {
        *self.muted.lock() = Some(muted);
    }
}

/// A spawned bridge plus handles to all of its fakes.
pub struct Harness {
    pub bridge: pmocastreceiver::CastBridge,
    pub tx: mpsc::Sender<pmocastreceiver::BridgeCommand>,
    pub player: Arc<FakePlayer>,
    pub element: Arc<FakeElement>,
    pub volume: Arc<FakeSystemVolume>,
    pub bus: Arc<RecordingBus>,
    pub journal: Journal,
}

/// Spawns a bridge wired to fakes; the app-data handler appends
/// `appData` to the journal.
pub fn spawn_bridge() -> Harness {
    let journal = journal();
    let player = FakePlayer::new(Arc::clone(&journal));
    let element = FakeElement::new();
    let volume = FakeSystemVolume::new();
    let bus = RecordingBus::new();

    let targets = pmocastreceiver::Targets {
        player: player.clone(),
        element: element.clone(),
        system_volume: volume.clone(),
    };
    let app_journal = Arc::clone(&journal);
    let (bridge, tx) = pmocastreceiver::CastBridge::spawn(
        targets,
        bus.clone(),
        Arc::new(move |_| app_journal.lock().push("appData".to_string())),
        pmocastreceiver::BridgeConfig::default(),
    );

    Harness { bridge, tx, player, element, volume, bus, journal }
}

pub fn sid(s: &str) -> SessionId {
    SessionId::new(s)
}

/// Lets the bridge loop drain its queues (paused time auto-advances).
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
}

/// One message captured by the recording bus.
#[derive(Clone, Debug)]
pub struct Sent {
    /// `None` for broadcasts, `Some(session)` for private sends.
    pub to: Option<SessionId>,
    pub namespace: Namespace,
    pub payload: Value,
}

#[derive(Default)]
pub struct RecordingBus {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    /// Broadcasts on `namespace` whose `type` field equals `kind`.
    pub fn broadcasts_of(&self, namespace: Namespace, kind: &str) -> Vec<Value> {
        self.sent
            .lock()
            .iter()
            .filter(|msg| {
                msg.to.is_none()
                    && msg.namespace == namespace
                    && msg.payload.get("type").and_then(Value::as_str) == Some(kind)
            })
            .map(|msg| msg.payload.clone())
            .collect()
    }

    pub fn privates_to(&self, session: &SessionId) -> Vec<Value> {
        self.sent
            .lock()
            .iter()
            .filter(|msg| msg.to.as_ref() == Some(session))
            .map(|msg| msg.payload.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl MessageBus for RecordingBus {
    fn broadcast(&self, namespace: Namespace, payload: Value) -> Result<(), BusError> {
        self.sent.lock().push(Sent { to: None, namespace, payload });
        Ok(())
    }

    fn send(
        &self,
        session: &SessionId,
        namespace: Namespace,
        payload: Value,
    ) -> Result<(), BusError> {
        self.sent.lock().push(Sent {
            to: Some(session.clone()),
            namespace,
            payload,
        });
        Ok(())
    }
}
