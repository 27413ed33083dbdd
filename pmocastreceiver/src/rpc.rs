//! Dispatch of inbound RPC messages onto the local player and media
//! element.
//!
//! `init` is split in two: the synchronous section (player
//! configuration, app-data callback) is applied before the handler
//! returns; everything else runs as a deferred tail the bridge loop
//! awaits alongside other messages. `asyncCall` settlements are
//! correlated by the composite `(session, callId)` key so concurrent
//! calls from different sessions can never collide.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, warn};

use pmocastproto::rpc::{InitState, RpcRequest};

use crate::bus::SessionId;
use crate::errors::PlayerError;
use crate::player::{
    LoadRequest, MediaElement, Player, PlayerAsyncCall, PlayerCall, SystemVolume, TargetName,
    VideoProperty,
};

/// Callback invoked with app-supplied data from `init`/`appData`.
pub type AppDataHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Non-owning handles to the local playback collaborators.
#[derive(Clone)]
pub struct Targets {
    pub player: Arc<dyn Player>,
    pub element: Arc<dyn MediaElement>,
    pub system_volume: Arc<dyn SystemVolume>,
}

/// Composite correlation key for a pending async call.
pub type PendingKey = (SessionId, String);

/// Outcome of a deferred portion of message handling, resolved inside
/// the bridge loop.
#[derive(Debug)]
pub enum Settlement {
    /// An `asyncCall` settled; a private `asyncComplete` may be owed.
    AsyncCall {
        key: PendingKey,
        generation: u64,
        id: Value,
        result: Result<(), PlayerError>,
    },
    /// The asynchronous tail of an `init` or a generic LOAD finished.
    /// Load failures surface through the player's error-event channel,
    /// not here; the bridge only refreshes state.
    TailDone,
}

pub struct RpcDispatcher {
    targets: Targets,
    app_data: AppDataHandler,
    /// Live records keyed by `(session, callId)`; the generation lets a
    /// replaced record's stale settlement be dropped on arrival.
    pending: HashMap<PendingKey, u64>,
    next_generation: u64,
}

impl RpcDispatcher {
    pub fn new(targets: Targets, app_data: AppDataHandler) -> Self {
        Self {
            targets,
            app_data,
            pending: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Handles one inbound RPC envelope. The synchronous effects happen
    /// before this returns; any deferred tail is handed back to the
    /// caller to be awaited.
    pub fn handle(
        &mut self,
        sender: &SessionId,
        payload: Value,
    ) -> Option<BoxFuture<'static, Settlement>> {
        let request: RpcRequest = match serde_json::from_value(payload) {
            Ok(request) => request,
            Err(err) => {
                // Protocol error: logged, never answered.
                warn!(session = %sender, "Malformed RPC message: {err}");
                return None;
            }
        };

        match request {
            RpcRequest::Init { init_state, app_data } => self.handle_init(init_state, app_data),
            RpcRequest::AppData { app_data } => {
                (self.app_data)(app_data);
                None
            }
            RpcRequest::Set { target_name, property, value } => {
                self.handle_set(&target_name, &property, &value);
                None
            }
            RpcRequest::Call { target_name, method_name, args } => {
                self.handle_call(&target_name, &method_name, &args);
                None
            }
            RpcRequest::AsyncCall { id, target_name, method_name, args } => {
                self.handle_async_call(sender, id, &target_name, &method_name, &args)
            }
        }
    }

    /// Resolves a settlement against the pending map. Returns the call
    /// id to answer iff the record is still live (not replaced).
    pub fn settle(&mut self, key: &PendingKey, generation: u64) -> bool {
        match self.pending.get(key) {
            Some(live) if *live == generation => {
                self.pending.remove(key);
                true
            }
            _ => false,
        }
    }

    fn handle_init(
        &mut self,
        init_state: InitState,
        app_data: Value,
    ) -> Option<BoxFuture<'static, Settlement>> {
        // Synchronous section, in order: player configuration, then the
        // app-data callback.
        for (name, value) in &init_state.player {
            apply_player_call(&self.targets, name, std::slice::from_ref(value));
        }
        if !app_data.is_null() {
            (self.app_data)(app_data);
        }

        let targets = self.targets.clone();
        Some(Box::pin(async move {
            run_init_tail(targets, init_state).await;
            Settlement::TailDone
        }))
    }

    fn handle_set(&self, target_name: &str, property: &str, value: &Value) {
        let target = match TargetName::from_name(target_name) {
            Ok(target) => target,
            Err(err) => {
                warn!("set rejected: {err}");
                return;
            }
        };
        match target {
            TargetName::Video => {
                let prop = match VideoProperty::from_name(property) {
                    Ok(prop) => prop,
                    Err(err) => {
                        warn!("set rejected: {err}");
                        return;
                    }
                };
                match prop {
                    // Volume writes go to the platform, not the element.
                    VideoProperty::Volume => {
                        if let Some(level) = value.as_f64() {
                            self.targets.system_volume.set_level(level);
                        } else {
                            warn!("set volume rejected: expected a number");
                        }
                    }
                    VideoProperty::Muted => {
                        if let Some(muted) = value.as_bool() {
                            self.targets.system_volume.set_muted(muted);
                        } else {
                            warn!("set muted rejected: expected a boolean");
                        }
                    }
                    other => {
                        if let Err(err) = other.write(&*self.targets.element, value) {
                            warn!("set rejected: {err}");
                        }
                    }
                }
            }
            TargetName::Player => {
                warn!("set rejected: player has no settable properties ('{property}')");
            }
        }
    }

    fn handle_call(&self, target_name: &str, method_name: &str, args: &[Value]) {
        match TargetName::from_name(target_name) {
            Ok(TargetName::Player) => apply_player_call(&self.targets, method_name, args),
            Ok(TargetName::Video) => {
                warn!("call rejected: video exposes no methods ('{method_name}')");
            }
            Err(err) => warn!("call rejected: {err}"),
        }
    }

    fn handle_async_call(
        &mut self,
        sender: &SessionId,
        id: Value,
        target_name: &str,
        method_name: &str,
        args: &[Value],
    ) -> Option<BoxFuture<'static, Settlement>> {
        match TargetName::from_name(target_name) {
            Ok(TargetName::Player) => {}
            Ok(TargetName::Video) => {
                warn!("asyncCall rejected: video exposes no deferred methods ('{method_name}')");
                return None;
            }
            Err(err) => {
                warn!("asyncCall rejected: {err}");
                return None;
            }
        }

        let call = match PlayerAsyncCall::resolve(method_name, args) {
            Ok(call) => call,
            Err(err) => {
                warn!(session = %sender, "asyncCall rejected: {err}");
                return None;
            }
        };

        let key: PendingKey = (sender.clone(), id.to_string());
        self.next_generation += 1;
        let generation = self.next_generation;
        if self.pending.insert(key.clone(), generation).is_some() {
            debug!(session = %sender, "Replacing pending async call with same id");
        }

        let player = Arc::clone(&self.targets.player);
        debug!(session = %sender, method = method_name, "Dispatching async call");
        Some(Box::pin(async move {
            let result = call.apply(&*player).await;
            Settlement::AsyncCall { key, generation, id, result }
        }))
    }
}

/// Builds the deferred tail of a generic LOAD command.
pub fn load_tail(
    targets: &Targets,
    content_id: String,
    start_time: Option<f64>,
    autoplay: bool,
) -> BoxFuture<'static, Settlement> {
    let targets = targets.clone();
    Box::pin(async move {
        run_load(&targets, content_id, start_time, autoplay).await;
        Settlement::TailDone
    })
}

fn apply_player_call(targets: &Targets, name: &str, args: &[Value]) {
    match PlayerCall::resolve(name, args) {
        Ok(call) => {
            // A fault here is the player's problem; it must not stop
            // message handling.
            if let Err(err) = call.apply(&*targets.player) {
                warn!("Player call '{name}' failed: {err}");
            }
        }
        Err(err) => warn!("call rejected: {err}"),
    }
}

async fn run_init_tail(targets: Targets, init_state: InitState) {
    for (name, value) in &init_state.post_load_player {
        apply_player_call(&targets, name, std::slice::from_ref(value));
    }
    for (name, value) in &init_state.video {
        match VideoProperty::from_name(name) {
            Ok(prop) => {
                if let Err(err) = prop.write(&*targets.element, value) {
                    warn!("init video property '{name}' rejected: {err}");
                }
            }
            Err(err) => warn!("init video property rejected: {err}"),
        }
    }

    if let Some(manifest) = init_state.manifest {
        run_load(&targets, manifest, init_state.start_time, targets.element.autoplay()).await;
    }
}

async fn run_load(targets: &Targets, content_id: String, start_time: Option<f64>, autoplay: bool) {
    // Autoplay is suspended for the duration of the load so the bridge
    // controls when playback actually starts.
    let saved_autoplay = targets.element.autoplay();
    targets.element.set_autoplay(false);

    let result = targets
        .player
        .load(LoadRequest { content_id: content_id.clone(), start_time })
        .await;

    targets.element.set_autoplay(saved_autoplay);

    match result {
        Ok(()) => {
            if autoplay {
                if let Err(err) = targets.player.play() {
                    warn!("Autoplay after load failed: {err}");
                }
            }
        }
        // Surfaced to sessions through the player's error-event channel.
        Err(err) => warn!("Load of '{content_id}' failed: {err}"),
    }
}
