//! The bridge worker: one task, one loop.
//!
//! Everything the engine does — inbound messages, player events, poll
//! ticks, idle grace, settlements of deferred work — is multiplexed
//! through a single `tokio::select!` loop, so no two handlers ever run
//! concurrently. Suspension happens only inside deferred results
//! (loads, deferred method calls, init tails), which are parked in a
//! `FuturesUnordered` and resolved by the same loop.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info, warn};

use pmocastproto::media::MediaStatusMessage;
use pmocastproto::rpc::RpcPush;
use pmocastproto::value::{encode, ProtocolValue};

use crate::bus::{BridgeCommand, MessageBus, Namespace, SessionId};
use crate::commands::{translate, CommandOutcome};
use crate::config::BridgeConfig;
use crate::idle::{GraceAction, IdleTracker};
use crate::player::PlayerEvent;
use crate::relay::broadcast_event;
use crate::rpc::{AppDataHandler, RpcDispatcher, Settlement, Targets};
use crate::sessions::{ConnectivityChange, SessionTracker};
use crate::snapshot::{build_snapshot, media_status_entry, MediaWatch};

/// Handle to the spawned bridge task.
pub struct CastBridge {
    join_handle: JoinHandle<()>,
    idle_rx: watch::Receiver<bool>,
}

impl CastBridge {
    /// Spawns the bridge worker. Feed it transport notices and inbound
    /// messages through the returned sender; send
    /// [`BridgeCommand::Shutdown`] (or drop the sender) to tear it
    /// down.
    pub fn spawn(
        targets: Targets,
        bus: Arc<dyn MessageBus>,
        app_data: AppDataHandler,
        config: BridgeConfig,
    ) -> (Self, mpsc::Sender<BridgeCommand>) {
        let (tx, rx) = mpsc::channel(32);
        let (idle_tx, idle_rx) = watch::channel(true);

        let join_handle = tokio::spawn(async move {
            info!("Starting cast bridge");
            run(targets, bus, app_data, config, rx, idle_tx).await;
            info!("Cast bridge stopped");
        });

        (Self { join_handle, idle_rx }, tx)
    }

    /// Current idle/active flag of the receiver.
    pub fn is_idle(&self) -> bool {
        *self.idle_rx.borrow()
    }

    /// Observe idle/active transitions.
    pub fn idle_changes(&self) -> watch::Receiver<bool> {
        self.idle_rx.clone()
    }

    /// Waits for the worker to finish its teardown.
    pub async fn join(self) {
        let _ = self.join_handle.await;
    }
}

struct BridgeState {
    targets: Targets,
    bus: Arc<dyn MessageBus>,
    dispatcher: RpcDispatcher,
    sessions: SessionTracker,
    idle: IdleTracker,
    media_watch: MediaWatch,
    idle_tx: watch::Sender<bool>,
    shutdown: bool,
}

async fn run(
    targets: Targets,
    bus: Arc<dyn MessageBus>,
    app_data: AppDataHandler,
    config: BridgeConfig,
    mut rx: mpsc::Receiver<BridgeCommand>,
    idle_tx: watch::Sender<bool>,
) {
    let mut events = targets.player.subscribe();
    let mut events_open = true;

    let mut state = BridgeState {
        dispatcher: RpcDispatcher::new(targets.clone(), app_data),
        targets,
        bus,
        sessions: SessionTracker::new(),
        idle: IdleTracker::new(),
        media_watch: MediaWatch::new(),
        idle_tx,
        shutdown: false,
    };

    let mut settlements: FuturesUnordered<BoxFuture<'static, Settlement>> = FuturesUnordered::new();

    let period = config.poll_interval();
    let mut poll = interval_at(Instant::now() + period, period);

    // The grace sleep is owned by the loop and re-armed in place; only
    // the flag decides whether its branch is polled.
    let mut grace = Box::pin(sleep(config.idle_grace()));
    let mut grace_armed = false;

    loop {
        tokio::select! {
            cmd = rx.recv() => {
                match cmd {
                    Some(cmd) => {
                        if state.handle_command(cmd, &mut settlements) {
                            // Connect flip: restart the poll cadence
                            // from now (the refresh already happened).
                            poll = interval_at(Instant::now() + period, period);
                        }
                    }
                    // Command channel closed, terminate.
                    None => state.shutdown = true,
                }
                if state.shutdown {
                    break;
                }
            }
            event = events.recv(), if events_open => {
                match event {
                    Some(event) => match state.handle_player_event(&event) {
                        GraceAction::Schedule => {
                            grace.as_mut().reset(Instant::now() + config.idle_grace());
                            grace_armed = true;
                        }
                        GraceAction::Cancel => grace_armed = false,
                        GraceAction::Keep => {}
                    },
                    None => events_open = false,
                }
            }
            Some(settlement) = settlements.next(), if !settlements.is_empty() => {
                state.handle_settlement(settlement);
            }
            _ = poll.tick(), if state.sessions.is_connected() => {
                state.poll_tick();
            }
            _ = grace.as_mut(), if grace_armed => {
                grace_armed = false;
                state.on_grace_elapsed();
            }
        }
    }

    // Scoped teardown: detach the event subscription, drop in-flight
    // work, tear the player down. Nothing is sent past this point.
    drop(events);
    settlements.clear();
    state.targets.player.teardown().await;
}

impl BridgeState {
    /// Returns true when the poll timer must restart (connect flip).
    fn handle_command(
        &mut self,
        cmd: BridgeCommand,
        settlements: &mut FuturesUnordered<BoxFuture<'static, Settlement>>,
    ) -> bool {
        match cmd {
            BridgeCommand::SessionsConnected(ids) => {
                if self.sessions.on_connected(ids) == Some(ConnectivityChange::Connected) {
                    debug!("Connectivity flipped to connected");
                    // Newly joined sessions get current state right
                    // away instead of waiting a full poll interval.
                    self.force_refresh();
                    return true;
                }
                false
            }
            BridgeCommand::SessionDisconnected(id) => {
                if self.sessions.on_disconnected(&id) == Some(ConnectivityChange::Disconnected) {
                    debug!("Connectivity flipped to disconnected");
                }
                false
            }
            BridgeCommand::Message { sender, namespace, payload } => {
                self.handle_message(&sender, namespace, payload, settlements);
                false
            }
            BridgeCommand::Shutdown => {
                self.shutdown = true;
                false
            }
        }
    }

    fn handle_message(
        &mut self,
        sender: &SessionId,
        namespace: Namespace,
        payload: Value,
        settlements: &mut FuturesUnordered<BoxFuture<'static, Settlement>>,
    ) {
        match namespace {
            Namespace::Rpc => {
                if let Some(tail) = self.dispatcher.handle(sender, payload) {
                    settlements.push(tail);
                }
            }
            Namespace::Media => match translate(&self.targets, &payload) {
                CommandOutcome::Nothing => {}
                CommandOutcome::Broadcast(reply) => {
                    if let Err(err) = self.bus.broadcast(Namespace::Media, reply) {
                        warn!("Generic reply broadcast failed: {err}");
                    }
                }
                CommandOutcome::Deferred(tail) => settlements.push(tail),
            },
        }
    }

    fn handle_player_event(&mut self, event: &PlayerEvent) -> GraceAction {
        let update = self.idle.handle(event);

        if self.sessions.is_connected() {
            broadcast_event(&*self.bus, event);
        }

        if update.changed {
            let _ = self.idle_tx.send(self.idle.is_idle());
            self.force_refresh();
        }
        update.grace
    }

    fn on_grace_elapsed(&mut self) {
        if self.idle.on_grace_elapsed() {
            let _ = self.idle_tx.send(true);
            self.force_refresh();
        }
    }

    fn handle_settlement(&mut self, settlement: Settlement) {
        match settlement {
            Settlement::AsyncCall { key, generation, id, result } => {
                if self.dispatcher.settle(&key, generation) {
                    let error = match result {
                        Ok(()) => Value::Null,
                        Err(err) => encode(&ProtocolValue::Error(err.into())),
                    };
                    let push = RpcPush::AsyncComplete { id, error };
                    match serde_json::to_value(&push) {
                        Ok(raw) => {
                            // Private reply: only the originating
                            // session's channel, never broadcast.
                            if let Err(err) = self.bus.send(&key.0, Namespace::Rpc, raw) {
                                warn!(session = %key.0, "asyncComplete send failed: {err}");
                            }
                        }
                        Err(err) => warn!("asyncComplete serialization failed: {err}"),
                    }
                } else {
                    debug!(session = %key.0, "Dropping settlement of a replaced async call");
                }
            }
            Settlement::TailDone => {}
        }
        // A settled load may have changed the media; refresh right away
        // rather than waiting for the next tick.
        self.force_refresh();
    }

    fn poll_tick(&mut self) {
        let snapshot = build_snapshot(&*self.targets.player, &*self.targets.element);
        let push = RpcPush::Update { update: snapshot };
        match serde_json::to_value(&push) {
            Ok(raw) => {
                if let Err(err) = self.bus.broadcast(Namespace::Rpc, raw) {
                    warn!("Update broadcast failed: {err}");
                }
            }
            Err(err) => warn!("Update serialization failed: {err}"),
        }

        if self.media_watch.changed(&*self.targets.player) {
            let entry = media_status_entry(&*self.targets.player, &*self.targets.element);
            match serde_json::to_value(MediaStatusMessage::new(0, vec![entry])) {
                Ok(raw) => {
                    if let Err(err) = self.bus.broadcast(Namespace::Media, raw) {
                        warn!("Media status broadcast failed: {err}");
                    }
                }
                Err(err) => warn!("Media status serialization failed: {err}"),
            }
        }
    }

    /// One immediate poll cycle; a no-op while disconnected (never
    /// broadcast with zero sessions).
    fn force_refresh(&mut self) {
        if self.sessions.is_connected() {
            self.poll_tick();
        }
    }
}
