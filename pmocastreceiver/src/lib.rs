//! # PMOCast Receiver
//!
//! Receiver-side session bridge between a local playback engine and
//! remote controller sessions connected over a message bus.
//!
//! The bridge keeps every session's view of playback state in sync,
//! forwards remote commands to the local player, correlates async
//! remote calls with their private replies, and translates the generic
//! media-control vocabulary (PLAY, PAUSE, LOAD, ...) into player
//! operations.
//!
//! ## Wiring
//!
//! The embedding application provides the collaborators: a [`player::Player`],
//! a [`player::MediaElement`], a [`player::SystemVolume`] and a
//! [`bus::MessageBus`] (the outbound half of the transport). Inbound
//! traffic — session connect/disconnect notices and decoded envelopes —
//! is pushed into the command channel returned by [`bridge::CastBridge::spawn`].
//!
//! ```ignore
//! use pmocastreceiver::{BridgeConfig, CastBridge, Targets};
//!
//! let (bridge, tx) = CastBridge::spawn(targets, bus, app_data, BridgeConfig::default());
//! tx.send(BridgeCommand::SessionsConnected(vec![session])).await?;
//! // ... forward inbound messages ...
//! tx.send(BridgeCommand::Shutdown).await?;
//! bridge.join().await;
//! ```

pub mod bridge;
pub mod bus;
pub mod commands;
pub mod config;
pub mod errors;
pub mod idle;
pub mod player;
pub mod relay;
pub mod rpc;
pub mod sessions;
pub mod snapshot;

pub use bridge::CastBridge;
pub use bus::{BridgeCommand, MessageBus, Namespace, SessionId};
pub use config::BridgeConfig;
pub use errors::{BusError, DispatchError, PlayerError};
pub use player::{
    EventSubscription, LoadRequest, MediaElement, PlaybackState, Player, PlayerEvent, SystemVolume,
};
pub use rpc::{AppDataHandler, Targets};
