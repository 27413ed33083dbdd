//! Translation of the generic remote-control vocabulary onto the
//! local player.

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::warn;

use pmocastproto::media::{InvalidRequestMessage, MediaCommand, MediaRequest, MediaStatusMessage, ResumeState};

use crate::rpc::{load_tail, Settlement, Targets};
use crate::snapshot::media_status_entry;

/// What the bridge must do after translating one generic request.
pub enum CommandOutcome {
    Nothing,
    /// Reply to broadcast on the media namespace.
    Broadcast(Value),
    /// Deferred work (LOAD) to await in the bridge loop.
    Deferred(BoxFuture<'static, Settlement>),
}

/// Dispatch table for the generic command set. Unknown command types
/// are answered with INVALID_REQUEST / INVALID_COMMAND; an envelope
/// without a `type` string is a protocol error and stays unanswered.
pub fn translate(targets: &Targets, payload: &Value) -> CommandOutcome {
    let Some(request) = MediaRequest::parse(payload) else {
        warn!("Malformed generic media request");
        return CommandOutcome::Nothing;
    };

    match request.command {
        MediaCommand::GetStatus => {
            let entry = media_status_entry(&*targets.player, &*targets.element);
            broadcast_status(request.request_id, vec![entry])
        }
        MediaCommand::Play => {
            if let Err(err) = targets.player.play() {
                warn!("PLAY failed: {err}");
            }
            CommandOutcome::Nothing
        }
        MediaCommand::Pause => {
            if let Err(err) = targets.player.pause() {
                warn!("PAUSE failed: {err}");
            }
            CommandOutcome::Nothing
        }
        MediaCommand::Seek { current_time, resume_state } => {
            if let Some(seconds) = current_time {
                if let Err(err) = targets.player.seek(seconds) {
                    warn!("SEEK failed: {err}");
                }
            }
            if resume_state == Some(ResumeState::PlaybackStart) {
                if let Err(err) = targets.player.play() {
                    warn!("SEEK resume failed: {err}");
                }
            }
            CommandOutcome::Nothing
        }
        MediaCommand::Stop => {
            if let Err(err) = targets.player.unload() {
                warn!("STOP failed: {err}");
            }
            CommandOutcome::Nothing
        }
        MediaCommand::Volume { level, muted } => {
            if let Some(level) = level {
                targets.system_volume.set_level(level);
            }
            if let Some(muted) = muted {
                targets.system_volume.set_muted(muted);
            }
            CommandOutcome::Nothing
        }
        MediaCommand::Load { media, current_time, autoplay } => {
            // Status follows through the poller once the load settles;
            // failures travel on the player's error-event channel.
            CommandOutcome::Deferred(load_tail(targets, media.content_id, current_time, autoplay))
        }
        MediaCommand::Unknown(kind) => {
            warn!("Unsupported generic command '{kind}'");
            match serde_json::to_value(InvalidRequestMessage::invalid_command(request.request_id)) {
                Ok(reply) => CommandOutcome::Broadcast(reply),
                Err(err) => {
                    warn!("INVALID_REQUEST serialization failed: {err}");
                    CommandOutcome::Nothing
                }
            }
        }
    }
}

fn broadcast_status(
    request_id: i64,
    status: Vec<pmocastproto::media::MediaStatusEntry>,
) -> CommandOutcome {
    match serde_json::to_value(MediaStatusMessage::new(request_id, status)) {
        Ok(reply) => CommandOutcome::Broadcast(reply),
        Err(err) => {
            warn!("MEDIA_STATUS serialization failed: {err}");
            CommandOutcome::Nothing
        }
    }
}
