//! State snapshots and media-status assembly.

use serde_json::{Map, Value};

use pmocastproto::media::{MediaInformation, MediaStatusEntry};
use pmocastproto::StreamType;

use crate::player::{LiveGetter, MediaElement, Player, PlayerGetter, VideoProperty};

/// Bitmask of generic commands this receiver accepts.
pub mod commands_mask {
    pub const PAUSE: u32 = 1;
    pub const SEEK: u32 = 1 << 1;
    pub const STREAM_VOLUME: u32 = 1 << 2;
    pub const STREAM_MUTE: u32 = 1 << 3;
    pub const ALL: u32 = PAUSE | SEEK | STREAM_VOLUME | STREAM_MUTE;
}

/// Builds the two-level `namespace → attribute → value` snapshot
/// broadcast in `update` messages. Live-only player accessors are
/// included only while the loaded content is a live stream.
pub fn build_snapshot(player: &dyn Player, element: &dyn MediaElement) -> Value {
    let mut video = Map::new();
    for property in VideoProperty::READABLE {
        video.insert(property.name().to_string(), property.read(element));
    }

    let mut player_ns = Map::new();
    for getter in PlayerGetter::ALL {
        player_ns.insert(getter.name().to_string(), getter.read(player));
    }
    if player.stream_type() == StreamType::Live {
        for getter in LiveGetter::ALL {
            player_ns.insert(getter.name().to_string(), getter.read(player));
        }
    }

    let mut snapshot = Map::new();
    snapshot.insert("video".to_string(), Value::Object(video));
    snapshot.insert("player".to_string(), Value::Object(player_ns));
    Value::Object(snapshot)
}

/// Media information of the currently loaded content, if any.
pub fn current_media(player: &dyn Player) -> Option<MediaInformation> {
    let content_id = player.content_id()?;
    Some(MediaInformation {
        content_id,
        content_type: player.content_type().unwrap_or_default(),
        stream_type: player.stream_type(),
        duration: player.duration(),
    })
}

/// One MEDIA_STATUS entry reflecting the current playback state.
pub fn media_status_entry(player: &dyn Player, element: &dyn MediaElement) -> MediaStatusEntry {
    MediaStatusEntry {
        media: current_media(player),
        player_state: player.state().as_str().to_string(),
        current_time: element.current_time(),
        playback_rate: element.playback_rate(),
        paused: element.paused(),
        muted: element.muted(),
        volume: element.volume(),
        supported_media_commands: commands_mask::ALL,
    }
}

/// Detects content-identity/duration changes between polls so that a
/// MEDIA_STATUS push goes out exactly once per change.
#[derive(Debug, Default)]
pub struct MediaWatch {
    // Starts as (None, None): an empty receiver has nothing to push.
    last: (Option<String>, Option<f64>),
}

impl MediaWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when (contentId, duration) differ from the last
    /// observed pair; repeated unchanged calls coalesce into silence.
    pub fn changed(&mut self, player: &dyn Player) -> bool {
        let current = (player.content_id(), player.duration());
        if current != self.last {
            self.last = current;
            true
        } else {
            false
        }
    }
}
