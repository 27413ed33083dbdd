//! Idle/active playback state machine.
//!
//! The receiver is idle until content starts loading and returns to
//! idle when content is unloaded. End-of-media does not flip the flag
//! immediately: the transition is scheduled after a grace window so a
//! quick resume (replay, next item) keeps the receiver active. The
//! machine is pure logic; the bridge loop owns the actual grace timer
//! and calls [`IdleTracker::on_grace_elapsed`] when it fires.

use std::time::Duration;

use tracing::debug;

use crate::player::PlayerEvent;

/// Default grace window between an `ended` event and the idle flip.
pub const DEFAULT_IDLE_GRACE: Duration = Duration::from_secs(5);

/// What the bridge loop must do with the grace timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraceAction {
    Keep,
    Schedule,
    Cancel,
}

/// Outcome of feeding one event into the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleUpdate {
    /// True when the idle flag flipped; observers must be notified.
    pub changed: bool,
    pub grace: GraceAction,
}

impl IdleUpdate {
    const NONE: IdleUpdate = IdleUpdate {
        changed: false,
        grace: GraceAction::Keep,
    };
}

#[derive(Debug)]
pub struct IdleTracker {
    idle: bool,
    ended: bool,
    grace_pending: bool,
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self {
            idle: true,
            ended: false,
            grace_pending: false,
        }
    }
}

impl IdleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn handle(&mut self, event: &PlayerEvent) -> IdleUpdate {
        match event {
            PlayerEvent::LoadStart => {
                // A new load is itself an activating event, so it also
                // cancels any pending end-of-media grace.
                self.ended = false;
                self.activate()
            }
            PlayerEvent::Playing => {
                if self.grace_pending {
                    self.ended = false;
                    debug!("Playback resumed during idle grace, cancelling idle transition");
                    self.grace_pending = false;
                    return IdleUpdate {
                        changed: false,
                        grace: GraceAction::Cancel,
                    };
                }
                if !self.ended {
                    self.activate()
                } else {
                    IdleUpdate::NONE
                }
            }
            PlayerEvent::Ended => {
                if !self.idle && !self.grace_pending {
                    self.ended = true;
                    self.grace_pending = true;
                    return IdleUpdate {
                        changed: false,
                        grace: GraceAction::Schedule,
                    };
                }
                IdleUpdate::NONE
            }
            PlayerEvent::Abort => {
                self.ended = false;
                let cancel = std::mem::replace(&mut self.grace_pending, false);
                if !self.idle {
                    self.idle = true;
                    debug!("Content unloaded, receiver is idle");
                    IdleUpdate {
                        changed: true,
                        grace: if cancel { GraceAction::Cancel } else { GraceAction::Keep },
                    }
                } else {
                    IdleUpdate {
                        changed: false,
                        grace: if cancel { GraceAction::Cancel } else { GraceAction::Keep },
                    }
                }
            }
            _ => IdleUpdate::NONE,
        }
    }

    /// Called by the bridge loop when the grace deadline fires.
    /// Returns true when the idle flag flipped.
    pub fn on_grace_elapsed(&mut self) -> bool {
        if !self.grace_pending {
            return false;
        }
        self.grace_pending = false;
        if !self.idle {
            self.idle = true;
            debug!("Idle grace elapsed with no resume, receiver is idle");
            true
        } else {
            false
        }
    }

    fn activate(&mut self) -> IdleUpdate {
        let cancel = std::mem::replace(&mut self.grace_pending, false);
        let changed = std::mem::replace(&mut self.idle, false);
        IdleUpdate {
            changed,
            grace: if cancel { GraceAction::Cancel } else { GraceAction::Keep },
        }
    }
}
