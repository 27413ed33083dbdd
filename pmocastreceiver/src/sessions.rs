//! Tracking of connected remote sessions.

use std::collections::HashSet;

use tracing::debug;

use crate::bus::SessionId;

/// Direction of a connectivity flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectivityChange {
    Connected,
    Disconnected,
}

/// Membership set of the currently connected sessions.
///
/// Connect/disconnect notices come from the transport; duplicates
/// collapse to membership. A [`ConnectivityChange`] is reported only
/// when the set flips between empty and non-empty, not on every
/// individual join or leave.
#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: HashSet<SessionId>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        !self.sessions.is_empty()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn on_connected(&mut self, ids: Vec<SessionId>) -> Option<ConnectivityChange> {
        let was_connected = self.is_connected();
        for id in ids {
            debug!(session = %id, "Session connected");
            self.sessions.insert(id);
        }
        (!was_connected && self.is_connected()).then_some(ConnectivityChange::Connected)
    }

    pub fn on_disconnected(&mut self, id: &SessionId) -> Option<ConnectivityChange> {
        let was_connected = self.is_connected();
        if self.sessions.remove(id) {
            debug!(session = %id, "Session disconnected");
        }
        (was_connected && !self.is_connected()).then_some(ConnectivityChange::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s)
    }

    #[test]
    fn connected_iff_non_empty() {
        let mut tracker = SessionTracker::new();
        assert!(!tracker.is_connected());

        assert_eq!(tracker.on_connected(vec![sid("a")]), Some(ConnectivityChange::Connected));
        assert!(tracker.is_connected());

        // Growing a non-empty set is not a flip.
        assert_eq!(tracker.on_connected(vec![sid("b"), sid("c")]), None);
        assert!(tracker.is_connected());

        assert_eq!(tracker.on_disconnected(&sid("a")), None);
        assert_eq!(tracker.on_disconnected(&sid("b")), None);
        assert!(tracker.is_connected());

        assert_eq!(
            tracker.on_disconnected(&sid("c")),
            Some(ConnectivityChange::Disconnected)
        );
        assert!(!tracker.is_connected());
    }

    #[test]
    fn duplicate_connects_collapse_to_membership() {
        let mut tracker = SessionTracker::new();
        tracker.on_connected(vec![sid("a"), sid("a"), sid("a")]);
        assert_eq!(tracker.session_count(), 1);

        // A single disconnect empties the set.
        assert_eq!(
            tracker.on_disconnected(&sid("a")),
            Some(ConnectivityChange::Disconnected)
        );
    }

    #[test]
    fn disconnect_of_unknown_session_is_ignored() {
        let mut tracker = SessionTracker::new();
        tracker.on_connected(vec![sid("a")]);
        assert_eq!(tracker.on_disconnected(&sid("ghost")), None);
        assert!(tracker.is_connected());
    }
}
