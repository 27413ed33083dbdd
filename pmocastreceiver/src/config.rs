//! Bridge configuration.
//!
//! A plain serde section meant to be embedded in the host
//! application's configuration file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// State poll cadence while at least one session is connected.
    pub poll_interval_ms: u64,
    /// Delay between end-of-media and the idle flip.
    pub idle_grace_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            idle_grace_secs: 5,
        }
    }
}

impl BridgeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn idle_grace(&self) -> Duration {
        Duration::from_secs(self.idle_grace_secs)
    }
}
