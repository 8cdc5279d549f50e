use crate::radar::player::RadarPlayer;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// One radar snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarUpdate {
    /// Ordering key; never decreases across updates from one producer
    pub version: u64,
    pub in_game: bool,
    pub map_id: Option<String>,
    pub players: Vec<RadarPlayer>,
}

impl RadarUpdate {
    /// Snapshot sent while no raid is running
    pub fn idle(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }
}

/// Producer-side version counter.
///
/// Shared by every task that emits updates for one radar so the versions it
/// hands out are strictly increasing, whichever task asks.
#[derive(Debug, Default)]
pub struct UpdateSequencer {
    next: AtomicU64,
}

impl UpdateSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after `last`, e.g. when a producer restarts
    pub fn starting_after(last: u64) -> Self {
        Self {
            next: AtomicU64::new(last.saturating_add(1)),
        }
    }

    pub fn next_version(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Build an update stamped with the next version
    pub fn stamp(
        &self,
        in_game: bool,
        map_id: Option<String>,
        players: Vec<RadarPlayer>,
    ) -> RadarUpdate {
        RadarUpdate {
            version: self.next_version(),
            in_game,
            map_id,
            players,
        }
    }
}

/// Consumer-side filter that drops stale or replayed updates.
#[derive(Debug, Default, Clone)]
pub struct VersionGate {
    last: Option<u64>,
    dropped: u64,
}

impl VersionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `version` if it is newer than everything accepted so far
    pub fn accept(&mut self, version: u64) -> bool {
        match self.last {
            Some(last) if version <= last => {
                self.dropped += 1;
                debug!(version, last, "Dropping stale radar update");
                false
            }
            _ => {
                self.last = Some(version);
                true
            }
        }
    }

    /// Filter a whole update
    pub fn admit(&mut self, update: &RadarUpdate) -> bool {
        self.accept(update.version)
    }

    pub fn last_version(&self) -> Option<u64> {
        self.last
    }

    /// Number of updates rejected so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Forget history, e.g. after reconnecting to a restarted producer
    pub fn reset(&mut self) {
        self.last = None;
    }
}
