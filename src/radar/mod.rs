//! # Radar Payload Schema
//!
//! Application values broadcast over the hub: a [`RadarUpdate`] snapshot per
//! tick, carrying one [`RadarPlayer`] per tracked player.
//!
//! Gathering live state is the host's job. This module defines the payload
//! types, the player classification rule, and the version bookkeeping both
//! ends rely on to order snapshots.

mod player;
mod update;

pub use player::{PlayerCategory, PlayerSource, RadarPlayer};
pub use update::{RadarUpdate, UpdateSequencer, VersionGate};
