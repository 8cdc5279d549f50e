use crate::core::geometry::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// How a player relates to the local operator.
///
/// Encoded by its declaration index, so variants must only ever be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerCategory {
    /// The operator's own character
    LocalPlayer,
    Teammate,
    /// Human opponent
    Player,
    /// Human opponent playing the scavenger faction
    PlayerScav,
    /// AI-controlled
    Bot,
}

impl PlayerCategory {
    /// Classify a player. Earlier checks win: the local player is never a
    /// teammate, and friendliness is decided before humanity.
    pub fn classify(is_local: bool, is_friendly: bool, is_human: bool, is_scav: bool) -> Self {
        if is_local {
            PlayerCategory::LocalPlayer
        } else if is_friendly {
            PlayerCategory::Teammate
        } else if is_human {
            if is_scav {
                PlayerCategory::PlayerScav
            } else {
                PlayerCategory::Player
            }
        } else {
            PlayerCategory::Bot
        }
    }

    pub fn is_human(self) -> bool {
        !matches!(self, PlayerCategory::Bot)
    }
}

/// Live player state as exposed by the host's game-state gatherer.
pub trait PlayerSource {
    fn name(&self) -> &str;
    fn is_local(&self) -> bool;
    fn is_friendly(&self) -> bool;
    fn is_human(&self) -> bool;
    fn is_scav(&self) -> bool;
    fn is_active(&self) -> bool;
    fn is_alive(&self) -> bool;
    /// World position
    fn position(&self) -> Vector3;
    /// View rotation
    fn rotation(&self) -> Vector2;
}

/// Compact per-player record sent to radar clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPlayer {
    pub name: String,
    pub category: PlayerCategory,
    pub is_active: bool,
    pub is_alive: bool,
    pub position: Vector3,
    pub rotation: Vector2,
}

impl RadarPlayer {
    /// Snapshot a live player
    pub fn create<P: PlayerSource + ?Sized>(player: &P) -> Self {
        Self {
            name: player.name().to_string(),
            category: PlayerCategory::classify(
                player.is_local(),
                player.is_friendly(),
                player.is_human(),
                player.is_scav(),
            ),
            is_active: player.is_active(),
            is_alive: player.is_alive(),
            position: player.position(),
            rotation: player.rotation(),
        }
    }
}
