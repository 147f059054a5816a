//! Tunable game settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::Resources;

/// One hour, in milliseconds
pub const HOUR_MS: u64 = 60 * 60 * 1000;

/// Settings applied when onboarding players and refreshing their budgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Resources every new player starts with
    pub starting_resources: Resources,
    /// Action points a new player starts with
    pub starting_action_points: u32,
    /// Ceiling the refresh job fills budgets up to
    pub max_action_points: u32,
    /// Time between scheduled AP refreshes (milliseconds)
    pub ap_refresh_period_ms: u64,
    /// Start positions are drawn from `-spawn_range..=spawn_range` on both axes
    pub spawn_range: i32,
    /// Radius revealed around a new player's start
    pub reveal_radius: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameConfigError {
    #[error("max_action_points must be positive")]
    ZeroActionPointCap,

    #[error("starting_action_points {start} exceeds max_action_points {max}")]
    StartAboveCap { start: u32, max: u32 },

    #[error("spawn_range must not be negative, got {0}")]
    NegativeSpawnRange(i32),
}

impl GameConfig {
    /// Reject settings that would break budget or onboarding rules
    pub fn validate(&self) -> Result<(), GameConfigError> {
        if self.max_action_points == 0 {
            return Err(GameConfigError::ZeroActionPointCap);
        }
        if self.starting_action_points > self.max_action_points {
            return Err(GameConfigError::StartAboveCap {
                start: self.starting_action_points,
                max: self.max_action_points,
            });
        }
        if self.spawn_range < 0 {
            return Err(GameConfigError::NegativeSpawnRange(self.spawn_range));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_resources: Resources::with_amounts(10, 10, 5, 3),
            starting_action_points: 10,
            max_action_points: 10,
            ap_refresh_period_ms: HOUR_MS,
            spawn_range: 100,
            reveal_radius: 3,
        }
    }
}
