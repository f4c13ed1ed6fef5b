// Battle rewards: credits, experience and level-ups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::*;

/// Battle result from the player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Win,
    Loss,
}

impl BattleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            BattleOutcome::Win => "win",
            BattleOutcome::Loss => "loss",
        }
    }

    pub fn credits(self) -> i64 {
        match self {
            BattleOutcome::Win => WIN_CREDITS,
            BattleOutcome::Loss => LOSS_CREDITS,
        }
    }

    /// Experience earned against an opponent of `enemy_level`.
    pub fn experience(self, enemy_level: i32) -> i64 {
        match self {
            BattleOutcome::Win => {
                BASE_WIN_EXPERIENCE + EXPERIENCE_PER_ENEMY_LEVEL * enemy_level.max(1) as i64
            }
            BattleOutcome::Loss => LOSS_EXPERIENCE,
        }
    }
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BattleOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(BattleOutcome::Win),
            "loss" => Ok(BattleOutcome::Loss),
            other => Err(format!("unknown battle outcome '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: i32,
    pub experience: i64,
    pub levels_gained: i32,
}

pub fn experience_to_next_level(level: i32) -> i64 {
    level.max(1) as i64 * EXPERIENCE_PER_LEVEL
}

/// Add `gained` experience; every threshold crossed costs its experience and
/// raises the level by one. A single gain is capped at `MAX_EXPERIENCE_GAIN`.
pub fn gain_experience(level: i32, experience: i64, gained: i64) -> LevelProgress {
    let mut level = level.max(STARTING_LEVEL);
    let mut experience = experience
        .max(0)
        .saturating_add(gained.clamp(0, MAX_EXPERIENCE_GAIN));
    let mut levels_gained = 0;

    while experience >= experience_to_next_level(level) {
        experience -= experience_to_next_level(level);
        level += 1;
        levels_gained += 1;
    }

    LevelProgress {
        level,
        experience,
        levels_gained,
    }
}
