use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::MAX_MOVE_POWER;

/// The three kinds of action a robot can take in its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Attack,
    Defend,
    Special,
}

impl MoveKind {
    pub const ALL: [MoveKind; 3] = [MoveKind::Attack, MoveKind::Defend, MoveKind::Special];

    pub fn as_str(self) -> &'static str {
        match self {
            MoveKind::Attack => "attack",
            MoveKind::Defend => "defend",
            MoveKind::Special => "special",
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(MoveKind::Attack),
            "defend" => Ok(MoveKind::Defend),
            "special" => Ok(MoveKind::Special),
            other => Err(format!("unknown move type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleMove {
    #[serde(rename = "type")]
    pub kind: MoveKind,
    pub power: i32,
    pub description: String,
}

impl BattleMove {
    pub fn new(kind: MoveKind, power: i32, description: &str) -> Self {
        Self {
            kind,
            power,
            description: description.to_string(),
        }
    }

    /// Power within `0..=MAX_MOVE_POWER`.
    pub fn is_valid(&self) -> bool {
        (0..=MAX_MOVE_POWER).contains(&self.power)
    }

    /// One of the moves offered to the player in the arena.
    pub fn is_player_move(&self) -> bool {
        player_moves().contains(self)
    }
}

/// Moves offered to the player in the arena.
pub fn player_moves() -> Vec<BattleMove> {
    vec![
        BattleMove::new(MoveKind::Attack, 20, "Cloud Cannon Attack"),
        BattleMove::new(MoveKind::Defend, 10, "Security Shield Defense"),
        BattleMove::new(MoveKind::Special, 30, "Function Compute Special"),
    ]
}

/// Moves the AI opponent picks from.
pub fn enemy_moves() -> Vec<BattleMove> {
    vec![
        BattleMove::new(MoveKind::Attack, 20, "Laser Blast"),
        BattleMove::new(MoveKind::Defend, 15, "Shield Barrier"),
        BattleMove::new(MoveKind::Special, 25, "Rocket Missile"),
    ]
}

/// The enemy move of the given kind.
pub fn enemy_move(kind: MoveKind) -> BattleMove {
    match kind {
        MoveKind::Attack => BattleMove::new(MoveKind::Attack, 20, "Laser Blast"),
        MoveKind::Defend => BattleMove::new(MoveKind::Defend, 15, "Shield Barrier"),
        MoveKind::Special => BattleMove::new(MoveKind::Special, 25, "Rocket Missile"),
    }
}
