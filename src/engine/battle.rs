// Turn-based battle state machine and the stateless exchange calculator.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::ai::{DecisionContext, EnemyPolicy};
use super::config::MAX_HEALTH;
use super::moves::{enemy_move, BattleMove, MoveKind};
use super::resolver::{apply_damage, apply_heal, resolve, MoveOutcome};
use super::robot::Combatant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Enemy => "enemy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum BattlePhase {
    NotStarted,
    PlayerTurn,
    EnemyTurn,
    Finished { winner: Side },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("battle has not started")]
    NotStarted,
    #[error("battle already started")]
    AlreadyStarted,
    #[error("it is not the {0} turn")]
    NotYourTurn(&'static str),
    #[error("battle is over")]
    Finished,
}

/// One accepted move and the state it left behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReport {
    pub side: Side,
    #[serde(rename = "move")]
    pub mv: BattleMove,
    pub outcome: MoveOutcome,
    pub player_health: i32,
    pub enemy_health: i32,
    pub phase: BattlePhase,
}

#[derive(Debug, Clone)]
pub struct Battle {
    player: Combatant,
    enemy: Combatant,
    player_health: i32,
    enemy_health: i32,
    phase: BattlePhase,
    log: Vec<String>,
    last_player_move: Option<MoveKind>,
    turns: u32,
}

impl Battle {
    pub fn new(player: Combatant, enemy: Combatant) -> Self {
        Self {
            player,
            enemy,
            player_health: MAX_HEALTH,
            enemy_health: MAX_HEALTH,
            phase: BattlePhase::NotStarted,
            log: Vec::new(),
            last_player_move: None,
            turns: 0,
        }
    }

    /// A battle that is already on the player's turn.
    pub fn started(player: Combatant, enemy: Combatant) -> Self {
        let mut battle = Self::new(player, enemy);
        battle.begin();
        battle
    }

    pub fn start(&mut self) -> Result<(), BattleError> {
        if self.phase != BattlePhase::NotStarted {
            return Err(BattleError::AlreadyStarted);
        }
        self.begin();
        Ok(())
    }

    fn begin(&mut self) {
        self.phase = BattlePhase::PlayerTurn;
        self.log.push("Battle started!".to_string());
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    pub fn player_health(&self) -> i32 {
        self.player_health
    }

    pub fn enemy_health(&self) -> i32 {
        self.enemy_health
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Number of moves applied so far.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            BattlePhase::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }

    fn expect_turn(&self, side: Side) -> Result<(), BattleError> {
        match (self.phase, side) {
            (BattlePhase::NotStarted, _) => Err(BattleError::NotStarted),
            (BattlePhase::Finished { .. }, _) => Err(BattleError::Finished),
            (BattlePhase::PlayerTurn, Side::Player) | (BattlePhase::EnemyTurn, Side::Enemy) => {
                Ok(())
            }
            (BattlePhase::PlayerTurn, Side::Enemy) => Err(BattleError::NotYourTurn("enemy's")),
            (BattlePhase::EnemyTurn, Side::Player) => Err(BattleError::NotYourTurn("player's")),
        }
    }

    pub fn player_move<R: Rng + ?Sized>(
        &mut self,
        mv: &BattleMove,
        rng: &mut R,
    ) -> Result<TurnReport, BattleError> {
        self.expect_turn(Side::Player)?;
        self.last_player_move = Some(mv.kind);
        Ok(self.apply(Side::Player, mv.clone(), rng))
    }

    /// Let `policy` pick the enemy's move and apply it.
    pub fn enemy_turn<R: Rng + ?Sized>(
        &mut self,
        policy: EnemyPolicy,
        rng: &mut R,
    ) -> Result<TurnReport, BattleError> {
        self.expect_turn(Side::Enemy)?;
        let ctx = DecisionContext {
            enemy_stats: self.enemy.stats,
            enemy_health: self.enemy_health,
            player_health: self.player_health,
            last_player_move: self.last_player_move,
        };
        let kind = policy.choose(&ctx, rng);
        Ok(self.apply(Side::Enemy, enemy_move(kind), rng))
    }

    fn apply<R: Rng + ?Sized>(&mut self, side: Side, mv: BattleMove, rng: &mut R) -> TurnReport {
        let (actor, target) = match side {
            Side::Player => (&self.player, &self.enemy),
            Side::Enemy => (&self.enemy, &self.player),
        };
        let outcome = resolve(&mv, &actor.stats, &target.stats, rng);
        let line = describe(side, &mv, &outcome);

        let (own, other) = match side {
            Side::Player => (&mut self.player_health, &mut self.enemy_health),
            Side::Enemy => (&mut self.enemy_health, &mut self.player_health),
        };
        *other = apply_damage(*other, outcome.damage);
        *own = apply_heal(*own, outcome.heal);
        let defeated = *other == 0;

        self.log.push(line);
        self.turns += 1;

        self.phase = if defeated {
            self.log.push(match side {
                Side::Player => "You won the battle!".to_string(),
                Side::Enemy => "You lost the battle!".to_string(),
            });
            BattlePhase::Finished { winner: side }
        } else {
            match side {
                Side::Player => BattlePhase::EnemyTurn,
                Side::Enemy => BattlePhase::PlayerTurn,
            }
        };

        TurnReport {
            side,
            mv,
            outcome,
            player_health: self.player_health,
            enemy_health: self.enemy_health,
            phase: self.phase,
        }
    }
}

fn describe(side: Side, mv: &BattleMove, outcome: &MoveOutcome) -> String {
    let who = match side {
        Side::Player => "Your robot",
        Side::Enemy => "Enemy robot",
    };
    let prefix = if outcome.critical { "CRITICAL HIT! " } else { "" };
    match mv.kind {
        MoveKind::Attack => format!(
            "{prefix}{who} used {} dealing {} damage!",
            mv.description, outcome.damage
        ),
        MoveKind::Defend => format!(
            "{who} used {} recovering {} health!",
            mv.description, outcome.heal
        ),
        MoveKind::Special => format!(
            "{who} used {} dealing {} damage and recovering {} health!",
            mv.description, outcome.damage, outcome.heal
        ),
    }
}

/// Result of one player move plus the enemy's reply, computed without a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    /// Damage dealt by the player.
    pub player_damage: i32,
    /// Damage dealt by the enemy.
    pub enemy_damage: i32,
    pub player_heal: i32,
    pub enemy_heal: i32,
    pub enemy_move: BattleMove,
    pub log: Vec<String>,
}

pub fn calculate_exchange<R: Rng + ?Sized>(
    player: &Combatant,
    enemy: &Combatant,
    player_move: &BattleMove,
    policy: EnemyPolicy,
    rng: &mut R,
) -> Exchange {
    let player_outcome = resolve(player_move, &player.stats, &enemy.stats, rng);

    let ctx = DecisionContext {
        enemy_stats: enemy.stats,
        enemy_health: MAX_HEALTH,
        player_health: MAX_HEALTH,
        last_player_move: Some(player_move.kind),
    };
    let enemy_mv = enemy_move(policy.choose(&ctx, rng));
    let enemy_outcome = resolve(&enemy_mv, &enemy.stats, &player.stats, rng);

    Exchange {
        player_damage: player_outcome.damage,
        enemy_damage: enemy_outcome.damage,
        player_heal: player_outcome.heal,
        enemy_heal: enemy_outcome.heal,
        log: vec![
            describe(Side::Player, player_move, &player_outcome),
            describe(Side::Enemy, &enemy_mv, &enemy_outcome),
        ],
        enemy_move: enemy_mv,
    }
}
