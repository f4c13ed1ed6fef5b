// Enemy move selection.
//
// Two policies are available. `Weighted` samples from stat-biased weights with
// a counter to the player's previous move; `Situational` reacts to health.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::*;
use super::moves::MoveKind;
use super::stats::StatBlock;

/// Everything a policy may look at when choosing the enemy's move.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext {
    pub enemy_stats: StatBlock,
    pub enemy_health: i32,
    pub player_health: i32,
    pub last_player_move: Option<MoveKind>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyPolicy {
    Weighted,
    #[default]
    Situational,
}

impl EnemyPolicy {
    pub fn choose<R: Rng + ?Sized>(&self, ctx: &DecisionContext, rng: &mut R) -> MoveKind {
        match self {
            EnemyPolicy::Weighted => {
                let weights = move_weights(&ctx.enemy_stats, ctx.last_player_move);
                sample(&weights, rng.gen::<f64>())
            }
            EnemyPolicy::Situational => {
                if ctx.enemy_health < ENEMY_DEFENSIVE_HEALTH {
                    MoveKind::Defend
                } else if ctx.player_health < PLAYER_FINISHER_HEALTH {
                    MoveKind::Special
                } else {
                    MoveKind::ALL[rng.gen_range(0..MoveKind::ALL.len())]
                }
            }
        }
    }
}

impl fmt::Display for EnemyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnemyPolicy::Weighted => write!(f, "weighted"),
            EnemyPolicy::Situational => write!(f, "situational"),
        }
    }
}

impl FromStr for EnemyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weighted" => Ok(EnemyPolicy::Weighted),
            "situational" => Ok(EnemyPolicy::Situational),
            other => Err(format!("unknown enemy policy '{other}'")),
        }
    }
}

/// Normalised probabilities for [attack, defend, special].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveWeights {
    pub attack: f64,
    pub defend: f64,
    pub special: f64,
}

/// Stat affinities and the counter-bias, clamped at zero and renormalised.
pub fn move_weights(enemy: &StatBlock, last_player_move: Option<MoveKind>) -> MoveWeights {
    let mut w = [BASE_ATTACK_WEIGHT, BASE_DEFEND_WEIGHT, BASE_SPECIAL_WEIGHT];

    let affinities = [(enemy.power, 0), (enemy.defense, 1), (enemy.energy, 2)];
    for (stat, favoured) in affinities {
        if stat > STAT_AFFINITY_THRESHOLD {
            for (i, weight) in w.iter_mut().enumerate() {
                if i == favoured {
                    *weight += AFFINITY_BONUS;
                } else {
                    *weight -= AFFINITY_PENALTY;
                }
            }
        }
    }

    match last_player_move {
        Some(MoveKind::Attack) => w[1] += COUNTER_BONUS,
        Some(MoveKind::Defend) => w[2] += COUNTER_BONUS,
        Some(MoveKind::Special) => w[0] += COUNTER_BONUS,
        None => {}
    }

    for weight in &mut w {
        *weight = weight.max(0.0);
    }
    let total: f64 = w.iter().sum();
    if total <= 0.0 {
        let third = 1.0 / 3.0;
        return MoveWeights {
            attack: third,
            defend: third,
            special: third,
        };
    }

    MoveWeights {
        attack: w[0] / total,
        defend: w[1] / total,
        special: w[2] / total,
    }
}

/// Map a uniform draw in [0, 1) onto the weights.
fn sample(weights: &MoveWeights, roll: f64) -> MoveKind {
    if roll < weights.attack {
        MoveKind::Attack
    } else if roll < weights.attack + weights.defend {
        MoveKind::Defend
    } else {
        MoveKind::Special
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn ctx(enemy_health: i32, player_health: i32) -> DecisionContext {
        DecisionContext {
            enemy_stats: StatBlock::new(50, 50, 50, 50),
            enemy_health,
            player_health,
            last_player_move: None,
        }
    }

    #[test]
    fn test_base_weights() {
        let w = move_weights(&StatBlock::new(50, 50, 50, 50), None);
        assert!(approx(w.attack, 0.4));
        assert!(approx(w.defend, 0.3));
        assert!(approx(w.special, 0.3));
    }

    #[test]
    fn test_power_affinity_and_counter() {
        // attack 0.6, defend 0.2 + 0.1, special 0.2 -> total 1.1
        let w = move_weights(&StatBlock::new(90, 10, 10, 10), Some(MoveKind::Attack));
        assert!(approx(w.attack, 0.6 / 1.1));
        assert!(approx(w.defend, 0.3 / 1.1));
        assert!(approx(w.special, 0.2 / 1.1));
    }

    #[test]
    fn test_all_affinities_cancel_out() {
        let w = move_weights(&StatBlock::new(90, 90, 90, 90), None);
        assert!(approx(w.attack, 0.4));
        assert!(approx(w.defend, 0.3));
        assert!(approx(w.special, 0.3));
    }

    #[test]
    fn test_weights_sum_to_one() {
        for power in [0, 71, 100] {
            for defense in [0, 71, 100] {
                for energy in [0, 71, 100] {
                    for last in [None, Some(MoveKind::Attack), Some(MoveKind::Special)] {
                        let w = move_weights(&StatBlock::new(power, defense, 0, energy), last);
                        assert!(approx(w.attack + w.defend + w.special, 1.0));
                        assert!(w.attack >= 0.0 && w.defend >= 0.0 && w.special >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sample_boundaries() {
        let w = MoveWeights {
            attack: 0.5,
            defend: 0.25,
            special: 0.25,
        };
        assert_eq!(sample(&w, 0.0), MoveKind::Attack);
        assert_eq!(sample(&w, 0.5), MoveKind::Defend);
        assert_eq!(sample(&w, 0.74), MoveKind::Defend);
        assert_eq!(sample(&w, 0.75), MoveKind::Special);
    }

    #[test]
    fn test_situational_defends_when_low() {
        let mut rng = StdRng::seed_from_u64(11);
        let policy = EnemyPolicy::Situational;
        assert_eq!(policy.choose(&ctx(29, 10), &mut rng), MoveKind::Defend);
        assert_eq!(policy.choose(&ctx(30, 39), &mut rng), MoveKind::Special);
    }

    #[test]
    fn test_situational_random_otherwise() {
        let mut rng = StdRng::seed_from_u64(12);
        let policy = EnemyPolicy::Situational;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(policy.choose(&ctx(100, 100), &mut rng));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_weighted_follows_distribution() {
        let mut rng = StdRng::seed_from_u64(13);
        let policy = EnemyPolicy::Weighted;
        let context = DecisionContext {
            enemy_stats: StatBlock::new(90, 10, 10, 10),
            enemy_health: 100,
            player_health: 100,
            last_player_move: Some(MoveKind::Special),
        };
        let attacks = (0..2000)
            .filter(|_| policy.choose(&context, &mut rng) == MoveKind::Attack)
            .count();
        // expected share 0.7 / 1.1 ~ 0.64
        assert!((1100..1450).contains(&attacks), "attacks = {attacks}");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Weighted".parse::<EnemyPolicy>(), Ok(EnemyPolicy::Weighted));
        assert_eq!("situational".parse::<EnemyPolicy>(), Ok(EnemyPolicy::Situational));
        assert!("greedy".parse::<EnemyPolicy>().is_err());
        assert_eq!(EnemyPolicy::default(), EnemyPolicy::Situational);
    }
}
