// Damage and heal formulas for the three move kinds.
//
// Every function here is pure apart from the critical-hit roll, which draws
// from the caller's RNG so a seeded battle replays exactly.

use rand::Rng;
use serde::Serialize;

use super::config::*;
use super::moves::{BattleMove, MoveKind};
use super::stats::StatBlock;

/// Result of resolving one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub kind: MoveKind,
    /// Damage dealt to the target.
    pub damage: i32,
    /// Health restored to the actor.
    pub heal: i32,
    pub critical: bool,
}

fn non_negative_round(v: f64) -> i32 {
    v.round().max(0.0) as i32
}

/// Probability of a critical attack, in [0, 1].
pub fn critical_chance(actor: &StatBlock) -> f64 {
    (actor.speed as f64 / CRIT_SPEED_DIVISOR).clamp(0.0, 1.0)
}

pub fn attack_damage(base: i32, actor: &StatBlock, target: &StatBlock, critical: bool) -> i32 {
    let multiplier = if critical { CRIT_MULTIPLIER } else { 1.0 };
    let power_bonus = actor.power as f64 / ATTACK_POWER_DIVISOR;
    let reduction = 1.0 - target.defense as f64 / ATTACK_DEFENSE_DIVISOR;
    non_negative_round(base as f64 * power_bonus * multiplier * reduction)
}

pub fn defend_heal(base: i32, actor: &StatBlock) -> i32 {
    let bonus = actor.defense as f64 / DEFEND_DEFENSE_DIVISOR
        + actor.energy as f64 / DEFEND_ENERGY_DIVISOR;
    non_negative_round(base as f64 * bonus)
}

pub fn special_damage(base: i32, actor: &StatBlock, target: &StatBlock) -> i32 {
    let bonus = actor.energy as f64 / SPECIAL_ENERGY_DIVISOR
        + actor.power as f64 / SPECIAL_POWER_DIVISOR;
    let reduction = 1.0 - target.defense as f64 / SPECIAL_DEFENSE_DIVISOR;
    non_negative_round(base as f64 * bonus * reduction)
}

pub fn special_heal(base: i32) -> i32 {
    non_negative_round(base as f64 * SPECIAL_SELF_HEAL_RATIO)
}

/// Resolve `mv` performed by `actor` against `target`.
pub fn resolve<R: Rng + ?Sized>(
    mv: &BattleMove,
    actor: &StatBlock,
    target: &StatBlock,
    rng: &mut R,
) -> MoveOutcome {
    match mv.kind {
        MoveKind::Attack => {
            let critical = rng.gen_bool(critical_chance(actor));
            MoveOutcome {
                kind: MoveKind::Attack,
                damage: attack_damage(mv.power, actor, target, critical),
                heal: 0,
                critical,
            }
        }
        MoveKind::Defend => MoveOutcome {
            kind: MoveKind::Defend,
            damage: 0,
            heal: defend_heal(mv.power, actor),
            critical: false,
        },
        MoveKind::Special => MoveOutcome {
            kind: MoveKind::Special,
            damage: special_damage(mv.power, actor, target),
            heal: special_heal(mv.power),
            critical: false,
        },
    }
}

pub fn apply_damage(health: i32, amount: i32) -> i32 {
    health
        .saturating_sub(amount.max(0))
        .clamp(MIN_HEALTH, MAX_HEALTH)
}

pub fn apply_heal(health: i32, amount: i32) -> i32 {
    health
        .saturating_add(amount.max(0))
        .clamp(MIN_HEALTH, MAX_HEALTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stats(power: i32, defense: i32, speed: i32, energy: i32) -> StatBlock {
        StatBlock::new(power, defense, speed, energy)
    }

    #[test]
    fn test_attack_reference_value() {
        // 20 * 0.5 * (1 - 50/150) = 6.67
        let dmg = attack_damage(20, &stats(50, 0, 0, 0), &stats(0, 50, 0, 0), false);
        assert_eq!(dmg, 7);
    }

    #[test]
    fn test_attack_critical_multiplier() {
        // 20 * 0.5 * 1.5 * (2/3) = 10
        let dmg = attack_damage(20, &stats(50, 0, 0, 0), &stats(0, 50, 0, 0), true);
        assert_eq!(dmg, 10);
    }

    #[test]
    fn test_attack_never_negative() {
        let dmg = attack_damage(20, &stats(100, 0, 0, 0), &stats(0, 400, 0, 0), false);
        assert_eq!(dmg, 0);
    }

    #[test]
    fn test_attack_monotonic_in_defense() {
        let attacker = stats(80, 0, 0, 0);
        let mut previous = i32::MAX;
        for defense in 0..=200 {
            let dmg = attack_damage(25, &attacker, &stats(0, defense, 0, 0), false);
            assert!(dmg >= 0);
            assert!(dmg <= previous, "defense {defense}: {dmg} > {previous}");
            previous = dmg;
        }
    }

    #[test]
    fn test_defend_heals_from_own_stats() {
        // 10 * (60/100 + 80/200) = 10
        assert_eq!(defend_heal(10, &stats(0, 60, 0, 80)), 10);
        assert_eq!(defend_heal(15, &stats(0, 0, 0, 0)), 0);
    }

    #[test]
    fn test_special_damage_and_heal() {
        // 30 * (70/100 + 60/200) * (1 - 90/300) = 30 * 1.0 * 0.7 = 21
        assert_eq!(special_damage(30, &stats(60, 0, 0, 70), &stats(0, 90, 0, 0)), 21);
        assert_eq!(special_heal(30), 6);
        assert_eq!(special_heal(25), 5);
    }

    #[test]
    fn test_critical_chance_is_capped() {
        assert_eq!(critical_chance(&stats(0, 0, 100, 0)), 0.5);
        assert_eq!(critical_chance(&stats(0, 0, 500, 0)), 1.0);
        assert_eq!(critical_chance(&stats(0, 0, 0, 0)), 0.0);
    }

    #[test]
    fn test_resolve_attack_without_speed_never_crits() {
        let mut rng = StdRng::seed_from_u64(1);
        let mv = BattleMove::new(MoveKind::Attack, 20, "Cloud Cannon Attack");
        for _ in 0..50 {
            let out = resolve(&mv, &stats(50, 0, 0, 0), &stats(0, 50, 0, 0), &mut rng);
            assert!(!out.critical);
            assert_eq!(out.damage, 7);
            assert_eq!(out.heal, 0);
        }
    }

    #[test]
    fn test_resolve_attack_with_full_speed_always_crits() {
        let mut rng = StdRng::seed_from_u64(2);
        let mv = BattleMove::new(MoveKind::Attack, 20, "Cloud Cannon Attack");
        let out = resolve(&mv, &stats(50, 0, 200, 0), &stats(0, 50, 0, 0), &mut rng);
        assert!(out.critical);
        assert_eq!(out.damage, 10);
    }

    #[test]
    fn test_resolve_special_heals_actor() {
        let mut rng = StdRng::seed_from_u64(3);
        let mv = BattleMove::new(MoveKind::Special, 30, "Function Compute Special");
        let out = resolve(&mv, &stats(60, 0, 0, 70), &stats(0, 90, 0, 0), &mut rng);
        assert_eq!(out.damage, 21);
        assert_eq!(out.heal, 6);
    }

    #[test]
    fn test_health_clamping() {
        assert_eq!(apply_damage(5, 20), 0);
        assert_eq!(apply_damage(50, -10), 50);
        assert_eq!(apply_heal(95, 20), 100);
        assert_eq!(apply_heal(0, 0), 0);
        assert_eq!(apply_heal(100, i32::MAX), 100);
        assert_eq!(apply_damage(1, i32::MAX), 0);
    }

    #[test]
    fn test_extreme_inputs_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(4);
        let huge = stats(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
        for kind in MoveKind::ALL {
            let mv = BattleMove::new(kind, i32::MAX, "overload");
            let out = resolve(&mv, &huge, &stats(0, 0, 0, 0), &mut rng);
            assert!(out.damage >= 0 && out.heal >= 0);
            for health in [0, 1, 50, 100] {
                let after_hit = apply_damage(health, out.damage);
                let after_heal = apply_heal(health, out.heal);
                assert!((MIN_HEALTH..=MAX_HEALTH).contains(&after_hit));
                assert!((MIN_HEALTH..=MAX_HEALTH).contains(&after_heal));
            }
        }
    }
}
