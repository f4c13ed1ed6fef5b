use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use super::config::MAX_STAT_VALUE;

/// The four combat stats shared by parts, robots and combatants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub power: i32,
    pub defense: i32,
    pub speed: i32,
    pub energy: i32,
}

impl StatBlock {
    pub const fn new(power: i32, defense: i32, speed: i32, energy: i32) -> Self {
        Self {
            power,
            defense,
            speed,
            energy,
        }
    }

    /// Multiply every stat by `factor`, rounding each to the nearest integer.
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |v: i32| (v as f64 * factor).round() as i32;
        Self {
            power: scale(self.power),
            defense: scale(self.defense),
            speed: scale(self.speed),
            energy: scale(self.energy),
        }
    }

    /// Every stat within `0..=MAX_STAT_VALUE`.
    pub fn is_valid(&self) -> bool {
        [self.power, self.defense, self.speed, self.energy]
            .iter()
            .all(|v| (0..=MAX_STAT_VALUE).contains(v))
    }
}

impl Add for StatBlock {
    type Output = StatBlock;

    fn add(self, rhs: StatBlock) -> StatBlock {
        StatBlock {
            power: self.power.saturating_add(rhs.power),
            defense: self.defense.saturating_add(rhs.defense),
            speed: self.speed.saturating_add(rhs.speed),
            energy: self.energy.saturating_add(rhs.energy),
        }
    }
}

impl Sum for StatBlock {
    fn sum<I: Iterator<Item = StatBlock>>(iter: I) -> Self {
        iter.fold(StatBlock::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_of_blocks() {
        let total: StatBlock = [
            StatBlock::new(15, 10, 5, 20),
            StatBlock::new(10, 30, 5, 25),
            StatBlock::new(35, 5, 15, 20),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, StatBlock::new(60, 45, 25, 65));
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: StatBlock = std::iter::empty().sum();
        assert_eq!(total, StatBlock::default());
    }

    #[test]
    fn test_scaled_rounds_each_stat() {
        let grown = StatBlock::new(55, 45, 25, 5).scaled(1.1);
        // 60.5 rounds away from zero, 49.5 likewise
        assert_eq!(grown, StatBlock::new(61, 50, 28, 6));
    }

    #[test]
    fn test_validity() {
        assert!(StatBlock::new(0, 0, 0, 0).is_valid());
        assert!(!StatBlock::new(10, -1, 0, 0).is_valid());
        assert!(StatBlock::new(1000, 1000, 1000, 1000).is_valid());
        assert!(!StatBlock::new(0, 0, i32::MAX, 0).is_valid());
    }

    #[test]
    fn test_add_saturates() {
        let big = StatBlock::new(i32::MAX, 0, 0, 0) + StatBlock::new(1, 2, 3, 4);
        assert_eq!(big, StatBlock::new(i32::MAX, 2, 3, 4));
    }
}
