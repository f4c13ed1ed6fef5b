// Battle and economy constants.

// Health
pub const MAX_HEALTH: i32 = 100;
pub const MIN_HEALTH: i32 = 0;

// Attack: crit chance is speed / CRIT_SPEED_DIVISOR
pub const CRIT_MULTIPLIER: f64 = 1.5;
pub const CRIT_SPEED_DIVISOR: f64 = 200.0;
pub const ATTACK_POWER_DIVISOR: f64 = 100.0;
pub const ATTACK_DEFENSE_DIVISOR: f64 = 150.0;

// Defend (self heal)
pub const DEFEND_DEFENSE_DIVISOR: f64 = 100.0;
pub const DEFEND_ENERGY_DIVISOR: f64 = 200.0;

// Special
pub const SPECIAL_ENERGY_DIVISOR: f64 = 100.0;
pub const SPECIAL_POWER_DIVISOR: f64 = 200.0;
pub const SPECIAL_DEFENSE_DIVISOR: f64 = 300.0;
pub const SPECIAL_SELF_HEAL_RATIO: f64 = 0.2;

// Weighted enemy policy
pub const BASE_ATTACK_WEIGHT: f64 = 0.4;
pub const BASE_DEFEND_WEIGHT: f64 = 0.3;
pub const BASE_SPECIAL_WEIGHT: f64 = 0.3;
pub const STAT_AFFINITY_THRESHOLD: i32 = 70;
pub const AFFINITY_BONUS: f64 = 0.2;
pub const AFFINITY_PENALTY: f64 = 0.1;
pub const COUNTER_BONUS: f64 = 0.1;

// Situational enemy policy
pub const ENEMY_DEFENSIVE_HEALTH: i32 = 30;
pub const PLAYER_FINISHER_HEALTH: i32 = 40;

// Economy
pub const STARTING_CREDITS: i64 = 1000;
pub const WIN_CREDITS: i64 = 200;
pub const LOSS_CREDITS: i64 = 50;

// Experience
pub const STARTING_LEVEL: i32 = 1;
pub const BASE_WIN_EXPERIENCE: i64 = 100;
pub const EXPERIENCE_PER_ENEMY_LEVEL: i64 = 20;
pub const LOSS_EXPERIENCE: i64 = 30;
pub const EXPERIENCE_PER_LEVEL: i64 = 100;
pub const LEVEL_STAT_GROWTH: f64 = 1.1;

pub const LEADERBOARD_SIZE: i64 = 10;

// Limits on client-supplied numbers
pub const MAX_STAT_VALUE: i32 = 1000;
pub const MAX_MOVE_POWER: i32 = 100;
pub const MAX_EXPERIENCE_GAIN: i64 = 10_000;
