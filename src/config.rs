// Application configuration, loaded from environment variables and CLI flags.

use crate::engine::ai::EnemyPolicy;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
    /// Maximum pooled database connections.
    pub db_max_connections: u32,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// How AI opponents pick their moves.
    pub enemy_policy: EnemyPolicy,
    /// Fixed RNG seed for reproducible battles. Random per battle when unset.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:robot_arena.db?mode=rwc".to_string(),
            db_max_connections: 5,
            port: 3000,
            enemy_policy: EnemyPolicy::default(),
            rng_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:robot_arena.db?mode=rwc`)
    /// - `DB_MAX_CONNECTIONS` - pool size (default: 5)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `ARENA_ENEMY_POLICY` - `weighted` or `situational` (default: `situational`)
    /// - `ARENA_RNG_SEED` - fixed seed for every battle
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--enemy-policy <POLICY>` - Override the enemy policy
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from CLI args and an env lookup. CLI wins over env,
    /// env wins over defaults; unparsable values fall back with a warning.
    pub fn from_sources<F>(args: &[String], env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let database_url = env("DATABASE_URL").unwrap_or(defaults.database_url);

        let db_max_connections = env("DB_MAX_CONNECTIONS")
            .and_then(|v| parse_or_warn("DB_MAX_CONNECTIONS", &v))
            .unwrap_or(defaults.db_max_connections);

        let port = Self::parse_cli_value(args, "--port")
            .or_else(|| env("PORT"))
            .and_then(|v| parse_or_warn("port", &v))
            .unwrap_or(defaults.port);

        let enemy_policy = Self::parse_cli_value(args, "--enemy-policy")
            .or_else(|| env("ARENA_ENEMY_POLICY"))
            .and_then(|v| parse_or_warn("enemy policy", &v))
            .unwrap_or(defaults.enemy_policy);

        let rng_seed = env("ARENA_RNG_SEED").and_then(|v| parse_or_warn("ARENA_RNG_SEED", &v));

        Config {
            database_url,
            db_max_connections,
            port,
            enemy_policy,
            rng_seed,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

fn parse_or_warn<T: std::str::FromStr>(what: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring invalid {what}: {value:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(&args(&["arena"]), env_of(&[]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "sqlite:robot_arena.db?mode=rwc");
        assert_eq!(config.enemy_policy, EnemyPolicy::Situational);
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_sources(
            &args(&["arena"]),
            env_of(&[
                ("PORT", "8080"),
                ("ARENA_ENEMY_POLICY", "weighted"),
                ("ARENA_RNG_SEED", "1234"),
                ("DB_MAX_CONNECTIONS", "2"),
            ]),
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.enemy_policy, EnemyPolicy::Weighted);
        assert_eq!(config.rng_seed, Some(1234));
        assert_eq!(config.db_max_connections, 2);
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = Config::from_sources(
            &args(&["arena", "--port", "9000", "--enemy-policy", "situational"]),
            env_of(&[("PORT", "8080"), ("ARENA_ENEMY_POLICY", "weighted")]),
        );
        assert_eq!(config.port, 9000);
        assert_eq!(config.enemy_policy, EnemyPolicy::Situational);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_sources(
            &args(&["arena"]),
            env_of(&[("PORT", "not-a-port"), ("ARENA_ENEMY_POLICY", "chaotic")]),
        );
        assert_eq!(config.port, 3000);
        assert_eq!(config.enemy_policy, EnemyPolicy::Situational);
    }
}
