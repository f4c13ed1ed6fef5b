// In-memory store of running battle sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::ai::EnemyPolicy;
use crate::engine::battle::{Battle, BattleError, BattlePhase, Side, TurnReport};
use crate::engine::moves::BattleMove;
use crate::engine::progression::BattleOutcome;
use crate::engine::robot::Combatant;
use crate::metrics;

/// Finished battles stay readable this long after their last move.
pub const FINISHED_SESSION_TTL: Duration = Duration::from_secs(5 * 60);
/// Battles nobody has touched for this long are dropped.
pub const IDLE_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// A battle plus the RNG that drives it, so a seed replays the whole fight.
pub struct Session {
    pub battle: Battle,
    pub seed: u64,
    pub started_at: String,
    last_activity: Instant,
    rng: StdRng,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub seed: u64,
    pub started_at: String,
    pub player: Combatant,
    pub enemy: Combatant,
    pub player_health: i32,
    pub enemy_health: i32,
    pub phase: BattlePhase,
    pub winner: Option<Side>,
    pub turns: u32,
    pub log: Vec<String>,
    /// What the player earned, once the battle is over.
    pub reward: Option<SessionReward>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReward {
    pub outcome: BattleOutcome,
    pub credits: i64,
    pub experience: i64,
}

impl Session {
    fn is_expired(&self, now: Instant) -> bool {
        let idle = now.saturating_duration_since(self.last_activity);
        if self.battle.is_finished() {
            idle >= FINISHED_SESSION_TTL
        } else {
            idle >= IDLE_SESSION_TTL
        }
    }

    fn snapshot(&self, id: Uuid) -> SessionSnapshot {
        SessionSnapshot {
            id,
            seed: self.seed,
            started_at: self.started_at.clone(),
            player: self.battle.player().clone(),
            enemy: self.battle.enemy().clone(),
            player_health: self.battle.player_health(),
            enemy_health: self.battle.enemy_health(),
            phase: self.battle.phase(),
            winner: self.battle.winner(),
            turns: self.battle.turns(),
            log: self.battle.log().to_vec(),
            reward: self.reward(),
        }
    }

    fn reward(&self) -> Option<SessionReward> {
        let outcome = match self.battle.winner()? {
            Side::Player => BattleOutcome::Win,
            Side::Enemy => BattleOutcome::Loss,
        };
        Some(SessionReward {
            outcome,
            credits: outcome.credits(),
            experience: outcome.experience(self.battle.enemy().level),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("battle not found")]
    NotFound,
    #[error("'{0}' is not one of the arena moves")]
    IllegalMove(String),
    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// Thread-safe map of battle sessions keyed by id.
#[derive(Clone, Default)]
pub struct BattleStore {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl BattleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a battle and return its first snapshot.
    pub fn start(&self, player: Combatant, enemy: Combatant, seed: u64) -> SessionSnapshot {
        let now = Instant::now();
        let id = Uuid::new_v4();
        let session = Session {
            battle: Battle::started(player, enemy),
            seed,
            started_at: chrono::Utc::now().to_rfc3339(),
            last_activity: now,
            rng: StdRng::seed_from_u64(seed),
        };
        let snapshot = session.snapshot(id);

        let mut sessions = self.inner.lock().unwrap();
        prune(&mut sessions, now);
        sessions.insert(id, session);
        metrics::BATTLES_STARTED_TOTAL.inc();
        metrics::ACTIVE_BATTLES.set(count_running(&sessions));
        tracing::info!(battle_id = %id, seed, "battle started");
        snapshot
    }

    pub fn get(&self, id: Uuid) -> Option<SessionSnapshot> {
        let sessions = self.inner.lock().unwrap();
        sessions.get(&id).map(|s| s.snapshot(id))
    }

    /// Apply the player's move, then the enemy's reply if the battle goes on.
    /// Only the standard arena moves are accepted.
    pub fn submit_move(
        &self,
        id: Uuid,
        mv: &BattleMove,
        policy: EnemyPolicy,
    ) -> Result<(SessionSnapshot, Vec<TurnReport>), SessionError> {
        if !mv.is_player_move() {
            return Err(SessionError::IllegalMove(mv.description.clone()));
        }

        let mut sessions = self.inner.lock().unwrap();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        session.last_activity = Instant::now();

        let mut reports = Vec::with_capacity(2);
        let report = session.battle.player_move(mv, &mut session.rng)?;
        record_turn(&report);
        reports.push(report);

        if !session.battle.is_finished() {
            let report = session.battle.enemy_turn(policy, &mut session.rng)?;
            record_turn(&report);
            reports.push(report);
        }

        if let Some(winner) = session.battle.winner() {
            metrics::BATTLES_FINISHED_TOTAL
                .with_label_values(&[winner.as_str()])
                .inc();
            metrics::BATTLE_LENGTH_TURNS.observe(session.battle.turns() as f64);
            tracing::info!(battle_id = %id, winner = winner.as_str(), turns = session.battle.turns(), "battle finished");
        }

        let snapshot = session.snapshot(id);
        metrics::ACTIVE_BATTLES.set(count_running(&sessions));
        Ok((snapshot, reports))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut sessions = self.inner.lock().unwrap();
        let removed = sessions.remove(&id).is_some();
        metrics::ACTIVE_BATTLES.set(count_running(&sessions));
        removed
    }

    /// Drop finished and abandoned sessions whose time is up at `now`.
    /// Returns how many were removed.
    pub fn prune_expired(&self, now: Instant) -> usize {
        let mut sessions = self.inner.lock().unwrap();
        let removed = prune(&mut sessions, now);
        metrics::ACTIVE_BATTLES.set(count_running(&sessions));
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Periodically drop expired sessions in the background.
pub fn spawn_reaper(store: BattleStore, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            store.prune_expired(Instant::now());
        }
    })
}

fn prune(sessions: &mut HashMap<Uuid, Session>, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired(now));
    let removed = before - sessions.len();
    if removed > 0 {
        tracing::debug!(removed, "expired battle sessions dropped");
    }
    removed
}

fn count_running(sessions: &HashMap<Uuid, Session>) -> i64 {
    sessions.values().filter(|s| !s.battle.is_finished()).count() as i64
}

fn record_turn(report: &TurnReport) {
    metrics::MOVES_RESOLVED_TOTAL
        .with_label_values(&[report.side.as_str(), report.mv.kind.as_str()])
        .inc();
    if report.outcome.critical {
        metrics::CRITICAL_HITS_TOTAL.inc();
    }
}
