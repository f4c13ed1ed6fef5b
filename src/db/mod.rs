// Database access layer (SQLite via sqlx): players, robots, leaderboard.

use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use thiserror::Error;

use crate::engine::catalog::PartSlot;
use crate::engine::config::LEADERBOARD_SIZE;
use crate::engine::hangar::{HangarError, Player};
use crate::engine::progression::{BattleOutcome, LevelProgress};
use crate::engine::robot::{Loadout, Robot};
use crate::engine::stats::StatBlock;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("player {0} not found")]
    PlayerNotFound(i64),
    #[error(transparent)]
    Hangar(#[from] HangarError),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub credits: i64,
    pub wins: i64,
    pub losses: i64,
    pub active_robot_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RobotRow {
    pub id: i64,
    pub player_id: i64,
    pub name: String,
    pub level: i32,
    pub experience: i64,
    pub head_part_id: Option<String>,
    pub body_part_id: Option<String>,
    pub arms_part_id: Option<String>,
    pub legs_part_id: Option<String>,
    pub stats_power: i32,
    pub stats_defense: i32,
    pub stats_speed: i32,
    pub stats_energy: i32,
    pub created_at: String,
}

/// Wire shape of a stored robot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotSummary {
    pub id: i64,
    pub player_id: i64,
    pub name: String,
    pub level: i32,
    pub experience: i64,
    pub parts: Loadout,
    pub stats: StatBlock,
}

impl RobotRow {
    pub fn stats(&self) -> StatBlock {
        StatBlock::new(
            self.stats_power,
            self.stats_defense,
            self.stats_speed,
            self.stats_energy,
        )
    }

    pub fn loadout(&self) -> Loadout {
        Loadout::from_ids(
            self.head_part_id.as_deref(),
            self.body_part_id.as_deref(),
            self.arms_part_id.as_deref(),
            self.legs_part_id.as_deref(),
        )
    }

    pub fn to_robot(&self) -> Robot {
        Robot {
            id: self.id,
            name: self.name.clone(),
            parts: self.loadout(),
            level: self.level,
            experience: self.experience,
        }
    }

    pub fn summary(&self) -> RobotSummary {
        RobotSummary {
            id: self.id,
            player_id: self.player_id,
            name: self.name.clone(),
            level: self.level,
            experience: self.experience,
            parts: self.loadout(),
            stats: self.stats(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LeaderboardRow {
    id: i64,
    name: String,
    wins: i64,
    losses: i64,
    robot_id: Option<i64>,
    robot_name: Option<String>,
    level: Option<i32>,
    power: Option<i32>,
    defense: Option<i32>,
    speed: Option<i32>,
    energy: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    pub wins: i64,
    pub losses: i64,
    pub robot_id: Option<i64>,
    pub robot_name: Option<String>,
    pub robot_level: Option<i32>,
    pub robot_stats: Option<StatBlock>,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        let robot_stats = match (row.power, row.defense, row.speed, row.energy) {
            (Some(p), Some(d), Some(s), Some(e)) => Some(StatBlock::new(p, d, s, e)),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            wins: row.wins,
            losses: row.losses,
            robot_id: row.robot_id,
            robot_name: row.robot_name,
            robot_level: row.level,
            robot_stats,
        }
    }
}

/// What a recorded battle changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub player_rank: i64,
    pub progress: LevelProgress,
}

const ROBOT_COLUMNS: &str = "id, player_id, name, level, experience, head_part_id, body_part_id, arms_part_id, legs_part_id, stats_power, stats_defense, stats_speed, stats_energy, created_at";
const PLAYER_COLUMNS: &str = "id, name, credits, wins, losses, active_robot_id, created_at";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        // Connections are never recycled so an in-memory database survives.
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                credits INTEGER NOT NULL DEFAULT 1000,
                wins INTEGER NOT NULL DEFAULT 0,
                losses INTEGER NOT NULL DEFAULT 0,
                active_robot_id INTEGER,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS robots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 1,
                experience INTEGER NOT NULL DEFAULT 0,
                head_part_id TEXT,
                body_part_id TEXT,
                arms_part_id TEXT,
                legs_part_id TEXT,
                stats_power INTEGER NOT NULL DEFAULT 0,
                stats_defense INTEGER NOT NULL DEFAULT 0,
                stats_speed INTEGER NOT NULL DEFAULT 0,
                stats_energy INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_wins ON players(wins DESC)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ── Players ───────────────────────────────────────────────────────

    pub async fn create_player(&self, name: &str) -> Result<PlayerRow, sqlx::Error> {
        let row = sqlx::query_as::<_, PlayerRow>(&format!(
            "INSERT INTO players (name) VALUES (?) RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_player(&self, id: i64) -> Result<Option<PlayerRow>, sqlx::Error> {
        let row = sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Robots ────────────────────────────────────────────────────────

    pub async fn list_robots(&self, player_id: i64) -> Result<Vec<RobotRow>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RobotRow>(&format!(
            "SELECT {ROBOT_COLUMNS} FROM robots WHERE player_id = ? ORDER BY id"
        ))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Load a player with all their robots as an engine `Player`.
    pub async fn load_player(&self, player_id: i64) -> Result<Option<Player>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        load_player(&mut conn, player_id).await
    }

    /// Create an empty robot for the player and make it active.
    pub async fn create_robot(&self, player_id: i64, name: &str) -> Result<RobotRow, DbError> {
        let mut tx = self.pool.begin().await?;

        let mut player = load_player(&mut tx, player_id)
            .await?
            .ok_or(DbError::PlayerNotFound(player_id))?;

        let robot = sqlx::query_as::<_, RobotRow>(&format!(
            "INSERT INTO robots (player_id, name) VALUES (?, ?) RETURNING {ROBOT_COLUMNS}"
        ))
        .bind(player_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        player.create_robot(robot.id, &robot.name);
        save_player(&mut tx, &player).await?;

        tx.commit().await?;
        Ok(robot)
    }

    pub async fn set_active_robot(&self, player_id: i64, robot_id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let mut player = load_player(&mut tx, player_id)
            .await?
            .ok_or(DbError::PlayerNotFound(player_id))?;
        player.set_active_robot(robot_id)?;
        save_player(&mut tx, &player).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Buy a part and install it on one of the player's robots. Credits,
    /// part columns and stat columns change together or not at all.
    pub async fn purchase_part(
        &self,
        player_id: i64,
        robot_id: i64,
        part_id: &str,
    ) -> Result<(PlayerRow, RobotRow), DbError> {
        let mut tx = self.pool.begin().await?;

        let mut player = load_player(&mut tx, player_id)
            .await?
            .ok_or(DbError::PlayerNotFound(player_id))?;
        let robot = player.buy_part(part_id, robot_id)?;
        save_robot(&mut tx, robot).await?;
        save_player(&mut tx, &player).await?;

        let player_row = fetch_player(&mut tx, player_id)
            .await?
            .ok_or(DbError::PlayerNotFound(player_id))?;
        let robot_row = fetch_robot(&mut tx, player_id, robot_id)
            .await?
            .ok_or(HangarError::RobotNotFound(robot_id))?;

        tx.commit().await?;
        Ok((player_row, robot_row))
    }

    // ── Leaderboard ───────────────────────────────────────────────────

    /// Apply a finished battle in one transaction: record, credits, robot
    /// experience and level, then the player's rank. Any failure drops the
    /// transaction, which rolls it back.
    pub async fn record_battle_outcome(
        &self,
        player_id: i64,
        robot_id: i64,
        outcome: BattleOutcome,
        experience_gained: i64,
    ) -> Result<BattleRecord, DbError> {
        let mut tx = self.pool.begin().await?;

        let mut player = load_player(&mut tx, player_id)
            .await?
            .ok_or(DbError::PlayerNotFound(player_id))?;
        let reward = player.record_battle(outcome, robot_id, experience_gained)?;

        save_player(&mut tx, &player).await?;
        if let Some(robot) = player.robot(robot_id) {
            save_robot(&mut tx, robot).await?;
        }

        let player_rank = player_rank(&mut tx, player_id).await?;

        tx.commit().await?;
        Ok(BattleRecord {
            player_rank,
            progress: reward.progress,
        })
    }

    pub async fn player_rank(&self, player_id: i64) -> Result<i64, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        player_rank(&mut conn, player_id).await
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT p.id, p.name, p.wins, p.losses,
                   r.id AS robot_id, r.name AS robot_name, r.level,
                   r.stats_power AS power, r.stats_defense AS defense,
                   r.stats_speed AS speed, r.stats_energy AS energy
            FROM players p
            LEFT JOIN robots r ON p.active_robot_id = r.id
            ORDER BY p.wins DESC, p.id ASC
            LIMIT ?
        "#,
        )
        .bind(LEADERBOARD_SIZE)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
    }
}

async fn fetch_player(
    conn: &mut SqliteConnection,
    player_id: i64,
) -> Result<Option<PlayerRow>, sqlx::Error> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?"
    ))
    .bind(player_id)
    .fetch_optional(conn)
    .await
}

async fn fetch_robot(
    conn: &mut SqliteConnection,
    player_id: i64,
    robot_id: i64,
) -> Result<Option<RobotRow>, sqlx::Error> {
    sqlx::query_as::<_, RobotRow>(&format!(
        "SELECT {ROBOT_COLUMNS} FROM robots WHERE id = ? AND player_id = ?"
    ))
    .bind(robot_id)
    .bind(player_id)
    .fetch_optional(conn)
    .await
}

async fn load_player(
    conn: &mut SqliteConnection,
    player_id: i64,
) -> Result<Option<Player>, sqlx::Error> {
    let Some(row) = fetch_player(&mut *conn, player_id).await? else {
        return Ok(None);
    };
    let robots = sqlx::query_as::<_, RobotRow>(&format!(
        "SELECT {ROBOT_COLUMNS} FROM robots WHERE player_id = ? ORDER BY id"
    ))
    .bind(player_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(Player {
        id: row.id,
        name: row.name,
        credits: row.credits,
        robots: robots.iter().map(RobotRow::to_robot).collect(),
        active_robot_id: row.active_robot_id,
        wins: row.wins,
        losses: row.losses,
    }))
}

/// Write back the player's wallet, record and active robot.
async fn save_player(conn: &mut SqliteConnection, player: &Player) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE players SET credits = ?, wins = ?, losses = ?, active_robot_id = ? WHERE id = ?",
    )
    .bind(player.credits)
    .bind(player.wins)
    .bind(player.losses)
    .bind(player.active_robot_id)
    .bind(player.id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Write back a robot's parts, progress and the stats its parts add up to.
async fn save_robot(conn: &mut SqliteConnection, robot: &Robot) -> Result<(), sqlx::Error> {
    let part_id = |slot: PartSlot| robot.parts.get(slot).map(|p| p.id);
    let stats = robot.stats();
    sqlx::query(
        "UPDATE robots SET head_part_id = ?, body_part_id = ?, arms_part_id = ?, legs_part_id = ?, \
         stats_power = ?, stats_defense = ?, stats_speed = ?, stats_energy = ?, \
         level = ?, experience = ? WHERE id = ?",
    )
    .bind(part_id(PartSlot::Head))
    .bind(part_id(PartSlot::Body))
    .bind(part_id(PartSlot::Arms))
    .bind(part_id(PartSlot::Legs))
    .bind(stats.power)
    .bind(stats.defense)
    .bind(stats.speed)
    .bind(stats.energy)
    .bind(robot.level)
    .bind(robot.experience)
    .bind(robot.id)
    .execute(conn)
    .await?;
    Ok(())
}

/// 1 + the number of players with strictly more wins.
async fn player_rank(conn: &mut SqliteConnection, player_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) + 1 FROM players WHERE wins > (SELECT wins FROM players WHERE id = ?)",
    )
    .bind(player_id)
    .fetch_one(conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::connect("sqlite::memory:", 1).await.unwrap()
    }

    async fn robot_row(db: &Database, player_id: i64, robot_id: i64) -> RobotRow {
        db.list_robots(player_id)
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.id == robot_id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_player() {
        let db = test_db().await;

        let p = db.create_player("Ada").await.unwrap();
        assert_eq!(p.name, "Ada");
        assert_eq!(p.credits, 1000);
        assert_eq!(p.wins, 0);
        assert!(p.active_robot_id.is_none());

        let fetched = db.get_player(p.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ada");
        assert!(db.get_player(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_robot_sets_active() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();

        let r1 = db.create_robot(p.id, "Rusty").await.unwrap();
        assert_eq!(r1.level, 1);
        assert_eq!(r1.stats(), StatBlock::default());
        let r2 = db.create_robot(p.id, "Sparky").await.unwrap();

        let player = db.get_player(p.id).await.unwrap().unwrap();
        assert_eq!(player.active_robot_id, Some(r2.id));
        assert_eq!(db.list_robots(p.id).await.unwrap().len(), 2);

        db.set_active_robot(p.id, r1.id).await.unwrap();
        let player = db.get_player(p.id).await.unwrap().unwrap();
        assert_eq!(player.active_robot_id, Some(r1.id));
    }

    #[tokio::test]
    async fn test_create_robot_for_missing_player() {
        let db = test_db().await;
        let err = db.create_robot(42, "Ghost").await.unwrap_err();
        assert!(matches!(err, DbError::PlayerNotFound(42)));
    }

    #[tokio::test]
    async fn test_set_active_robot_of_other_player() {
        let db = test_db().await;
        let a = db.create_player("A").await.unwrap();
        let b = db.create_player("B").await.unwrap();
        let rb = db.create_robot(b.id, "B-bot").await.unwrap();

        let err = db.set_active_robot(a.id, rb.id).await.unwrap_err();
        assert!(matches!(err, DbError::Hangar(HangarError::RobotNotFound(_))));

        let player = db.get_player(a.id).await.unwrap().unwrap();
        assert!(player.active_robot_id.is_none());
    }

    #[tokio::test]
    async fn test_purchase_part_updates_stats_and_credits() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();
        let r = db.create_robot(p.id, "Rusty").await.unwrap();

        let (player, robot) = db.purchase_part(p.id, r.id, "arms-1").await.unwrap();
        assert_eq!(player.credits, 550);
        assert_eq!(robot.arms_part_id.as_deref(), Some("arms-1"));
        assert_eq!(robot.stats(), StatBlock::new(35, 5, 15, 20));

        let (player, robot) = db.purchase_part(p.id, r.id, "legs-3").await.unwrap();
        assert_eq!(player.credits, 200);
        assert_eq!(robot.stats(), StatBlock::new(50, 35, 25, 40));
        assert_eq!(robot.stats(), robot.to_robot().stats());
    }

    #[tokio::test]
    async fn test_purchase_part_rolls_back_on_insufficient_credits() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();
        let r = db.create_robot(p.id, "Rusty").await.unwrap();
        db.purchase_part(p.id, r.id, "body-4").await.unwrap();

        let err = db.purchase_part(p.id, r.id, "head-5").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Hangar(HangarError::InsufficientCredits { needed: 600, available: 300 })
        ));

        let player = db.get_player(p.id).await.unwrap().unwrap();
        assert_eq!(player.credits, 300);
        let robot = robot_row(&db, p.id, r.id).await;
        assert!(robot.head_part_id.is_none());
    }

    #[tokio::test]
    async fn test_record_win() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();
        let r = db.create_robot(p.id, "Rusty").await.unwrap();

        let record = db
            .record_battle_outcome(p.id, r.id, BattleOutcome::Win, 120)
            .await
            .unwrap();
        assert_eq!(record.player_rank, 1);
        assert_eq!(record.progress.level, 2);
        assert_eq!(record.progress.experience, 20);

        let player = db.get_player(p.id).await.unwrap().unwrap();
        assert_eq!(player.wins, 1);
        assert_eq!(player.credits, 1200);
        let robot = robot_row(&db, p.id, r.id).await;
        assert_eq!(robot.level, 2);
        assert_eq!(robot.experience, 20);
    }

    #[tokio::test]
    async fn test_record_loss() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();
        let r = db.create_robot(p.id, "Rusty").await.unwrap();

        let record = db
            .record_battle_outcome(p.id, r.id, BattleOutcome::Loss, 30)
            .await
            .unwrap();
        assert_eq!(record.progress.level, 1);

        let player = db.get_player(p.id).await.unwrap().unwrap();
        assert_eq!(player.losses, 1);
        assert_eq!(player.credits, 1050);
    }

    #[tokio::test]
    async fn test_record_outcome_rolls_back_on_unknown_robot() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();

        let err = db
            .record_battle_outcome(p.id, 77, BattleOutcome::Win, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Hangar(HangarError::RobotNotFound(77))));

        let player = db.get_player(p.id).await.unwrap().unwrap();
        assert_eq!(player.wins, 0);
        assert_eq!(player.credits, 1000);
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_player() {
        let db = test_db().await;
        let err = db
            .record_battle_outcome(5, 1, BattleOutcome::Loss, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::PlayerNotFound(5)));
    }

    #[tokio::test]
    async fn test_rank_and_leaderboard_order() {
        let db = test_db().await;
        let mut players = Vec::new();
        for (name, wins) in [("Low", 1), ("Top", 4), ("Mid", 2)] {
            let p = db.create_player(name).await.unwrap();
            let r = db.create_robot(p.id, &format!("{name}-bot")).await.unwrap();
            for _ in 0..wins {
                db.record_battle_outcome(p.id, r.id, BattleOutcome::Win, 0)
                    .await
                    .unwrap();
            }
            players.push(p);
        }

        assert_eq!(db.player_rank(players[1].id).await.unwrap(), 1);
        assert_eq!(db.player_rank(players[2].id).await.unwrap(), 2);
        assert_eq!(db.player_rank(players[0].id).await.unwrap(), 3);

        let board = db.leaderboard().await.unwrap();
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Top", "Mid", "Low"]);
        assert_eq!(board[0].robot_name.as_deref(), Some("Top-bot"));
        assert_eq!(board[0].robot_stats, Some(StatBlock::default()));
    }

    #[tokio::test]
    async fn test_tied_wins_share_rank() {
        let db = test_db().await;
        let mut ids = Vec::new();
        for (name, wins) in [("First", 3), ("Second", 3), ("Third", 1)] {
            let p = db.create_player(name).await.unwrap();
            let r = db.create_robot(p.id, &format!("{name}-bot")).await.unwrap();
            for _ in 0..wins {
                db.record_battle_outcome(p.id, r.id, BattleOutcome::Win, 0)
                    .await
                    .unwrap();
            }
            ids.push(p.id);
        }

        assert_eq!(db.player_rank(ids[0]).await.unwrap(), 1);
        assert_eq!(db.player_rank(ids[1]).await.unwrap(), 1);
        assert_eq!(db.player_rank(ids[2]).await.unwrap(), 3);

        // ties keep creation order on the board
        let board = db.leaderboard().await.unwrap();
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_load_player_with_robots() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();
        let r1 = db.create_robot(p.id, "Rusty").await.unwrap();
        db.create_robot(p.id, "Sparky").await.unwrap();
        db.purchase_part(p.id, r1.id, "head-1").await.unwrap();
        db.set_active_robot(p.id, r1.id).await.unwrap();

        let player = db.load_player(p.id).await.unwrap().unwrap();
        assert_eq!(player.credits, 700);
        assert_eq!(player.robots.len(), 2);
        let active = player.active_robot().unwrap();
        assert_eq!(active.name, "Rusty");
        assert_eq!(active.stats(), StatBlock::new(15, 10, 5, 20));
        assert!(db.load_player(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purchase_for_unknown_robot() {
        let db = test_db().await;
        let p = db.create_player("Ada").await.unwrap();
        let err = db.purchase_part(p.id, 9, "head-1").await.unwrap_err();
        assert!(matches!(err, DbError::Hangar(HangarError::RobotNotFound(9))));
        assert_eq!(db.get_player(p.id).await.unwrap().unwrap().credits, 1000);
    }

    #[tokio::test]
    async fn test_leaderboard_limited_to_ten() {
        let db = test_db().await;
        for i in 0..12 {
            db.create_player(&format!("P{i}")).await.unwrap();
        }
        let board = db.leaderboard().await.unwrap();
        assert_eq!(board.len(), 10);
        assert!(board.iter().all(|e| e.robot_id.is_none() && e.robot_stats.is_none()));
    }
}
