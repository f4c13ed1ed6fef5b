// HTTP API routes: catalog, battle calculator, battle sessions, hangar, leaderboard.

use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::db::{DbError, Database};
use crate::engine::ai::EnemyPolicy;
use crate::engine::battle::{calculate_exchange, BattleError};
use crate::engine::catalog::{self, PartFilter, CLOUD_SERVICES, ENEMIES};
use crate::engine::config::{MAX_EXPERIENCE_GAIN, MAX_MOVE_POWER, MAX_STAT_VALUE};
use crate::engine::hangar::HangarError;
use crate::engine::moves::{enemy_moves, player_moves, BattleMove};
use crate::engine::progression::BattleOutcome;
use crate::engine::robot::Combatant;
use crate::engine::stats::StatBlock;
use crate::metrics;
use crate::sessions::{BattleStore, SessionError};

const MISSING_PARAMETERS: &str = "Missing required parameters";

// ── Request types ─────────────────────────────────────────────────────

/// A robot as the client sends it: already-effective stats.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotSpec {
    pub name: Option<String>,
    pub stats: StatBlock,
    pub level: Option<i32>,
}

impl RobotSpec {
    fn combatant(&self, fallback_name: &str) -> Combatant {
        Combatant {
            name: self
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
            level: self.level.unwrap_or(1).max(1),
            stats: self.stats,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub player_robot: Option<RobotSpec>,
    pub enemy_robot: Option<RobotSpec>,
    pub player_move: Option<BattleMove>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBattleRequest {
    /// Ad-hoc robot; alternatively a stored one via `playerId` and optional `robotId`.
    pub player_robot: Option<RobotSpec>,
    pub player_id: Option<i64>,
    pub robot_id: Option<i64>,
    pub enemy_id: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Deserialize)]
pub struct SubmitMoveRequest {
    #[serde(rename = "move")]
    pub mv: BattleMove,
}

#[derive(Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateRobotRequest {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRobotRequest {
    pub robot_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyPartRequest {
    pub part_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUpdateRequest {
    pub player_id: Option<i64>,
    pub robot_id: Option<i64>,
    pub battle_outcome: Option<BattleOutcome>,
    pub experience_gained: Option<i64>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub battles: BattleStore,
    pub enemy_policy: EnemyPolicy,
    pub rng_seed: Option<u64>,
}

impl AppState {
    pub fn new(db: Arc<Database>, enemy_policy: EnemyPolicy, rng_seed: Option<u64>) -> Self {
        Self {
            db,
            battles: BattleStore::new(),
            enemy_policy,
            rng_seed,
        }
    }

    fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn seed_for(&self, requested: Option<u64>) -> u64 {
        requested
            .or(self.rng_seed)
            .unwrap_or_else(rand::random::<u64>)
    }
}

// ── Error helpers ─────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!("Internal error: {e}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn bad_json(rejection: JsonRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, &rejection.body_text())
}

fn db_error(e: DbError) -> Response {
    match e {
        DbError::PlayerNotFound(_)
        | DbError::Hangar(HangarError::PartNotFound(_))
        | DbError::Hangar(HangarError::RobotNotFound(_)) => {
            json_error(StatusCode::NOT_FOUND, &e.to_string())
        }
        DbError::Hangar(HangarError::InsufficientCredits { .. }) => {
            json_error(StatusCode::BAD_REQUEST, &e.to_string())
        }
        DbError::Sqlx(e) => internal_error(e),
    }
}

fn session_error(e: SessionError) -> Response {
    match e {
        SessionError::NotFound => json_error(StatusCode::NOT_FOUND, "Battle not found"),
        SessionError::IllegalMove(_) => json_error(StatusCode::BAD_REQUEST, &e.to_string()),
        SessionError::Battle(e) => battle_error(e),
    }
}

fn battle_error(e: BattleError) -> Response {
    json_error(StatusCode::CONFLICT, &e.to_string())
}

fn validate_robot(spec: &RobotSpec) -> Result<(), Response> {
    if !spec.stats.is_valid() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            &format!("robot stats must be between 0 and {MAX_STAT_VALUE}"),
        ));
    }
    Ok(())
}

fn validate_move(mv: &BattleMove) -> Result<(), Response> {
    if !mv.is_valid() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            &format!("move power must be between 0 and {MAX_MOVE_POWER}"),
        ));
    }
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Catalog
        .route("/api/parts", get(list_parts))
        .route("/api/cloud-services", get(list_cloud_services))
        .route("/api/enemies", get(list_enemies))
        .route("/api/moves", get(list_moves))
        // Battles
        .route("/api/battle/calculate", post(calculate_battle))
        .route("/api/battles", post(start_battle))
        .route("/api/battles/{id}", get(get_battle).delete(delete_battle))
        .route("/api/battles/{id}/moves", post(submit_move))
        // Players and robots
        .route("/api/players", post(create_player))
        .route("/api/players/{id}", get(get_player))
        .route("/api/players/{id}/robots", post(create_robot))
        .route("/api/players/{id}/active-robot", put(set_active_robot))
        .route(
            "/api/players/{id}/robots/{robot_id}/parts",
            post(buy_part),
        )
        // Leaderboard
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/leaderboard/update", post(update_leaderboard))
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state)
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = metrics::normalize_path(req.uri().path());
    let started = Instant::now();

    let response = next.run(req).await;

    metrics::API_REQUEST_DURATION_SECONDS
        .with_label_values(&[&endpoint])
        .observe(started.elapsed().as_secs_f64());
    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[&method, &endpoint, response.status().as_str()])
        .inc();
    response
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "robot-arena" }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

// ── Catalog handlers ──────────────────────────────────────────────────

async fn list_parts(Query(filter): Query<PartFilter>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!(filter.apply())))
}

async fn list_cloud_services() -> impl IntoResponse {
    (StatusCode::OK, Json(json!(CLOUD_SERVICES)))
}

async fn list_enemies() -> impl IntoResponse {
    (StatusCode::OK, Json(json!(ENEMIES)))
}

async fn list_moves() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "player": player_moves(), "enemy": enemy_moves() })),
    )
}

// ── Battle handlers ───────────────────────────────────────────────────

async fn calculate_battle(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    let (Some(player), Some(enemy), Some(mv)) = (req.player_robot, req.enemy_robot, req.player_move)
    else {
        return json_error(StatusCode::BAD_REQUEST, MISSING_PARAMETERS);
    };
    if let Err(resp) = validate_robot(&player)
        .and_then(|_| validate_robot(&enemy))
        .and_then(|_| validate_move(&mv))
    {
        return resp;
    }

    let mut rng = state.rng();
    let exchange = calculate_exchange(
        &player.combatant("Player"),
        &enemy.combatant("Enemy"),
        &mv,
        state.enemy_policy,
        &mut rng,
    );

    metrics::EXCHANGES_CALCULATED_TOTAL.inc();
    metrics::MOVES_RESOLVED_TOTAL
        .with_label_values(&["player", mv.kind.as_str()])
        .inc();
    metrics::MOVES_RESOLVED_TOTAL
        .with_label_values(&["enemy", exchange.enemy_move.kind.as_str()])
        .inc();

    (StatusCode::OK, Json(json!(exchange))).into_response()
}

async fn start_battle(
    State(state): State<AppState>,
    payload: Result<Json<StartBattleRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };

    let player = match (&req.player_robot, req.player_id, req.robot_id) {
        (Some(spec), _, _) => {
            if let Err(resp) = validate_robot(spec) {
                return resp;
            }
            spec.combatant("Player")
        }
        (None, Some(player_id), robot_id) => {
            let player = match state.db.load_player(player_id).await {
                Ok(Some(p)) => p,
                Ok(None) => return json_error(StatusCode::NOT_FOUND, "Player not found"),
                Err(e) => return internal_error(e),
            };
            // Without a robot id the player's active robot fights.
            let robot = match robot_id {
                Some(id) => player.robot(id),
                None => player.active_robot(),
            };
            match robot {
                Some(r) => r.combatant(),
                None => return json_error(StatusCode::NOT_FOUND, "Robot not found"),
            }
        }
        (None, None, _) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "playerRobot or playerId is required",
            )
        }
    };

    let seed = state.seed_for(req.seed);
    let enemy = match req.enemy_id.as_deref() {
        Some(id) => match catalog::find_enemy(id) {
            Some(e) => e,
            None => return json_error(StatusCode::NOT_FOUND, "Enemy not found"),
        },
        None => catalog::random_enemy(&mut StdRng::seed_from_u64(seed)),
    };

    let snapshot = state.battles.start(player, enemy.combatant(), seed);
    (StatusCode::CREATED, Json(json!(snapshot))).into_response()
}

async fn get_battle(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.battles.get(id) {
        Some(snapshot) => (StatusCode::OK, Json(json!(snapshot))).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Battle not found"),
    }
}

async fn submit_move(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SubmitMoveRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    if let Err(resp) = validate_move(&req.mv) {
        return resp;
    }

    match state.battles.submit_move(id, &req.mv, state.enemy_policy) {
        Ok((snapshot, turns)) => (
            StatusCode::OK,
            Json(json!({ "battle": snapshot, "turns": turns })),
        )
            .into_response(),
        Err(e) => session_error(e),
    }
}

async fn delete_battle(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    if state.battles.remove(id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        json_error(StatusCode::NOT_FOUND, "Battle not found")
    }
}

// ── Player handlers ───────────────────────────────────────────────────

async fn create_player(
    State(state): State<AppState>,
    payload: Result<Json<CreatePlayerRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    if req.name.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "name is required");
    }
    match state.db.create_player(req.name.trim()).await {
        Ok(player) => (StatusCode::CREATED, Json(json!(player))).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn get_player(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let player = match state.db.get_player(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "Player not found"),
        Err(e) => return internal_error(e),
    };
    let robots = match state.db.list_robots(id).await {
        Ok(rows) => rows.iter().map(|r| r.summary()).collect::<Vec<_>>(),
        Err(e) => return internal_error(e),
    };
    (
        StatusCode::OK,
        Json(json!({ "player": player, "robots": robots })),
    )
        .into_response()
}

async fn create_robot(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
    payload: Result<Json<CreateRobotRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    if req.name.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "name is required");
    }
    match state.db.create_robot(player_id, req.name.trim()).await {
        Ok(robot) => (StatusCode::CREATED, Json(json!(robot.summary()))).into_response(),
        Err(e) => db_error(e),
    }
}

async fn set_active_robot(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
    payload: Result<Json<SetActiveRobotRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    match state.db.set_active_robot(player_id, req.robot_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => db_error(e),
    }
}

async fn buy_part(
    State(state): State<AppState>,
    Path((player_id, robot_id)): Path<(i64, i64)>,
    payload: Result<Json<BuyPartRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    match state.db.purchase_part(player_id, robot_id, &req.part_id).await {
        Ok((player, robot)) => {
            metrics::PARTS_PURCHASED_TOTAL.inc();
            tracing::info!(player_id, robot_id, part_id = %req.part_id, "part purchased");
            (
                StatusCode::OK,
                Json(json!({ "credits": player.credits, "robot": robot.summary() })),
            )
                .into_response()
        }
        Err(e) => db_error(e),
    }
}

// ── Leaderboard handlers ──────────────────────────────────────────────

async fn get_leaderboard(State(state): State<AppState>) -> Response {
    match state.db.leaderboard().await {
        Ok(entries) => (StatusCode::OK, Json(json!(entries))).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn update_leaderboard(
    State(state): State<AppState>,
    payload: Result<Json<LeaderboardUpdateRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    let (Some(player_id), Some(robot_id), Some(outcome)) =
        (req.player_id, req.robot_id, req.battle_outcome)
    else {
        return json_error(StatusCode::BAD_REQUEST, MISSING_PARAMETERS);
    };
    let experience = req.experience_gained.unwrap_or(0);
    if !(0..=MAX_EXPERIENCE_GAIN).contains(&experience) {
        return json_error(
            StatusCode::BAD_REQUEST,
            &format!("experienceGained must be between 0 and {MAX_EXPERIENCE_GAIN}"),
        );
    }

    let record = match state
        .db
        .record_battle_outcome(player_id, robot_id, outcome, experience)
        .await
    {
        Ok(r) => r,
        Err(e) => return db_error(e),
    };
    metrics::LEADERBOARD_UPDATES_TOTAL
        .with_label_values(&[outcome.as_str()])
        .inc();
    tracing::info!(
        player_id,
        robot_id,
        outcome = outcome.as_str(),
        rank = record.player_rank,
        "leaderboard updated"
    );

    let leaderboard = match state.db.leaderboard().await {
        Ok(entries) => entries,
        Err(e) => return internal_error(e),
    };

    (
        StatusCode::OK,
        Json(json!({
            "message": "Leaderboard updated successfully",
            "playerRank": record.player_rank,
            "robot": record.progress,
            "leaderboard": leaderboard,
        })),
    )
        .into_response()
}
