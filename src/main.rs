use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use robot_arena::api::{self, AppState};
use robot_arena::config::Config;
use robot_arena::db::Database;
use robot_arena::metrics;
use robot_arena::sessions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    metrics::register_metrics();

    let db = Database::connect(&config.database_url, config.db_max_connections).await?;
    let state = AppState::new(Arc::new(db), config.enemy_policy, config.rng_seed);
    sessions::spawn_reaper(state.battles.clone(), Duration::from_secs(60));

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        port = config.port,
        enemy_policy = %config.enemy_policy,
        "robot arena listening on {addr}"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
