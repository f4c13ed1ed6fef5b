// Prometheus metrics definitions for the arena service.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Battle sessions that have not finished yet.
    pub static ref ACTIVE_BATTLES: IntGauge =
        IntGauge::new("arena_active_battles", "Battle sessions still running").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    pub static ref BATTLES_STARTED_TOTAL: IntCounter =
        IntCounter::new("arena_battles_started_total", "Battle sessions started").unwrap();

    /// Finished battles, by winning side.
    pub static ref BATTLES_FINISHED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("arena_battles_finished_total", "Battle sessions finished"),
        &["winner"],
    )
    .unwrap();

    /// Moves resolved in sessions and by the calculator, by side and kind.
    pub static ref MOVES_RESOLVED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("arena_moves_resolved_total", "Moves resolved"),
        &["side", "kind"],
    )
    .unwrap();

    pub static ref CRITICAL_HITS_TOTAL: IntCounter =
        IntCounter::new("arena_critical_hits_total", "Critical attacks landed").unwrap();

    /// Stateless battle-calculator invocations.
    pub static ref EXCHANGES_CALCULATED_TOTAL: IntCounter = IntCounter::new(
        "arena_exchanges_calculated_total",
        "Battle calculator invocations",
    )
    .unwrap();

    /// Leaderboard updates, by outcome (win, loss).
    pub static ref LEADERBOARD_UPDATES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("arena_leaderboard_updates_total", "Leaderboard updates applied"),
        &["outcome"],
    )
    .unwrap();

    pub static ref PARTS_PURCHASED_TOTAL: IntCounter =
        IntCounter::new("arena_parts_purchased_total", "Parts bought in the marketplace").unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("arena_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Moves played before a battle finished.
    pub static ref BATTLE_LENGTH_TURNS: Histogram = Histogram::with_opts(
        HistogramOpts::new("arena_battle_length_turns", "Moves per finished battle")
            .buckets(vec![2.0, 4.0, 8.0, 12.0, 16.0, 24.0, 32.0, 48.0, 64.0]),
    )
    .unwrap();

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "arena_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ACTIVE_BATTLES.clone()),
        Box::new(BATTLES_STARTED_TOTAL.clone()),
        Box::new(BATTLES_FINISHED_TOTAL.clone()),
        Box::new(MOVES_RESOLVED_TOTAL.clone()),
        Box::new(CRITICAL_HITS_TOTAL.clone()),
        Box::new(EXCHANGES_CALCULATED_TOTAL.clone()),
        Box::new(LEADERBOARD_UPDATES_TOTAL.clone()),
        Box::new(PARTS_PURCHASED_TOTAL.clone()),
        Box::new(API_REQUESTS_TOTAL.clone()),
        Box::new(BATTLE_LENGTH_TURNS.clone()),
        Box::new(API_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        // Registering twice (e.g. from several tests) is harmless.
        if let Err(e) = REGISTRY.register(c) {
            tracing::debug!("metric already registered: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Normalize a URL path for metric labels: numeric and UUID segments become
/// `:id` to keep label cardinality bounded.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.parse::<i64>().is_ok() || uuid::Uuid::parse_str(segment).is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/parts"), "/api/parts");
        assert_eq!(normalize_path("/health"), "/health");
    }

    #[test]
    fn test_normalize_path_with_ids() {
        assert_eq!(normalize_path("/api/players/42"), "/api/players/:id");
        assert_eq!(
            normalize_path("/api/players/42/robots/7/parts"),
            "/api/players/:id/robots/:id/parts"
        );
        assert_eq!(
            normalize_path("/api/battles/67e55044-10b1-426f-9247-bb680e5fe0c8/moves"),
            "/api/battles/:id/moves"
        );
    }

    #[test]
    fn test_gather_metrics_returns_string() {
        register_metrics();
        register_metrics();
        CRITICAL_HITS_TOTAL.inc();
        let output = gather_metrics();
        assert!(output.contains("arena_critical_hits_total"));
    }

    #[test]
    fn test_metric_increments() {
        ACTIVE_BATTLES.set(2);
        assert_eq!(ACTIVE_BATTLES.get(), 2);
        ACTIVE_BATTLES.set(0);

        BATTLES_FINISHED_TOTAL.with_label_values(&["player"]).inc();
        MOVES_RESOLVED_TOTAL
            .with_label_values(&["enemy", "special"])
            .inc();
        LEADERBOARD_UPDATES_TOTAL.with_label_values(&["win"]).inc();
        BATTLE_LENGTH_TURNS.observe(9.0);
        API_REQUEST_DURATION_SECONDS
            .with_label_values(&["/api/parts"])
            .observe(0.01);
        API_REQUESTS_TOTAL
            .with_label_values(&["GET", "/api/parts", "200"])
            .inc();
    }
}
