//! Route definitions for the analytics engine.

use axum::routing::post;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Analytics routes mounted at `/analytics`.
///
/// ```text
/// POST /demand-scores          -> demand_scores
/// POST /optimize               -> optimize
/// POST /upgrade-paths          -> upgrade_paths
/// POST /urgent-match           -> urgent_match
/// POST /utilization-trend      -> utilization_trend
/// POST /gap-analysis           -> gap_analysis
/// POST /collaboration-graph    -> collaboration_graph
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/demand-scores", post(analytics::demand_scores))
        .route("/optimize", post(analytics::optimize))
        .route("/upgrade-paths", post(analytics::upgrade_paths))
        .route("/urgent-match", post(analytics::urgent_match))
        .route("/utilization-trend", post(analytics::utilization_trend))
        .route("/gap-analysis", post(analytics::gap_analysis))
        .route("/collaboration-graph", post(analytics::collaboration_graph))
}
