pub mod analytics;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /analytics/demand-scores                 rank assets by demand
/// /analytics/optimize                      greedy allocation plan
/// /analytics/upgrade-paths                 catalog upgrade chains
/// /analytics/urgent-match                  urgent request matching
/// /analytics/utilization-trend             rolling usage trends
/// /analytics/gap-analysis                  requirement coverage
/// /analytics/collaboration-graph           co-usage graph
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/analytics", analytics::router())
}
