//! Handlers for the analytics endpoints.
//!
//! Each handler receives already-fetched records in the request body, runs
//! one engine component from `resourcemesh_core`, and wraps the result in
//! the `{ "data": ... }` envelope. Per-request knobs override the server's
//! [`AnalyticsConfig`](resourcemesh_core::config::AnalyticsConfig) defaults.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use resourcemesh_core::allocation::{daily_budget_from_project, optimize_asset_allocation};
use resourcemesh_core::collaboration::build_collaboration_graph_with;
use resourcemesh_core::config::AnalyticsConfig;
use resourcemesh_core::demand::{calculate_demand_scores, rank_by_demand, DemandParams};
use resourcemesh_core::gap::analyze_resource_gap;
use resourcemesh_core::records::{
    deserialize_spec_map, Allocation, Asset, AssetRef, CatalogEntry, CategoryStock, Requirement,
    SpecMap, UsageLog,
};
use resourcemesh_core::trends::{compute_utilization_trend, TrendOptions};
use resourcemesh_core::types::DbId;
use resourcemesh_core::upgrade_path::find_upgrade_paths_limited;
use resourcemesh_core::urgent_match::{match_urgent_request_limited, UrgentMatch, UrgentRequest};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DemandScoresRequest {
    /// Only `id` is read; full asset records are accepted.
    pub assets: Vec<AssetRef>,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
    pub damping: Option<f64>,
    pub max_iterations: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Explicit daily ceiling. Wins over `project_budget`.
    pub max_cost_per_day: Option<f64>,
    /// Whole-project budget, spread over a 30-day horizon.
    pub project_budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradePathsRequest {
    pub current_category: String,
    #[serde(default, deserialize_with = "deserialize_spec_map")]
    pub target_spec: SpecMap,
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UrgentMatchRequest {
    pub request: UrgentRequest,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Serialize)]
pub struct UrgentMatchResponse {
    pub matches: Vec<UrgentMatch>,
    pub total_found: usize,
}

#[derive(Debug, Deserialize)]
pub struct UtilizationTrendRequest {
    #[serde(default)]
    pub logs: Vec<UsageLog>,
    pub window_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GapAnalysisRequest {
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Only `category_id` and `status` are read; ids are not required.
    #[serde(default)]
    pub assets: Vec<CategoryStock>,
}

#[derive(Debug, Deserialize)]
pub struct CollaborationGraphRequest {
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

// ---------------------------------------------------------------------------
// POST /analytics/demand-scores
// ---------------------------------------------------------------------------

/// Rank assets by team demand, most demanded first.
pub async fn demand_scores(
    State(state): State<AppState>,
    Json(body): Json<DemandScoresRequest>,
) -> AppResult<impl IntoResponse> {
    let config = AnalyticsConfig {
        damping: body.damping.unwrap_or(state.config.analytics.damping),
        max_iterations: body
            .max_iterations
            .unwrap_or(state.config.analytics.max_iterations),
        ..state.config.analytics.clone()
    };
    config.validate()?;

    let asset_ids: Vec<DbId> = body.assets.iter().map(|a| a.id).collect();
    let scores = calculate_demand_scores(&asset_ids, &body.allocations, &DemandParams::from(&config));
    let ranking = rank_by_demand(&scores);

    tracing::info!(
        assets = asset_ids.len(),
        allocations = body.allocations.len(),
        damping = config.damping,
        "Demand scores computed"
    );

    Ok(Json(DataResponse { data: ranking }))
}

// ---------------------------------------------------------------------------
// POST /analytics/optimize
// ---------------------------------------------------------------------------

/// Greedy selection of available assets covering the requirements.
pub async fn optimize(Json(body): Json<OptimizeRequest>) -> AppResult<impl IntoResponse> {
    let max_cost_per_day = match body.max_cost_per_day {
        Some(ceiling) if !ceiling.is_finite() => {
            return Err(AppError::BadRequest(
                "max_cost_per_day must be a finite number".to_string(),
            ));
        }
        Some(ceiling) => ceiling,
        None => daily_budget_from_project(body.project_budget),
    };

    let plan = optimize_asset_allocation(&body.requirements, &body.assets, max_cost_per_day);

    tracing::info!(
        requirements = body.requirements.len(),
        assets = body.assets.len(),
        max_cost_per_day,
        selected = plan.selected_asset_ids.len(),
        "Allocation optimized"
    );

    Ok(Json(DataResponse { data: plan }))
}

// ---------------------------------------------------------------------------
// POST /analytics/upgrade-paths
// ---------------------------------------------------------------------------

/// Shortest upgrade chains from a category to entries meeting a target spec.
pub async fn upgrade_paths(
    State(state): State<AppState>,
    Json(body): Json<UpgradePathsRequest>,
) -> AppResult<impl IntoResponse> {
    if body.current_category.trim().is_empty() {
        return Err(AppError::BadRequest(
            "current_category must not be empty".to_string(),
        ));
    }

    let paths = find_upgrade_paths_limited(
        &body.current_category,
        &body.target_spec,
        &body.catalog,
        state.config.analytics.max_upgrade_paths,
    );

    tracing::info!(
        category = %body.current_category,
        catalog = body.catalog.len(),
        found = paths.len(),
        "Upgrade paths searched"
    );

    Ok(Json(DataResponse { data: paths }))
}

// ---------------------------------------------------------------------------
// POST /analytics/urgent-match
// ---------------------------------------------------------------------------

/// Best available assets for an urgent request.
pub async fn urgent_match(
    State(state): State<AppState>,
    Json(body): Json<UrgentMatchRequest>,
) -> AppResult<impl IntoResponse> {
    let matches = match_urgent_request_limited(
        &body.request,
        &body.assets,
        state.config.analytics.max_urgent_matches,
    );
    let total_found = matches.len();

    tracing::info!(
        category_id = body.request.category_id,
        assets = body.assets.len(),
        total_found,
        "Urgent request matched"
    );

    Ok(Json(DataResponse {
        data: UrgentMatchResponse {
            matches,
            total_found,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /analytics/utilization-trend
// ---------------------------------------------------------------------------

/// Rolling utilization, peak days and idle assets from usage logs.
pub async fn utilization_trend(
    State(state): State<AppState>,
    Json(body): Json<UtilizationTrendRequest>,
) -> AppResult<impl IntoResponse> {
    let mut options = TrendOptions::from(&state.config.analytics);
    if let Some(window_days) = body.window_days {
        options.window_days = window_days;
    }

    let trend = compute_utilization_trend(&body.logs, &options);

    tracing::info!(
        logs = body.logs.len(),
        window_days = options.window_days,
        assets = trend.asset_trends.len(),
        idle = trend.idle_asset_ids.len(),
        "Utilization trend computed"
    );

    Ok(Json(DataResponse { data: trend }))
}

// ---------------------------------------------------------------------------
// POST /analytics/gap-analysis
// ---------------------------------------------------------------------------

/// Per-category comparison of required against available assets.
pub async fn gap_analysis(Json(body): Json<GapAnalysisRequest>) -> AppResult<impl IntoResponse> {
    let gap = analyze_resource_gap(&body.requirements, &body.assets);

    tracing::info!(
        requirements = body.requirements.len(),
        assets = body.assets.len(),
        unmet = gap.unmet_requirements.len(),
        gap_score = gap.gap_score,
        "Resource gap analyzed"
    );

    Ok(Json(DataResponse { data: gap }))
}

// ---------------------------------------------------------------------------
// POST /analytics/collaboration-graph
// ---------------------------------------------------------------------------

/// Asset co-usage graph with strong-tie communities.
pub async fn collaboration_graph(
    State(state): State<AppState>,
    Json(body): Json<CollaborationGraphRequest>,
) -> AppResult<impl IntoResponse> {
    let graph = build_collaboration_graph_with(
        &body.allocations,
        state.config.analytics.strong_co_usage_weight,
    );

    tracing::info!(
        allocations = body.allocations.len(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        communities = graph.communities.len(),
        "Collaboration graph built"
    );

    Ok(Json(DataResponse { data: graph }))
}
