//! Budget-constrained allocation recommendations for a project.
//!
//! A greedy value-density heuristic, not an exact 0/1 knapsack: candidates
//! are ranked once by `urgency * (1 - utilization) / cost` and accepted in
//! that order while their category still needs units and the running daily
//! cost stays within budget. Callers depend on this selection order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{requirement_map, Asset, Requirement};
use crate::types::{round_to, DbId};

/// Daily-cost ceiling used when no budget is known.
pub const DEFAULT_MAX_COST_PER_DAY: f64 = 99_999.0;

/// Days a project budget is spread over when deriving a daily ceiling.
pub const BUDGET_DAYS: f64 = 30.0;

/// Floor applied to costs before dividing, so free assets stay finite.
pub const MIN_COST_FOR_DENSITY: f64 = 0.01;

/// Urgency for a category that still has outstanding quantity.
const URGENCY_OUTSTANDING: f64 = 2.0;

/// Urgency for a category with nothing outstanding.
const URGENCY_COVERED: f64 = 0.5;

/// Recommended selection for a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationPlan {
    pub selected_asset_ids: Vec<DbId>,
    /// Fraction of required units covered, rounded to 4 decimals.
    pub coverage_score: f64,
    /// Sum of selected daily costs, rounded to 2 decimals.
    pub total_cost_per_day: f64,
}

impl AllocationPlan {
    fn empty() -> Self {
        Self {
            selected_asset_ids: Vec::new(),
            coverage_score: 0.0,
            total_cost_per_day: 0.0,
        }
    }
}

/// Derive a daily cost ceiling from a whole-project budget.
pub fn daily_budget_from_project(budget: Option<f64>) -> f64 {
    match budget {
        Some(b) if b > 0.0 => b / BUDGET_DAYS,
        _ => DEFAULT_MAX_COST_PER_DAY,
    }
}

/// Greedy value density of one candidate.
pub fn value_density(asset: &Asset, outstanding: bool) -> f64 {
    let urgency = if outstanding {
        URGENCY_OUTSTANDING
    } else {
        URGENCY_COVERED
    };
    let free_share = 1.0 - asset.utilization() / 100.0;
    urgency * free_share / asset.cost_per_day.max(MIN_COST_FOR_DENSITY)
}

/// Pick available assets covering `requirements` within `max_cost_per_day`.
pub fn optimize_asset_allocation(
    requirements: &[Requirement],
    assets: &[Asset],
    max_cost_per_day: f64,
) -> AllocationPlan {
    if requirements.is_empty() || assets.is_empty() {
        return AllocationPlan::empty();
    }

    let needed = requirement_map(requirements);

    let mut candidates: Vec<(&Asset, f64)> = assets
        .iter()
        .filter(|a| a.is_available())
        .map(|a| {
            let outstanding = needed.get(&a.category_id).is_some_and(|qty| *qty > 0);
            (a, value_density(a, outstanding))
        })
        .collect();
    if candidates.is_empty() {
        return AllocationPlan::empty();
    }
    // Stable: equal densities keep input order.
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut selected = Vec::new();
    let mut total_cost = 0.0;
    let mut filled: BTreeMap<DbId, u64> = BTreeMap::new();

    for (asset, _) in candidates {
        let want = needed.get(&asset.category_id).copied().unwrap_or(0);
        let have = filled.get(&asset.category_id).copied().unwrap_or(0);
        if have < want && total_cost + asset.cost_per_day <= max_cost_per_day {
            selected.push(asset.id);
            total_cost += asset.cost_per_day;
            filled.insert(asset.category_id, have + 1);
        }
    }

    let total_required = needed.values().fold(0_u64, |acc, qty| acc.saturating_add(*qty));
    let total_met = needed
        .iter()
        .map(|(cat, qty)| filled.get(cat).copied().unwrap_or(0).min(*qty))
        .fold(0_u64, u64::saturating_add);
    let coverage = if total_required > 0 {
        total_met as f64 / total_required as f64
    } else {
        0.0
    };

    tracing::debug!(
        selected = selected.len(),
        total_required,
        total_met,
        total_cost,
        "Allocation plan computed"
    );

    AllocationPlan {
        selected_asset_ids: selected,
        coverage_score: round_to(coverage, 4),
        total_cost_per_day: round_to(total_cost, 2),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
