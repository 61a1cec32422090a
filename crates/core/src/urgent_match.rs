//! Real-time matching of an urgent request against available assets.
//!
//! Every eligible asset gets a composite score
//! `0.5 * spec + 0.3 * availability + 0.2 * cost_efficiency`, and the best
//! few are returned with short human-readable reasons.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_URGENT_MATCHES;
use crate::records::{deserialize_spec_map, Asset, SpecMap};
use crate::spec_match::match_fraction;
use crate::types::{round_to, DbId};

// ---------------------------------------------------------------------------
// Weights and thresholds
// ---------------------------------------------------------------------------

pub const WEIGHT_SPEC: f64 = 0.5;
pub const WEIGHT_AVAILABILITY: f64 = 0.3;
pub const WEIGHT_COST: f64 = 0.2;

/// Daily cost ceiling used when a request states none.
pub const DEFAULT_MAX_DAILY_COST: f64 = 9999.0;

/// Sub-score levels above which a reason is attached.
pub const REASON_SPEC_THRESHOLD: f64 = 0.8;
pub const REASON_AVAILABILITY_THRESHOLD: f64 = 0.7;
pub const REASON_COST_THRESHOLD: f64 = 0.7;

pub const REASON_EXCEEDS_SPEC: &str = "Exceeds spec requirements";
pub const REASON_HIGH_AVAILABILITY: &str = "High availability";
pub const REASON_COST_EFFICIENT: &str = "Cost efficient";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An ad-hoc request for immediate allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgentRequest {
    pub category_id: DbId,
    /// Informational; every eligible asset is ranked regardless.
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_spec_map")]
    pub min_specs: SpecMap,
    /// Daily cost ceiling. Absent means [`DEFAULT_MAX_DAILY_COST`]; zero or
    /// negative disables the filter.
    #[serde(default)]
    pub max_daily_cost: Option<f64>,
}

impl UrgentRequest {
    fn cost_ceiling(&self) -> Option<f64> {
        Some(self.max_daily_cost.unwrap_or(DEFAULT_MAX_DAILY_COST)).filter(|max| *max > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgentMatch {
    pub asset_id: DbId,
    pub asset_name: String,
    pub score: f64,
    pub spec_match: f64,
    pub availability: f64,
    pub cost_efficiency: f64,
    pub reasons: Vec<String>,
    pub cost_per_day: f64,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Rank the top [`DEFAULT_MAX_URGENT_MATCHES`] assets for `request`.
pub fn match_urgent_request(request: &UrgentRequest, assets: &[Asset]) -> Vec<UrgentMatch> {
    match_urgent_request_limited(request, assets, DEFAULT_MAX_URGENT_MATCHES)
}

/// Same as [`match_urgent_request`] with an explicit result cap.
pub fn match_urgent_request_limited(
    request: &UrgentRequest,
    assets: &[Asset],
    limit: usize,
) -> Vec<UrgentMatch> {
    let ceiling = request.cost_ceiling();

    let mut matches: Vec<UrgentMatch> = assets
        .iter()
        .filter(|a| a.is_available() && a.category_id == request.category_id)
        .filter(|a| ceiling.map_or(true, |max| a.cost_per_day <= max))
        .map(|a| score_asset(a, &request.min_specs, ceiling))
        .collect();

    // Stable: equal scores keep filter order.
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(limit);
    matches
}

fn score_asset(asset: &Asset, min_specs: &SpecMap, ceiling: Option<f64>) -> UrgentMatch {
    let spec = match_fraction(&asset.specifications, min_specs);
    let availability = 1.0 - asset.utilization() / 100.0;
    let cost_efficiency = match ceiling {
        Some(max) => (1.0 - asset.cost_per_day / max.max(1.0)).clamp(0.0, 1.0),
        None => 1.0,
    };
    let composite =
        WEIGHT_SPEC * spec + WEIGHT_AVAILABILITY * availability + WEIGHT_COST * cost_efficiency;

    let mut reasons = Vec::new();
    if spec > REASON_SPEC_THRESHOLD {
        reasons.push(REASON_EXCEEDS_SPEC.to_string());
    }
    if availability > REASON_AVAILABILITY_THRESHOLD {
        reasons.push(REASON_HIGH_AVAILABILITY.to_string());
    }
    if cost_efficiency > REASON_COST_THRESHOLD {
        reasons.push(REASON_COST_EFFICIENT.to_string());
    }

    UrgentMatch {
        asset_id: asset.id,
        asset_name: asset.name.clone(),
        score: round_to(composite, 4),
        spec_match: round_to(spec, 4),
        availability: round_to(availability, 4),
        cost_efficiency: round_to(cost_efficiency, 4),
        reasons,
        cost_per_day: asset.cost_per_day,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
