//! Asset demand scoring.
//!
//! Ranks assets by aggregated team demand with a PageRank-style power
//! iteration. Each team's recorded hours are split across the assets it
//! used; that share flows back into the asset as a self-loop weight. Assets
//! no team used are dangling and redistribute their rank uniformly.
//!
//! The transition matrix only ever has entries on the diagonal (used assets)
//! or in whole uniform columns (dangling assets), so it is stored as a
//! diagonal vector plus a dangling mask and each iteration is `O(n)`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::{
    AnalyticsConfig, DEFAULT_CONVERGENCE_TOLERANCE, DEFAULT_DAMPING, DEFAULT_MAX_ITERATIONS,
};
use crate::records::Allocation;
use crate::types::{round_to, DbId};

/// Knobs for one demand-scoring run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandParams {
    pub damping: f64,
    pub max_iterations: u32,
    pub tolerance: f64,
}

impl Default for DemandParams {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
        }
    }
}

impl From<&AnalyticsConfig> for DemandParams {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            damping: config.damping,
            max_iterations: config.max_iterations,
            tolerance: config.convergence_tolerance,
        }
    }
}

/// One row of the demand ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandRanking {
    pub asset_id: DbId,
    pub demand_score: f64,
}

/// Score every asset in `asset_ids` by demand, min-max normalized to `[0, 1]`.
///
/// Allocations without a team, or for an asset outside `asset_ids`, are
/// ignored. If every asset ends with the same raw score, all scores are `0.0`.
pub fn calculate_demand_scores(
    asset_ids: &[DbId],
    allocations: &[Allocation],
    params: &DemandParams,
) -> BTreeMap<DbId, f64> {
    if asset_ids.is_empty() {
        return BTreeMap::new();
    }

    let n = asset_ids.len();
    let index: HashMap<DbId, usize> = asset_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();

    // (asset index, team, hours) for every allocation that counts.
    let usable: Vec<(usize, DbId, f64)> = allocations
        .iter()
        .filter_map(|alloc| {
            let idx = *index.get(&alloc.asset_id?)?;
            Some((idx, alloc.team_id?, alloc.demand_hours()))
        })
        .collect();

    let mut team_demand: HashMap<DbId, f64> = HashMap::new();
    for &(_, team, hours) in &usable {
        *team_demand.entry(team).or_insert(0.0) += hours;
    }

    let mut diagonal = vec![0.0_f64; n];
    for &(idx, team, hours) in &usable {
        let total = team_demand.get(&team).copied().unwrap_or(0.0);
        if total > 0.0 {
            diagonal[idx] += hours / total;
        }
    }
    let dangling: Vec<bool> = diagonal.iter().map(|w| *w == 0.0).collect();

    let raw = power_iterate(&diagonal, &dangling, params);
    let normalized = min_max_normalize(&raw);

    asset_ids.iter().map(|id| (*id, normalized[index[id]])).collect()
}

/// Run `v <- d * (M v) + (1 - d) / n` from a uniform start.
///
/// Once a step moves the vector by less than the tolerance (L1), the vector
/// from before that step is returned.
fn power_iterate(diagonal: &[f64], dangling: &[bool], params: &DemandParams) -> Vec<f64> {
    let n = diagonal.len();
    let nf = n as f64;
    let teleport = (1.0 - params.damping) / nf;
    let mut v = vec![1.0 / nf; n];

    for iteration in 0..params.max_iterations {
        let dangling_mass: f64 = v
            .iter()
            .zip(dangling)
            .filter(|(_, is_dangling)| **is_dangling)
            .map(|(rank, _)| rank)
            .sum();
        let spread = dangling_mass / nf;

        let next: Vec<f64> = (0..n)
            .map(|i| {
                let own = if dangling[i] { 0.0 } else { diagonal[i] * v[i] };
                params.damping * (own + spread) + teleport
            })
            .collect();

        let delta: f64 = next.iter().zip(&v).map(|(a, b)| (a - b).abs()).sum();
        if delta < params.tolerance {
            tracing::debug!(iteration, delta, "Demand power iteration converged");
            return v;
        }
        v = next;
    }

    tracing::debug!(
        max_iterations = params.max_iterations,
        "Demand power iteration hit iteration cap"
    );
    v
}

fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        values.iter().map(|v| (v - min) / (max - min)).collect()
    } else {
        vec![0.0; values.len()]
    }
}

/// Order scores from most to least demanded (ties by ascending id), rounded
/// to 4 decimals.
pub fn rank_by_demand(scores: &BTreeMap<DbId, f64>) -> Vec<DemandRanking> {
    let mut rows: Vec<DemandRanking> = scores
        .iter()
        .map(|(id, score)| DemandRanking {
            asset_id: *id,
            demand_score: round_to(*score, 4),
        })
        .collect();
    // BTreeMap iteration is already id-ascending; a stable sort keeps that for ties.
    rows.sort_by(|a, b| b.demand_score.total_cmp(&a.demand_score));
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alloc(asset_id: DbId, team_id: DbId, hours: Option<f64>) -> Allocation {
        Allocation {
            asset_id: Some(asset_id),
            team_id: Some(team_id),
            actual_hours_used: hours,
            ..Allocation::default()
        }
    }

    // -- calculate_demand_scores --

    #[test]
    fn empty_assets_yield_empty_scores() {
        let scores = calculate_demand_scores(&[], &[alloc(1, 1, None)], &DemandParams::default());
        assert!(scores.is_empty());
    }

    #[test]
    fn no_allocations_all_tie_at_zero() {
        let scores = calculate_demand_scores(&[1, 2, 3], &[], &DemandParams::default());
        assert_eq!(scores.len(), 3);
        assert!(scores.values().all(|s| *s == 0.0));
    }

    #[test]
    fn single_asset_scores_zero() {
        let scores =
            calculate_demand_scores(&[7], &[alloc(7, 1, Some(4.0))], &DemandParams::default());
        assert_eq!(scores.get(&7), Some(&0.0));
    }

    #[test]
    fn heavier_usage_ranks_higher() {
        let allocations = vec![alloc(1, 10, Some(9.0)), alloc(2, 10, Some(1.0))];
        let scores = calculate_demand_scores(&[1, 2, 3], &allocations, &DemandParams::default());

        assert!((scores[&1] - 1.0).abs() < 1e-9);
        assert!(scores[&3].abs() < 1e-9);
        assert!(scores[&2] > 0.0 && scores[&2] < 1.0);
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let allocations = vec![
            alloc(1, 10, Some(3.0)),
            alloc(2, 10, None),
            alloc(2, 11, Some(8.0)),
            alloc(4, 11, Some(2.0)),
            alloc(5, 12, Some(0.0)),
        ];
        let scores =
            calculate_demand_scores(&[1, 2, 3, 4, 5], &allocations, &DemandParams::default());
        assert!(scores.values().all(|s| (0.0..=1.0).contains(s)));
        assert!(scores.values().any(|s| (*s - 1.0).abs() < 1e-9));
    }

    #[test]
    fn unusable_allocations_are_skipped() {
        let allocations = vec![
            alloc(99, 10, Some(5.0)),
            Allocation {
                asset_id: Some(1),
                team_id: None,
                ..Allocation::default()
            },
            Allocation::default(),
        ];
        let scores = calculate_demand_scores(&[1, 2], &allocations, &DemandParams::default());
        assert!(scores.values().all(|s| *s == 0.0));
    }

    #[test]
    fn iteration_cap_bounds_the_loop() {
        let params = DemandParams {
            damping: 1.0,
            max_iterations: 1,
            tolerance: 0.0,
        };
        let scores = calculate_demand_scores(&[1, 2], &[alloc(1, 1, Some(2.0))], &params);
        assert_eq!(scores.len(), 2);
        assert!(scores[&1] >= scores[&2]);
    }

    #[test]
    fn convergence_keeps_vector_before_final_step() {
        // A loose tolerance converges on the first step, so the uniform start
        // is kept and every asset ties.
        let params = DemandParams {
            tolerance: 10.0,
            ..DemandParams::default()
        };
        let scores = calculate_demand_scores(&[1, 2], &[alloc(1, 1, Some(5.0))], &params);
        assert_eq!(scores[&1], 0.0);
        assert_eq!(scores[&2], 0.0);
    }

    // -- rank_by_demand --

    #[test]
    fn ranking_sorted_descending_with_id_tiebreak() {
        let scores: BTreeMap<DbId, f64> =
            [(3, 0.5), (1, 0.5), (2, 1.0), (4, 0.123_456)].into_iter().collect();
        let ranked = rank_by_demand(&scores);
        let ids: Vec<DbId> = ranked.iter().map(|r| r.asset_id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
        assert_eq!(ranked[3].demand_score, 0.1235);
    }
}
