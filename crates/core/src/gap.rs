//! Requirement-vs-availability gap analysis.
//!
//! Requirement quantities and available asset counts are aggregated per
//! category, then both sorted key sets are swept together and each category
//! is classified as met, unmet or over-provisioned.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{requirement_map, CategoryStock, Requirement};
use crate::types::{round_to, DbId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetRequirement {
    pub category_id: DbId,
    pub needed: u64,
    pub available: u64,
    pub surplus: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmetRequirement {
    pub category_id: DbId,
    pub needed: u64,
    pub available: u64,
    pub shortage: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverProvisioned {
    pub category_id: DbId,
    pub surplus: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapAnalysis {
    pub met_requirements: Vec<MetRequirement>,
    pub unmet_requirements: Vec<UnmetRequirement>,
    pub over_provisioned: Vec<OverProvisioned>,
    /// Share of required units in fully met categories, rounded to 4 decimals.
    pub gap_score: f64,
    pub total_required: u64,
    pub total_available_matching: u64,
}

/// Count available assets per category.
fn availability_map(assets: &[CategoryStock]) -> BTreeMap<DbId, u64> {
    let mut map = BTreeMap::new();
    for asset in assets.iter().filter(|a| a.is_available()) {
        *map.entry(asset.category_id).or_insert(0) += 1;
    }
    map
}

/// Classify every category appearing in `requirements` or `assets`.
///
/// With no requirements at all the gap score is `1.0`.
pub fn analyze_resource_gap(requirements: &[Requirement], assets: &[CategoryStock]) -> GapAnalysis {
    let needed = requirement_map(requirements);
    let available = availability_map(assets);

    let mut met = Vec::new();
    let mut unmet = Vec::new();
    let mut over = Vec::new();

    let mut classify = |category_id: DbId, needed: u64, available: u64| {
        if needed == 0 && available > 0 {
            over.push(OverProvisioned {
                category_id,
                surplus: available,
            });
        } else if needed > 0 && available >= needed {
            met.push(MetRequirement {
                category_id,
                needed,
                available,
                surplus: available - needed,
            });
        } else {
            unmet.push(UnmetRequirement {
                category_id,
                needed,
                available,
                shortage: needed.saturating_sub(available),
            });
        }
    };

    // Merge sweep over the two sorted key sets.
    let mut req_iter = needed.iter().peekable();
    let mut avail_iter = available.iter().peekable();
    loop {
        match (req_iter.peek(), avail_iter.peek()) {
            (Some(&(&rc, &rq)), Some(&(&ac, &aq))) => match rc.cmp(&ac) {
                Ordering::Less => {
                    classify(rc, rq, 0);
                    req_iter.next();
                }
                Ordering::Greater => {
                    classify(ac, 0, aq);
                    avail_iter.next();
                }
                Ordering::Equal => {
                    classify(rc, rq, aq);
                    req_iter.next();
                    avail_iter.next();
                }
            },
            (Some(&(&rc, &rq)), None) => {
                classify(rc, rq, 0);
                req_iter.next();
            }
            (None, Some(&(&ac, &aq))) => {
                classify(ac, 0, aq);
                avail_iter.next();
            }
            (None, None) => break,
        }
    }

    let total_required = needed.values().fold(0_u64, |acc, qty| acc.saturating_add(*qty));
    let total_met = met
        .iter()
        .map(|m| m.needed.min(m.available))
        .fold(0_u64, u64::saturating_add);
    let gap_score = if total_required > 0 {
        total_met as f64 / total_required as f64
    } else {
        1.0
    };

    GapAnalysis {
        met_requirements: met,
        unmet_requirements: unmet,
        over_provisioned: over,
        gap_score: round_to(gap_score, 4),
        total_required,
        total_available_matching: total_met,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
