//! Utilization trend analysis over a usage-log stream.
//!
//! Hours are bucketed per asset and calendar day, laid out on a common day
//! axis shared by all assets (missing days count as zero), and smoothed with
//! a trailing rolling average. Also reports the busiest days overall and the
//! assets whose mean daily usage falls under the idle threshold.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{AnalyticsConfig, DEFAULT_IDLE_HOURS_THRESHOLD, DEFAULT_WINDOW_DAYS};
use crate::records::UsageLog;
use crate::types::DbId;

/// Number of peak-demand days reported.
pub const PEAK_PERIOD_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendOptions {
    pub window_days: u32,
    pub idle_hours_threshold: f64,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            idle_hours_threshold: DEFAULT_IDLE_HOURS_THRESHOLD,
        }
    }
}

impl From<&AnalyticsConfig> for TrendOptions {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            window_days: config.default_window_days,
            idle_hours_threshold: config.idle_hours_threshold,
        }
    }
}

/// Daily series for one asset on the shared day axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetTrend {
    pub days: Vec<NaiveDate>,
    pub daily_hours: Vec<f64>,
    pub rolling_avg: Vec<f64>,
    pub peak_hours: f64,
    pub avg_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakPeriod {
    pub date: NaiveDate,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationTrend {
    pub asset_trends: BTreeMap<DbId, AssetTrend>,
    pub peak_periods: Vec<PeakPeriod>,
    pub idle_asset_ids: Vec<DbId>,
    pub window_days: u32,
}

/// Compute per-asset rolling utilization, peak days and idle assets.
///
/// Entries without an asset id or a readable timestamp are dropped.
pub fn compute_utilization_trend(logs: &[UsageLog], options: &TrendOptions) -> UtilizationTrend {
    let mut per_asset: BTreeMap<DbId, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    let mut dropped = 0usize;

    for log in logs {
        let (Some(asset_id), Some(day)) = (
            log.asset_id,
            log.logged_at.as_ref().and_then(|ts| ts.day()),
        ) else {
            dropped += 1;
            continue;
        };
        *per_asset
            .entry(asset_id)
            .or_default()
            .entry(day)
            .or_insert(0.0) += log.hours();
    }
    if dropped > 0 {
        tracing::debug!(dropped, "Usage logs without asset or readable timestamp skipped");
    }

    let axis: Vec<NaiveDate> = per_asset
        .values()
        .flat_map(|daily| daily.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let asset_trends: BTreeMap<DbId, AssetTrend> = per_asset
        .iter()
        .map(|(asset_id, daily)| {
            let hours: Vec<f64> = axis
                .iter()
                .map(|day| daily.get(day).copied().unwrap_or(0.0))
                .collect();
            (*asset_id, build_trend(&axis, hours, options.window_days))
        })
        .collect();

    let peak_periods = peak_days(&axis, &asset_trends);

    let idle_asset_ids = asset_trends
        .iter()
        .filter(|(_, trend)| trend.avg_hours < options.idle_hours_threshold)
        .map(|(id, _)| *id)
        .collect();

    UtilizationTrend {
        asset_trends,
        peak_periods,
        idle_asset_ids,
        window_days: options.window_days,
    }
}

fn build_trend(axis: &[NaiveDate], daily_hours: Vec<f64>, window_days: u32) -> AssetTrend {
    let rolling_avg = rolling_average(&daily_hours, window_days as usize);
    let peak_hours = daily_hours.iter().copied().fold(0.0, f64::max);
    let avg_hours = if daily_hours.is_empty() {
        0.0
    } else {
        daily_hours.iter().sum::<f64>() / daily_hours.len() as f64
    };
    AssetTrend {
        days: axis.to_vec(),
        daily_hours,
        rolling_avg,
        peak_hours,
        avg_hours,
    }
}

/// Trailing mean over `[max(0, i - window + 1), i]`. A zero window averages
/// nothing and yields `0.0`.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![0.0; values.len()];
    }
    (0..values.len())
        .map(|i| {
            let slice = &values[(i + 1).saturating_sub(window)..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

fn peak_days(axis: &[NaiveDate], trends: &BTreeMap<DbId, AssetTrend>) -> Vec<PeakPeriod> {
    let mut totals: Vec<PeakPeriod> = axis
        .iter()
        .enumerate()
        .map(|(i, day)| PeakPeriod {
            date: *day,
            total_hours: trends.values().map(|t| t.daily_hours[i]).sum(),
        })
        .collect();
    // Stable: equal totals stay in day order.
    totals.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    totals.truncate(PEAK_PERIOD_COUNT);
    totals
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
