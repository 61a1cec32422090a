//! Tunable defaults for the analytics components.
//!
//! The engine is stateless; the caller owns an [`AnalyticsConfig`] and passes
//! the relevant knobs into each component call.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Power-iteration damping factor for demand scoring.
pub const DEFAULT_DAMPING: f64 = 0.85;

/// Hard cap on power iterations, independent of convergence.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// L1 change below which power iteration is considered converged.
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// Trailing window for rolling utilization averages, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Mean daily hours below which an asset is idle (10% of a 24-hour day).
pub const DEFAULT_IDLE_HOURS_THRESHOLD: f64 = 2.4;

/// Co-usage weight at which two assets are merged into one community.
pub const DEFAULT_STRONG_CO_USAGE_WEIGHT: u32 = 2;

/// Maximum number of upgrade paths returned.
pub const DEFAULT_MAX_UPGRADE_PATHS: usize = 5;

/// Maximum number of urgent matches returned.
pub const DEFAULT_MAX_URGENT_MATCHES: usize = 10;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub damping: f64,
    pub max_iterations: u32,
    pub convergence_tolerance: f64,
    pub default_window_days: u32,
    pub idle_hours_threshold: f64,
    pub strong_co_usage_weight: u32,
    pub max_upgrade_paths: usize,
    pub max_urgent_matches: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
            default_window_days: DEFAULT_WINDOW_DAYS,
            idle_hours_threshold: DEFAULT_IDLE_HOURS_THRESHOLD,
            strong_co_usage_weight: DEFAULT_STRONG_CO_USAGE_WEIGHT,
            max_upgrade_paths: DEFAULT_MAX_UPGRADE_PATHS,
            max_urgent_matches: DEFAULT_MAX_URGENT_MATCHES,
        }
    }
}

impl AnalyticsConfig {
    /// Reject values the components cannot run with meaningfully.
    ///
    /// A window of zero days is allowed (it yields zero rolling averages).
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_damping(self.damping)?;
        validate_max_iterations(self.max_iterations)?;
        if !(self.convergence_tolerance > 0.0) {
            return Err(CoreError::Validation(
                "convergence_tolerance must be positive".to_string(),
            ));
        }
        if !(self.idle_hours_threshold >= 0.0) {
            return Err(CoreError::Validation(
                "idle_hours_threshold must not be negative".to_string(),
            ));
        }
        if self.strong_co_usage_weight == 0 {
            return Err(CoreError::Validation(
                "strong_co_usage_weight must be at least 1".to_string(),
            ));
        }
        if self.max_upgrade_paths == 0 || self.max_urgent_matches == 0 {
            return Err(CoreError::Validation(
                "Result limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Damping must lie in `(0, 1]`.
pub fn validate_damping(damping: f64) -> Result<(), CoreError> {
    if damping > 0.0 && damping <= 1.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "damping must be in (0, 1], got {damping}"
        )))
    }
}

pub fn validate_max_iterations(max_iterations: u32) -> Result<(), CoreError> {
    if max_iterations == 0 {
        return Err(CoreError::Validation(
            "max_iterations must be at least 1".to_string(),
        ));
    }
    Ok(())
}
