use std::fmt::Display;
use std::str::FromStr;

use resourcemesh_core::config::AnalyticsConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Engine defaults used when a request does not override them.
    pub analytics: AnalyticsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `DEMAND_DAMPING`         | `0.85`                     |
    /// | `DEMAND_MAX_ITERATIONS`  | `100`                      |
    /// | `TREND_WINDOW_DAYS`      | `7`                        |
    /// | `IDLE_HOURS_THRESHOLD`   | `2.4`                      |
    /// | `STRONG_CO_USAGE_WEIGHT` | `2`                        |
    /// | `MAX_UPGRADE_PATHS`      | `5`                        |
    /// | `MAX_URGENT_MATCHES`     | `10`                       |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let analytics = analytics_from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            analytics,
        }
    }
}

/// Engine defaults with any env overrides applied, then validated.
fn analytics_from_env() -> AnalyticsConfig {
    let defaults = AnalyticsConfig::default();
    let config = AnalyticsConfig {
        damping: env_or("DEMAND_DAMPING", defaults.damping),
        max_iterations: env_or("DEMAND_MAX_ITERATIONS", defaults.max_iterations),
        default_window_days: env_or("TREND_WINDOW_DAYS", defaults.default_window_days),
        idle_hours_threshold: env_or("IDLE_HOURS_THRESHOLD", defaults.idle_hours_threshold),
        strong_co_usage_weight: env_or("STRONG_CO_USAGE_WEIGHT", defaults.strong_co_usage_weight),
        max_upgrade_paths: env_or("MAX_UPGRADE_PATHS", defaults.max_upgrade_paths),
        max_urgent_matches: env_or("MAX_URGENT_MATCHES", defaults.max_urgent_matches),
        ..defaults
    };

    if let Err(e) = config.validate() {
        panic!("Invalid analytics configuration: {e}");
    }
    config
}

/// Parse `name` from the environment, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid value, got '{raw}': {e}")),
        Err(_) => default,
    }
}
