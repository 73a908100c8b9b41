//! Central Configuration Constants
//!
//! Single source of truth for all analysis defaults.
//! `AnalyzerConfig::default()` and the env overlay read from here.

/// Default window size (seconds) - hourly windows
pub const DEFAULT_WINDOW_SECS: i64 = 3600;

/// Volume anomaly: standard deviations from trailing mean
pub const DEFAULT_VOLUME_THRESHOLD: f64 = 2.5;

/// Protocol anomaly: normalized entropy floor
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 0.7;

/// Burst: sudden traffic increase factor (std devs)
pub const DEFAULT_BURST_FACTOR: f64 = 3.0;

/// Pattern anomaly: z-score limit for shape metrics
pub const DEFAULT_PATTERN_THRESHOLD: f64 = 3.0;

/// Seed windows needed before burst/volume checks run
pub const DEFAULT_MIN_HISTORY_WINDOWS: usize = 12;

/// Trailing baseline length (windows)
pub const DEFAULT_TRAILING_WINDOWS: usize = 24;

/// Prior patterns of the same hour bucket needed for pattern checks
pub const DEFAULT_MIN_PATTERN_HISTORY: usize = 3;

/// Records a window needs before its protocol mix is judged
pub const DEFAULT_MIN_WINDOW_RECORDS: usize = 3;

/// Fallback seasonal period (windows) - daily for hourly windows
pub const DEFAULT_SEASONAL_PERIOD: usize = 24;

/// Minimum autocorrelation for a detected period to be trusted
pub const DEFAULT_SEASONALITY_MIN_STRENGTH: f64 = 0.3;

/// Hotspot percentile of node weights
pub const DEFAULT_HOTSPOT_PERCENTILE: f64 = 95.0;

/// Distinct peers that make a host fan-out / fan-in
pub const DEFAULT_FAN_THRESHOLD: usize = 10;

/// (protocol, port) frequency below this is "rare"
pub const DEFAULT_RARITY_THRESHOLD: f64 = 0.01;

/// DBSCAN neighborhood radius (standardized units)
pub const DEFAULT_CLUSTER_EPS: f64 = 0.3;

/// DBSCAN minimum neighborhood size (point included)
pub const DEFAULT_CLUSTER_MIN_SAMPLES: usize = 5;

/// Samples a behavioral feature needs before it is trained
pub const DEFAULT_BASELINE_MIN_SAMPLES: usize = 1;

/// Base deviation band (z units) for behavioral thresholds
pub const DEFAULT_DEVIATION_BAND: f64 = 3.0;

/// Upper bound on the windows one batch may span
pub const DEFAULT_MAX_WINDOWS: usize = 100_000;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "traffic-pattern-core";

// ============================================
// Env helper
// ============================================

/// Read a parseable value from the environment, falling back to `default`
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

