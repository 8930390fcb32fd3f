//! Heatwatch Core Library
//!
//! The pure half of the heat-index dashboard:
//! - Date windows for the week/month period selector
//! - Dense time-series normalization for chart feeds
//! - Station summary cards, rankings and classification buckets
//! - Configuration file discovery shared by the binaries

pub mod classification;
mod config;
pub mod series;
pub mod summary;
pub mod window;

pub use classification::{
    classify, classify_and_color, color_for, count_by_classification, ClassificationCount,
    ClassifiedBucket, Threshold, UNKNOWN_COLOR,
};
pub use config::{find_config_file, get_xdg_config_dir, load_config, ConfigSource};
pub use series::{normalize, SeriesPoint, SeriesRow};
pub use summary::{
    forecast_accuracy, rank_stations, summarize, summarize_with_threshold, AccuracyReport,
    ForecastAccuracy, ForecastActual, RankedStation, StationReading, StationSummary,
};
pub use window::{
    parse_date, resolve_window, resolve_window_with, Period, WeekPolicy, Window, WindowError,
};

/// Application name used for config paths
pub const APP_NAME: &str = "heatwatch";

/// Default dashboard port
pub const DEFAULT_PORT: u16 = 9900;

/// Heat index (degrees Celsius) at or above which a station counts toward the danger card
pub const DANGER_THRESHOLD: f64 = 41.0;

/// Default lifetime of cached API responses
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Philippine Standard Time, used to pick "today" when no date is given
pub const DEFAULT_UTC_OFFSET_HOURS: i8 = 8;
