use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use heatwatch_core::{
    find_config_file, load_config, WeekPolicy, DANGER_THRESHOLD, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_PORT, DEFAULT_UTC_OFFSET_HOURS,
};
use log::LevelFilter;
use std::{env, time::Duration};
use time::{format_description::well_known::Iso8601, OffsetDateTime, UtcOffset};

use crate::DashboardSettings;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Heatwatch - heat index dashboard for Philippine weather stations"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $HEATWATCH_CONFIG, ./heatwatch.toml,
    /// $XDG_CONFIG_HOME/heatwatch/heatwatch.toml, /etc/heatwatch/heatwatch.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "HEATWATCH_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "HEATWATCH_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "HEATWATCH_PORT")]
    pub port: Option<String>,

    /// Public URL for API responses and UI
    #[arg(short, long, env = "HEATWATCH_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Directory for the SQLite heat index database
    #[arg(short = 'b', long, env = "HEATWATCH_DB_DIR")]
    pub db_dir: Option<String>,

    /// Directory containing UI static files
    #[arg(short, long, env = "HEATWATCH_UI_DIR")]
    pub ui_dir: Option<String>,

    /// Redis URL for the response cache; an in-process cache is used when unset
    #[arg(long, env = "HEATWATCH_REDIS_URL")]
    pub redis_url: Option<String>,

    /// Seconds a cached API response stays fresh (0 disables caching)
    #[arg(long, env = "HEATWATCH_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// Interpreter or executable that runs the forecast model
    #[arg(long, env = "HEATWATCH_FORECAST_PROGRAM")]
    pub forecast_program: Option<String>,

    /// Forecast model script, passed to the program before the date
    #[arg(long, env = "HEATWATCH_FORECAST_SCRIPT")]
    pub forecast_script: Option<String>,

    /// Seconds before a forecast model run is killed
    #[arg(long, env = "HEATWATCH_FORECAST_TIMEOUT_SECS")]
    pub forecast_timeout_secs: Option<u64>,

    /// Heat index (°C) at or above which a station counts as in danger
    #[arg(long, env = "HEATWATCH_DANGER_THRESHOLD")]
    pub danger_threshold: Option<f64>,

    /// Offset from UTC, in hours, used to decide what "today" is
    #[arg(long, env = "HEATWATCH_UTC_OFFSET_HOURS", allow_negative_numbers = true)]
    pub utc_offset_hours: Option<i8>,

    /// Week window layout: rolling (last seven days) or iso_week (Monday to Sunday)
    #[arg(long, env = "HEATWATCH_WEEK_POLICY")]
    pub week_policy: Option<String>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn db_dir(&self) -> String {
        self.db_dir
            .clone()
            .unwrap_or_else(|| "./heatwatch_data".to_string())
    }

    pub fn static_dir(&self) -> String {
        self.ui_dir
            .clone()
            .unwrap_or_else(|| "./static".to_string())
    }

    pub fn forecast_program(&self) -> String {
        self.forecast_program
            .clone()
            .unwrap_or_else(|| "python3".to_string())
    }

    pub fn forecast_script(&self) -> String {
        self.forecast_script
            .clone()
            .unwrap_or_else(|| "./services/forecast.py".to_string())
    }

    pub fn forecast_timeout(&self) -> Duration {
        Duration::from_secs(self.forecast_timeout_secs.unwrap_or(120))
    }

    pub fn dashboard_settings(&self) -> anyhow::Result<DashboardSettings> {
        let hours = self.utc_offset_hours.unwrap_or(DEFAULT_UTC_OFFSET_HOURS);
        let utc_offset = UtcOffset::from_hms(hours, 0, 0)
            .map_err(|e| anyhow::anyhow!("invalid utc_offset_hours {}: {}", hours, e))?;

        let week_policy = match self.week_policy.as_deref() {
            Some(raw) => raw.parse::<WeekPolicy>()?,
            None => WeekPolicy::default(),
        };

        Ok(DashboardSettings {
            danger_threshold: self.danger_threshold.unwrap_or(DANGER_THRESHOLD),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS)),
            utc_offset,
            week_policy,
        })
    }

    /// Fill every unset field from `file`
    fn or(self, file: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file.level),
            domain: self.domain.or(file.domain),
            port: self.port.or(file.port),
            remote_url: self.remote_url.or(file.remote_url),
            db_dir: self.db_dir.or(file.db_dir),
            ui_dir: self.ui_dir.or(file.ui_dir),
            redis_url: self.redis_url.or(file.redis_url),
            cache_ttl_secs: self.cache_ttl_secs.or(file.cache_ttl_secs),
            forecast_program: self.forecast_program.or(file.forecast_program),
            forecast_script: self.forecast_script.or(file.forecast_script),
            forecast_timeout_secs: self.forecast_timeout_secs.or(file.forecast_timeout_secs),
            danger_threshold: self.danger_threshold.or(file.danger_threshold),
            utc_offset_hours: self.utc_offset_hours.or(file.utc_offset_hours),
            week_policy: self.week_policy.or(file.week_policy),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> anyhow::Result<Cli> {
    merge_config_file(Cli::parse())
}

/// Fill unset flags from the config file. A file that was found but cannot
/// be read or parsed is an error, as is a `--config` path that does not exist.
fn merge_config_file(cli_args: Cli) -> anyhow::Result<Cli> {
    let source = find_config_file(cli_args.config.as_deref(), "HEATWATCH_CONFIG", "heatwatch.toml");

    // The logger is not up yet, so report straight to stderr
    if let Some(path) = source.path() {
        eprintln!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source)?;

    // CLI args override file config (env vars are handled by clap)
    Ok(cli_args.or(file_config))
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc()
                    .format(&Iso8601::DEFAULT)
                    .unwrap_or_default(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
