// src/config.rs
use crate::adapter::ControllerSettings;
use crate::application::usecase::PollingCadence;
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::model::{Interval, NotificationTimings};
use crate::domain::service::DisplayZone;
use crate::infrastructure::view::DashboardMarkup;
use dotenv::dotenv;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Trading engine connection
    pub engine: EngineConfig,

    /// Refresh periods
    pub polling: PollingConfig,

    /// Notification lifetimes
    pub notifications: NotificationConfig,

    /// Initial page content
    pub dashboard: DashboardConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trading engine connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine origin (e.g., "http://127.0.0.1:5000")
    pub base_url: String,

    /// Upper bound for a single request, in seconds
    pub request_timeout_secs: u64,
}

/// Polling periods in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    pub status_secs: u64,
    pub stats_secs: u64,
    pub trades_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Time a notification stays on screen, in milliseconds
    pub display_ms: u64,

    /// Exit transition before removal, in milliseconds
    pub removal_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Symbols offered by the selector (e.g., ["ETHUSD", "BTCUSD"])
    pub symbols: Vec<String>,

    /// Preselected interval (e.g., "5m")
    pub interval: String,

    /// Prefilled account balance
    pub balance: Decimal,

    /// Zone for trade timestamps: "local" or "utc"
    pub timezone: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Names a JSON config file that takes precedence over the environment
pub const CONFIG_PATH_VAR: &str = "DASHBOARD_CONFIG";

impl Config {
    /// Load from the file named by `DASHBOARD_CONFIG` when set, otherwise
    /// from environment variables
    pub fn load() -> DashboardResult<Self> {
        dotenv().ok();

        match env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                log::debug!("Loading configuration from {}", path);
                Self::from_file(path.trim())
            }
            _ => Self::from_env(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> DashboardResult<Self> {
        // Load .env file if it exists
        dotenv().ok();
        let defaults = Config::default();

        let engine_config = EngineConfig {
            base_url: env::var("ENGINE_BASE_URL").unwrap_or(defaults.engine.base_url),
            request_timeout_secs: env_or("ENGINE_REQUEST_TIMEOUT_SECS", defaults.engine.request_timeout_secs),
        };

        let polling_config = PollingConfig {
            status_secs: env_or("POLL_STATUS_SECS", defaults.polling.status_secs),
            stats_secs: env_or("POLL_STATS_SECS", defaults.polling.stats_secs),
            trades_secs: env_or("POLL_TRADES_SECS", defaults.polling.trades_secs),
        };

        let notification_config = NotificationConfig {
            display_ms: env_or("NOTIFY_DISPLAY_MS", defaults.notifications.display_ms),
            removal_ms: env_or("NOTIFY_REMOVAL_MS", defaults.notifications.removal_ms),
        };

        let symbols = match env::var("DASHBOARD_SYMBOLS") {
            Ok(value) => value
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.dashboard.symbols,
        };

        let dashboard_config = DashboardConfig {
            symbols,
            interval: env::var("DASHBOARD_INTERVAL").unwrap_or(defaults.dashboard.interval),
            balance: env::var("DASHBOARD_BALANCE")
                .ok()
                .map(|value| {
                    Decimal::from_str(value.trim())
                        .map_err(|e| DashboardError::Config(format!("Invalid DASHBOARD_BALANCE {}: {}", value, e)))
                })
                .transpose()?
                .unwrap_or(defaults.dashboard.balance),
            timezone: env::var("DASHBOARD_TIMEZONE").unwrap_or(defaults.dashboard.timezone),
        };

        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env_or("LOG_TO_FILE", false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        let config = Config {
            engine: engine_config,
            polling: polling_config,
            notifications: notification_config,
            dashboard: dashboard_config,
            logging: logging_config,
        };
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DashboardResult<Self> {
        let mut file = File::open(path).map_err(|e| {
            DashboardError::Config(format!("Failed to open config file: {}", e))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            DashboardError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            DashboardError::Config(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values the dashboard cannot run with
    pub fn validate(&self) -> DashboardResult<()> {
        if self.polling.status_secs == 0 || self.polling.stats_secs == 0 || self.polling.trades_secs == 0 {
            return Err(DashboardError::Config("Polling periods must be at least one second".to_string()));
        }
        if self.engine.request_timeout_secs == 0 {
            return Err(DashboardError::Config("Request timeout must be at least one second".to_string()));
        }
        if self.dashboard.symbols.is_empty() {
            return Err(DashboardError::Config("At least one dashboard symbol is required".to_string()));
        }
        self.interval()?;
        self.display_zone()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.request_timeout_secs)
    }

    pub fn cadence(&self) -> PollingCadence {
        PollingCadence {
            status: Duration::from_secs(self.polling.status_secs),
            stats: Duration::from_secs(self.polling.stats_secs),
            trades: Duration::from_secs(self.polling.trades_secs),
        }
    }

    pub fn notification_timings(&self) -> NotificationTimings {
        NotificationTimings {
            display: Duration::from_millis(self.notifications.display_ms),
            removal: Duration::from_millis(self.notifications.removal_ms),
            ..Default::default()
        }
    }

    pub fn interval(&self) -> DashboardResult<Interval> {
        Interval::from_str(&self.dashboard.interval)
            .map_err(|_| DashboardError::Config(format!("Invalid dashboard interval: {}", self.dashboard.interval)))
    }

    pub fn display_zone(&self) -> DashboardResult<DisplayZone> {
        DisplayZone::from_str(&self.dashboard.timezone)
    }

    pub fn markup(&self) -> DashboardResult<DashboardMarkup> {
        Ok(DashboardMarkup {
            symbols: self.dashboard.symbols.clone(),
            interval: self.interval()?,
            balance: self.dashboard.balance,
        })
    }

    pub fn controller_settings(&self) -> DashboardResult<ControllerSettings> {
        Ok(ControllerSettings {
            cadence: self.cadence(),
            timings: self.notification_timings(),
            zone: self.display_zone()?,
        })
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> DashboardResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    DashboardError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        // Initialize the logger
        builder
            .try_init()
            .map_err(|e| DashboardError::Config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                request_timeout_secs: 10,
            },
            polling: PollingConfig {
                status_secs: 5,
                stats_secs: 10,
                trades_secs: 15,
            },
            notifications: NotificationConfig {
                display_ms: 3000,
                removal_ms: 300,
            },
            dashboard: DashboardConfig {
                symbols: vec!["ETHUSD".to_string(), "BTCUSD".to_string()],
                interval: "5m".to_string(),
                balance: dec!(300),
                timezone: "local".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_timings() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.cadence(), PollingCadence::default());
        assert_eq!(config.notification_timings(), NotificationTimings::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));

        let markup = config.markup().unwrap();
        assert_eq!(markup.interval, Interval::Minutes5);
        assert_eq!(markup.symbols, vec!["ETHUSD".to_string(), "BTCUSD".to_string()]);
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut config = Config::default();
        config.polling.stats_secs = 0;
        assert!(matches!(config.validate(), Err(DashboardError::Config(_))));

        let mut config = Config::default();
        config.dashboard.interval = "2m".to_string();
        assert!(matches!(config.validate(), Err(DashboardError::Config(_))));

        let mut config = Config::default();
        config.dashboard.timezone = "mars".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.dashboard.symbols.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_prefers_config_file() {
        let path = std::env::temp_dir().join(format!("engine_dashboard_config_{}.json", std::process::id()));
        let mut config = Config::default();
        config.engine.base_url = "https://engine.example:8443".to_string();
        config.dashboard.timezone = "utc".to_string();
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        env::set_var(CONFIG_PATH_VAR, &path);
        let loaded = Config::load();
        env::remove_var(CONFIG_PATH_VAR);
        std::fs::remove_file(&path).ok();

        let loaded = loaded.unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.display_zone().unwrap(), DisplayZone::Utc);
    }

    #[test]
    fn test_invalid_config_file_rejected() {
        let path = std::env::temp_dir().join(format!("engine_dashboard_bad_{}.json", std::process::id()));
        let mut config = Config::default();
        config.polling.trades_secs = 0;
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let result = Config::from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert!(matches!(
            Config::from_file("/nonexistent/engine_dashboard.json"),
            Err(DashboardError::Config(_))
        ));
    }
}
