use crate::application::services::LoadingPacing;
use crate::shared::error::AppError;
use sl_core::config;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:4000/api";
pub const DEFAULT_MIRROR_URL: &str = "sqlite://data/tracking_mirror.db?mode=rwc";
pub const DEFAULT_ADMIN_PASSPHRASE: &str = "qwertykeyboard";

/// Where the local mirror lives. `sqlite:` URLs select the SQLite backend,
/// `memory` keeps it in process, anything else is a directory of JSON files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorLocation {
    Sqlite(String),
    JsonDir(PathBuf),
    Memory,
}

impl MirrorLocation {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("sqlite:") {
            MirrorLocation::Sqlite(value.to_string())
        } else if value.eq_ignore_ascii_case("memory") {
            MirrorLocation::Memory
        } else {
            MirrorLocation::JsonDir(PathBuf::from(value))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub mirror: MirrorLocation,
    pub http_timeout: Duration,
    /// `None` disables the periodic refresh.
    pub refresh_interval: Option<Duration>,
    pub mirror_poll: Duration,
    pub admin_passphrase: String,
    pub loading: LoadingPacing,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            mirror: MirrorLocation::parse(DEFAULT_MIRROR_URL),
            http_timeout: Duration::from_secs(10),
            refresh_interval: Some(Duration::from_secs(60)),
            mirror_poll: Duration::from_millis(1000),
            admin_passphrase: DEFAULT_ADMIN_PASSPHRASE.to_string(),
            loading: LoadingPacing::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.loading.min > self.loading.max {
            return Err(AppError::Configuration(
                "SL_LOADING_MIN_MILLIS must not exceed SL_LOADING_MAX_MILLIS".to_string(),
            ));
        }
        if self.mirror_poll.is_zero() {
            return Err(AppError::Configuration(
                "SL_MIRROR_POLL_MILLIS must be greater than zero".to_string(),
            ));
        }
        if self.admin_passphrase.is_empty() {
            return Err(AppError::Configuration(
                "SL_ADMIN_PASSPHRASE must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn number_from_env(name: &str, default: u64) -> Result<u64, AppError> {
    config::u64_from_env(name, default).map_err(|err| AppError::Configuration(err.to_string()))
}

pub fn load_client_config() -> Result<ClientConfig, AppError> {
    let refresh_secs = number_from_env("SL_REFRESH_INTERVAL_SECS", 60)?;
    let config = ClientConfig {
        api_base: config::env_or("SL_API_BASE", DEFAULT_API_BASE),
        mirror: MirrorLocation::parse(&config::env_or("SL_MIRROR_URL", DEFAULT_MIRROR_URL)),
        http_timeout: Duration::from_secs(number_from_env("SL_HTTP_TIMEOUT_SECS", 10)?),
        refresh_interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
        mirror_poll: Duration::from_millis(number_from_env("SL_MIRROR_POLL_MILLIS", 1000)?),
        admin_passphrase: config::env_or("SL_ADMIN_PASSPHRASE", DEFAULT_ADMIN_PASSPHRASE),
        loading: LoadingPacing::new(
            Duration::from_millis(number_from_env("SL_LOADING_MIN_MILLIS", 2000)?),
            Duration::from_millis(number_from_env("SL_LOADING_MAX_MILLIS", 10000)?),
        ),
    };
    config.validate()?;
    Ok(config)
}
