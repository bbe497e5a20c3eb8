use crate::error::Result;
use config::{AppStrategy, constants as config_constants, create_strategy, resolve_dir};
use search_controller::SearchControllerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AppConfig {
    pub credential: Option<String>,
    pub socket_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub debounce_ms: u64,
    /// `0` disables the timeout
    pub request_timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            request_timeout_ms: 10_000,
        }
    }
}

impl ControllerConfig {
    pub fn to_controller_config(&self) -> SearchControllerConfig {
        let timeout = (self.request_timeout_ms > 0)
            .then(|| Duration::from_millis(self.request_timeout_ms));
        SearchControllerConfig::default()
            .with_debounce(Duration::from_millis(self.debounce_ms))
            .with_request_timeout(timeout)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub controller: ControllerConfig,

    // === System state ===
    pub socket_path: PathBuf,
    pub config_path: PathBuf,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
struct RawConfig {
    app: AppConfig,
    controller: ControllerConfig,
}

impl Config {
    fn from_raw(raw: RawConfig, socket_path: PathBuf, config_path: PathBuf) -> Self {
        let socket_path = raw.app.socket_path.clone().unwrap_or(socket_path);
        Self {
            app: raw.app,
            controller: raw.controller,
            socket_path,
            config_path,
        }
    }

    fn config_path<S: AppStrategy>(strategy: &S) -> PathBuf {
        resolve_dir("CONFIG_DIRECTORY", strategy, |s| Some(s.config_dir()))
            .join(config_constants::CLIENT_CONFIG_FILE_NAME)
    }

    fn parse<S: AppStrategy>(config_str: &str, strategy: &S) -> Result<Self> {
        let raw: RawConfig = toml::from_str(config_str)?;
        Ok(Self::from_raw(
            raw,
            config::socket_path(strategy),
            Self::config_path(strategy),
        ))
    }

    /// Read the config file. A missing file yields the defaults.
    pub fn load() -> Result<Config> {
        let strategy = create_strategy()?;

        let content = match std::fs::read_to_string(Self::config_path(&strategy)) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        Self::parse(&content, &strategy)
    }

    #[cfg(test)]
    pub fn load_str(config_str: &str) -> Result<Self> {
        Self::parse(config_str, &create_strategy()?)
    }
}
