use crate::error::Result;
use config::{AppStrategy, create_strategy, resolve_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// JSON array of users. The builtin catalog is served when unset.
    pub catalog: Option<PathBuf>,
    pub page_size: usize,
    /// Accepted access tokens. An empty list disables the credential check.
    pub credentials: Vec<String>,
    /// Artificial delay added to every search
    pub latency_ms: u64,
    pub socket_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            page_size: 30,
            credentials: Vec::new(),
            latency_ms: 0,
            socket_path: None,
        }
    }
}

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        Ok(user_config)
    }

    pub fn load() -> Result<Config> {
        let strategy = create_strategy()?;
        let config_path = resolve_dir("CONFIG_DIRECTORY", &strategy, |s| Some(s.config_dir()))
            .join(config::constants::SERVER_CONFIG_FILE_NAME);

        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => Self::load_str(&user_config_str),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::create_example_config(&config_path)?;
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn socket_path(&self) -> Result<PathBuf> {
        match &self.socket_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config::socket_path(&create_strategy()?)),
        }
    }

    fn create_example_config(config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let example_config = r#"# usersearch server configuration
#
# Created on first start. Restart the server after editing.

# JSON array of { id, login, avatar_url, html_url } records.
# The builtin catalog is served when unset.
# catalog = "/path/to/users.json"

# Records per page
page-size = 30

# Accepted access tokens. Leave empty to allow anonymous searches.
credentials = []

# Artificial delay per search, handy for watching cancellation
latency-ms = 0

# socket-path = "/run/user/1000/usersearch.sock"
"#;

        std::fs::write(config_path, example_config)?;
        tracing::info!("created example config at {config_path:?}");
        Ok(())
    }
}
