pub mod constants;

pub use etcetera::AppStrategy;
use etcetera::{AppStrategyArgs, choose_app_strategy};

use std::env;
use std::path::PathBuf;

pub fn create_strategy() -> std::result::Result<impl AppStrategy, etcetera::HomeDirError> {
    choose_app_strategy(AppStrategyArgs {
        top_level_domain: constants::TOP_LEVEL_DOMAIN.to_string(),
        author: constants::AUTHOR.to_string(),
        app_name: constants::APP_NAME.to_string(),
    })
}

/// Resolve a directory from `env_key` first, then the platform strategy, and
/// finally a per-app folder under the temp dir.
pub fn resolve_dir<S, F>(env_key: &str, strategy: &S, strategy_fn: F) -> PathBuf
where
    S: AppStrategy,
    F: FnOnce(&S) -> Option<PathBuf>,
{
    env::var_os(env_key)
        .map(PathBuf::from)
        .or_else(|| strategy_fn(strategy))
        .unwrap_or_else(|| env::temp_dir().join(constants::APP_NAME))
}

/// Path of the unix socket the server listens on and the client connects to.
pub fn socket_path<S: AppStrategy>(strategy: &S) -> PathBuf {
    resolve_dir("RUNTIME_DIRECTORY", strategy, |s| s.runtime_dir())
        .join(constants::UNIX_SOCKET_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path_ends_with_socket_file() {
        let strategy = create_strategy().expect("home dir");
        let path = socket_path(&strategy);
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(constants::UNIX_SOCKET_FILE_NAME)
        );
    }

    #[test]
    fn test_resolve_dir_falls_back_to_temp() {
        let strategy = create_strategy().expect("home dir");
        let dir = resolve_dir("USERSEARCH_TEST_UNSET_VARIABLE", &strategy, |_| None);
        assert_eq!(dir, env::temp_dir().join(constants::APP_NAME));
    }
}
