pub const APP_NAME: &str = "usersearch";
pub const AUTHOR: &str = "usersearch";
pub const TOP_LEVEL_DOMAIN: &str = "org";

pub const UNIX_SOCKET_FILE_NAME: &str = "usersearch.sock";
pub const SERVER_CONFIG_FILE_NAME: &str = "server.toml";
pub const CLIENT_CONFIG_FILE_NAME: &str = "client.toml";
