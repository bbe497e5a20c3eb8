use crate::error::{Result, WrapErr};
use rpc::UserSearchClient;
use rpc::search::{Cursor, Page, ServiceError, User};
use search_controller::SearchService;
use std::path::Path;
use tarpc::{client, context, tokio_serde::formats::Bincode};
use tracing::{debug, info};

pub async fn connect(unix_socket_path: &Path) -> Result<UserSearchClient> {
    let mut transport =
        tarpc::serde_transport::unix::connect(unix_socket_path, Bincode::default);
    transport.config_mut().max_frame_length(usize::MAX);

    let transport = transport
        .await
        .with_context(|| format!("Could not connect to {unix_socket_path:?}"))?;
    let client = UserSearchClient::new(client::Config::default(), transport).spawn();

    let pong = client.ping(context::current()).await.context("Ping server")?;
    info!("connected to RPC server ({pong})");
    Ok(client)
}

/// [`SearchService`] backed by the remote user search, sending the same
/// credential with every request.
#[derive(Clone)]
pub struct RpcSearchService {
    client: UserSearchClient,
    credential: Option<String>,
}

impl RpcSearchService {
    pub fn new(client: UserSearchClient, credential: Option<String>) -> Self {
        Self { client, credential }
    }
}

#[async_trait::async_trait]
impl SearchService<User> for RpcSearchService {
    async fn search(
        &self,
        query: &str,
        after: Option<&Cursor>,
    ) -> std::result::Result<Page<User>, ServiceError> {
        debug!(query, after = ?after, "remote search");
        self.client
            .search_users(
                context::current(),
                query.to_string(),
                after.cloned(),
                self.credential.clone(),
            )
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?
    }
}
