use super::Command;
use crate::catalog::UserCatalog;
use crate::config::Config;
use crate::error::Result;
use futures::{future, prelude::*};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use rpc::{
    UserSearch,
    search::{Cursor, Page, ServiceError, User},
};
use tarpc::{
    context::Context,
    server::{self, Channel},
    tokio_serde::formats::Bincode,
};

async fn spawn(fut: impl Future<Output = ()> + Send + 'static) {
    tokio::spawn(fut);
}

#[derive(Clone)]
struct Server {
    catalog: Arc<UserCatalog>,
    credentials: Arc<Vec<String>>,
    page_size: usize,
    latency: Duration,
}

impl Server {
    fn authorize(&self, credential: Option<&str>) -> std::result::Result<(), ServiceError> {
        if self.credentials.is_empty() {
            return Ok(());
        }
        match credential {
            Some(token) if self.credentials.iter().any(|c| c == token) => Ok(()),
            _ => Err(ServiceError::MissingCredential),
        }
    }
}

impl UserSearch for Server {
    async fn ping(self, _c: Context) -> String {
        "Pong".to_string()
    }

    async fn search_users(
        self,
        _c: Context,
        query: String,
        after: Option<Cursor>,
        credential: Option<String>,
    ) -> std::result::Result<Page<User>, ServiceError> {
        info!(%query, after = ?after, "search request");

        if let Err(e) = self.authorize(credential.as_deref()) {
            warn!("rejected search without a valid credential");
            return Err(e);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let page = self.catalog.search(&query, after.as_ref(), self.page_size)?;
        info!(
            records = page.records.len(),
            total = page.total_count,
            has_next_page = page.has_next_page,
            "search served"
        );
        Ok(page)
    }
}

pub struct ServeCommand {
    config: Config,
}

impl ServeCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let unix_socket_path = self.config.socket_path()?;

        if let Some(parent) = unix_socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if unix_socket_path.exists() {
            fs::remove_file(&unix_socket_path)?;
        }

        let catalog = match &self.config.catalog {
            Some(path) => UserCatalog::load(path)?,
            None => UserCatalog::builtin()?,
        };
        info!("loaded {} users", catalog.len());
        if self.config.credentials.is_empty() {
            info!("credential check disabled");
        }

        let server = Server {
            catalog: Arc::new(catalog),
            credentials: Arc::new(self.config.credentials.clone()),
            page_size: self.config.page_size,
            latency: self.config.latency(),
        };

        info!("listening on {:?}", unix_socket_path);
        let mut listener =
            tarpc::serde_transport::unix::listen(&unix_socket_path, Bincode::default).await?;
        listener.config_mut().max_frame_length(usize::MAX);

        listener
            .filter_map(|r| future::ready(r.ok()))
            .map(server::BaseChannel::with_defaults)
            .map(|channel| {
                let server = server.clone();
                channel.execute(server.serve()).for_each(spawn)
            })
            .buffer_unordered(10)
            .for_each(|_| async {})
            .await;

        Ok(())
    }
}
