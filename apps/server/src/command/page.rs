use super::Command;
use crate::catalog::UserCatalog;
use crate::config::Config;
use crate::error::{Result, WrapErr};
use rpc::search::Cursor;

/// Runs one search against the catalog without starting the service.
pub struct PageCommand {
    config: Config,
    query: String,
    after: Option<Cursor>,
}

impl PageCommand {
    pub fn new(cfg: Config, query: String, after: Option<String>) -> Self {
        Self {
            config: cfg,
            query,
            after: after.map(Cursor::new),
        }
    }
}

#[async_trait::async_trait]
impl Command for PageCommand {
    async fn execute(&self) -> Result<()> {
        let catalog = match &self.config.catalog {
            Some(path) => UserCatalog::load(path)?,
            None => UserCatalog::builtin()?,
        };

        let page = catalog.search(&self.query, self.after.as_ref(), self.config.page_size)?;
        let json = serde_json::to_string_pretty(&page).context("Serialize page")?;
        println!("{json}");
        Ok(())
    }
}
