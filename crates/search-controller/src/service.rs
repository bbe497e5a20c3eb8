use rpc::search::{Cursor, Page, ServiceError};

/// Remote paged search.
///
/// Each call returns one page. `after` is the `next_cursor` of the previous
/// page of the same query, absent for the first page.
#[async_trait::async_trait]
pub trait SearchService<R>: Send + Sync + 'static {
    async fn search(&self, query: &str, after: Option<&Cursor>) -> Result<Page<R>, ServiceError>;
}
