pub mod search;

use search::{Cursor, Page, ServiceError, User};

#[tarpc::service]
pub trait UserSearch {
    /// Heartbeat
    async fn ping() -> String;

    /// Fetch one page of users whose login matches `query`.
    ///
    /// `after` is the `next_cursor` of the previous page, absent for the first
    /// page. `credential` is the caller's access token, if it has one.
    async fn search_users(
        query: String,
        after: Option<Cursor>,
        credential: Option<String>,
    ) -> Result<Page<User>, ServiceError>;
}
