use serde::{Deserialize, Serialize};
use std::fmt;

/// A user account as returned by the search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Opaque continuation token. Clients hand it back unchanged to fetch the
/// following page and must not interpret its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a paginated search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records in service order
    pub records: Vec<T>,
    pub next_cursor: Option<Cursor>,
    pub has_next_page: bool,
    /// Number of matches for the whole query, not for this page
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            next_cursor: None,
            has_next_page: false,
            total_count: 0,
        }
    }

    /// True when the service can hand out another page after this one.
    pub fn has_more(&self) -> bool {
        self.has_next_page && self.next_cursor.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ServiceError {
    /// No access token was supplied, or the supplied one was rejected
    #[error("missing or rejected credential")]
    MissingCredential,
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("rate limited")]
    RateLimited,
    #[error("service unavailable: {0}")]
    Unavailable(String),
}
