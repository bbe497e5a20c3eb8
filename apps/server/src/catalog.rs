use crate::error::{Result, WrapErr};
use rpc::search::{Cursor, Page, ServiceError, User};
use std::path::Path;
use tracing::debug;

const BUILTIN_CATALOG: &str = include_str!("../assets/users.json");

/// In-memory user list served page by page.
///
/// Cursors are the offset of the first record of the next page, written in
/// base 10. Clients treat them as opaque.
#[derive(Debug, Clone)]
pub struct UserCatalog {
    users: Vec<User>,
}

impl UserCatalog {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self {
            users: serde_json::from_str(json)?,
        })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG).context("Parse builtin user catalog")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Read user catalog {path:?}"))?;
        Self::from_json(&json).with_context(|| format!("Parse user catalog {path:?}"))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// One page of the users whose login contains `query`, ignoring case.
    pub fn search(
        &self,
        query: &str,
        after: Option<&Cursor>,
        page_size: usize,
    ) -> std::result::Result<Page<User>, ServiceError> {
        let offset = match after {
            Some(cursor) => decode_cursor(cursor)?,
            None => 0,
        };

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Page::empty());
        }

        let matches: Vec<&User> = self
            .users
            .iter()
            .filter(|user| user.login.to_lowercase().contains(&needle))
            .collect();
        let total = matches.len();

        if offset > total {
            return Err(ServiceError::InvalidQuery(format!(
                "cursor {offset} is past the last match ({total})"
            )));
        }

        let end = total.min(offset.saturating_add(page_size.max(1)));
        let has_next_page = end < total;
        debug!(query, offset, end, total, "served catalog page");

        Ok(Page {
            records: matches[offset..end].iter().map(|&user| user.clone()).collect(),
            next_cursor: has_next_page.then(|| encode_cursor(end)),
            has_next_page,
            total_count: total as u64,
        })
    }
}

fn encode_cursor(offset: usize) -> Cursor {
    Cursor::new(offset.to_string())
}

fn decode_cursor(cursor: &Cursor) -> std::result::Result<usize, ServiceError> {
    cursor
        .as_str()
        .parse()
        .map_err(|_| ServiceError::InvalidQuery(format!("malformed cursor {cursor:?}")))
}
