use std::fmt;
use std::sync::Arc;

/// Whether a page request is outstanding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching,
}

/// Coarse controller state, derived from the committed query, the fetch
/// state and pagination progress.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No committed query
    #[default]
    Empty,
    Fetching,
    /// Waiting for the next trigger; more pages may exist
    Idle,
    /// Every page of the current query has been received
    Exhausted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Empty => write!(f, "empty"),
            Phase::Fetching => write!(f, "fetching"),
            Phase::Idle => write!(f, "idle"),
            Phase::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// What the view is shown after every state change. Cloning is cheap; the
/// items are shared with the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<R> {
    pub items: Arc<Vec<R>>,
    pub total_count: u64,
    pub fetch_state: FetchState,
    pub phase: Phase,
}

impl<R> Snapshot<R> {
    /// `"{loaded}/{total}"`, the label shown next to the search field.
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.items.len(), self.total_count)
    }

    /// Drives the loading footer below the last row.
    pub fn is_loading(&self) -> bool {
        self.fetch_state == FetchState::Fetching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_label() {
        let snapshot = Snapshot {
            items: Arc::new(vec!["u1", "u2"]),
            total_count: 5,
            fetch_state: FetchState::Fetching,
            phase: Phase::Fetching,
        };
        assert_eq!(snapshot.progress_label(), "2/5");
        assert!(snapshot.is_loading());
    }
}
