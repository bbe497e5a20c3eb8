use rpc::search::ServiceError;

/// Outcome of a failed page fetch, as seen by the controller.
///
/// Every service error is folded into one of these before it reaches the
/// observer; raw transport errors never cross the controller boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The user has to supply or renew a credential
    #[error("missing credential")]
    MissingCredential,
    /// Network or service failure; the next trigger may retry
    #[error("fetch failed: {0}")]
    Transient(String),
    /// Superseded by a newer fetch; never reported to the view
    #[error("fetch cancelled")]
    Cancelled,
}

impl From<ServiceError> for FetchError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MissingCredential => FetchError::MissingCredential,
            other => FetchError::Transient(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// The view asked for a row it was never shown
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
    /// The controller task is no longer running
    #[error("search controller has stopped")]
    Stopped,
}
