use std::time::Duration;

/// Default quiescence interval before typed input is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchControllerConfig {
    /// Time without new input after which the latest text is committed
    pub debounce: Duration,
    /// Upper bound for one page fetch; `None` waits forever
    pub request_timeout: Option<Duration>,
}

impl Default for SearchControllerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl SearchControllerConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}
