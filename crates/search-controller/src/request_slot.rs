use tracing::debug;

/// Handle to an in-flight operation that can be told to stop.
///
/// Cancellation is best effort on the operation itself; the slot stops
/// trusting the operation as soon as `cancel` is called.
pub trait Cancellable: Send {
    fn cancel(&self);
}

impl Cancellable for tokio::task::AbortHandle {
    fn cancel(&self) {
        self.abort();
    }
}

/// Identity of one issued fetch. Completions carry it back so stale results
/// can be told apart from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

/// Holds at most one in-flight fetch.
#[derive(Default)]
pub struct RequestSlot {
    active: Option<(FetchTicket, Box<dyn Cancellable>)>,
    issued: u64,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the ticket for the next fetch. Tickets are never reused.
    pub fn next_ticket(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Cancel whatever is held and keep `handle` as the live fetch.
    pub fn install(&mut self, ticket: FetchTicket, handle: Box<dyn Cancellable>) {
        self.clear();
        self.active = Some((ticket, handle));
    }

    /// Cancel and forget the live fetch. Returns whether there was one.
    pub fn clear(&mut self) -> bool {
        match self.active.take() {
            Some((ticket, handle)) => {
                debug!(ticket = ticket.0, "cancelling in-flight fetch");
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.active.as_ref().is_some_and(|(live, _)| *live == ticket)
    }

    pub fn current(&self) -> Option<FetchTicket> {
        self.active.as_ref().map(|(ticket, _)| *ticket)
    }

    /// Completion path: empty the slot without cancelling, but only when
    /// `ticket` is the live fetch. A `false` return means the completion is
    /// stale and must be ignored.
    pub fn release(&mut self, ticket: FetchTicket) -> bool {
        if self.is_current(ticket) {
            self.active = None;
            true
        } else {
            false
        }
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        self.clear();
    }
}
