use crate::request_slot::{Cancellable, FetchTicket};
use rpc::search::Cursor;
use std::time::Instant;

/// One page request, as handed to the [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub query: String,
    pub after: Option<Cursor>,
}

/// Side effects of the controller: reading the clock, arming the debounce
/// timer and starting fetches.
///
/// Whatever a dispatcher starts must be reported back on the controller's own
/// context: an armed timer as
/// [`SearchController::on_debounce_elapsed`](crate::SearchController::on_debounce_elapsed),
/// a finished fetch as
/// [`SearchController::on_fetch_completed`](crate::SearchController::on_fetch_completed)
/// carrying the request's ticket.
pub trait Dispatcher {
    fn now(&self) -> Instant;

    fn schedule_commit(&mut self, deadline: Instant);

    fn start_fetch(&mut self, request: FetchRequest) -> Box<dyn Cancellable>;
}
