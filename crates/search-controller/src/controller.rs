//! The search state machine.
//!
//! ```text
//! raw input -> Debouncer -> commit -> (query changed?) reset + cancel -> fetch
//! bottom reached (false -> true) --------------------------------------> fetch
//! fetch completion (live ticket only) -> apply page / report error -> notify
//! ```
//!
//! Every public method mutates state synchronously and pushes the resulting
//! snapshot to the observer before returning. Callers must serialize calls
//! onto one context; [`ControllerRuntime`](crate::ControllerRuntime) does
//! that with a tokio task.

use crate::config::SearchControllerConfig;
use crate::debounce::Debouncer;
use crate::dispatch::{Dispatcher, FetchRequest};
use crate::error::{ControllerError, FetchError};
use crate::lifecycle::{NotificationSource, SubscriptionSet};
use crate::page_cursor::PageCursor;
use crate::request_slot::{FetchTicket, RequestSlot};
use crate::state::{FetchState, Phase, Snapshot};
use crate::view::Observer;
use rpc::search::Page;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SearchController<R, O, D> {
    debouncer: Debouncer<String>,
    /// Last committed query; empty means no search
    query: String,
    pages: PageCursor<R>,
    fetch_state: FetchState,
    slot: RequestSlot,
    reached_bottom: bool,

    observer: O,
    dispatcher: D,

    sources: Vec<Arc<dyn NotificationSource>>,
    subscriptions: Option<SubscriptionSet>,
}

impl<R, O, D> SearchController<R, O, D>
where
    R: Clone,
    O: Observer<R>,
    D: Dispatcher,
{
    pub fn new(config: &SearchControllerConfig, observer: O, dispatcher: D) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce),
            query: String::new(),
            pages: PageCursor::new(),
            fetch_state: FetchState::Idle,
            slot: RequestSlot::new(),
            reached_bottom: false,
            observer,
            dispatcher,
            sources: Vec::new(),
            subscriptions: None,
        }
    }

    /// Register a feed to subscribe to on [`Self::activate`].
    pub fn with_notification_source(mut self, source: Arc<dyn NotificationSource>) -> Self {
        self.sources.push(source);
        self
    }

    // ===== Inputs =====

    /// Raw text from the search field. Nothing changes until the debounce
    /// window closes.
    pub fn on_input_changed(&mut self, raw_text: impl Into<String>) {
        let now = self.dispatcher.now();
        let deadline = self.debouncer.submit(raw_text.into(), now);
        self.dispatcher.schedule_commit(deadline);
    }

    /// A debounce timer armed through the dispatcher went off. Timers that
    /// were superseded by later input do nothing.
    pub fn on_debounce_elapsed(&mut self) {
        let now = self.dispatcher.now();
        if let Some(text) = self.debouncer.fire(now) {
            self.commit(text);
        }
    }

    /// Make `text` the committed query.
    ///
    /// A different query resets pagination and cancels the outstanding fetch.
    /// A fetch is attempted either way, so the first page of a query is
    /// loaded as soon as it is committed.
    pub fn commit(&mut self, text: String) {
        if text != self.query {
            info!(query = %text, previous = %self.query, "committing new query");
            self.query = text;
            self.pages.reset();
            if self.slot.clear() {
                debug!("cancelled fetch for superseded query");
            }
            self.set_fetch_state(FetchState::Idle);
        } else {
            debug!(query = %text, "query unchanged");
        }

        self.fetch_next_page();
    }

    /// Scroll position report from the view. Only the edge into the bottom
    /// triggers a fetch.
    pub fn on_reached_bottom_changed(&mut self, at_bottom: bool) {
        let was_at_bottom = std::mem::replace(&mut self.reached_bottom, at_bottom);
        if at_bottom && !was_at_bottom {
            self.fetch_next_page();
        }
    }

    /// Issue a fetch for the next page of the committed query if one is
    /// allowed. Returns whether a fetch was started.
    pub fn fetch_next_page(&mut self) -> bool {
        let in_flight = self.slot.is_occupied() || self.fetch_state == FetchState::Fetching;
        if !self.pages.accepts_fetch(&self.query, in_flight) {
            debug!(
                query = %self.query,
                in_flight,
                exhausted = self.pages.is_exhausted(),
                "fetch not eligible"
            );
            return false;
        }

        let ticket = self.slot.next_ticket();
        self.set_fetch_state(FetchState::Fetching);

        let request = FetchRequest {
            ticket,
            query: self.query.clone(),
            after: self.pages.cursor().cloned(),
        };
        info!(
            ticket = ticket.0,
            query = %request.query,
            after = ?request.after,
            "fetching page"
        );
        let handle = self.dispatcher.start_fetch(request);
        self.slot.install(ticket, handle);
        true
    }

    /// A fetch started through the dispatcher finished.
    ///
    /// Completions whose ticket is no longer in the slot belong to a
    /// cancelled or superseded fetch and are dropped without a trace.
    pub fn on_fetch_completed(&mut self, ticket: FetchTicket, result: Result<Page<R>, FetchError>) {
        if !self.slot.release(ticket) {
            debug!(ticket = ticket.0, "discarding stale fetch completion");
            return;
        }

        match result {
            Ok(page) => {
                debug!(
                    ticket = ticket.0,
                    records = page.records.len(),
                    total_count = page.total_count,
                    has_more = page.has_more(),
                    "page received"
                );
                self.pages.apply_page(page);
                self.set_fetch_state(FetchState::Idle);
            }
            Err(FetchError::Cancelled) => {
                debug!(ticket = ticket.0, "fetch cancelled");
                self.set_fetch_state(FetchState::Idle);
            }
            Err(FetchError::MissingCredential) => {
                warn!(ticket = ticket.0, "search refused: missing credential");
                self.set_fetch_state(FetchState::Idle);
                self.observer.auth_error();
            }
            Err(FetchError::Transient(reason)) => {
                warn!(ticket = ticket.0, %reason, "fetch failed");
                self.set_fetch_state(FetchState::Idle);
                self.observer.fetch_failed(&reason);
            }
        }
    }

    /// Show the record at `index`.
    pub fn select_record(&self, index: usize) -> Result<(), ControllerError> {
        let record = self.pages.get(index).ok_or(ControllerError::IndexOutOfRange {
            index,
            len: self.pages.len(),
        })?;
        self.observer.show_record(record);
        Ok(())
    }

    // ===== Lifecycle =====

    /// Subscribe to every registered notification source. Calling it again
    /// while active does nothing.
    pub fn activate(&mut self) {
        if self.subscriptions.is_some() {
            return;
        }
        let set = SubscriptionSet::subscribe_all(&self.sources);
        debug!(subscriptions = set.len(), "activated");
        self.subscriptions = Some(set);
    }

    pub fn deactivate(&mut self) {
        if let Some(mut set) = self.subscriptions.take() {
            debug!(subscriptions = set.len(), "deactivated");
            set.dispose();
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Drop pending input, cancel the outstanding fetch and release
    /// subscriptions.
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.slot.clear();
        self.deactivate();
    }

    // ===== Reads =====

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn record(&self, index: usize) -> Option<&R> {
        self.pages.get(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.pages.total_count()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch_state
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.slot.current()
    }

    pub fn phase(&self) -> Phase {
        if self.query.is_empty() {
            Phase::Empty
        } else if self.fetch_state == FetchState::Fetching {
            Phase::Fetching
        } else if self.pages.is_exhausted() {
            Phase::Exhausted
        } else {
            Phase::Idle
        }
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        Snapshot {
            items: self.pages.shared_items(),
            total_count: self.pages.total_count(),
            fetch_state: self.fetch_state,
            phase: self.phase(),
        }
    }

    fn set_fetch_state(&mut self, fetch_state: FetchState) {
        self.fetch_state = fetch_state;
        let snapshot = self.snapshot();
        self.observer.state_changed(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_slot::Cancellable;
    use crate::view::ObserverEvent;
    use rpc::search::Cursor;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    const DEBOUNCE: Duration = Duration::from_millis(300);

    type Record = &'static str;

    #[derive(Default)]
    struct Log {
        elapsed: Duration,
        wakeups: Vec<Instant>,
        fetches: Vec<FetchRequest>,
    }

    struct ManualDispatcher {
        start: Instant,
        log: Rc<RefCell<Log>>,
        cancelled: Arc<Mutex<Vec<FetchTicket>>>,
    }

    struct TicketHandle {
        ticket: FetchTicket,
        cancelled: Arc<Mutex<Vec<FetchTicket>>>,
    }

    impl Cancellable for TicketHandle {
        fn cancel(&self) {
            self.cancelled.lock().unwrap().push(self.ticket);
        }
    }

    impl Dispatcher for ManualDispatcher {
        fn now(&self) -> Instant {
            self.start + self.log.borrow().elapsed
        }

        fn schedule_commit(&mut self, deadline: Instant) {
            self.log.borrow_mut().wakeups.push(deadline);
        }

        fn start_fetch(&mut self, request: FetchRequest) -> Box<dyn Cancellable> {
            let ticket = request.ticket;
            self.log.borrow_mut().fetches.push(request);
            Box::new(TicketHandle {
                ticket,
                cancelled: self.cancelled.clone(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<ObserverEvent<Record>>>>);

    impl Observer<Record> for Recorder {
        fn state_changed(&self, snapshot: &Snapshot<Record>) {
            self.0.borrow_mut().push(ObserverEvent::StateChanged(snapshot.clone()));
        }

        fn show_record(&self, record: &Record) {
            self.0.borrow_mut().push(ObserverEvent::ShowRecord(*record));
        }

        fn auth_error(&self) {
            self.0.borrow_mut().push(ObserverEvent::AuthError);
        }

        fn fetch_failed(&self, reason: &str) {
            self.0.borrow_mut().push(ObserverEvent::FetchFailed(reason.to_string()));
        }
    }

    struct Harness {
        controller: SearchController<Record, Recorder, ManualDispatcher>,
        log: Rc<RefCell<Log>>,
        events: Recorder,
        cancelled: Arc<Mutex<Vec<FetchTicket>>>,
        start: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let start = Instant::now();
            let log = Rc::new(RefCell::new(Log::default()));
            let cancelled = Arc::new(Mutex::new(Vec::new()));
            let events = Recorder::default();
            let dispatcher = ManualDispatcher {
                start,
                log: log.clone(),
                cancelled: cancelled.clone(),
            };
            let config = SearchControllerConfig::default().with_debounce(DEBOUNCE);
            let controller = SearchController::new(&config, events.clone(), dispatcher);
            Self {
                controller,
                log,
                events,
                cancelled,
                start,
            }
        }

        /// Move the clock forward and deliver every timer that came due.
        fn advance(&mut self, by: Duration) {
            self.log.borrow_mut().elapsed += by;
            let now = self.start + self.log.borrow().elapsed;
            loop {
                let due = {
                    let mut log = self.log.borrow_mut();
                    let position = log.wakeups.iter().position(|at| *at <= now);
                    position.map(|i| log.wakeups.remove(i))
                };
                if due.is_none() {
                    break;
                }
                self.controller.on_debounce_elapsed();
            }
        }

        fn type_and_settle(&mut self, text: &str) {
            self.controller.on_input_changed(text);
            self.advance(DEBOUNCE);
        }

        fn fetches(&self) -> Vec<FetchRequest> {
            self.log.borrow().fetches.clone()
        }

        fn last_ticket(&self) -> FetchTicket {
            self.log.borrow().fetches.last().expect("no fetch issued").ticket
        }

        fn complete(&mut self, result: Result<Page<Record>, FetchError>) {
            let ticket = self.last_ticket();
            self.controller.on_fetch_completed(ticket, result);
        }

        fn take_events(&self) -> Vec<ObserverEvent<Record>> {
            std::mem::take(&mut *self.events.0.borrow_mut())
        }

        fn cancelled(&self) -> Vec<FetchTicket> {
            self.cancelled.lock().unwrap().clone()
        }
    }

    fn page(records: &[Record], next: Option<&str>, has_next: bool, total: u64) -> Page<Record> {
        Page {
            records: records.to_vec(),
            next_cursor: next.map(Cursor::new),
            has_next_page: has_next,
            total_count: total,
        }
    }

    fn scenario_a(h: &mut Harness) {
        h.type_and_settle("foo");
        h.complete(Ok(page(&["u1", "u2"], Some("c1"), true, 5)));
    }

    #[test]
    fn test_burst_commits_once_with_last_text() {
        let mut h = Harness::new();
        for text in ["f", "fo", "foo"] {
            h.controller.on_input_changed(text);
            h.advance(Duration::from_millis(100));
        }
        assert!(h.fetches().is_empty());

        h.advance(DEBOUNCE);
        let fetches = h.fetches();
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].query, "foo");
        assert_eq!(fetches[0].after, None);
        assert_eq!(h.controller.query(), "foo");
    }

    #[test]
    fn test_input_does_not_mutate_synchronously() {
        let mut h = Harness::new();
        h.controller.on_input_changed("foo");
        assert_eq!(h.controller.query(), "");
        assert_eq!(h.controller.phase(), Phase::Empty);
        assert!(h.take_events().is_empty());
    }

    #[test]
    fn test_scenario_a_first_page() {
        let mut h = Harness::new();
        scenario_a(&mut h);

        assert_eq!(*h.controller.snapshot().items, vec!["u1", "u2"]);
        assert_eq!(h.controller.total_count(), 5);
        assert_eq!(h.controller.fetch_state(), FetchState::Idle);
        assert_eq!(h.controller.phase(), Phase::Idle);
        assert_eq!(h.controller.in_flight(), None);
    }

    #[test]
    fn test_scenario_b_last_page_exhausts() {
        let mut h = Harness::new();
        scenario_a(&mut h);

        h.controller.on_reached_bottom_changed(true);
        let fetches = h.fetches();
        assert_eq!(fetches.len(), 2);
        assert_eq!(fetches[1].after, Some(Cursor::new("c1")));

        h.complete(Ok(page(&["u3", "u4", "u5"], None, false, 5)));
        assert_eq!(*h.controller.snapshot().items, vec!["u1", "u2", "u3", "u4", "u5"]);
        assert_eq!(h.controller.phase(), Phase::Exhausted);

        for at_bottom in [false, true, false, true] {
            h.controller.on_reached_bottom_changed(at_bottom);
        }
        assert_eq!(h.fetches().len(), 2);
    }

    #[test]
    fn test_scenario_c_new_query_discards_stale_response() {
        let mut h = Harness::new();
        h.type_and_settle("foo");
        let foo_ticket = h.last_ticket();
        h.take_events();

        h.type_and_settle("bar");
        assert_eq!(h.cancelled(), vec![foo_ticket]);

        // items reset before anything for "bar" arrives
        let events = h.take_events();
        let ObserverEvent::StateChanged(first) = &events[0] else {
            panic!("expected a snapshot, got {events:?}");
        };
        assert!(first.items.is_empty());
        assert_eq!(first.total_count, 0);

        let bar_ticket = h.last_ticket();
        assert_ne!(foo_ticket, bar_ticket);
        assert_eq!(h.fetches()[1].query, "bar");

        // the cancellation lost the race and "foo" answered anyway
        h.controller
            .on_fetch_completed(foo_ticket, Ok(page(&["f1", "f2"], Some("c1"), true, 9)));
        assert!(h.controller.is_empty());
        assert_eq!(h.controller.total_count(), 0);
        assert_eq!(h.controller.in_flight(), Some(bar_ticket));
        assert!(h.take_events().is_empty());

        h.complete(Ok(page(&["b1"], None, false, 1)));
        assert_eq!(*h.controller.snapshot().items, vec!["b1"]);
    }

    #[test]
    fn test_scenario_d_missing_credential() {
        let mut h = Harness::new();
        scenario_a(&mut h);
        h.controller.on_reached_bottom_changed(true);
        h.take_events();

        h.complete(Err(FetchError::MissingCredential));

        let events = h.take_events();
        assert!(events.contains(&ObserverEvent::AuthError));
        assert!(!events.iter().any(|e| matches!(e, ObserverEvent::FetchFailed(_))));
        assert_eq!(*h.controller.snapshot().items, vec!["u1", "u2"]);
        assert_eq!(h.controller.total_count(), 5);
        assert_eq!(h.controller.fetch_state(), FetchState::Idle);
    }

    #[test]
    fn test_scenario_e_select_out_of_range() {
        let mut h = Harness::new();
        h.type_and_settle("foo");
        h.complete(Ok(page(&["u1", "u2", "u3"], Some("c1"), true, 10)));
        h.take_events();

        assert_eq!(
            h.controller.select_record(5),
            Err(ControllerError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert!(h.take_events().is_empty());

        h.controller.select_record(1).unwrap();
        assert_eq!(h.take_events(), vec![ObserverEvent::ShowRecord("u2")]);
    }

    #[test]
    fn test_transient_failure_is_retryable() {
        let mut h = Harness::new();
        h.type_and_settle("foo");
        h.complete(Err(FetchError::Transient("connection reset".into())));

        assert!(
            h.take_events()
                .contains(&ObserverEvent::FetchFailed("connection reset".into()))
        );
        assert_eq!(h.controller.phase(), Phase::Idle);
        assert!(h.controller.is_empty());

        h.controller.on_reached_bottom_changed(true);
        let fetches = h.fetches();
        assert_eq!(fetches.len(), 2);
        assert_eq!(fetches[1].after, None);
    }

    #[test]
    fn test_only_one_fetch_in_flight() {
        let mut h = Harness::new();
        h.type_and_settle("foo");

        h.controller.on_reached_bottom_changed(true);
        h.controller.on_reached_bottom_changed(false);
        h.controller.on_reached_bottom_changed(true);
        // same text again: a fetch attempt, but one is already outstanding
        h.type_and_settle("foo");

        assert_eq!(h.fetches().len(), 1);
        assert_eq!(h.controller.phase(), Phase::Fetching);
    }

    #[test]
    fn test_repeated_bottom_signal_fetches_once() {
        let mut h = Harness::new();
        scenario_a(&mut h);

        h.controller.on_reached_bottom_changed(true);
        h.complete(Ok(page(&["u3"], Some("c2"), true, 5)));
        h.controller.on_reached_bottom_changed(true);

        assert_eq!(h.fetches().len(), 2);
    }

    #[test]
    fn test_same_query_commit_loads_next_page_when_idle() {
        let mut h = Harness::new();
        scenario_a(&mut h);
        h.take_events();

        h.type_and_settle("foo");
        let fetches = h.fetches();
        assert_eq!(fetches.len(), 2);
        assert_eq!(fetches[1].after, Some(Cursor::new("c1")));
        // no reset happened
        assert_eq!(h.controller.len(), 2);
    }

    #[test]
    fn test_clearing_query_goes_empty() {
        let mut h = Harness::new();
        scenario_a(&mut h);

        h.type_and_settle("");
        assert_eq!(h.controller.phase(), Phase::Empty);
        assert!(h.controller.is_empty());
        assert_eq!(h.fetches().len(), 1);
    }

    #[test]
    fn test_items_never_shrink_within_a_query() {
        let mut h = Harness::new();
        h.type_and_settle("foo");

        let mut seen = 0;
        for (i, next) in [Some("c1"), Some("c2"), None].into_iter().enumerate() {
            if i > 0 {
                h.controller.on_reached_bottom_changed(false);
                h.controller.on_reached_bottom_changed(true);
            }
            h.complete(Ok(page(&["u"], next, next.is_some(), 3)));
            for event in h.take_events() {
                if let ObserverEvent::StateChanged(snapshot) = event {
                    assert!(snapshot.items.len() >= seen);
                    seen = snapshot.items.len();
                }
            }
        }
        assert_eq!(seen, 3);
        assert_eq!(h.controller.phase(), Phase::Exhausted);
    }

    #[test]
    fn test_cancelled_completion_is_silent() {
        let mut h = Harness::new();
        h.type_and_settle("foo");
        h.take_events();

        h.complete(Err(FetchError::Cancelled));
        let events = h.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ObserverEvent::StateChanged(_)));
        assert_eq!(h.controller.fetch_state(), FetchState::Idle);
    }

    #[test]
    fn test_fetching_is_announced_before_dispatch() {
        let mut h = Harness::new();
        h.type_and_settle("foo");

        let events = h.take_events();
        let last = events.last().expect("no events");
        assert!(matches!(
            last,
            ObserverEvent::StateChanged(Snapshot {
                fetch_state: FetchState::Fetching,
                phase: Phase::Fetching,
                ..
            })
        ));
    }

    #[test]
    fn test_notifications_share_unchanged_items() {
        let mut h = Harness::new();
        scenario_a(&mut h);
        h.take_events();

        h.controller.on_reached_bottom_changed(true);
        let events = h.take_events();
        let Some(ObserverEvent::StateChanged(fetching)) = events.last() else {
            panic!("expected a state change, got {events:?}");
        };
        assert!(fetching.is_loading());
        assert!(Arc::ptr_eq(&fetching.items, &h.controller.snapshot().items));
    }

    #[test]
    fn test_shutdown_cancels_in_flight_fetch() {
        let mut h = Harness::new();
        h.type_and_settle("foo");
        let ticket = h.last_ticket();
        h.controller.on_input_changed("bar");

        h.controller.shutdown();
        assert_eq!(h.cancelled(), vec![ticket]);

        h.advance(DEBOUNCE);
        assert_eq!(h.controller.query(), "foo");
    }
}
