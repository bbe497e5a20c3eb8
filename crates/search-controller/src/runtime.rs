//! Tokio host for [`SearchController`].
//!
//! The controller lives inside one task and only that task mutates it. View
//! input arrives through a [`ControllerHandle`]; debounce timers and fetches
//! run as separate tasks and report back through the same channel, so their
//! completions are applied in order with everything else.

use crate::config::SearchControllerConfig;
use crate::controller::SearchController;
use crate::dispatch::{Dispatcher, FetchRequest};
use crate::error::{ControllerError, FetchError};
use crate::lifecycle::NotificationSource;
use crate::request_slot::{Cancellable, FetchTicket};
use crate::service::SearchService;
use crate::state::Snapshot;
use crate::view::Observer;
use rpc::search::Page;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

enum Event<R> {
    InputChanged(String),
    ReachedBottomChanged(bool),
    DebounceElapsed,
    FetchCompleted {
        ticket: FetchTicket,
        result: Result<Page<R>, FetchError>,
    },
    SelectRecord {
        index: usize,
        reply: oneshot::Sender<Result<(), ControllerError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot<R>>,
    },
    Activate,
    Deactivate,
    Shutdown,
}

/// Runs debounce timers and fetches as tokio tasks.
///
/// Holds only a weak sender to the controller task, so in-flight work does
/// not keep a controller alive once every handle is gone.
pub(crate) struct TokioDispatcher<R, S> {
    service: Arc<S>,
    events: mpsc::WeakUnboundedSender<Event<R>>,
    request_timeout: Option<Duration>,
}

impl<R, S> Dispatcher for TokioDispatcher<R, S>
where
    R: Send + Sync + 'static,
    S: SearchService<R>,
{
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn schedule_commit(&mut self, deadline: Instant) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(Event::DebounceElapsed);
            }
        });
    }

    fn start_fetch(&mut self, request: FetchRequest) -> Box<dyn Cancellable> {
        let service = self.service.clone();
        let events = self.events.clone();
        let request_timeout = self.request_timeout;

        let task = tokio::spawn(async move {
            let FetchRequest { ticket, query, after } = request;
            let search = service.search(&query, after.as_ref());
            let result = match request_timeout {
                Some(limit) => match tokio::time::timeout(limit, search).await {
                    Ok(result) => result.map_err(FetchError::from),
                    Err(_) => Err(FetchError::Transient(format!(
                        "timed out after {}ms",
                        limit.as_millis()
                    ))),
                },
                None => search.await.map_err(FetchError::from),
            };

            if let Some(tx) = events.upgrade() {
                let _ = tx.send(Event::FetchCompleted { ticket, result });
            }
        });

        Box::new(task.abort_handle())
    }
}

/// Builder for a controller task.
pub struct ControllerRuntime<S, O> {
    service: S,
    observer: O,
    config: SearchControllerConfig,
    sources: Vec<Arc<dyn NotificationSource>>,
}

impl<S, O> ControllerRuntime<S, O> {
    pub fn new(service: S, observer: O, config: SearchControllerConfig) -> Self {
        Self {
            service,
            observer,
            config,
            sources: Vec::new(),
        }
    }

    pub fn with_notification_source(mut self, source: Arc<dyn NotificationSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Start the controller task on the current tokio runtime.
    ///
    /// The task stops on [`ControllerHandle::shutdown`] or once every handle
    /// has been dropped.
    pub fn spawn<R>(self) -> ControllerHandle<R>
    where
        R: Clone + Send + Sync + 'static,
        S: SearchService<R>,
        O: Observer<R> + Send + 'static,
    {
        let Self {
            service,
            observer,
            config,
            sources,
        } = self;

        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = TokioDispatcher {
            service: Arc::new(service),
            events: tx.downgrade(),
            request_timeout: config.request_timeout,
        };

        let controller = sources.into_iter().fold(
            SearchController::new(&config, observer, dispatcher),
            |controller, source| controller.with_notification_source(source),
        );

        tokio::spawn(run(controller, rx));
        ControllerHandle { tx }
    }
}

async fn run<R, O, D>(
    mut controller: SearchController<R, O, D>,
    mut rx: mpsc::UnboundedReceiver<Event<R>>,
)
where
    R: Clone,
    O: Observer<R>,
    D: Dispatcher,
{
    info!("search controller started");

    while let Some(event) = rx.recv().await {
        match event {
            Event::InputChanged(text) => controller.on_input_changed(text),
            Event::ReachedBottomChanged(at_bottom) => {
                controller.on_reached_bottom_changed(at_bottom)
            }
            Event::DebounceElapsed => controller.on_debounce_elapsed(),
            Event::FetchCompleted { ticket, result } => {
                controller.on_fetch_completed(ticket, result)
            }
            Event::SelectRecord { index, reply } => {
                let _ = reply.send(controller.select_record(index));
            }
            Event::Snapshot { reply } => {
                let _ = reply.send(controller.snapshot());
            }
            Event::Activate => controller.activate(),
            Event::Deactivate => controller.deactivate(),
            Event::Shutdown => {
                debug!("shutdown requested");
                break;
            }
        }
    }

    controller.shutdown();
    info!("search controller stopped");
}

/// Cloneable entry point for the view. Every method only enqueues; state
/// changes reach the observer asynchronously.
pub struct ControllerHandle<R> {
    tx: mpsc::UnboundedSender<Event<R>>,
}

impl<R> Clone for ControllerHandle<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<R> ControllerHandle<R> {
    fn send(&self, event: Event<R>) -> Result<(), ControllerError> {
        self.tx.send(event).map_err(|_| ControllerError::Stopped)
    }

    pub fn input_changed(&self, raw_text: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Event::InputChanged(raw_text.into()))
    }

    pub fn reached_bottom_changed(&self, at_bottom: bool) -> Result<(), ControllerError> {
        self.send(Event::ReachedBottomChanged(at_bottom))
    }

    pub fn activate(&self) -> Result<(), ControllerError> {
        self.send(Event::Activate)
    }

    pub fn deactivate(&self) -> Result<(), ControllerError> {
        self.send(Event::Deactivate)
    }

    pub fn shutdown(&self) -> Result<(), ControllerError> {
        self.send(Event::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Ask the controller to show the record at `index`.
    pub async fn select_record(&self, index: usize) -> Result<(), ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Event::SelectRecord { index, reply })?;
        rx.await.map_err(|_| ControllerError::Stopped)?
    }

    /// Current state, after every event queued before this call.
    pub async fn snapshot(&self) -> Result<Snapshot<R>, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Event::Snapshot { reply })?;
        rx.await.map_err(|_| ControllerError::Stopped)
    }
}
