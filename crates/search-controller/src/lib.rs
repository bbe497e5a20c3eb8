//! Incremental search controller.
//!
//! Raw input is debounced into a committed query, each committed query drives
//! cursor-based page fetches against a [`SearchService`], and the accumulated
//! results are pushed to an [`Observer`] as [`Snapshot`]s.
//!
//! [`SearchController`] is a synchronous state machine. All of its side effects
//! (timers and fetches) go through a [`Dispatcher`], so it can be driven
//! deterministically. [`ControllerRuntime`] wraps it in a tokio task that
//! serializes every input, timer and fetch completion onto one context.

mod config;
mod controller;
mod debounce;
mod dispatch;
mod error;
mod lifecycle;
mod page_cursor;
mod request_slot;
mod runtime;
mod service;
mod state;
mod view;

pub use config::SearchControllerConfig;
pub use controller::SearchController;
pub use debounce::Debouncer;
pub use dispatch::{Dispatcher, FetchRequest};
pub use error::{ControllerError, FetchError};
pub use lifecycle::{NotificationSource, Subscription, SubscriptionSet};
pub use page_cursor::PageCursor;
pub use request_slot::{Cancellable, FetchTicket, RequestSlot};
pub use runtime::{ControllerHandle, ControllerRuntime};
pub use service::SearchService;
pub use state::{FetchState, Phase, Snapshot};
pub use view::{ChannelObserver, Observer, ObserverEvent, is_reached_bottom};

pub use rpc::search::{Cursor, Page, ServiceError};
