use crate::state::Snapshot;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Passive sink for controller output. Implementations never call back into
/// the controller from these methods.
pub trait Observer<R> {
    fn state_changed(&self, snapshot: &Snapshot<R>);

    fn show_record(&self, record: &R);

    /// A fetch was refused for lack of a valid credential.
    fn auth_error(&self);

    fn fetch_failed(&self, reason: &str);
}

impl<R, O: Observer<R> + ?Sized> Observer<R> for Arc<O> {
    fn state_changed(&self, snapshot: &Snapshot<R>) {
        (**self).state_changed(snapshot);
    }

    fn show_record(&self, record: &R) {
        (**self).show_record(record);
    }

    fn auth_error(&self) {
        (**self).auth_error();
    }

    fn fetch_failed(&self, reason: &str) {
        (**self).fetch_failed(reason);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent<R> {
    StateChanged(Snapshot<R>),
    ShowRecord(R),
    AuthError,
    FetchFailed(String),
}

/// Forwards every observer call as an [`ObserverEvent`] over a channel, for
/// views that live on another task or thread.
pub struct ChannelObserver<R> {
    tx: mpsc::UnboundedSender<ObserverEvent<R>>,
}

impl<R> ChannelObserver<R> {
    pub fn new(tx: mpsc::UnboundedSender<ObserverEvent<R>>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ObserverEvent<R>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: ObserverEvent<R>) {
        // The view going away is not the controller's problem
        let _ = self.tx.send(event);
    }
}

impl<R: Clone> Observer<R> for ChannelObserver<R> {
    fn state_changed(&self, snapshot: &Snapshot<R>) {
        self.send(ObserverEvent::StateChanged(snapshot.clone()));
    }

    fn show_record(&self, record: &R) {
        self.send(ObserverEvent::ShowRecord(record.clone()));
    }

    fn auth_error(&self) {
        self.send(ObserverEvent::AuthError);
    }

    fn fetch_failed(&self, reason: &str) {
        self.send(ObserverEvent::FetchFailed(reason.to_string()));
    }
}

/// Whether a scrolled viewport shows the end of its content.
pub fn is_reached_bottom(content_offset: f64, content_size: f64, viewport_size: f64) -> bool {
    let max_scroll_distance = (content_size - viewport_size).max(0.0);
    max_scroll_distance <= content_offset
}
