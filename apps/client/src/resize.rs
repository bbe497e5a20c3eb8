use search_controller::{NotificationSource, Subscription};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Terminal size changes (`SIGWINCH`), forwarded to the view while the
/// controller is active.
pub struct WindowResizeSource {
    notify: mpsc::UnboundedSender<()>,
}

impl WindowResizeSource {
    pub fn new(notify: mpsc::UnboundedSender<()>) -> Self {
        Self { notify }
    }
}

struct ResizeSubscription(Option<AbortHandle>);

impl Subscription for ResizeSubscription {
    fn unsubscribe(self: Box<Self>) {
        if let Some(task) = self.0 {
            task.abort();
        }
        debug!("stopped listening for window resizes");
    }
}

impl NotificationSource for WindowResizeSource {
    fn name(&self) -> &str {
        "window-resize"
    }

    fn subscribe(&self) -> Box<dyn Subscription> {
        let mut resizes = match signal(SignalKind::window_change()) {
            Ok(resizes) => resizes,
            Err(e) => {
                warn!("cannot listen for window resizes: {e}");
                return Box::new(ResizeSubscription(None));
            }
        };

        let notify = self.notify.clone();
        let task = tokio::spawn(async move {
            while resizes.recv().await.is_some() {
                if notify.send(()).is_err() {
                    break;
                }
            }
        });
        Box::new(ResizeSubscription(Some(task.abort_handle())))
    }
}
