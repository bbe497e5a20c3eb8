//! Attach/detach bookkeeping for external notification feeds (keyboard,
//! window geometry and the like). None of this touches search state; it only
//! makes sure every subscription taken on activation is released again.

use std::sync::Arc;

/// A live registration with some notification feed.
pub trait Subscription: Send {
    fn unsubscribe(self: Box<Self>);
}

pub trait NotificationSource: Send + Sync {
    fn name(&self) -> &str;

    fn subscribe(&self) -> Box<dyn Subscription>;
}

/// Subscriptions taken by one activation. Disposed on
/// [`SubscriptionSet::dispose`] or when dropped.
#[derive(Default)]
pub struct SubscriptionSet {
    handles: Vec<Box<dyn Subscription>>,
}

impl SubscriptionSet {
    pub fn subscribe_all(sources: &[Arc<dyn NotificationSource>]) -> Self {
        Self {
            handles: sources.iter().map(|source| source.subscribe()).collect(),
        }
    }

    pub fn push(&mut self, subscription: Box<dyn Subscription>) {
        self.handles.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn dispose(&mut self) {
        for handle in self.handles.drain(..) {
            handle.unsubscribe();
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.dispose();
    }
}
