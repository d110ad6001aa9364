//! Rate-change notifications.
//!
//! The selector tells every subscribed observer when a fresh search settles
//! on a data rate different from the previous one. Delivery is synchronous
//! and in subscription order.

use crossbeam_channel::Sender;
use serde::Serialize;
use tracing::trace;

use crate::station::MacAddress;

/// One data-rate transition for a peer. `old_rate_bps` is 0 on the first
/// selection after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateChange {
    pub peer: MacAddress,
    pub old_rate_bps: u64,
    pub new_rate_bps: u64,
}

/// Receiver of [`RateChange`] events.
pub trait RateObserver: Send {
    fn on_rate_change(&self, change: &RateChange);
}

impl<F> RateObserver for F
where
    F: Fn(&RateChange) + Send,
{
    fn on_rate_change(&self, change: &RateChange) {
        self(change)
    }
}

/// Forwards events into a crossbeam channel.
///
/// A disconnected receiver is not an error: the event is dropped.
pub struct ChannelObserver {
    tx: Sender<RateChange>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<RateChange>) -> Self {
        ChannelObserver { tx }
    }
}

impl RateObserver for ChannelObserver {
    fn on_rate_change(&self, change: &RateChange) {
        if self.tx.send(*change).is_err() {
            trace!(peer = %change.peer, "rate-change receiver gone");
        }
    }
}

/// Ordered list of subscribed observers.
#[derive(Default)]
pub struct RateObservers {
    observers: Vec<Box<dyn RateObserver>>,
}

impl RateObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn RateObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&self, change: &RateChange) {
        for observer in &self.observers {
            observer.on_rate_change(change);
        }
    }
}

impl std::fmt::Debug for RateObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateObservers")
            .field("count", &self.observers.len())
            .finish()
    }
}
