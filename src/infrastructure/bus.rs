// In-process publish/subscribe channel carrying call batches from the
// recording transport to any number of panel instances.

use crate::domain::call::CallBatch;
use crate::ports::CallSubscriber;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

/// Broadcast channel for call batches.
///
/// Subscribers are held weakly: dropping a panel unsubscribes it, and dead
/// entries are pruned on the next publish. Delivery is synchronous on the
/// publishing thread, in registration order.
#[derive(Default)]
pub struct CallBus {
    subscribers: Mutex<Vec<Weak<dyn CallSubscriber>>>,
}

impl CallBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Only a weak reference is kept.
    pub fn subscribe<S: CallSubscriber + 'static>(&self, subscriber: &Arc<S>) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            let weak = Arc::downgrade(subscriber) as Weak<dyn CallSubscriber>;
            subscribers.push(weak);
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subs| subs.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Broadcast a batch to every live subscriber.
    ///
    /// Robust send: a subscriber that returns an error or panics is logged
    /// and skipped, the remaining subscribers still receive the batch, and
    /// nothing propagates back to the publisher.
    pub fn publish(&self, batch: &CallBatch) {
        let live: Vec<Arc<dyn CallSubscriber>> = match self.subscribers.lock() {
            Ok(mut subscribers) => {
                subscribers.retain(|weak| weak.strong_count() > 0);
                subscribers.iter().filter_map(|weak| weak.upgrade()).collect()
            }
            Err(_) => return,
        };

        for subscriber in live {
            match catch_unwind(AssertUnwindSafe(|| subscriber.on_batch(batch))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "call subscriber failed; continuing delivery");
                }
                Err(_) => {
                    tracing::warn!("call subscriber panicked; continuing delivery");
                }
            }
        }
    }
}
