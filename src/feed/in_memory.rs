//! In-memory change feed for testing and single-process scenarios.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::{ChangeEvent, ChangeFeed, FeedError, FeedSubscription, SubscriptionFilter};

/// In-memory change feed.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - Push semantics: a subscription only sees events published after it
///   was created
/// - Per-subscription filters, applied on delivery
/// - Failure injection for exercising degraded-subscription paths
#[derive(Clone, Default)]
pub struct InMemoryFeed {
    log: Arc<RwLock<Vec<ChangeEvent>>>,
    fail_next_subscribe: Arc<AtomicBool>,
}

impl InMemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event. Live subscriptions receive it when their filter
    /// matches.
    pub fn publish(&self, event: ChangeEvent) {
        self.log.write().unwrap().push(event);
    }

    /// All events published so far.
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.log.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.log.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().unwrap().is_empty()
    }

    /// Make the next `subscribe` call fail, to exercise pull-only fallback.
    pub fn fail_next_subscribe(&self) {
        self.fail_next_subscribe.store(true, Ordering::SeqCst);
    }

    /// Clear all events (useful for test cleanup).
    pub fn clear(&self) {
        self.log.write().unwrap().clear();
    }
}

impl ChangeFeed for InMemoryFeed {
    fn subscribe(
        &self,
        filter: SubscriptionFilter,
    ) -> Result<Box<dyn FeedSubscription>, FeedError> {
        if self.fail_next_subscribe.swap(false, Ordering::SeqCst) {
            return Err(FeedError::SubscribeFailed(
                "injected subscribe failure".to_string(),
            ));
        }

        // Start at the end of the log: push channels deliver go-forward only.
        let position = self.log.read().unwrap().len();
        Ok(Box::new(InMemorySubscription {
            log: Arc::clone(&self.log),
            filter,
            position: Mutex::new(position),
            closed: AtomicBool::new(false),
        }))
    }
}

struct InMemorySubscription {
    log: Arc<RwLock<Vec<ChangeEvent>>>,
    filter: SubscriptionFilter,
    position: Mutex<usize>,
    closed: AtomicBool,
}

impl FeedSubscription for InMemorySubscription {
    fn poll(&self, timeout_ms: u64) -> Result<Option<ChangeEvent>, FeedError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            if self.closed.load(Ordering::SeqCst) {
                return Err(FeedError::Closed);
            }

            {
                let log = self.log.read().unwrap();
                let mut pos = self.position.lock().unwrap();

                while *pos < log.len() {
                    let event = log[*pos].clone();
                    *pos += 1;
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn unsubscribe(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
