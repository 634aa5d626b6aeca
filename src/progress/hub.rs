//! Topic-based pub/sub hub for progress events.
//!
//! Grounded on `cfr::storage::RegretStorage`: a handful of maps behind
//! `RwLock`, concurrent reads (here: broadcasting a publish to every
//! subscriber on a topic) and exclusive writes (subscribe/unsubscribe). The
//! hub is the only piece of long-lived shared state in the whole crate (§5);
//! everything else is a per-request value type.

use crate::progress::event::ProgressEvent;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

const SUBSCRIBER_BUFFER_CAPACITY: usize = 256;
const DEFAULT_DROP_THRESHOLD: u32 = 16;

/// A subscriber's bounded inbox. A full buffer drops the newest event rather
/// than blocking the publisher; exceeding `drop_threshold` closes the
/// subscriber so a slow consumer can't pin memory indefinitely.
struct Subscriber {
    id: u64,
    buffer: Mutex<VecDeque<ProgressEvent>>,
    dropped: AtomicU32,
    closed: AtomicBool,
    drop_threshold: u32,
}

impl Subscriber {
    fn new(id: u64, drop_threshold: u32) -> Self {
        Self {
            id,
            buffer: Mutex::new(VecDeque::with_capacity(SUBSCRIBER_BUFFER_CAPACITY)),
            dropped: AtomicU32::new(0),
            closed: AtomicBool::new(false),
            drop_threshold,
        }
    }

    fn enqueue(&self, event: ProgressEvent) {
        if self.closed.load(Ordering::Relaxed) {
            return;
        }
        let mut buf = self.buffer.lock().unwrap();
        if buf.len() >= SUBSCRIBER_BUFFER_CAPACITY {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if dropped > self.drop_threshold {
                self.closed.store(true, Ordering::Relaxed);
            }
            return; // drop the newest event, buffer keeps its existing order
        }
        buf.push_back(event);
    }
}

/// A handle returned by [`ProgressHub::subscribe`]. Drains buffered events
/// and reports whether the hub has closed this subscriber.
pub struct SubscriptionHandle {
    topic: String,
    subscriber: Arc<Subscriber>,
}

impl SubscriptionHandle {
    /// Drain all currently buffered events, in arrival order.
    pub fn drain(&self) -> Vec<ProgressEvent> {
        let mut buf = self.subscriber.buffer.lock().unwrap();
        buf.drain(..).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.subscriber.closed.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u32 {
        self.subscriber.dropped.load(Ordering::Relaxed)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// Topic-based pub/sub hub. `subscribe`/`unsubscribe` are exclusive writes;
/// `publish` is a concurrent read (it only needs to see the current
/// subscriber list, not mutate it).
#[derive(Default)]
pub struct ProgressHub {
    topics: RwLock<FxHashMap<String, Vec<Arc<Subscriber>>>>,
    next_id: AtomicU64,
    drop_threshold: u32,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(0),
            drop_threshold: DEFAULT_DROP_THRESHOLD,
        }
    }

    pub fn subscribe(&self, topic: &str) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Arc::new(Subscriber::new(id, self.drop_threshold));
        let mut topics = self.topics.write().unwrap();
        topics
            .entry(topic.to_string())
            .or_default()
            .push(Arc::clone(&subscriber));
        SubscriptionHandle {
            topic: topic.to_string(),
            subscriber,
        }
    }

    pub fn unsubscribe(&self, handle: &SubscriptionHandle) {
        let mut topics = self.topics.write().unwrap();
        if let Some(subs) = topics.get_mut(&handle.topic) {
            subs.retain(|s| s.id != handle.subscriber.id);
        }
    }

    /// Broadcast an event to every subscriber on `event.topic`. Events for a
    /// given run are published in non-decreasing `completed` order by the
    /// caller (C3/C4); the hub does not reorder.
    pub fn publish(&self, event: ProgressEvent) {
        let topics = self.topics.read().unwrap();
        if let Some(subs) = topics.get(&event.topic) {
            for sub in subs {
                sub.enqueue(event.clone());
            }
        }
    }
}
