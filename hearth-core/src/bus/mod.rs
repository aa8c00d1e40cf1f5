//! In-process typed publish/subscribe.
//!
//! Decouples producers (inventory changes, task completions) from consumers
//! (orchestration) within a single process. Each subscriber owns a bounded
//! mpsc channel: `publish` awaits channel capacity, so a slow subscriber
//! exerts back-pressure instead of silently losing events, and same-type
//! delivery order per subscriber matches publish order. Delivery is
//! at-most-once, in-memory only - nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

/// Discriminant for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    InventoryLevelChanged,
    TaskCompleted,
    TaskAssigned,
    ScheduleTrigger,
}

/// The events routed through the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HomeEvent {
    InventoryLevelChanged {
        item_id: String,
        item_name: String,
        previous_level: f64,
        new_level: f64,
        below_threshold: bool,
    },
    TaskCompleted {
        task_id: String,
        task_name: String,
        user_id: String,
    },
    TaskAssigned {
        task_id: String,
        task_name: String,
        user_id: String,
        assigned_by: String,
    },
    ScheduleTrigger {
        trigger_id: String,
        trigger_name: String,
        #[serde(default)]
        context: HashMap<String, String>,
    },
}

impl HomeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::InventoryLevelChanged { .. } => EventKind::InventoryLevelChanged,
            Self::TaskCompleted { .. } => EventKind::TaskCompleted,
            Self::TaskAssigned { .. } => EventKind::TaskAssigned,
            Self::ScheduleTrigger { .. } => EventKind::ScheduleTrigger,
        }
    }
}

struct BusInner {
    capacity: usize,
    subscribers: Mutex<HashMap<EventKind, Vec<mpsc::Sender<HomeEvent>>>>,
}

/// Cheaply cloneable handle to the shared bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a bus whose subscriber channels hold `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                capacity: capacity.max(1),
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a subscriber for one event kind.
    pub async fn subscribe(&self, kind: EventKind) -> mpsc::Receiver<HomeEvent> {
        self.subscribe_all(&[kind]).await
    }

    /// Register one subscriber channel for several event kinds at once.
    pub async fn subscribe_all(&self, kinds: &[EventKind]) -> mpsc::Receiver<HomeEvent> {
        let (tx, rx) = mpsc::channel(self.inner.capacity);
        let mut subscribers = self.inner.subscribers.lock().await;
        for kind in kinds {
            subscribers.entry(*kind).or_default().push(tx.clone());
        }
        rx
    }

    /// Deliver an event to every current subscriber of its kind.
    ///
    /// Returns the number of subscribers reached. Subscribers whose receiver
    /// has been dropped are pruned.
    pub async fn publish(&self, event: HomeEvent) -> usize {
        let kind = event.kind();
        let senders: Vec<mpsc::Sender<HomeEvent>> = {
            let subscribers = self.inner.subscribers.lock().await;
            subscribers.get(&kind).cloned().unwrap_or_default()
        };

        if senders.is_empty() {
            debug!(?kind, "no subscribers for event kind");
            return 0;
        }

        let mut delivered = 0;
        let mut closed = false;
        for sender in &senders {
            if sender.send(event.clone()).await.is_ok() {
                delivered += 1;
            } else {
                closed = true;
            }
        }

        if closed {
            let mut subscribers = self.inner.subscribers.lock().await;
            for senders in subscribers.values_mut() {
                senders.retain(|s| !s.is_closed());
            }
        }
        delivered
    }
}
