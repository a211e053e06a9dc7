//! # Change Events
//!
//! In-process change notifications. Every committed mutation publishes one
//! event; UI layers subscribe and refresh the views that care.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Change Event Flow                                  │
//! │                                                                         │
//! │  OrderStore::change_status() ──┐                                       │
//! │  PaymentStore::record() ───────┼──► EventBus (tokio broadcast)         │
//! │  TaskStore::update() ──────────┘         │                             │
//! │                                          ├──► orders view refresh      │
//! │                                          ├──► dashboard refresh        │
//! │                                          └──► activity feed refresh    │
//! │                                                                         │
//! │  Lossy by design: a slow subscriber misses events and re-reads the     │
//! │  store instead of blocking writers.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use ts_rs::TS;

use opsdesk_core::{OrderStatus, PaymentStatus};

/// Broadcast channel capacity. Subscribers slower than this lag and must
/// re-read.
const EVENT_CAPACITY: usize = 256;

/// A committed change, published after the transaction succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    OrderCreated {
        order_id: String,
        order_number: String,
    },
    OrderUpdated {
        order_id: String,
    },
    OrderStatusChanged {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
    OrderDeleted {
        order_id: String,
    },
    PaymentRecorded {
        payment_id: String,
        order_id: String,
    },
    PaymentStatusChanged {
        payment_id: String,
        order_id: String,
        to: PaymentStatus,
    },
    PaymentDeleted {
        payment_id: String,
        order_id: String,
    },
    CustomerChanged {
        customer_id: String,
    },
    ProductChanged {
        product_id: String,
    },
    ExpenseChanged {
        expense_id: String,
    },
    TaskChanged {
        task_id: String,
    },
}

/// Publish/subscribe handle for change events.
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        EventBus { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// A send with no subscribers is not an error; events are advisory.
    pub fn publish(&self, event: ChangeEvent) {
        debug!(?event, "Publishing change event");
        let _ = self.sender.send(event);
    }

    /// Subscribes to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(ChangeEvent::OrderDeleted {
            order_id: "o1".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ChangeEvent::OrderDeleted {
                order_id: "o1".to_string()
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(ChangeEvent::CustomerChanged {
            customer_id: "c1".to_string(),
        });
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.publish(ChangeEvent::TaskChanged {
            task_id: "t1".to_string(),
        });

        let mut rx = bus.subscribe();
        bus.publish(ChangeEvent::TaskChanged {
            task_id: "t2".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ChangeEvent::TaskChanged {
                task_id: "t2".to_string()
            }
        );
    }
}
