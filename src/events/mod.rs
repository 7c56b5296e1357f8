use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the services after a successful state change.
///
/// Consumers are best-effort observers: failure to deliver an event never
/// fails the operation that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order / cart events
    OrderCreated(Uuid),
    CartItemAdded {
        order_id: Uuid,
        category_id: Uuid,
    },
    CartItemRemoved {
        order_id: Uuid,
        order_item_id: Uuid,
    },
    CartCleared(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderCancelled(Uuid),

    // Payment events
    PaymentRecorded {
        order_id: Uuid,
        payment_id: Uuid,
        amount_cents: i64,
    },

    // Delivery events
    DeliveryCreated {
        order_id: Uuid,
        delivery_id: Uuid,
    },
    DeliveryStatusChanged {
        delivery_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Rating events
    RatingCreated {
        order_id: Uuid,
        rating_id: Uuid,
        score: i32,
    },

    // Catalog events
    CategoryCreated(Uuid),
    CategoryUpdated(Uuid),
    CategoryDeleted(Uuid),

    // Admin events
    UserDeleted(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Consumes domain events and logs them. Notification delivery is handled by
/// an external collaborator; this task is the in-process observer.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = rx.recv().await {
        info!(?event, "Domain event");
    }
    info!("Event processor stopped");
}
