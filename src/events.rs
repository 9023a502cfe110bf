use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Events emitted by the stock movement workflows after their transaction
/// commits. Consumers are in-process only; delivery is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Transfer events
    TransferCreated {
        transfer_id: Uuid,
        transfer_number: String,
    },
    TransferApproved(Uuid),
    TransferInTransit(Uuid),
    TransferCompleted(Uuid),
    TransferCancelled(Uuid),

    // Adjustment events
    AdjustmentCreated {
        adjustment_id: Uuid,
        adjustment_number: String,
    },
    AdjustmentApproved(Uuid),
    AdjustmentCancelled(Uuid),

    // Sales order events
    SalesOrderCreated {
        order_id: Uuid,
        order_number: String,
    },
    SalesOrderCancelled(Uuid),

    // Goods receipt seam
    InventoryReceived {
        tenant_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        quantity: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
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
}

/// Background consumer that drains the event channel. Currently logs each
/// event; downstream projections subscribe here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        debug!(?event, "Processing event");
    }
    info!("Event channel closed; event processor stopping");
}
