use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Lifecycle events published by the services.
///
/// Consumers are best-effort: a full channel never fails the request that
/// produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CityCreated(Uuid),
    CityDeleted(Uuid),
    AreaCreated(Uuid),
    AreaUpdated(Uuid),
    AreaDeleted(Uuid),
    CategoryCreated(Uuid),
    CategoryDeleted(Uuid),
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    StockDecremented {
        product_id: Uuid,
        variant_index: usize,
        quantity: i32,
        remaining: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing the failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and only logs on failure.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::StockDecremented {
                product_id,
                variant_index,
                quantity,
                remaining,
            } => {
                info!(
                    %product_id,
                    variant_index,
                    quantity,
                    remaining,
                    "stock decremented"
                );
            }
            other => info!(event = ?other, "event processed"),
        }
    }
}
