use crate::constants::events::RESOURCE_LOADED;
use crate::registry::ResourceType;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// Notification emitted after a URL loads successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadEvent {
    pub name: String,
    pub resource_type: ResourceType,
    pub url: String,
    /// Name of the strategy that succeeded
    pub strategy: String,
    /// Time from the first strategy attempt to success
    pub elapsed: Duration,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl LoadEvent {
    pub fn resource_loaded(
        resource_type: ResourceType,
        url: impl Into<String>,
        strategy: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            name: RESOURCE_LOADED.to_string(),
            resource_type,
            url: url.into(),
            strategy: strategy.into(),
            elapsed,
            published_at: chrono::Utc::now(),
        }
    }
}

/// Broadcast publisher for load notifications
#[derive(Debug, Clone)]
pub struct LoadEventPublisher {
    sender: broadcast::Sender<LoadEvent>,
}

impl LoadEventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to every current subscriber
    pub fn publish(&self, event: LoadEvent) {
        // send() only fails when nobody is listening, which is fine for notifications
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LoadEventPublisher {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_EVENT_CAPACITY)
    }
}
