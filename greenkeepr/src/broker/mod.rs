//! In-process topic broker.
//!
//! Every subscriber owns a bounded queue. [`Broker::send`] waits for room in
//! each queue, so the pipeline stages push back on their producers.
//! [`Broker::publish`] never waits: a message for a subscriber whose queue is
//! full is dropped with a log line. A message for a topic without subscribers
//! is always dropped. There is no acknowledgement and no redelivery.

mod error;
mod messages;

pub use error::BrokerError;
pub use messages::{check_topic, CheckRequested, RepositoryDue, RepositoryToggled, TOGGLE_TOPIC};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

type Payload = Arc<[u8]>;

/// Routes JSON messages by topic name.
#[derive(Clone)]
pub struct Broker {
    topics: Arc<Mutex<HashMap<String, Vec<mpsc::Sender<Payload>>>>>,
    capacity: usize,
}

impl Broker {
    /// Creates a broker whose subscriber queues hold `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to `topic`. Every subscriber receives every message.
    pub fn subscribe(&self, topic: &str) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        self.topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.to_string())
            .or_default()
            .push(sender);

        debug!(topic, "Subscribed");
        Subscription {
            topic: topic.to_string(),
            receiver,
        }
    }

    /// Delivers `message` to every subscriber of `topic`, waiting while a
    /// subscriber queue is full.
    ///
    /// Returns the number of subscribers that received the message.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Encode`] if the message cannot be serialized.
    pub async fn send<T: Serialize>(&self, topic: &str, message: &T) -> Result<usize, BrokerError> {
        let payload = encode(topic, message)?;

        let subscribers: Vec<mpsc::Sender<Payload>> = self
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .unwrap_or_default();

        let mut delivered = 0;
        for subscriber in &subscribers {
            if subscriber.send(Arc::clone(&payload)).await.is_ok() {
                delivered += 1;
            }
        }

        if delivered == 0 {
            self.prune(topic);
            warn!(topic, "Dropping message for topic without subscribers");
        }
        Ok(delivered)
    }

    /// Publishes `message` to every subscriber of `topic` without waiting.
    ///
    /// Returns the number of subscribers that accepted the message.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Encode`] if the message cannot be serialized.
    pub fn publish<T: Serialize>(&self, topic: &str, message: &T) -> Result<usize, BrokerError> {
        let payload = encode(topic, message)?;

        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = topics.get_mut(topic) else {
            warn!(topic, "Dropping message for topic without subscribers");
            return Ok(0);
        };

        let mut delivered = 0;
        subscribers.retain(|subscriber| match subscriber.try_send(Arc::clone(&payload)) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(topic, "Dropping message for full subscriber queue");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });

        if subscribers.is_empty() {
            topics.remove(topic);
            warn!(topic, "Dropping message for topic without subscribers");
        }

        Ok(delivered)
    }

    fn prune(&self, topic: &str) {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(subscribers) = topics.get_mut(topic) {
            subscribers.retain(|subscriber| !subscriber.is_closed());
            if subscribers.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

fn encode<T: Serialize>(topic: &str, message: &T) -> Result<Payload, BrokerError> {
    serde_json::to_vec(message)
        .map(Payload::from)
        .map_err(|source| BrokerError::Encode {
            topic: topic.to_string(),
            source,
        })
}

/// Receiving end of one subscription.
pub struct Subscription {
    topic: String,
    receiver: mpsc::Receiver<Payload>,
}

impl Subscription {
    /// Topic of this subscription.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next message. `None` once the broker is gone.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Option<Result<T, BrokerError>> {
        let payload = self.receiver.recv().await?;
        Some(
            serde_json::from_slice(&payload).map_err(|source| BrokerError::Decode {
                topic: self.topic.clone(),
                source,
            }),
        )
    }
}
