//! Long-lived stages of the service.
//!
//! ```text
//! Scheduler --<plugin>--> FanOut --<plugin>-<language>--> CheckWorker
//!                           ^
//!          toggle-repository|
//! ```
//!
//! Stages only share the broker and the file system.

mod fan_out;
mod resolver;
mod worker;

pub use fan_out::FanOut;
pub use resolver::ConfigResolver;
pub use worker::CheckWorker;

use crate::broker::{Broker, RepositoryDue};
use crate::repository::{RepositoryError, RepositoryStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Periodically announces every repository with the plugin enabled.
pub struct Scheduler {
    store: Arc<dyn RepositoryStore>,
    broker: Broker,
    plugin: String,
    interval: Duration,
}

impl Scheduler {
    /// Creates a scheduler publishing on the `plugin` topic.
    pub fn new(store: Arc<dyn RepositoryStore>, broker: Broker, plugin: impl Into<String>, interval: Duration) -> Self {
        Self {
            store,
            broker,
            plugin: plugin.into(),
            interval,
        }
    }

    /// Sends one [`RepositoryDue`] per enabled repository, waiting while the
    /// fan-out queue is full.
    ///
    /// Returns the number of repositories delivered to a subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the store cannot be read.
    pub async fn tick(&self) -> Result<usize, RepositoryError> {
        let repositories = self.store.load().await?;
        let mut announced = 0;

        for repository in repositories.iter().filter(|r| r.has_plugin(&self.plugin)) {
            let message = RepositoryDue {
                repository_id: repository.id.clone(),
                plugin: self.plugin.clone(),
            };
            match self.broker.send(&self.plugin, &message).await {
                Ok(0) => warn!(repo = %repository.full_name, "Nobody received the announcement"),
                Ok(_) => announced += 1,
                Err(e) => error!(repo = %repository.full_name, error = %e, "Failed to announce repository"),
            }
        }

        debug!(announced, "Scheduler tick");
        Ok(announced)
    }

    /// Ticks immediately, then once per interval. Never returns.
    pub async fn run(self) {
        info!(plugin = %self.plugin, interval_secs = self.interval.as_secs(), "Scheduler started");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                error!(error = %e, "Failed to load repositories");
            }
        }
    }
}
