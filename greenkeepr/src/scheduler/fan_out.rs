//! Repository to module fan-out.

use super::ConfigResolver;
use crate::broker::{
    check_topic, Broker, CheckRequested, RepositoryDue, RepositoryToggled, Subscription, TOGGLE_TOPIC,
};
use crate::host::CodeHost;
use crate::pipeline::UpdateError;
use crate::repository::{Repository, RepositoryStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns due or toggled repositories into one check request per module.
pub struct FanOut {
    store: Arc<dyn RepositoryStore>,
    broker: Broker,
    resolver: ConfigResolver,
    plugin: String,
    due: Subscription,
    toggles: Subscription,
}

impl FanOut {
    /// Creates the stage and subscribes to the `plugin` and toggle topics.
    pub fn new(
        store: Arc<dyn RepositoryStore>,
        host: Arc<dyn CodeHost>,
        broker: Broker,
        plugin: impl Into<String>,
        config_file: impl Into<String>,
    ) -> Self {
        let plugin = plugin.into();
        let due = broker.subscribe(&plugin);
        let toggles = broker.subscribe(TOGGLE_TOPIC);

        Self {
            store,
            resolver: ConfigResolver::new(host, config_file),
            broker,
            plugin,
            due,
            toggles,
        }
    }

    /// Sends a [`CheckRequested`] for each configured module, waiting while a
    /// worker queue is full.
    ///
    /// Returns the number of requests delivered to a worker.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] if the configuration cannot be resolved.
    pub async fn fan_out(&self, repository: &Repository) -> Result<usize, UpdateError> {
        let modules = self.resolver.modules(repository, &self.plugin).await?;
        let mut published = 0;

        for module in modules {
            let topic = check_topic(&self.plugin, &module.language);
            let message = CheckRequested {
                config: module,
                repository_id: repository.id.clone(),
            };

            match self.broker.send(&topic, &message).await {
                Ok(0) => warn!(repo = %repository.full_name, topic = %topic, "No worker for language"),
                Ok(_) => published += 1,
                Err(e) => warn!(repo = %repository.full_name, topic = %topic, error = %e, "Failed to request check"),
            }
        }

        debug!(repo = %repository.full_name, published, "Requested module checks");
        Ok(published)
    }

    /// Handles a due repository.
    pub async fn handle_due(&self, message: RepositoryDue) {
        self.dispatch(&message.repository_id).await;
    }

    /// Handles a toggle: the cached configuration is dropped and the
    /// repository is scanned right away if the plugin is still enabled.
    pub async fn handle_toggle(&self, message: RepositoryToggled) {
        self.resolver.invalidate(&message.repository_id);
        self.dispatch(&message.repository_id).await;
    }

    async fn dispatch(&self, repository_id: &str) {
        let repository = match self.store.find(repository_id).await {
            Ok(repository) => repository,
            Err(e) => {
                warn!(repository_id, error = %e, "Cannot load repository");
                return;
            }
        };

        if !repository.has_plugin(&self.plugin) {
            debug!(repo = %repository.full_name, "Plugin disabled, skipping");
            return;
        }

        match self.fan_out(&repository).await {
            Ok(_) => {}
            Err(e) if e.is_silent() => debug!(repo = %repository.full_name, reason = %e, "Skipped"),
            Err(e) => warn!(repo = %repository.full_name, error = %e, "Fan-out failed"),
        }
    }

    /// Processes messages until the broker is gone.
    pub async fn run(mut self) {
        info!(plugin = %self.plugin, "Fan-out started");

        loop {
            tokio::select! {
                message = self.due.next::<RepositoryDue>() => match message {
                    Some(Ok(message)) => self.handle_due(message).await,
                    Some(Err(e)) => warn!(error = %e, "Dropping invalid message"),
                    None => break,
                },
                message = self.toggles.next::<RepositoryToggled>() => match message {
                    Some(Ok(message)) => self.handle_toggle(message).await,
                    Some(Err(e)) => warn!(error = %e, "Dropping invalid message"),
                    None => break,
                },
            }
        }

        info!("Fan-out stopped");
    }
}
