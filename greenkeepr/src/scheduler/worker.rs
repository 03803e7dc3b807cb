//! Bounded check worker for one language topic.

use crate::broker::{check_topic, Broker, CheckRequested, Subscription};
use crate::pipeline::UpdatePipeline;
use crate::summary::ProcessingResult;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Runs module jobs from a `<plugin>-<language>` topic on a bounded pool.
///
/// A permit is taken before the next message is received, so a saturated
/// pool leaves messages in the subscription queue.
pub struct CheckWorker {
    pipeline: UpdatePipeline,
    subscription: Subscription,
    concurrency: usize,
}

impl CheckWorker {
    /// Creates the worker and subscribes to the language's check topic.
    pub fn new(pipeline: UpdatePipeline, broker: &Broker, plugin: &str, language: &str, concurrency: usize) -> Self {
        Self {
            pipeline,
            subscription: broker.subscribe(&check_topic(plugin, language)),
            concurrency: concurrency.max(1),
        }
    }

    /// Runs one module job; failures become part of the result.
    pub async fn process_check(pipeline: &UpdatePipeline, message: CheckRequested) -> ProcessingResult {
        let repository = match pipeline.context().store.find(&message.repository_id).await {
            Ok(repository) => repository,
            Err(e) => {
                return ProcessingResult::Failed {
                    repository: message.repository_id,
                    module: Some(message.config),
                    error: e.to_string(),
                };
            }
        };

        let result = pipeline.run(&repository, &message.config).await;
        ProcessingResult::from_job(&repository.full_name, &message.config, result)
    }

    /// Processes messages until the broker is gone, then drains running jobs.
    pub async fn run(mut self) {
        let topic = self.subscription.topic().to_string();
        info!(topic = %topic, concurrency = self.concurrency, "Check worker started");

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut jobs = JoinSet::new();

        loop {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };

            while let Some(finished) = jobs.try_join_next() {
                log_join(finished);
            }

            let message = match self.subscription.next::<CheckRequested>().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    warn!(topic = %topic, error = %e, "Dropping invalid message");
                    continue;
                }
                None => break,
            };

            let pipeline = self.pipeline.clone();
            jobs.spawn(async move {
                let _permit = permit;
                Self::process_check(&pipeline, message).await.log();
            });
        }

        while let Some(finished) = jobs.join_next().await {
            log_join(finished);
        }
        info!(topic = %topic, "Check worker stopped");
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Check job panicked");
    }
}
