//! Regulation loop: poll intensity, translate, fan out to assets.
//!
//! A [`Regulator`] session runs two independent tokio tasks that share only
//! the directive channel:
//!
//! ```text
//! Producer --(directive channel)--> Consumer --> each Asset
//! ```

pub mod channel;
pub mod consumer;
pub mod directive;
pub mod producer;
/// Cooperative cancellation for both loops.
pub mod shutdown;

use std::time::Duration;

use tracing::info;

use crate::assets::Asset;
use crate::error::RegulatorError;
use crate::intensity::IntensitySource;

pub use channel::{DirectivePublisher, DirectiveReceiver, directive_channel};
pub use consumer::{Consumer, ConsumerStats, DispatchReport};
pub use directive::{Directive, translate};
pub use producer::{CycleOutcome, Producer, ProducerStats};
pub use shutdown::{Shutdown, ShutdownTrigger};

/// Timing and buffering for one regulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegulationSettings {
    /// Wait between producer cycles.
    pub interval: Duration,
    /// Directive channel capacity; `0` is a rendezvous hand-off.
    pub channel_capacity: usize,
}

impl RegulationSettings {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            channel_capacity: 0,
        }
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegulationSummary {
    pub producer: ProducerStats,
    pub consumer: ConsumerStats,
}

/// One regulation session over a fixed set of assets.
pub struct Regulator<S> {
    source: S,
    assets: Vec<Box<dyn Asset>>,
    settings: RegulationSettings,
}

impl<S: IntensitySource + 'static> Regulator<S> {
    /// Creates a session. The asset list is fixed for the session's lifetime.
    pub fn new(source: S, assets: Vec<Box<dyn Asset>>, settings: RegulationSettings) -> Self {
        Self {
            source,
            assets,
            settings,
        }
    }

    /// Runs producer and consumer until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns [`RegulatorError::TaskFailed`] if either loop panicked.
    pub async fn run(self, shutdown: Shutdown) -> Result<RegulationSummary, RegulatorError> {
        let (publisher, receiver) = directive_channel(self.settings.channel_capacity);
        info!(
            assets = self.assets.len(),
            interval_secs = self.settings.interval.as_secs_f64(),
            channel_capacity = self.settings.channel_capacity,
            "starting regulation session"
        );

        let producer = Producer::new(self.source, publisher, self.settings.interval);
        let consumer = Consumer::new(self.assets);
        let producer_task = tokio::spawn(producer.run(shutdown.clone()));
        let consumer_task = tokio::spawn(consumer.run(receiver, shutdown));

        let producer_abort = producer_task.abort_handle();
        let consumer_abort = consumer_task.abort_handle();

        // Whichever loop dies first is reported without waiting on the other.
        let joined = tokio::try_join!(
            async {
                producer_task
                    .await
                    .map_err(|source| RegulatorError::TaskFailed {
                        task: "producer",
                        source,
                    })
            },
            async {
                consumer_task
                    .await
                    .map_err(|source| RegulatorError::TaskFailed {
                        task: "consumer",
                        source,
                    })
            },
        );
        if joined.is_err() {
            producer_abort.abort();
            consumer_abort.abort();
        }
        let (producer, consumer) = joined?;

        Ok(RegulationSummary { producer, consumer })
    }
}
