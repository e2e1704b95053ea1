//! Polling half of the regulation loop.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::channel::DirectivePublisher;
use super::directive::{Directive, translate};
use super::shutdown::Shutdown;
use crate::error::ChannelClosed;
use crate::intensity::{Classification, IntensitySource};

/// What a single producer cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A directive was handed to the consumer.
    Published(Directive),
    /// The reading translated to hold; nothing was published.
    Held(Classification),
    /// The intensity source failed; nothing was published.
    FetchFailed,
}

/// Counters accumulated over the producer's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProducerStats {
    pub cycles: u64,
    pub published: u64,
    pub held: u64,
    pub fetch_failures: u64,
}

/// Polls an intensity source on a fixed interval and publishes directives.
pub struct Producer<S> {
    source: S,
    publisher: DirectivePublisher,
    interval: Duration,
    consecutive_failures: u32,
    stats: ProducerStats,
}

impl<S: IntensitySource> Producer<S> {
    pub fn new(source: S, publisher: DirectivePublisher, interval: Duration) -> Self {
        Self {
            source,
            publisher,
            interval,
            consecutive_failures: 0,
            stats: ProducerStats::default(),
        }
    }

    pub fn stats(&self) -> ProducerStats {
        self.stats
    }

    /// Fetch failures since the last successful reading.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Runs one fetch → translate → publish step, without the interval wait.
    ///
    /// Fetch failures are logged and reported as [`CycleOutcome::FetchFailed`];
    /// they never escalate.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelClosed`] if the consumer is gone.
    pub async fn poll_once(&mut self) -> Result<CycleOutcome, ChannelClosed> {
        self.stats.cycles += 1;

        let reading = match self.source.fetch_current().await {
            Ok(reading) => reading,
            Err(err) => {
                self.consecutive_failures += 1;
                self.stats.fetch_failures += 1;
                warn!(
                    error = %err,
                    consecutive_failures = self.consecutive_failures,
                    "failed to fetch carbon intensity, retrying next interval"
                );
                return Ok(CycleOutcome::FetchFailed);
            }
        };

        if self.consecutive_failures > 0 {
            info!(
                failures = self.consecutive_failures,
                "intensity source recovered"
            );
            self.consecutive_failures = 0;
        }
        debug!(%reading, "carbon intensity reading");

        let Some(directive) = translate(&reading.classification) else {
            if reading.classification.is_recognized() {
                info!("Carbon intensity is {}. Holding", reading.classification);
            } else {
                info!(
                    classification = %reading.classification,
                    "cannot classify carbon intensity, holding"
                );
            }
            self.stats.held += 1;
            return Ok(CycleOutcome::Held(reading.classification));
        };

        self.publisher.publish(directive).await?;
        self.stats.published += 1;
        info!(
            %directive,
            classification = %reading.classification,
            "published directive"
        );
        Ok(CycleOutcome::Published(directive))
    }

    /// Polls until shutdown is requested or the consumer goes away.
    ///
    /// Every suspension point (fetch, publish, interval wait) yields to the
    /// shutdown signal.
    pub async fn run(mut self, mut shutdown: Shutdown) -> ProducerStats {
        info!(interval_secs = self.interval.as_secs_f64(), "producer started");
        loop {
            let outcome = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                outcome = self.poll_once() => outcome,
            };
            if outcome.is_err() {
                warn!("directive channel closed, producer stopping");
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!(
            cycles = self.stats.cycles,
            published = self.stats.published,
            held = self.stats.held,
            fetch_failures = self.stats.fetch_failures,
            "producer stopped"
        );
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::FetchError;
    use crate::intensity::IntensityReading;
    use crate::regulation::channel::directive_channel;

    struct Script(Mutex<VecDeque<Option<Classification>>>);

    impl Script {
        fn new(steps: Vec<Option<Classification>>) -> Self {
            Self(Mutex::new(steps.into()))
        }
    }

    #[async_trait]
    impl IntensitySource for Script {
        async fn fetch_current(&self) -> Result<IntensityReading, FetchError> {
            let next = self.0.lock().expect("script lock").pop_front().flatten();
            next.map(|classification| IntensityReading {
                from: "2018-01-20T12:00Z".to_string(),
                to: "2018-01-20T12:30Z".to_string(),
                forecast: 266,
                actual: Some(100),
                classification,
            })
            .ok_or(FetchError::NoData)
        }
    }

    #[tokio::test]
    async fn publishes_discharge_on_high() {
        let (publisher, mut receiver) = directive_channel(1);
        let mut producer = Producer::new(
            Script::new(vec![Some(Classification::High)]),
            publisher,
            Duration::from_millis(1),
        );
        let outcome = producer.poll_once().await.expect("receiver alive");
        assert_eq!(outcome, CycleOutcome::Published(Directive::DischargeMax));
        assert_eq!(receiver.recv().await, Some(Directive::DischargeMax));
    }

    #[tokio::test]
    async fn holds_on_moderate() {
        let (publisher, _receiver) = directive_channel(1);
        let mut producer = Producer::new(
            Script::new(vec![Some(Classification::Moderate)]),
            publisher,
            Duration::from_millis(1),
        );
        let outcome = producer.poll_once().await.expect("receiver alive");
        assert_eq!(outcome, CycleOutcome::Held(Classification::Moderate));
        assert_eq!(producer.stats().published, 0);
        assert_eq!(producer.stats().held, 1);
    }

    #[tokio::test]
    async fn counts_and_resets_consecutive_failures() {
        let (publisher, _receiver) = directive_channel(1);
        let mut producer = Producer::new(
            Script::new(vec![None, None, Some(Classification::VeryLow)]),
            publisher,
            Duration::from_millis(1),
        );
        assert_eq!(producer.poll_once().await, Ok(CycleOutcome::FetchFailed));
        assert_eq!(producer.poll_once().await, Ok(CycleOutcome::FetchFailed));
        assert_eq!(producer.consecutive_failures(), 2);

        assert_eq!(
            producer.poll_once().await,
            Ok(CycleOutcome::Published(Directive::ChargeMax))
        );
        assert_eq!(producer.consecutive_failures(), 0);
        assert_eq!(
            producer.stats(),
            ProducerStats {
                cycles: 3,
                published: 1,
                held: 0,
                fetch_failures: 2,
            }
        );
    }

    #[tokio::test]
    async fn closed_channel_is_reported() {
        let (publisher, receiver) = directive_channel(0);
        drop(receiver);
        let mut producer = Producer::new(
            Script::new(vec![Some(Classification::Low)]),
            publisher,
            Duration::from_millis(1),
        );
        assert_eq!(producer.poll_once().await, Err(ChannelClosed));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let (publisher, _receiver) = directive_channel(0);
        let producer = Producer::new(Script::new(vec![]), publisher, Duration::from_secs(3600));
        let (trigger, shutdown) = crate::regulation::shutdown::channel();

        let handle = tokio::spawn(producer.run(shutdown));
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.trigger();

        let stats = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("producer should stop promptly")
            .expect("producer should not panic");
        assert_eq!(stats.published, 0);
        assert_eq!(stats.fetch_failures, 1);
    }
}
