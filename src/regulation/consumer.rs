//! Dispatch half of the regulation loop.

use std::fmt;

use tracing::{info, warn};

use super::channel::DirectiveReceiver;
use super::directive::Directive;
use super::shutdown::Shutdown;
use crate::assets::Asset;
use crate::error::AssetError;

/// Result of applying one directive to one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetOutcome {
    pub asset_id: String,
    pub result: Result<(), AssetError>,
}

/// Per-asset results of one fan-out, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub directive: Directive,
    pub outcomes: Vec<AssetOutcome>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}/{} assets ok",
            self.directive,
            self.succeeded(),
            self.outcomes.len()
        )
    }
}

/// Counters accumulated over the consumer's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub directives: u64,
    pub asset_calls: u64,
    pub asset_failures: u64,
}

/// Applies received directives to a fixed, ordered set of assets.
pub struct Consumer {
    assets: Vec<Box<dyn Asset>>,
    stats: ConsumerStats,
}

impl Consumer {
    pub fn new(assets: Vec<Box<dyn Asset>>) -> Self {
        Self {
            assets,
            stats: ConsumerStats::default(),
        }
    }

    pub fn assets(&self) -> &[Box<dyn Asset>] {
        &self.assets
    }

    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    /// Applies `directive` to every asset in registration order.
    ///
    /// A failing asset is logged and skipped; it does not stop the fan-out and
    /// is not retried within this dispatch.
    pub fn dispatch(&mut self, directive: Directive) -> DispatchReport {
        let mut outcomes = Vec::with_capacity(self.assets.len());
        for asset in &mut self.assets {
            let result = asset.set_charging(directive.value());
            if let Err(err) = &result {
                self.stats.asset_failures += 1;
                warn!(
                    asset = asset.asset_id(),
                    asset_type = asset.asset_type(),
                    error = %err,
                    "asset did not accept directive"
                );
            }
            self.stats.asset_calls += 1;
            outcomes.push(AssetOutcome {
                asset_id: asset.asset_id().to_string(),
                result,
            });
        }
        self.stats.directives += 1;
        DispatchReport {
            directive,
            outcomes,
        }
    }

    /// Waits for directives and dispatches each one until shutdown is
    /// requested or the producer goes away.
    ///
    /// Once shutdown has been requested no further directive is dispatched,
    /// even one already sitting in the channel.
    pub async fn run(
        mut self,
        mut receiver: DirectiveReceiver,
        mut shutdown: Shutdown,
    ) -> ConsumerStats {
        info!(assets = self.assets.len(), "consumer started");
        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                next = receiver.recv() => next,
            };
            let Some(directive) = next else {
                info!("directive channel closed, consumer stopping");
                break;
            };

            let report = self.dispatch(directive);
            info!(
                %directive,
                succeeded = report.succeeded(),
                failed = report.failed(),
                "dispatched directive"
            );
        }
        info!(
            directives = self.stats.directives,
            asset_failures = self.stats.asset_failures,
            "consumer stopped"
        );
        self.stats
    }
}
