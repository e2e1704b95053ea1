//! Owned hand-off buffer between the producer and the consumer.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::directive::Directive;
use crate::error::ChannelClosed;

struct Envelope {
    directive: Directive,
    taken: Option<oneshot::Sender<()>>,
}

/// Producer half of the directive channel.
#[derive(Debug)]
pub struct DirectivePublisher {
    tx: mpsc::Sender<Envelope>,
    rendezvous: bool,
}

/// Consumer half of the directive channel.
#[derive(Debug)]
pub struct DirectiveReceiver {
    rx: mpsc::Receiver<Envelope>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("directive", &self.directive)
            .finish_non_exhaustive()
    }
}

/// Creates a directive channel.
///
/// With `capacity == 0` the channel is a rendezvous: [`DirectivePublisher::publish`]
/// returns only once the consumer has taken the directive. Otherwise up to
/// `capacity` directives may wait in the buffer.
pub fn directive_channel(capacity: usize) -> (DirectivePublisher, DirectiveReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        DirectivePublisher {
            tx,
            rendezvous: capacity == 0,
        },
        DirectiveReceiver { rx },
    )
}

impl DirectivePublisher {
    /// Publishes a directive, suspending while the channel is full.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelClosed`] if the receiver has been dropped, including
    /// while a rendezvous publish is waiting to be taken.
    pub async fn publish(&self, directive: Directive) -> Result<(), ChannelClosed> {
        if !self.rendezvous {
            return self
                .tx
                .send(Envelope {
                    directive,
                    taken: None,
                })
                .await
                .map_err(|_| ChannelClosed);
        }

        let (taken_tx, taken_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                directive,
                taken: Some(taken_tx),
            })
            .await
            .map_err(|_| ChannelClosed)?;
        taken_rx.await.map_err(|_| ChannelClosed)
    }
}

impl DirectiveReceiver {
    /// Waits for the next directive; `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<Directive> {
        let envelope = self.rx.recv().await?;
        if let Some(taken) = envelope.taken {
            // The publisher may have been cancelled mid-publish.
            if taken.send(()).is_err() {
                debug!(directive = %envelope.directive, "publisher stopped waiting for hand-off");
            }
        }
        Some(envelope.directive)
    }
}
