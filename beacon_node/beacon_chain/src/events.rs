use slog::{trace, Logger};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::SendError;
use tokio::sync::broadcast::{Receiver, Sender};
use types::{Checkpoint, Hash256};

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Broadcasts the two outward signals the core produces (§1): a new head and a new finalized
/// checkpoint. There is no HTTP/SSE surface here — that lives in the excluded RPC layer, which is
/// expected to subscribe to these same channels.
pub struct EventHandler {
    block_tx: Sender<EventKind>,
    head_tx: Sender<EventKind>,
    finalized_tx: Sender<EventKind>,
    log: Logger,
}

impl EventHandler {
    pub fn new(log: Logger) -> Self {
        Self::with_capacity(log, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(log: Logger, capacity: usize) -> Self {
        let (block_tx, _) = broadcast::channel(capacity);
        let (head_tx, _) = broadcast::channel(capacity);
        let (finalized_tx, _) = broadcast::channel(capacity);
        Self { block_tx, head_tx, finalized_tx, log }
    }

    pub fn register(&self, kind: EventKind) {
        let result = match kind {
            EventKind::BlockProcessed { .. } => self
                .block_tx
                .send(kind)
                .map(|n| trace!(self.log, "Registering block-processed event"; "receiver_count" => n)),
            EventKind::HeadChanged { .. } => self
                .head_tx
                .send(kind)
                .map(|n| trace!(self.log, "Registering head-changed event"; "receiver_count" => n)),
            EventKind::FinalizedCheckpoint(_) => self
                .finalized_tx
                .send(kind)
                .map(|n| trace!(self.log, "Registering finalized-checkpoint event"; "receiver_count" => n)),
        };
        if let Err(SendError(event)) = result {
            trace!(self.log, "No receivers registered to listen for event"; "event" => ?event);
        }
    }

    pub fn subscribe_block(&self) -> Receiver<EventKind> {
        self.block_tx.subscribe()
    }

    pub fn subscribe_head(&self) -> Receiver<EventKind> {
        self.head_tx.subscribe()
    }

    pub fn subscribe_finalized(&self) -> Receiver<EventKind> {
        self.finalized_tx.subscribe()
    }
}

#[derive(Debug, Clone)]
pub enum EventKind {
    /// Emitted after step 8 of `onBlock` (§6, Inter-service event).
    BlockProcessed { block_root: Hash256, verified: bool },
    /// Emitted exactly when the head tracker's root changes (§4.6).
    HeadChanged { previous_root: Hash256, current_root: Hash256 },
    FinalizedCheckpoint(Checkpoint),
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{o, Discard};

    #[test]
    fn undelivered_event_does_not_error() {
        let handler = EventHandler::new(Logger::root(Discard, o!()));
        handler.register(EventKind::HeadChanged { previous_root: Hash256::zero(), current_root: Hash256::from_slice(&[1u8; 32]) });
    }

    #[tokio::test]
    async fn subscriber_receives_block_processed() {
        let handler = EventHandler::new(Logger::root(Discard, o!()));
        let mut rx = handler.subscribe_block();
        handler.register(EventKind::BlockProcessed { block_root: Hash256::from_slice(&[9u8; 32]), verified: true });
        let event = rx.recv().await.unwrap();
        match event {
            EventKind::BlockProcessed { verified, .. } => assert!(verified),
            _ => panic!("wrong event kind"),
        }
    }
}
