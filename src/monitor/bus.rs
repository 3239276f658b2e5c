//! Monitor event bus.
//!
//! A broadcast channel fanning monitor lifecycle and token events out to the
//! SSE gateway. Fan-out is non-blocking: a subscriber that falls more than
//! the channel capacity behind loses the oldest events (it can recover from
//! the next `initial` snapshot on reconnect).

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::tokens::types::TokenRecord;

/// Slow-subscriber buffer; beyond this, events are dropped for that
/// subscriber only.
const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum MonitorEvent {
    LoadingHistory { count: usize },
    HistoryLoaded { count: usize },
    /// Every analyzed token, regardless of verdict.
    TokenAnalyzed(Arc<TokenRecord>),
    TokenPassed(Arc<TokenRecord>),
    TokenFiltered(Arc<TokenRecord>),
    /// Upstream connection state changes.
    Connected,
    Disconnected,
    Error(String),
    Stopped,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MonitorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Publish to all subscribers. Lagging receivers drop events; a send
    /// with no receivers is a no-op.
    pub fn publish(&self, event: MonitorEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience constructors used by the monitor hot path.
impl MonitorEvent {
    pub fn for_verdict(record: &Arc<TokenRecord>) -> MonitorEvent {
        if record.analysis.passed {
            MonitorEvent::TokenPassed(record.clone())
        } else {
            MonitorEvent::TokenFiltered(record.clone())
        }
    }
}
