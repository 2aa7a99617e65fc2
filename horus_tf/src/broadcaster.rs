//! Broadcast channels for stamped transforms
//!
//! Publishing is fire-and-forget: implementations never report failure to
//! the caller, they log and move on.

use crate::state::TransformStamped;
use parking_lot::Mutex;
use std::io::Write;
use tokio::sync::broadcast;
use tracing::{info, trace, warn};

/// Default number of transforms a lagging channel subscriber may fall behind
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Sink for published transforms
pub trait TransformBroadcaster: Send + Sync {
    /// Make `transform` available to downstream consumers
    fn publish(&self, transform: &TransformStamped);
}

impl<B: TransformBroadcaster + ?Sized> TransformBroadcaster for Box<B> {
    fn publish(&self, transform: &TransformStamped) {
        (**self).publish(transform)
    }
}

impl<B: TransformBroadcaster + ?Sized> TransformBroadcaster for std::sync::Arc<B> {
    fn publish(&self, transform: &TransformStamped) {
        (**self).publish(transform)
    }
}

/// In-process broadcaster backed by a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<TransformStamped>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Receive every transform published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TransformStamped> {
        self.tx.subscribe()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl TransformBroadcaster for ChannelBroadcaster {
    fn publish(&self, transform: &TransformStamped) {
        // No subscribers is not an error
        if self.tx.send(transform.clone()).is_err() {
            trace!(
                "No subscribers for transform {} -> {}",
                transform.parent_frame,
                transform.child_frame
            );
        }
    }
}

/// Writes one JSON object per line to any writer (stdout by default)
pub struct JsonLinesBroadcaster<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonLinesBroadcaster<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesBroadcaster<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Take the writer back
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> TransformBroadcaster for JsonLinesBroadcaster<W> {
    fn publish(&self, transform: &TransformStamped) {
        let line = match serde_json::to_string(transform) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize transform: {}", e);
                return;
            }
        };

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Failed to write transform: {}", e);
        }
    }
}

/// Reports every transform as a tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBroadcaster;

impl TransformBroadcaster for LogBroadcaster {
    fn publish(&self, transform: &TransformStamped) {
        let [x, y, z] = transform.translation;
        let [qx, qy, qz, qw] = transform.rotation;
        info!(
            parent = %transform.parent_frame,
            child = %transform.child_frame,
            stamp = transform.timestamp,
            "translation [{:.6}, {:.6}, {:.6}] rotation [{:.6}, {:.6}, {:.6}, {:.6}]",
            x, y, z, qx, qy, qz, qw
        );
    }
}
