//! Periodic transform publishing

use crate::broadcaster::TransformBroadcaster;
use crate::error::{TfError, TfResult};
use crate::state::{SharedTransformState, TransformStamped};
use crate::timestamp_now;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Republishes the shared transform once per period
pub struct TransformSender<B: TransformBroadcaster> {
    state: SharedTransformState,
    broadcaster: B,
    period: Duration,
}

impl<B: TransformBroadcaster> TransformSender<B> {
    pub fn new(state: SharedTransformState, broadcaster: B, period: Duration) -> TfResult<Self> {
        if period.is_zero() {
            return Err(TfError::InvalidPeriod(0.0));
        }

        Ok(Self {
            state,
            broadcaster,
            period,
        })
    }

    /// Publish the current transform once
    ///
    /// The stamp is dated one period ahead so consumers still see it as
    /// current until the next publish arrives.
    pub fn send_once(&self) -> TransformStamped {
        let stamp = timestamp_now().saturating_add(self.period.as_nanos() as u64);
        let transform = self.state.lock().snapshot(stamp);

        self.broadcaster.publish(&transform);
        debug!(
            "Sending transform from {} with parent {}",
            transform.child_frame, transform.parent_frame
        );
        transform
    }

    /// Publish every period until `shutdown` turns true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let (parent, child) = {
            let state = self.state.lock();
            (state.parent_frame().to_string(), state.child_frame().to_string())
        };
        info!("Publishing {} -> {} every {:?}", parent, child, self.period);

        while !*shutdown.borrow() {
            self.send_once();

            tokio::select! {
                _ = tokio::time::sleep(self.period) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Transform sender stopped");
    }
}
