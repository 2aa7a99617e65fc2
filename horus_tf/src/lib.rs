//! HORUS static transform publishing
//!
//! Keeps a single parent -> child transform consistent across its three
//! editable representations and republishes it on a fixed period.
//!
//! # Overview
//!
//! The crate provides:
//! - `TransformState`: the canonical translation + unit quaternion
//! - Euler / quaternion conversion with one fixed composition order
//! - `ReconfigureController`: per field group edit handling
//! - `ReconfigureServer`: the field schema with bounds that edits go through
//! - `TransformBroadcaster` implementations and the periodic `TransformSender`
//!
//! # Example
//!
//! ```rust,ignore
//! use horus_tf::{ReconfigureController, ReconfigureServer, TransformState};
//!
//! let state = TransformState::from_euler(
//!     1.0, 0.0, 0.5, 0.0, 0.0, std::f64::consts::FRAC_PI_2, 0, "base_link", "laser",
//! )?
//! .into_shared();
//!
//! let server = ReconfigureServer::new(ReconfigureController::new(state.clone()));
//!
//! let mut edit = std::collections::BTreeMap::new();
//! edit.insert("angle_units".to_string(), "degrees".into());
//! edit.insert("yaw".to_string(), 45.0.into());
//! let report = server.update(&edit)?;
//! assert_eq!(report.config.yaw, 45.0);
//! ```

pub mod angles;
pub mod broadcaster;
mod error;
pub mod params;
pub mod reconfigure;
pub mod sender;
pub mod state;

pub use angles::{
    quaternion_from_rpy, rpy_from_quaternion, to_degrees, to_radians, AngleBounds, AngleUnits,
};
pub use broadcaster::{
    ChannelBroadcaster, JsonLinesBroadcaster, LogBroadcaster, TransformBroadcaster,
};
pub use error::{TfError, TfResult};
pub use params::TransformSenderConfig;
pub use reconfigure::{
    ChangeGroup, ReconfigureController, ReconfigureOutcome, ReconfigureReport, ReconfigureServer,
};
pub use sender::TransformSender;
pub use state::{
    QuaternionStatus, QuaternionUpdate, SharedTransformState, TransformStamped, TransformState,
};

/// Get current timestamp in nanoseconds
pub fn timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now() {
        let ts = timestamp_now();
        assert!(ts > 0);
    }
}
