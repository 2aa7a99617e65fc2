//! Canonical transform state
//!
//! Holds the one parent -> child transform and the angle unit preference.
//! Every update leaves the rotation a unit quaternion.

use crate::angles::{quaternion_from_rpy, rpy_from_quaternion, AngleUnits};
use crate::error::{TfError, TfResult};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Transform state shared between the publish loop and the edit path
pub type SharedTransformState = Arc<Mutex<TransformState>>;

/// Stamped transform handed to the broadcast channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStamped {
    pub parent_frame: String,
    pub child_frame: String,
    /// Nanoseconds since UNIX epoch
    pub timestamp: u64,
    /// Translation [x, y, z]
    pub translation: [f64; 3],
    /// Rotation quaternion [x, y, z, w]
    pub rotation: [f64; 4],
}

/// How a submitted quaternion was handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuaternionStatus {
    /// Stored as given
    Accepted,
    /// Not unit length; the normalized value was stored
    Renormalized { squared_norm: f64 },
    /// Zero length (or non-finite); previous rotation kept
    Degenerate,
}

/// Result of [`TransformState::apply_quaternion`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuaternionUpdate {
    /// The rotation stored after the call
    pub stored: UnitQuaternion<f64>,
    pub status: QuaternionStatus,
}

/// The canonical transform plus angle unit preference
#[derive(Debug, Clone)]
pub struct TransformState {
    translation: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    parent_frame: String,
    child_frame: String,
    timestamp: u64,
    angle_units: AngleUnits,
}

impl TransformState {
    /// Create from translation and roll/pitch/yaw in radians
    #[allow(clippy::too_many_arguments)]
    pub fn from_euler(
        x: f64,
        y: f64,
        z: f64,
        roll: f64,
        pitch: f64,
        yaw: f64,
        timestamp: u64,
        parent_frame: impl Into<String>,
        child_frame: impl Into<String>,
    ) -> TfResult<Self> {
        Self::new(
            Vector3::new(x, y, z),
            quaternion_from_rpy(roll, pitch, yaw),
            timestamp,
            parent_frame.into(),
            child_frame.into(),
        )
    }

    /// Create from translation and quaternion
    ///
    /// A non-unit quaternion is normalized; a zero-length one is rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn from_quaternion(
        x: f64,
        y: f64,
        z: f64,
        qx: f64,
        qy: f64,
        qz: f64,
        qw: f64,
        timestamp: u64,
        parent_frame: impl Into<String>,
        child_frame: impl Into<String>,
    ) -> TfResult<Self> {
        let q = Quaternion::new(qw, qx, qy, qz);
        let rotation = match classify(&q) {
            QuaternionStatus::Degenerate => return Err(TfError::DegenerateQuaternion),
            QuaternionStatus::Renormalized { squared_norm } => {
                warn!(
                    "Quaternion is not normalized (length^2 = {}). Normalizing.",
                    squared_norm
                );
                UnitQuaternion::from_quaternion(q)
            }
            QuaternionStatus::Accepted => UnitQuaternion::new_unchecked(q),
        };

        Self::new(
            Vector3::new(x, y, z),
            rotation,
            timestamp,
            parent_frame.into(),
            child_frame.into(),
        )
    }

    fn new(
        translation: Vector3<f64>,
        rotation: UnitQuaternion<f64>,
        timestamp: u64,
        parent_frame: String,
        child_frame: String,
    ) -> TfResult<Self> {
        if parent_frame == child_frame {
            return Err(TfError::SameFrame(parent_frame));
        }

        Ok(Self {
            translation,
            rotation,
            parent_frame,
            child_frame,
            timestamp,
            angle_units: AngleUnits::default(),
        })
    }

    /// Wrap into the mutex-protected handle used by the sender and controller
    pub fn into_shared(self) -> SharedTransformState {
        Arc::new(Mutex::new(self))
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    pub fn parent_frame(&self) -> &str {
        &self.parent_frame
    }

    pub fn child_frame(&self) -> &str {
        &self.child_frame
    }

    /// Stamp of the last snapshot
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn angle_units(&self) -> AngleUnits {
        self.angle_units
    }

    /// Replace the translation, leaving rotation and timestamp untouched
    pub fn apply_translation(&mut self, x: f64, y: f64, z: f64) {
        self.translation = Vector3::new(x, y, z);
    }

    /// Replace the rotation from roll/pitch/yaw expressed in `units`
    pub fn apply_euler(&mut self, roll: f64, pitch: f64, yaw: f64, units: AngleUnits) {
        self.rotation = quaternion_from_rpy(
            units.to_radians(roll),
            units.to_radians(pitch),
            units.to_radians(yaw),
        );
    }

    /// Replace the rotation from a raw quaternion
    ///
    /// Zero-length input keeps the current rotation; non-unit input is
    /// normalized before it is stored.
    pub fn apply_quaternion(&mut self, qx: f64, qy: f64, qz: f64, qw: f64) -> QuaternionUpdate {
        let q = Quaternion::new(qw, qx, qy, qz);
        let status = classify(&q);

        match status {
            QuaternionStatus::Degenerate => {}
            QuaternionStatus::Renormalized { .. } => {
                self.rotation = UnitQuaternion::from_quaternion(q);
            }
            QuaternionStatus::Accepted => {
                self.rotation = UnitQuaternion::new_unchecked(q);
            }
        }

        QuaternionUpdate {
            stored: self.rotation,
            status,
        }
    }

    /// Set the unit preference. Returns false when it was already `units`.
    pub fn set_angle_units(&mut self, units: AngleUnits) -> bool {
        if self.angle_units == units {
            return false;
        }
        self.angle_units = units;
        true
    }

    /// Current rotation as (roll, pitch, yaw) in `units`
    pub fn euler_readback(&self, units: AngleUnits) -> (f64, f64, f64) {
        let (roll, pitch, yaw) = rpy_from_quaternion(&self.rotation);
        (
            units.from_radians(roll),
            units.from_radians(pitch),
            units.from_radians(yaw),
        )
    }

    /// Record `stamp` as the publish time and return a copy for broadcasting
    pub fn snapshot(&mut self, stamp: u64) -> TransformStamped {
        self.timestamp = stamp;
        let q = self.rotation.quaternion();

        TransformStamped {
            parent_frame: self.parent_frame.clone(),
            child_frame: self.child_frame.clone(),
            timestamp: stamp,
            translation: [self.translation.x, self.translation.y, self.translation.z],
            rotation: [q.i, q.j, q.k, q.w],
        }
    }
}

fn classify(q: &Quaternion<f64>) -> QuaternionStatus {
    let squared_norm = q.norm_squared();

    if !squared_norm.is_finite() || squared_norm == 0.0 {
        QuaternionStatus::Degenerate
    } else if (squared_norm - 1.0).abs() > f64::EPSILON {
        QuaternionStatus::Renormalized { squared_norm }
    } else {
        QuaternionStatus::Accepted
    }
}
