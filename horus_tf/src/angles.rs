//! Angle units and Euler <-> quaternion conversion
//!
//! Every code path that turns roll/pitch/yaw into a rotation (or back) goes
//! through [`quaternion_from_rpy`] and [`rpy_from_quaternion`]. The rotation is
//! composed as `R = Rz(yaw) * Ry(pitch) * Rx(roll)`: roll about the fixed X
//! axis first, then pitch about fixed Y, then yaw about fixed Z. This is the
//! same convention as ROS `setRPY`/`getRPY`.

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Unit in which Euler angles are exchanged with the reconfiguration channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnits {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnits {
    /// Integer code used by reconfiguration clients (0 = radians, 1 = degrees)
    pub fn code(self) -> i64 {
        match self {
            AngleUnits::Radians => 0,
            AngleUnits::Degrees => 1,
        }
    }

    /// Inverse of [`AngleUnits::code`]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(AngleUnits::Radians),
            1 => Some(AngleUnits::Degrees),
            _ => None,
        }
    }

    /// Roll/pitch/yaw limits expressed in this unit
    pub fn bounds(self) -> AngleBounds {
        match self {
            AngleUnits::Radians => AngleBounds { min: -PI, max: PI },
            AngleUnits::Degrees => AngleBounds {
                min: -180.0,
                max: 180.0,
            },
        }
    }

    /// Convert an angle expressed in this unit to radians
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnits::Radians => value,
            AngleUnits::Degrees => to_radians(value),
        }
    }

    /// Convert an angle in radians to this unit
    pub fn from_radians(self, value: f64) -> f64 {
        match self {
            AngleUnits::Radians => value,
            AngleUnits::Degrees => to_degrees(value),
        }
    }
}

impl fmt::Display for AngleUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleUnits::Radians => write!(f, "radians"),
            AngleUnits::Degrees => write!(f, "degrees"),
        }
    }
}

impl FromStr for AngleUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "radians" | "rad" | "0" => Ok(AngleUnits::Radians),
            "degrees" | "deg" | "1" => Ok(AngleUnits::Degrees),
            other => Err(format!(
                "unknown angle units '{}' (expected radians or degrees)",
                other
            )),
        }
    }
}

/// Closed interval accepted for roll, pitch and yaw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleBounds {
    pub min: f64,
    pub max: f64,
}

impl AngleBounds {
    /// Clamp a value into the interval
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Radians to degrees
pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Degrees to radians
pub fn to_radians(degrees: f64) -> f64 {
    degrees / 180.0 * PI
}

/// Build a rotation from roll, pitch and yaw in radians
pub fn quaternion_from_rpy(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(roll, pitch, yaw)
}

/// Extract (roll, pitch, yaw) in radians; inverse of [`quaternion_from_rpy`]
pub fn rpy_from_quaternion(rotation: &UnitQuaternion<f64>) -> (f64, f64, f64) {
    rotation.euler_angles()
}
