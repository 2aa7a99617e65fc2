//! Reconfiguration parameters for the transform sender
//!
//! The field set exposed to reconfiguration clients. Values are exchanged as
//! `serde_json::Value` so any front end (console, network, YAML) can drive
//! the same schema.

use crate::angles::AngleUnits;
use crate::error::{TfError, TfResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Every parameter name, in schema order
pub const PARAM_NAMES: [&str; 12] = [
    "x",
    "y",
    "z",
    "roll",
    "pitch",
    "yaw",
    "qx",
    "qy",
    "qz",
    "qw",
    "use_quaternion",
    "angle_units",
];

/// Values of the reconfiguration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSenderConfig {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    pub qw: f64,
    /// One-shot request to apply the quaternion fields
    pub use_quaternion: bool,
    pub angle_units: AngleUnits,
}

impl Default for TransformSenderConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            qx: 0.0,
            qy: 0.0,
            qz: 0.0,
            qw: 1.0,
            use_quaternion: false,
            angle_units: AngleUnits::Radians,
        }
    }
}

impl TransformSenderConfig {
    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<Value> {
        let value = match key {
            "x" => Value::from(self.x),
            "y" => Value::from(self.y),
            "z" => Value::from(self.z),
            "roll" => Value::from(self.roll),
            "pitch" => Value::from(self.pitch),
            "yaw" => Value::from(self.yaw),
            "qx" => Value::from(self.qx),
            "qy" => Value::from(self.qy),
            "qz" => Value::from(self.qz),
            "qw" => Value::from(self.qw),
            "use_quaternion" => Value::from(self.use_quaternion),
            "angle_units" => Value::from(self.angle_units.to_string()),
            _ => return None,
        };
        Some(value)
    }

    /// Set a parameter value, checking name and type
    pub fn set(&mut self, key: &str, value: &Value) -> TfResult<()> {
        match key {
            "x" => self.x = finite(key, value)?,
            "y" => self.y = finite(key, value)?,
            "z" => self.z = finite(key, value)?,
            "roll" => self.roll = finite(key, value)?,
            "pitch" => self.pitch = finite(key, value)?,
            "yaw" => self.yaw = finite(key, value)?,
            "qx" => self.qx = finite(key, value)?,
            "qy" => self.qy = finite(key, value)?,
            "qz" => self.qz = finite(key, value)?,
            "qw" => self.qw = finite(key, value)?,
            "use_quaternion" => {
                self.use_quaternion = value.as_bool().ok_or_else(|| TfError::InvalidParam {
                    name: key.to_string(),
                    reason: format!("expected a boolean, got {}", value),
                })?
            }
            "angle_units" => self.angle_units = units(key, value)?,
            _ => return Err(TfError::UnknownParam(key.to_string())),
        }
        Ok(())
    }

    /// Get all parameters
    pub fn to_params(&self) -> BTreeMap<String, Value> {
        PARAM_NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

fn finite(key: &str, value: &Value) -> TfResult<f64> {
    let number = value.as_f64().ok_or_else(|| TfError::InvalidParam {
        name: key.to_string(),
        reason: format!("expected a number, got {}", value),
    })?;

    if !number.is_finite() {
        return Err(TfError::InvalidParam {
            name: key.to_string(),
            reason: "value must be finite".to_string(),
        });
    }
    Ok(number)
}

fn units(key: &str, value: &Value) -> TfResult<AngleUnits> {
    let parsed = match value {
        Value::String(s) => s.parse::<AngleUnits>().ok(),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(AngleUnits::from_code),
        _ => None,
    };

    parsed.ok_or_else(|| TfError::InvalidParam {
        name: key.to_string(),
        reason: format!("expected radians/degrees or 0/1, got {}", value),
    })
}
