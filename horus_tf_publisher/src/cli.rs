//! Command line arguments

use crate::config::OutputKind;
use clap::Parser;
use horus_tf::{AngleUnits, TfError, TfResult, TransformState};
use std::path::PathBuf;
use std::time::Duration;

const AFTER_HELP: &str = "\
Usage: horus_tf_publisher x y z yaw pitch roll frame_id child_frame_id period_ms
OR
Usage: horus_tf_publisher x y z qx qy qz qw frame_id child_frame_id period_ms

This transform is the transform of the coordinate frame from frame_id into the
coordinate frame of the child_frame_id. Angles are in radians.";

#[derive(Parser, Debug)]
#[command(name = "horus_tf_publisher")]
#[command(about = "A command line utility for manually sending a transform. It will periodically republish the given transform.", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Args {
    /// Transform, frames and period (9 values for yaw/pitch/roll, 10 for a quaternion)
    #[arg(num_args = 9..=10, required = true, allow_negative_numbers = true, value_name = "VALUES")]
    pub values: Vec<String>,

    /// YAML file with publisher settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Units used for roll/pitch/yaw when editing
    #[arg(long)]
    pub angle_units: Option<AngleUnits>,

    /// Where published transforms go
    #[arg(long, value_enum)]
    pub output: Option<OutputKind>,

    /// Do not read edits from stdin
    #[arg(long)]
    pub no_console: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Rotation as given on the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationArgs {
    Euler { yaw: f64, pitch: f64, roll: f64 },
    Quaternion { qx: f64, qy: f64, qz: f64, qw: f64 },
}

/// Positional arguments after validation
#[derive(Debug, Clone, PartialEq)]
pub struct TransformArgs {
    pub translation: [f64; 3],
    pub rotation: RotationArgs,
    pub frame_id: String,
    pub child_frame_id: String,
    pub period: Duration,
}

impl TransformArgs {
    pub fn parse(values: &[String]) -> TfResult<Self> {
        let (numbers, rest) = match values.len() {
            9 => values.split_at(6),
            10 => values.split_at(7),
            n => {
                return Err(TfError::InvalidArgument {
                    name: "arguments".to_string(),
                    value: format!("{} values (expected 9 or 10)", n),
                })
            }
        };

        const NAMES: [&str; 7] = ["x", "y", "z", "qx/yaw", "qy/pitch", "qz/roll", "qw"];
        let numbers = numbers
            .iter()
            .zip(NAMES)
            .map(|(value, name)| number(name, value))
            .collect::<TfResult<Vec<f64>>>()?;

        let frame_id = rest[0].clone();
        let child_frame_id = rest[1].clone();
        if frame_id == child_frame_id {
            return Err(TfError::SameFrame(frame_id));
        }

        let period_ms = number("period", &rest[2])?;
        if period_ms <= 0.0 {
            return Err(TfError::InvalidPeriod(period_ms));
        }

        let period = Duration::try_from_secs_f64(period_ms / 1000.0)
            .ok()
            .filter(|period| !period.is_zero())
            .ok_or(TfError::InvalidPeriod(period_ms))?;

        let rotation = match numbers[3..] {
            [yaw, pitch, roll] => RotationArgs::Euler { yaw, pitch, roll },
            [qx, qy, qz, qw] => RotationArgs::Quaternion { qx, qy, qz, qw },
            _ => {
                return Err(TfError::InvalidArgument {
                    name: "rotation".to_string(),
                    value: format!("{:?}", &numbers[3..]),
                })
            }
        };

        Ok(Self {
            translation: [numbers[0], numbers[1], numbers[2]],
            rotation,
            frame_id,
            child_frame_id,
            period,
        })
    }

    /// Build the initial transform, stamped one period from time zero
    pub fn into_state(self) -> TfResult<TransformState> {
        let [x, y, z] = self.translation;
        let stamp = self.period.as_nanos() as u64;

        match self.rotation {
            RotationArgs::Euler { yaw, pitch, roll } => TransformState::from_euler(
                x,
                y,
                z,
                roll,
                pitch,
                yaw,
                stamp,
                self.frame_id,
                self.child_frame_id,
            ),
            RotationArgs::Quaternion { qx, qy, qz, qw } => TransformState::from_quaternion(
                x,
                y,
                z,
                qx,
                qy,
                qz,
                qw,
                stamp,
                self.frame_id,
                self.child_frame_id,
            ),
        }
    }
}

fn number(name: &str, value: &str) -> TfResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TfError::InvalidArgument {
            name: name.to_string(),
            value: value.to_string(),
        })
}
