//! Line-based edit console on stdin
//!
//! Each line is one edit: whitespace separated `field=value` pairs, e.g.
//! `angle_units=degrees yaw=90`. `show` prints the current values and
//! `help` lists the fields.

use horus_tf::params::PARAM_NAMES;
use horus_tf::{ReconfigureServer, TransformSenderConfig};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Help,
    Edit(BTreeMap<String, Value>),
    Empty,
}

/// Parse one console line
pub fn parse_line(line: &str) -> Result<Command, String> {
    let line = line.trim();
    match line {
        "" => return Ok(Command::Empty),
        "show" => return Ok(Command::Show),
        "help" | "?" => return Ok(Command::Help),
        _ => {}
    }

    let mut edits = BTreeMap::new();
    for token in line.split_whitespace() {
        let (key, raw) = token
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{}'", token))?;
        if key.is_empty() {
            return Err(format!("missing field name in '{}'", token));
        }
        edits.insert(key.to_string(), parse_value(raw));
    }

    Ok(Command::Edit(edits))
}

fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.parse::<f64>() {
            Ok(number) => Value::from(number),
            Err(_) => Value::from(raw),
        },
    }
}

/// One-line summary of the schema values
pub fn format_config(config: &TransformSenderConfig) -> String {
    format!(
        "x={} y={} z={} roll={} pitch={} yaw={} qx={} qy={} qz={} qw={} use_quaternion={} angle_units={}",
        config.x,
        config.y,
        config.z,
        config.roll,
        config.pitch,
        config.yaw,
        config.qx,
        config.qy,
        config.qz,
        config.qw,
        config.use_quaternion,
        config.angle_units
    )
}

/// Handle one line against the server
pub fn handle_line(server: &ReconfigureServer, line: &str) {
    let edits = match parse_line(line) {
        Ok(Command::Empty) => return,
        Ok(Command::Show) => {
            let bounds = server.bounds();
            info!("{}", format_config(&server.config()));
            info!("roll/pitch/yaw bounds: [{}, {}]", bounds.min, bounds.max);
            return;
        }
        Ok(Command::Help) => {
            info!("Fields: {}", PARAM_NAMES.join(", "));
            info!("Example: angle_units=degrees yaw=90");
            return;
        }
        Ok(Command::Edit(edits)) => edits,
        Err(e) => {
            warn!("Console: {}", e);
            return;
        }
    };

    match server.update(&edits) {
        Ok(report) if report.groups.is_empty() => info!("No change"),
        Ok(report) => {
            let groups: Vec<String> = report.groups.iter().map(|g| g.to_string()).collect();
            info!("Applied {}: {}", groups.join(", "), format_config(&report.config));
        }
        Err(e) => warn!("Edit rejected: {}", e),
    }
}

/// Read edits from stdin on a dedicated thread until stdin closes
pub fn spawn(server: Arc<ReconfigureServer>) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("tf-console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => handle_line(&server, &line),
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            debug!("stdin closed, console edits disabled");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use horus_tf::{AngleUnits, ReconfigureController, TransformState};

    fn server() -> ReconfigureServer {
        let state = TransformState::from_euler(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0, "map", "odom")
            .unwrap()
            .into_shared();
        ReconfigureServer::new(ReconfigureController::new(state))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("  "), Ok(Command::Empty));
        assert_eq!(parse_line("show"), Ok(Command::Show));
        assert_eq!(parse_line("help"), Ok(Command::Help));
    }

    #[test]
    fn test_parse_edit_values() {
        let Ok(Command::Edit(edits)) =
            parse_line("x=-1.5 use_quaternion=true angle_units=degrees qw=1")
        else {
            panic!("expected an edit");
        };

        assert_eq!(edits["x"], Value::from(-1.5));
        assert_eq!(edits["use_quaternion"], Value::Bool(true));
        assert_eq!(edits["angle_units"], Value::from("degrees"));
        assert_eq!(edits["qw"], Value::from(1.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("x 1").is_err());
        assert!(parse_line("=3").is_err());
    }

    #[test]
    fn test_handle_line_applies_edit() {
        let server = server();
        handle_line(&server, "angle_units=degrees yaw=90");

        let config = server.config();
        assert_eq!(config.angle_units, AngleUnits::Degrees);
        assert!((config.yaw - 90.0).abs() < 1e-9);
        assert!((config.qz - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_handle_line_accepts_unit_codes() {
        let server = server();
        handle_line(&server, "angle_units=1");
        assert_eq!(server.angle_units(), AngleUnits::Degrees);
        assert_eq!(server.bounds(), AngleUnits::Degrees.bounds());

        handle_line(&server, "angle_units=0");
        assert_eq!(server.angle_units(), AngleUnits::Radians);
    }

    #[test]
    fn test_handle_line_ignores_bad_edit() {
        let server = server();
        let before = server.config();
        handle_line(&server, "x=2 nonsense=1");
        handle_line(&server, "not an edit");
        assert_eq!(server.config(), before);
    }

    #[test]
    fn test_format_config_mentions_every_field() {
        let text = format_config(&TransformSenderConfig::default());
        for name in PARAM_NAMES {
            assert!(text.contains(&format!("{}=", name)), "missing {}", name);
        }
    }
}
