//! Publisher settings
//!
//! Loaded from an optional YAML file; command line flags take precedence.

use crate::cli::Args;
use anyhow::Context;
use horus_tf::AngleUnits;
use serde::Deserialize;
use std::path::Path;

/// Destination for published transforms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Log each transform through tracing
    #[default]
    Log,
    /// One JSON object per line on stdout
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Units for roll/pitch/yaw at startup
    pub angle_units: AngleUnits,
    pub output: OutputKind,
    /// Read `field=value` edits from stdin
    pub console: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            angle_units: AngleUnits::Radians,
            output: OutputKind::Log,
            console: true,
        }
    }
}

impl PublisherConfig {
    /// Load settings from a YAML file
    pub fn load_from_disk(path: &Path) -> anyhow::Result<Self> {
        let yaml_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&yaml_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// File settings (if any) overridden by command line flags
    pub fn resolve(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_disk(path)?,
            None => Self::default(),
        };

        if let Some(units) = args.angle_units {
            config.angle_units = units;
        }
        if let Some(output) = args.output {
            config.output = output;
        }
        if args.no_console {
            config.console = false;
        }

        Ok(config)
    }
}
