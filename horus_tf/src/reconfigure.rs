//! Runtime reconfiguration of the published transform
//!
//! [`ReconfigureController`] turns one `(ChangeGroup, values)` edit into
//! [`TransformState`](crate::TransformState) updates and returns the values the
//! schema must show afterwards. [`ReconfigureServer`] owns the schema (values
//! and Euler bounds), validates raw edits and feeds them to the controller.

use crate::angles::{AngleBounds, AngleUnits};
use crate::error::TfResult;
use crate::params::TransformSenderConfig;
use crate::state::{QuaternionStatus, SharedTransformState};
use nalgebra::UnitQuaternion;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Which field group an edit touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeGroup {
    /// Full resynchronization, sent once at startup
    All,
    Translation,
    Euler,
    Quaternion,
    Units,
}

impl ChangeGroup {
    /// Order in which groups of a multi-group edit are dispatched
    pub const DISPATCH_ORDER: [ChangeGroup; 4] = [
        ChangeGroup::Units,
        ChangeGroup::Translation,
        ChangeGroup::Euler,
        ChangeGroup::Quaternion,
    ];

    /// Group a schema field belongs to
    pub fn for_field(name: &str) -> Option<ChangeGroup> {
        match name {
            "x" | "y" | "z" => Some(ChangeGroup::Translation),
            "roll" | "pitch" | "yaw" => Some(ChangeGroup::Euler),
            "qx" | "qy" | "qz" | "qw" | "use_quaternion" => Some(ChangeGroup::Quaternion),
            "angle_units" => Some(ChangeGroup::Units),
            _ => None,
        }
    }

    /// Whether any field of this group differs between two configs
    fn differs(self, a: &TransformSenderConfig, b: &TransformSenderConfig) -> bool {
        match self {
            ChangeGroup::All => a != b,
            ChangeGroup::Translation => (a.x, a.y, a.z) != (b.x, b.y, b.z),
            ChangeGroup::Euler => (a.roll, a.pitch, a.yaw) != (b.roll, b.pitch, b.yaw),
            ChangeGroup::Quaternion => {
                (a.qx, a.qy, a.qz, a.qw, a.use_quaternion)
                    != (b.qx, b.qy, b.qz, b.qw, b.use_quaternion)
            }
            ChangeGroup::Units => a.angle_units != b.angle_units,
        }
    }
}

impl fmt::Display for ChangeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeGroup::All => "all",
            ChangeGroup::Translation => "translation",
            ChangeGroup::Euler => "euler",
            ChangeGroup::Quaternion => "quaternion",
            ChangeGroup::Units => "angle_units",
        };
        write!(f, "{}", name)
    }
}

/// What the controller accepted for one edit
#[derive(Debug, Clone, PartialEq)]
pub struct ReconfigureOutcome {
    /// Values the schema must hold after the edit
    pub config: TransformSenderConfig,
    /// New roll/pitch/yaw limits, when they changed
    pub bounds: Option<AngleBounds>,
    /// Set for quaternion edits
    pub quaternion: Option<QuaternionStatus>,
}

/// Applies edit events to the shared transform state
#[derive(Debug, Clone)]
pub struct ReconfigureController {
    state: SharedTransformState,
}

impl ReconfigureController {
    pub fn new(state: SharedTransformState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SharedTransformState {
        &self.state
    }

    /// Apply one edit and return the write-back for the schema
    pub fn apply(&self, group: ChangeGroup, config: &TransformSenderConfig) -> ReconfigureOutcome {
        let mut accepted = config.clone();
        let mut bounds = None;
        let mut quaternion = None;
        let mut units_changed = None;

        {
            let mut state = self.state.lock();
            let units = state.angle_units();

            match group {
                ChangeGroup::All => {
                    let t = state.translation();
                    accepted.x = t.x;
                    accepted.y = t.y;
                    accepted.z = t.z;
                    write_rpy(&mut accepted, state.euler_readback(units));
                    write_quaternion(&mut accepted, &state.rotation());
                    accepted.use_quaternion = false;
                    accepted.angle_units = units;
                    bounds = Some(units.bounds());
                }
                ChangeGroup::Translation => {
                    state.apply_translation(config.x, config.y, config.z);
                }
                ChangeGroup::Euler => {
                    state.apply_euler(config.roll, config.pitch, config.yaw, units);
                    write_quaternion(&mut accepted, &state.rotation());
                }
                ChangeGroup::Quaternion => {
                    let update = state.apply_quaternion(config.qx, config.qy, config.qz, config.qw);
                    write_quaternion(&mut accepted, &update.stored);
                    write_rpy(&mut accepted, state.euler_readback(units));
                    accepted.use_quaternion = false;
                    quaternion = Some(update.status);
                }
                ChangeGroup::Units => {
                    if state.set_angle_units(config.angle_units) {
                        let units = state.angle_units();
                        write_rpy(&mut accepted, state.euler_readback(units));
                        bounds = Some(units.bounds());
                        units_changed = Some(units);
                    }
                    accepted.angle_units = state.angle_units();
                }
            }
        }

        debug!("Reconfigure: applied {} edit", group);

        match quaternion {
            Some(QuaternionStatus::Degenerate) => {
                warn!("Reconfigure: quaternion length cannot be 0.0. Using previous value");
            }
            Some(QuaternionStatus::Renormalized { squared_norm }) => {
                warn!(
                    "Reconfigure: quaternion is not normalized (length^2 = {}). Normalizing.",
                    squared_norm
                );
            }
            _ => {}
        }

        if let Some(units) = units_changed {
            info!("Reconfigure: angle units set to {}", units);
        }

        ReconfigureOutcome {
            config: accepted,
            bounds,
            quaternion,
        }
    }
}

fn write_rpy(config: &mut TransformSenderConfig, (roll, pitch, yaw): (f64, f64, f64)) {
    config.roll = roll;
    config.pitch = pitch;
    config.yaw = yaw;
}

fn write_quaternion(config: &mut TransformSenderConfig, rotation: &UnitQuaternion<f64>) {
    let q = rotation.quaternion();
    config.qx = q.i;
    config.qy = q.j;
    config.qz = q.k;
    config.qw = q.w;
}

/// Result of one [`ReconfigureServer::update`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReconfigureReport {
    /// Schema values after the edit
    pub config: TransformSenderConfig,
    /// Current roll/pitch/yaw limits
    pub bounds: AngleBounds,
    /// Groups dispatched, in order. Empty when nothing changed.
    pub groups: Vec<ChangeGroup>,
    pub quaternion: Option<QuaternionStatus>,
}

#[derive(Debug)]
struct Schema {
    config: TransformSenderConfig,
    bounds: AngleBounds,
}

/// Reconfiguration schema holding the field values and Euler bounds
#[derive(Debug)]
pub struct ReconfigureServer {
    controller: ReconfigureController,
    schema: Mutex<Schema>,
}

impl ReconfigureServer {
    /// Create the server and populate every field from the current transform
    pub fn new(controller: ReconfigureController) -> Self {
        let outcome = controller.apply(ChangeGroup::All, &TransformSenderConfig::default());
        let bounds = outcome
            .bounds
            .unwrap_or_else(|| outcome.config.angle_units.bounds());

        Self {
            controller,
            schema: Mutex::new(Schema {
                config: outcome.config,
                bounds,
            }),
        }
    }

    /// Current field values
    pub fn config(&self) -> TransformSenderConfig {
        self.schema.lock().config.clone()
    }

    /// Current roll/pitch/yaw limits
    pub fn bounds(&self) -> AngleBounds {
        self.schema.lock().bounds
    }

    /// Get a single field value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.schema.lock().config.get(key)
    }

    /// All field values keyed by name
    pub fn params(&self) -> BTreeMap<String, Value> {
        self.schema.lock().config.to_params()
    }

    /// Apply an edit given as field name -> value
    ///
    /// The edit is validated as a whole first; if any field is unknown or has
    /// a bad value nothing is applied. Changed groups are dispatched in
    /// [`ChangeGroup::DISPATCH_ORDER`].
    pub fn update(&self, edits: &BTreeMap<String, Value>) -> TfResult<ReconfigureReport> {
        let mut schema = self.schema.lock();

        let mut requested = schema.config.clone();
        for (key, value) in edits {
            requested.set(key, value)?;
        }

        let groups: Vec<ChangeGroup> = ChangeGroup::DISPATCH_ORDER
            .into_iter()
            .filter(|group| group.differs(&schema.config, &requested))
            .collect();

        let mut config = schema.config.clone();
        let mut bounds = schema.bounds;
        let mut quaternion = None;

        for &group in &groups {
            // Only fields named in the edit; earlier groups may have written back the rest
            for (key, value) in edits {
                if ChangeGroup::for_field(key) == Some(group) {
                    config.set(key, value)?;
                }
            }

            if group == ChangeGroup::Euler {
                config.roll = bounds.clamp(config.roll);
                config.pitch = bounds.clamp(config.pitch);
                config.yaw = bounds.clamp(config.yaw);
            }

            let outcome = self.controller.apply(group, &config);
            config = outcome.config;
            if let Some(new_bounds) = outcome.bounds {
                bounds = new_bounds;
            }
            if outcome.quaternion.is_some() {
                quaternion = outcome.quaternion;
            }
        }

        schema.config = config.clone();
        schema.bounds = bounds;

        Ok(ReconfigureReport {
            config,
            bounds,
            groups,
            quaternion,
        })
    }

    /// Units currently used for roll/pitch/yaw fields
    pub fn angle_units(&self) -> AngleUnits {
        self.schema.lock().config.angle_units
    }
}
