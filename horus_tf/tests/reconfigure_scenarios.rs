//! End-to-end reconfiguration scenarios
//!
//! Drives the server the way a reconfiguration client would and checks the
//! write-back against the transform that gets published.

use approx::assert_relative_eq;
use horus_tf::{
    AngleUnits, ChangeGroup, ChannelBroadcaster, QuaternionStatus, ReconfigureController,
    ReconfigureServer, SharedTransformState, TransformSender, TransformState,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::time::Duration;

fn edit(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn setup(state: TransformState) -> (SharedTransformState, ReconfigureServer) {
    let shared = state.into_shared();
    let server = ReconfigureServer::new(ReconfigureController::new(shared.clone()));
    (shared, server)
}

#[test]
fn test_yaw_90_degrees_from_cli_form() {
    // Command line order is yaw, pitch, roll
    let (yaw, pitch, roll) = (90.0_f64.to_radians(), 0.0, 0.0);
    let state =
        TransformState::from_euler(0.0, 0.0, 0.0, roll, pitch, yaw, 0, "map", "base_link").unwrap();
    let q = state.rotation();

    assert_relative_eq!(q.i, 0.0, epsilon = 1e-12);
    assert_relative_eq!(q.j, 0.0, epsilon = 1e-12);
    assert_relative_eq!(q.k, FRAC_1_SQRT_2, epsilon = 1e-12);
    assert_relative_eq!(q.w, FRAC_1_SQRT_2, epsilon = 1e-12);
}

#[test]
fn test_zero_quaternion_is_rejected() {
    let (shared, server) = setup(
        TransformState::from_euler(0.0, 0.0, 0.0, 0.2, 0.1, -0.3, 0, "map", "base_link").unwrap(),
    );
    let before = shared.lock().rotation();
    let before_config = server.config();

    let report = server
        .update(&edit(&[
            ("qx", Value::from(0.0)),
            ("qy", Value::from(0.0)),
            ("qz", Value::from(0.0)),
            ("qw", Value::from(0.0)),
            ("use_quaternion", Value::from(true)),
        ]))
        .unwrap();

    assert_eq!(report.groups, vec![ChangeGroup::Quaternion]);
    assert_eq!(report.quaternion, Some(QuaternionStatus::Degenerate));
    assert_eq!(shared.lock().rotation(), before);
    assert!(!report.config.use_quaternion);

    // Prior quaternion and angles are written back
    assert_eq!(report.config.qx, before_config.qx);
    assert_eq!(report.config.qy, before_config.qy);
    assert_eq!(report.config.qz, before_config.qz);
    assert_eq!(report.config.qw, before_config.qw);
    assert_relative_eq!(report.config.roll, 0.2, epsilon = 1e-9);
    assert_relative_eq!(report.config.yaw, -0.3, epsilon = 1e-9);
}

#[test]
fn test_non_unit_quaternion_is_normalized() {
    let (shared, server) = setup(
        TransformState::from_euler(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0, "map", "base_link").unwrap(),
    );

    let report = server
        .update(&edit(&[
            ("qx", Value::from(2.0)),
            ("qy", Value::from(0.0)),
            ("qz", Value::from(0.0)),
            ("qw", Value::from(0.0)),
            ("use_quaternion", Value::from(true)),
        ]))
        .unwrap();

    assert_eq!(
        report.quaternion,
        Some(QuaternionStatus::Renormalized { squared_norm: 4.0 })
    );
    assert_eq!(
        (report.config.qx, report.config.qy, report.config.qz, report.config.qw),
        (1.0, 0.0, 0.0, 0.0)
    );
    assert!(!report.config.use_quaternion);

    let q = shared.lock().rotation();
    assert_eq!((q.i, q.j, q.k, q.w), (1.0, 0.0, 0.0, 0.0));

    // 180 degrees about X
    assert_relative_eq!(report.config.roll.abs(), PI, epsilon = 1e-9);
    assert_relative_eq!(report.config.pitch, 0.0, epsilon = 1e-9);
    assert_relative_eq!(report.config.yaw, 0.0, epsilon = 1e-9);
}

#[test]
fn test_sequential_translation_edits() {
    let (shared, server) = setup(
        TransformState::from_euler(0.0, 0.0, 0.0, 0.5, -0.5, 1.0, 0, "map", "base_link").unwrap(),
    );
    let rotation = shared.lock().rotation();

    let first = server
        .update(&edit(&[
            ("x", Value::from(1.0)),
            ("y", Value::from(2.0)),
            ("z", Value::from(3.0)),
        ]))
        .unwrap();
    assert_eq!(first.groups, vec![ChangeGroup::Translation]);
    assert_eq!(shared.lock().rotation(), rotation);

    server
        .update(&edit(&[
            ("x", Value::from(4.0)),
            ("y", Value::from(5.0)),
            ("z", Value::from(6.0)),
        ]))
        .unwrap();

    let state = shared.lock();
    assert_eq!(state.rotation(), rotation);
    assert_eq!(
        (state.translation().x, state.translation().y, state.translation().z),
        (4.0, 5.0, 6.0)
    );
}

#[test]
fn test_unit_switch_and_back() {
    let (_, server) = setup(
        TransformState::from_euler(0.0, 0.0, 0.0, 0.25, -0.5, 2.0, 0, "map", "base_link").unwrap(),
    );
    let radians = server.config();
    assert_eq!(server.bounds(), AngleUnits::Radians.bounds());

    let degrees = server
        .update(&edit(&[("angle_units", Value::from("degrees"))]))
        .unwrap();
    assert_eq!(degrees.bounds.min, -180.0);
    assert_eq!(degrees.bounds.max, 180.0);
    assert_eq!(degrees.config.angle_units, AngleUnits::Degrees);
    assert_relative_eq!(degrees.config.roll, 0.25_f64.to_degrees(), epsilon = 1e-9);
    assert_relative_eq!(degrees.config.pitch, (-0.5_f64).to_degrees(), epsilon = 1e-9);
    assert_relative_eq!(degrees.config.yaw, 2.0_f64.to_degrees(), epsilon = 1e-9);

    // Quaternion fields are not touched by a unit switch
    assert_eq!(degrees.config.qx, radians.qx);
    assert_eq!(degrees.config.qw, radians.qw);

    let back = server
        .update(&edit(&[("angle_units", Value::from(0))]))
        .unwrap();
    assert_eq!(back.bounds, AngleUnits::Radians.bounds());
    assert_relative_eq!(back.config.roll, radians.roll, epsilon = 1e-9);
    assert_relative_eq!(back.config.pitch, radians.pitch, epsilon = 1e-9);
    assert_relative_eq!(back.config.yaw, radians.yaw, epsilon = 1e-9);
}

#[test]
fn test_euler_edit_in_degrees_is_published() {
    let (shared, server) = setup(
        TransformState::from_euler(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0, "map", "base_link").unwrap(),
    );
    let broadcaster = ChannelBroadcaster::default();
    let mut rx = broadcaster.subscribe();
    let sender = TransformSender::new(shared, broadcaster, Duration::from_millis(100)).unwrap();

    server
        .update(&edit(&[("angle_units", Value::from("degrees"))]))
        .unwrap();
    let report = server.update(&edit(&[("yaw", Value::from(90.0))])).unwrap();
    assert_relative_eq!(report.config.qz, FRAC_1_SQRT_2, epsilon = 1e-12);
    assert_relative_eq!(report.config.qw, FRAC_1_SQRT_2, epsilon = 1e-12);

    sender.send_once();
    let published = rx.try_recv().unwrap();
    assert_eq!(published.translation, [1.0, 0.0, 0.0]);
    assert_relative_eq!(published.rotation[2], FRAC_1_SQRT_2, epsilon = 1e-12);
    assert_relative_eq!(published.rotation[3], FRAC_1_SQRT_2, epsilon = 1e-12);
}

#[test]
fn test_concurrent_edits_and_publishing() {
    let (shared, server) = setup(
        TransformState::from_euler(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0, "map", "base_link").unwrap(),
    );
    let server = std::sync::Arc::new(server);
    let sender =
        TransformSender::new(shared, ChannelBroadcaster::default(), Duration::from_millis(1))
            .unwrap();

    let editor = {
        let server = server.clone();
        std::thread::spawn(move || {
            for i in 0..200 {
                let yaw = (i as f64 / 200.0) * PI - PI / 2.0;
                server.update(&edit(&[("yaw", Value::from(yaw))])).unwrap();
            }
        })
    };

    for _ in 0..200 {
        let sent = sender.send_once();
        let norm: f64 = sent.rotation.iter().map(|c| c * c).sum();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-9);
    }

    editor.join().unwrap();
}
