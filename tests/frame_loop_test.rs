mod common;

use approx::assert_relative_eq;
use cgmath::MetricSpace;
use xwing_flow::{clock::FrameClock, input::Key, session::AssetStatus};

use crate::common::test_utils::{bound_session, run_for, session, small_config};

#[test]
fn should_tick_without_a_ship() {
    let mut session = session(&small_config());
    let mut clock = FrameClock::new();
    let before = session.particles.positions().to_vec();

    run_for(&mut session, &mut clock, 0.5);

    assert_eq!(session.status(), &AssetStatus::Loading);
    assert!(session.ship.is_none());
    assert_ne!(session.particles.positions(), before.as_slice());
    assert!(session.particles.rotation_z() > 0.0);
}

#[test]
fn should_keep_running_after_a_failed_load() {
    let mut session = session(&small_config());
    let mut clock = FrameClock::new();
    session.fail_ship("missing file");

    assert!(matches!(session.status(), AssetStatus::Failed(reason) if reason == "missing file"));
    assert!(!session.key_down(Key::Space));
    run_for(&mut session, &mut clock, 0.5);
    assert!(session.ship.is_none());
}

#[test]
fn should_bob_the_ship() {
    let (mut session, _) = bound_session(&small_config());
    let mut clock = FrameClock::new();
    assert_eq!(session.status(), &AssetStatus::Ready);

    for seconds in [0.25, 0.5, 1.0] {
        let time = run_for(&mut session, &mut clock, seconds);
        let y = session.ship.as_ref().map(|ship| ship.transform.position.y);
        assert_relative_eq!(y.unwrap(), (time.elapsed * 2.0).sin() * 0.1, epsilon = 1e-6);
    }
}

#[test]
fn should_place_the_model_root_from_the_ship_transform() {
    let (mut session, mut root) = bound_session(&small_config());
    let mut clock = FrameClock::new();
    let time = run_for(&mut session, &mut clock, 0.3);
    session.pose_ship(&mut root);

    assert_relative_eq!(root.local.position.y, (time.elapsed * 2.0).sin() * 0.1, epsilon = 1e-6);
    assert_relative_eq!(root.local.scale.x, 0.5, epsilon = 1e-6);
    assert_relative_eq!(root.world.position.y, root.local.position.y, epsilon = 1e-6);
}

#[test]
fn should_glide_and_settle_after_a_drag() {
    let mut session = session(&small_config());
    let mut clock = FrameClock::new();
    let start = session.camera.position;
    let distance = session.controls.distance();

    session.controls.rotate_by_pixels(120.0, 0.0, 600.0);
    run_for(&mut session, &mut clock, 0.1);
    let early = session.camera.position;
    assert!(!session.controls.is_settled());
    assert!(early.distance(start) > 0.0);

    run_for(&mut session, &mut clock, 10.0);
    assert!(session.controls.is_settled());
    assert!(session.camera.position.distance(early) > 0.0);
    assert_relative_eq!(session.controls.distance(), distance, epsilon = 1e-4);
    assert_eq!(session.camera.target, session.controls.target);
}

#[test]
fn should_ignore_zoom() {
    let mut session = session(&small_config());
    let distance = session.controls.distance();

    assert!(!session.controls.zoom(0.5));
    assert_eq!(session.controls.distance(), distance);
}
