mod common;

use approx::assert_relative_eq;
use cgmath::{Quaternion, Rad, Rotation3};
use xwing_flow::{clock::FrameClock, input::Key, wings::WingState};

use crate::common::test_utils::{bound_session, run_for, session, small_config, ship_tree};

const OPEN: [f32; 4] = [0.3, -0.3, 0.3, -0.3];

#[test]
fn should_not_stack_repeated_open_requests() {
    let (mut session, _) = bound_session(&small_config());
    assert!(session.open_wings());
    assert!(session.open_wings());
    assert_eq!(session.wing_targets(), Some(OPEN));

    let mut clock = FrameClock::new();
    run_for(&mut session, &mut clock, 1.0);
    assert_eq!(session.wing_targets(), Some(OPEN));
    assert_eq!(session.wing_state(), Some(WingState::Open));
}

#[test]
fn should_close_after_opening() {
    let (mut session, _) = bound_session(&small_config());
    let mut clock = FrameClock::new();
    session.open_wings();
    run_for(&mut session, &mut clock, 1.0);
    session.close_wings();
    run_for(&mut session, &mut clock, 1.0);

    assert_eq!(session.wing_targets(), Some([0.0; 4]));
    assert_eq!(session.wing_state(), Some(WingState::Closed));
}

#[test]
fn should_toggle_closed_when_front_right_reads_open() {
    let (mut session, _) = bound_session(&small_config());
    if let Some(wings) = session.wings.as_mut() {
        wings.front_right.rotation_y = 0.3;
    }
    assert_eq!(session.toggle_wings(), Some(WingState::Closed));
    assert_eq!(session.wing_targets(), Some([0.0; 4]));
}

#[test]
fn should_toggle_with_space() {
    let (mut session, _) = bound_session(&small_config());
    let mut clock = FrameClock::new();
    assert!(session.key_down(Key::Space));
    run_for(&mut session, &mut clock, 1.0);
    assert_eq!(session.wing_state(), Some(WingState::Open));

    assert!(session.key_down(Key::Space));
    run_for(&mut session, &mut clock, 1.0);
    assert_eq!(session.wing_state(), Some(WingState::Closed));
}

#[test]
fn should_retarget_a_running_transition() {
    let (mut session, _) = bound_session(&small_config());
    let mut clock = FrameClock::new();
    session.open_wings();
    run_for(&mut session, &mut clock, 0.2);
    let midway = session.wings.as_ref().map(|wings| wings.front_right.rotation_y);
    assert!(midway.is_some_and(|rotation| rotation > 0.0 && rotation < 0.3));

    session.close_wings();
    run_for(&mut session, &mut clock, 1.0);
    let wings = session.wings.as_ref().unwrap();
    assert_eq!(wings.front_right.rotation_y, 0.0);
    assert_eq!(wings.back_left.rotation_y, 0.0);
}

#[test]
fn should_leave_wings_unbound_when_the_model_is_too_small() {
    let mut session = session(&small_config());
    let mut root = ship_tree();
    root.children.truncate(2);
    session.bind_ship(&mut root, Vec::new());

    assert!(session.wings.is_none());
    assert!(!session.open_wings());
    assert!(!session.key_down(Key::Space));
    assert_eq!(session.wing_state(), None);
}

#[test]
fn should_pose_wing_nodes_around_y() {
    let (mut session, mut root) = bound_session(&small_config());
    let mut clock = FrameClock::new();
    session.open_wings();
    run_for(&mut session, &mut clock, 1.0);
    session.pose_ship(&mut root);

    for (child, angle) in [(1, 0.3f32), (2, 0.3), (3, -0.3), (4, -0.3)] {
        let expected = Quaternion::from_angle_y(Rad(angle));
        let actual = root.children[child].local.rotation;
        assert_relative_eq!(actual.s, expected.s, epsilon = 1e-6);
        assert_relative_eq!(actual.v.y, expected.v.y, epsilon = 1e-6);
        assert_relative_eq!(actual.v.x, 0.0, epsilon = 1e-6);
    }
    assert_eq!(root.children[0].local.rotation, Quaternion::new(1.0, 0.0, 0.0, 0.0));
}
