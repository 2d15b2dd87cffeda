mod common;

use approx::assert_relative_eq;
use cgmath::Vector3;
use xwing_flow::{
    clock::FrameClock,
    debug::{Axis, Param},
    resources::animation::{Clip, Interpolation, Keyframes, Track},
    session::SceneSession,
    wings::WingState,
};

use crate::common::test_utils::{bound_session, run_for, session, ship_tree, small_config};

fn slide_clip(name: &str) -> Clip {
    Clip {
        name: name.to_string(),
        tracks: vec![Track {
            node: 1,
            timestamps: vec![0.0, 2.0],
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 2.0, 0.0),
            ]),
            interpolation: Interpolation::Linear,
        }],
    }
}

fn session_with_clips() -> SceneSession {
    let mut session = session(&small_config());
    let mut root = ship_tree();
    session.bind_ship(&mut root, vec![slide_clip("Idle"), slide_clip("Fly")]);
    session
}

#[test]
fn should_clamp_and_store_light_values() {
    let mut session = session(&small_config());

    assert_eq!(session.debug_set("lightIntensity", 20.0).unwrap(), 10.0);
    assert_eq!(session.lights.directional[0].intensity, 10.0);

    let stored = session.debug_set("lightY2", 3.25).unwrap();
    assert_relative_eq!(stored, 3.25, epsilon = 1e-4);
    assert_relative_eq!(session.lights.directional[1].position.y, stored, epsilon = 1e-6);

    session.debug_set("ambientIntensity", -1.0).unwrap();
    assert_eq!(session.param(Param::AmbientIntensity), Some(0.0));
}

#[test]
fn should_reject_unknown_controls() {
    let mut session = session(&small_config());

    assert!(session.debug_set("warpSpeed", 1.0).is_err());
    assert!(session.debug_press("SelfDestruct").is_err());
}

#[test]
fn should_offer_ship_rotation_only_after_binding() {
    let mut unbound = session(&small_config());
    assert!(unbound.debug_set("rotate x", 1.0).is_err());
    assert!(unbound.set_param(Param::ShipRotation(Axis::X), 1.0).is_err());

    let (mut session, _) = bound_session(&small_config());
    assert_eq!(session.debug_set("rotate z", 25.0).unwrap(), 20.0);
    assert_eq!(session.param(Param::ShipRotation(Axis::Z)), Some(20.0));
}

#[test]
fn should_open_and_close_wings_from_buttons() {
    let (mut session, _) = bound_session(&small_config());
    let mut clock = FrameClock::new();

    session.debug_press("OpenWings").unwrap();
    run_for(&mut session, &mut clock, 1.0);
    assert_eq!(session.wing_state(), Some(WingState::Open));

    session.debug_press("CloseWings").unwrap();
    run_for(&mut session, &mut clock, 1.0);
    assert_eq!(session.wing_state(), Some(WingState::Closed));
}

#[test]
fn should_ignore_wing_buttons_before_binding() {
    let mut session = session(&small_config());

    assert!(session.debug_press("OpenWings").is_ok());
    assert!(session.tweens.is_empty());
}

#[test]
fn should_toggle_the_bound_clip() {
    let mut session = session_with_clips();
    let mut clock = FrameClock::new();
    let playing = |session: &SceneSession| {
        session
            .mixer
            .as_ref()
            .is_some_and(|mixer| !mixer.sample().is_empty())
    };
    assert!(!playing(&session));

    session.debug_press("PlayClip").unwrap();
    run_for(&mut session, &mut clock, 0.5);
    assert!(playing(&session));

    session.debug_press("PlayClip").unwrap();
    assert!(!playing(&session));
}

#[test]
fn should_fail_play_clip_without_a_clip() {
    let (mut session, _) = bound_session(&small_config());

    assert!(session.debug_press("PlayClip").is_err());
}

#[test]
fn should_pose_animated_nodes() {
    let mut config = small_config();
    config.model.clip_index = 0;
    let mut session = session(&config);
    let mut root = ship_tree();
    session.bind_ship(&mut root, vec![slide_clip("Idle")]);
    let mut clock = FrameClock::new();

    session.debug_press("PlayClip").unwrap();
    run_for(&mut session, &mut clock, 1.0);
    session.pose_ship(&mut root);

    let y = root.children[1].local.position.y;
    assert!(y > 0.5 && y < 1.5, "wing moved to {y}");
    assert_eq!(root.children[0].local.position.y, 0.0);
}
