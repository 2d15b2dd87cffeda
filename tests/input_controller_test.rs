mod common;

use approx::assert_relative_eq;
use xwing_flow::{clock::FrameClock, config::MovementMode, input::Key};

use crate::common::test_utils::{bound_session, config_with_mode, run_for, session};

fn ship_x(session: &xwing_flow::session::SceneSession) -> f32 {
    session.ship.as_ref().map_or(f32::NAN, |ship| ship.transform.position.x)
}

fn ship_roll(session: &xwing_flow::session::SceneSession) -> f32 {
    session.ship.as_ref().map_or(f32::NAN, |ship| ship.transform.rotation[2])
}

#[test]
fn should_bank_and_slide_while_key_is_held() {
    let (mut session, _) = bound_session(&config_with_mode(MovementMode::Bank));
    let mut clock = FrameClock::new();

    assert!(session.key_down(Key::Left));
    run_for(&mut session, &mut clock, 1.0);
    assert_relative_eq!(ship_x(&session), -0.8, epsilon = 1e-6);
    assert_relative_eq!(ship_roll(&session), -0.5, epsilon = 1e-6);

    assert!(session.key_up(Key::Left));
    run_for(&mut session, &mut clock, 1.0);
    assert_relative_eq!(ship_roll(&session), 0.0, epsilon = 1e-6);
    assert_relative_eq!(ship_x(&session), -0.8, epsilon = 1e-6);
}

#[test]
fn should_bank_right_the_other_way() {
    let (mut session, _) = bound_session(&config_with_mode(MovementMode::Bank));
    let mut clock = FrameClock::new();

    session.key_down(Key::Right);
    run_for(&mut session, &mut clock, 1.0);
    assert_relative_eq!(ship_x(&session), 0.8, epsilon = 1e-6);
    assert_relative_eq!(ship_roll(&session), 0.5, epsilon = 1e-6);
}

#[test]
fn should_accumulate_rapid_presses() {
    let (mut session, _) = bound_session(&config_with_mode(MovementMode::Bank));
    let mut clock = FrameClock::new();

    session.key_down(Key::Left);
    session.key_down(Key::Left);
    run_for(&mut session, &mut clock, 1.0);
    assert_relative_eq!(ship_x(&session), -1.6, epsilon = 1e-6);
    assert_relative_eq!(ship_roll(&session), -0.5, epsilon = 1e-6);
}

#[test]
fn should_accumulate_a_press_during_a_running_slide() {
    let (mut session, _) = bound_session(&config_with_mode(MovementMode::Bank));
    let mut clock = FrameClock::new();

    session.key_down(Key::Left);
    run_for(&mut session, &mut clock, 0.1);
    session.key_down(Key::Left);
    run_for(&mut session, &mut clock, 1.0);
    assert_relative_eq!(ship_x(&session), -1.6, epsilon = 1e-6);
}

#[test]
fn should_nudge_immediately_in_step_mode() {
    let (mut session, _) = bound_session(&config_with_mode(MovementMode::Step));

    assert!(session.key_down(Key::Left));
    assert_relative_eq!(ship_x(&session), -0.8, epsilon = 1e-6);
    assert!(session.key_down(Key::Right));
    assert!(session.key_down(Key::Right));
    assert_relative_eq!(ship_x(&session), 0.8, epsilon = 1e-6);

    assert!(!session.key_up(Key::Right));
    assert!(session.tweens.is_empty());
}

#[test]
fn should_ignore_keys_before_the_ship_is_bound() {
    let mut session = session(&config_with_mode(MovementMode::Bank));

    assert!(!session.key_down(Key::Left));
    assert!(!session.key_down(Key::Space));
    assert!(!session.key_up(Key::Left));
    assert!(session.tweens.is_empty());
    assert!(session.ship.is_none());
}

#[test]
fn should_ignore_unmapped_keys() {
    let (mut session, _) = bound_session(&config_with_mode(MovementMode::Bank));

    assert!(!session.key_down(Key::Other(65)));
    assert!(!session.key_up(Key::Space));
    assert!(session.tweens.is_empty());
}
