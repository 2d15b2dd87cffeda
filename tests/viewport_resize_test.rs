mod common;

use approx::assert_relative_eq;
use xwing_flow::viewport::{MAX_PIXEL_RATIO, SurfaceSize, Viewport};

use crate::common::test_utils::{session, small_config};

#[test]
fn should_follow_a_wider_window() {
    let mut viewport = Viewport::new(800, 600, 1.0);
    let size = viewport.resize(1200, 600, 1.0);

    assert_eq!(size, SurfaceSize { width: 1200, height: 600 });
    assert_relative_eq!(viewport.aspect(), 2.0, epsilon = 1e-6);
}

#[test]
fn should_cap_the_pixel_ratio() {
    let mut viewport = Viewport::new(800, 600, 3.0);
    assert_eq!(viewport.pixel_ratio(), MAX_PIXEL_RATIO);
    assert_eq!(viewport.surface_size(), SurfaceSize { width: 1600, height: 1200 });

    viewport.resize(800, 600, 1.5);
    assert_eq!(viewport.surface_size(), SurfaceSize { width: 1200, height: 900 });
}

#[test]
fn should_keep_size_when_minimized() {
    let mut viewport = Viewport::new(800, 600, 1.0);
    let size = viewport.resize(0, 0, 1.0);

    assert_eq!(size, SurfaceSize { width: 800, height: 600 });
    assert_eq!(viewport.width(), 800);
}

#[test]
fn should_convert_physical_window_sizes() {
    let viewport = Viewport::from_physical(1600, 1200, 2.0);

    assert_eq!(viewport.width(), 800);
    assert_eq!(viewport.height(), 600);
    assert_eq!(viewport.surface_size(), SurfaceSize { width: 1600, height: 1200 });
}

#[test]
fn should_update_camera_aspect_on_resize() {
    let mut session = session(&small_config());
    assert_relative_eq!(session.camera.aspect, 800.0 / 600.0, epsilon = 1e-6);

    let mut viewport = Viewport::new(800, 600, 1.0);
    viewport.resize(1200, 600, 1.0);
    session.resize(&viewport);
    assert_relative_eq!(session.camera.aspect, 2.0, epsilon = 1e-6);
}
