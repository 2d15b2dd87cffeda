//! Orbit camera controls with damping.
//!
//! Dragging accumulates an angular delta around the target. `update` feeds a
//! fraction of that delta into the orbit each tick and decays the rest, which
//! gives the camera its glide after the mouse is released.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector3};

use crate::config::CameraConfig;

/// Keeps the camera off the poles so the view never flips.
const POLE_EPSILON: f32 = 1e-6;
/// Deltas below this are treated as settled.
const SETTLED: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
}

impl OrbitControls {
    pub fn new(position: Point3<f32>, config: &CameraConfig) -> Self {
        let target = Point3::from(config.target);
        Self {
            target,
            spherical: Spherical::from_offset(position - target),
            delta_theta: 0.0,
            delta_phi: 0.0,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            enable_zoom: false,
        }
    }

    /// Queues a rotation for a pointer drag of `dx`, `dy` pixels on a viewport
    /// `viewport_height` pixels tall. A full-height drag turns the camera once.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.delta_theta -= 2.0 * PI * dx / viewport_height * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / viewport_height * self.rotate_speed;
    }

    /// Dolly request from the scroll wheel. Returns whether it was applied.
    pub fn zoom(&mut self, scale: f32) -> bool {
        if !self.enable_zoom || scale <= 0.0 {
            return false;
        }
        self.spherical.radius = (self.spherical.radius * scale).max(POLE_EPSILON);
        true
    }

    /// Applies pending rotation and returns the new camera position.
    pub fn update(&mut self) -> Point3<f32> {
        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        self.spherical.theta += self.delta_theta * factor;
        self.spherical.phi = (self.spherical.phi + self.delta_phi * factor)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            if self.delta_theta.abs() < SETTLED {
                self.delta_theta = 0.0;
            }
            if self.delta_phi.abs() < SETTLED {
                self.delta_phi = 0.0;
            }
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.position()
    }

    pub fn position(&self) -> Point3<f32> {
        self.target + self.spherical.to_offset()
    }

    pub fn is_settled(&self) -> bool {
        self.delta_theta == 0.0 && self.delta_phi == 0.0
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controls() -> OrbitControls {
        let config = CameraConfig::default();
        OrbitControls::new(Point3::from(config.position), &config)
    }

    #[test]
    fn should_keep_initial_position_without_input() {
        let mut controls = controls();
        let position = controls.update();
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(position.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(position.z, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn should_glide_and_settle_after_drag() {
        let mut controls = controls();
        let distance = controls.distance();
        controls.rotate_by_pixels(100.0, 0.0, 600.0);

        let first = controls.update();
        let second = controls.update();
        assert!(first.x < 0.0, "dragging right orbits towards -X");
        assert!(second.x < first.x);

        for _ in 0..1000 {
            controls.update();
        }
        assert!(controls.is_settled());
        assert_relative_eq!(controls.distance(), distance, epsilon = 1e-5);
    }

    #[test]
    fn should_ignore_zoom_while_disabled() {
        let mut controls = controls();
        let distance = controls.distance();
        assert!(!controls.zoom(0.5));
        assert_eq!(controls.distance(), distance);
    }
}
