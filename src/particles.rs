//! The starfield: a fixed set of points streaming towards the camera.

use cgmath::{Matrix4, Rad, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::ParticleConfig;

/// Particle positions plus the spin of the whole field.
///
/// The buffer never grows or shrinks. Each step pushes every particle along +Z
/// with a speed that ramps up with the particle's index, so the field moves in
/// waves. Particles past the depth bound are thrown back to a random spot in
/// the spawn cube.
pub struct ParticleField {
    positions: Vec<[f32; 3]>,
    rotation_z: f32,
    dirty: bool,
    config: ParticleConfig,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: &ParticleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: &ParticleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: &ParticleConfig, mut rng: StdRng) -> Self {
        let half = config.spread / 2.0;
        let positions = (0..config.count)
            .map(|_| random_point(&mut rng, half))
            .collect();
        Self {
            positions,
            rotation_z: 0.0,
            dirty: true,
            config: config.clone(),
            rng,
        }
    }

    /// Advances the field by one tick and returns how many particles respawned.
    pub fn step(&mut self) -> usize {
        let half = self.config.spread / 2.0;
        let mut velocity = 0.0;
        let mut respawned = 0;
        for position in self.positions.iter_mut() {
            velocity += self.config.acceleration;
            position[2] += velocity;
            if position[2] > self.config.depth_limit {
                *position = random_point(&mut self.rng, half);
                velocity = self.config.respawn_velocity;
                respawned += 1;
            }
        }
        self.rotation_z += self.config.spin_per_particle * self.positions.len() as f32;
        self.dirty = true;
        respawned
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Direct access for seeding a known layout.
    pub fn positions_mut(&mut self) -> &mut [[f32; 3]] {
        self.dirty = true;
        &mut self.positions
    }

    pub fn rotation_z(&self) -> f32 {
        self.rotation_z
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, returning whether the buffer needs an upload.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Placement of the field in the scene: fixed offset, then its spin.
    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::from(self.config.offset))
            * Matrix4::from_angle_z(Rad(self.rotation_z))
    }
}

fn random_point<R: Rng>(rng: &mut R, half: f32) -> [f32; 3] {
    [
        rng.gen_range(-half..=half),
        rng.gen_range(-half..=half),
        rng.gen_range(-half..=half),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_ramp_speed_with_particle_index() {
        let config = ParticleConfig {
            count: 3,
            ..Default::default()
        };
        let mut field = ParticleField::with_seed(&config, 1);
        for p in field.positions_mut() {
            *p = [0.0, 0.0, 0.0];
        }
        assert_eq!(field.step(), 0);
        let z: Vec<f32> = field.positions().iter().map(|p| p[2]).collect();
        assert!((z[0] - 0.002).abs() < 1e-7);
        assert!((z[1] - 0.004).abs() < 1e-7);
        assert!((z[2] - 0.006).abs() < 1e-7);
    }

    #[test]
    fn should_spin_proportionally_to_count() {
        let config = ParticleConfig {
            count: 1000,
            ..Default::default()
        };
        let mut field = ParticleField::with_seed(&config, 7);
        field.step();
        field.step();
        assert!((field.rotation_z() - 2.0 * 1000.0 * 5e-7).abs() < 1e-7);
    }

    #[test]
    fn should_flag_buffer_dirty_after_step() {
        let mut field = ParticleField::with_seed(&ParticleConfig::default(), 3);
        assert!(field.take_dirty());
        assert!(!field.is_dirty());
        field.step();
        assert!(field.take_dirty());
    }
}
