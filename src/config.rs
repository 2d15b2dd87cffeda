//! Demo configuration.
//!
//! Everything tunable about the scene lives in [`DemoConfig`] and is read from
//! `assets/config.json` through the same loader that fetches models, so the file
//! is picked up natively and on the web. Every field has a default; a missing or
//! broken file only costs a warning.

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::{resources::load_string, tween::Ease};

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub model: ModelConfig,
    pub particles: ParticleConfig,
    pub wings: WingConfig,
    pub movement: MovementConfig,
    pub tween: TweenConfig,
    pub camera: CameraConfig,
    pub lights: LightsConfig,
}

/// Child indices of the four wings below the model root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WingNodes {
    pub front_right: usize,
    pub front_left: usize,
    pub back_right: usize,
    pub back_left: usize,
}

impl Default for WingNodes {
    fn default() -> Self {
        Self {
            front_right: 1,
            front_left: 2,
            back_right: 3,
            back_left: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub scale: f32,
    /// Euler angles (XYZ order, radians) applied to the root once loaded.
    pub rotation: [f32; 3],
    pub wings: WingNodes,
    /// Index of the glTF animation handed to the mixer.
    pub clip_index: usize,
    pub bob_frequency: f32,
    pub bob_amplitude: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/xWing/xWing-separate-wings.glb".to_string(),
            scale: 0.5,
            rotation: [std::f32::consts::TAU, std::f32::consts::PI, 0.0],
            wings: WingNodes::default(),
            clip_index: 1,
            bob_frequency: 2.0,
            bob_amplitude: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Edge length of the cube particles (re)spawn in, centered on the origin.
    pub spread: f32,
    pub depth_limit: f32,
    pub acceleration: f32,
    pub respawn_velocity: f32,
    pub spin_per_particle: f32,
    pub offset: [f32; 3],
    pub size: f32,
    pub sprite: String,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 3000,
            spread: 20.0,
            depth_limit: 15.0,
            acceleration: 0.002,
            respawn_velocity: 0.02,
            spin_per_particle: 0.000_000_5,
            offset: [0.0, 0.0, -5.0],
            size: 0.09,
            sprite: "textures/particles/1.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WingConfig {
    pub open_angle: f32,
}

impl Default for WingConfig {
    fn default() -> Self {
        Self { open_angle: 0.3 }
    }
}

/// How the arrow keys move the ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Roll into the turn while sliding sideways, level out on key release.
    #[default]
    Bank,
    /// Jump sideways by a fixed step.
    Step,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub mode: MovementMode,
    pub step: f32,
    pub bank_angle: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            mode: MovementMode::default(),
            step: 0.8,
            bank_angle: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TweenConfig {
    pub duration: f32,
    pub ease: Ease,
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            duration: 0.5,
            ease: Ease::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 2.0, 6.0],
            target: [0.0, 0.75, 0.0],
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightConfig {
    pub color: String,
    pub intensity: f32,
    #[serde(default)]
    pub position: [f32; 3],
}

impl LightConfig {
    fn new(color: &str, intensity: f32, position: [f32; 3]) -> Self {
        Self {
            color: color.to_string(),
            intensity,
            position,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub ambient: LightConfig,
    pub directional: [LightConfig; 2],
    pub point: LightConfig,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient: LightConfig::new("#634F85", 0.8, [0.0; 3]),
            directional: [
                LightConfig::new("#78AFFF", 1.6, [5.0, 5.0, 5.0]),
                LightConfig::new("#78AFFF", 0.6, [1.15, 6.3, -0.07]),
            ],
            point: LightConfig::new("#8EDBFF", 0.5, [-0.3, 0.6, -3.0]),
        }
    }
}

impl DemoConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: DemoConfig =
            serde_json::from_str(text).context("Failed to parse demo configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(file_name: &str) -> Result<Self> {
        let text = load_string(file_name)
            .await
            .with_context(|| format!("Failed to read config file {file_name}"))?;
        Self::from_json(&text)
    }

    pub async fn load_or_default(file_name: &str) -> Self {
        match Self::load(file_name).await {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let particles = &self.particles;
        for (name, value) in [
            ("particles.spread", particles.spread),
            ("particles.depth_limit", particles.depth_limit),
            ("particles.acceleration", particles.acceleration),
            ("particles.respawn_velocity", particles.respawn_velocity),
            ("particles.spin_per_particle", particles.spin_per_particle),
            ("particles.size", particles.size),
            ("tween.duration", self.tween.duration),
        ] {
            if !value.is_finite() {
                bail!("{name} must be a finite number, got {value}");
            }
        }
        if self.particles.spread <= 0.0 {
            bail!("particles.spread must be positive, got {}", self.particles.spread);
        }
        if self.tween.duration < 0.0 {
            bail!("tween.duration must not be negative, got {}", self.tween.duration);
        }
        if !(0.0..1.0).contains(&self.camera.damping_factor) {
            bail!(
                "camera.damping_factor must be in [0, 1), got {}",
                self.camera.damping_factor
            );
        }
        parse_hex_color(&self.lights.ambient.color)?;
        for light in &self.lights.directional {
            parse_hex_color(&light.color)?;
        }
        parse_hex_color(&self.lights.point.color)?;
        Ok(())
    }
}

/// Parses `#RRGGBB` into linear-free RGB floats in `[0, 1]`.
pub fn parse_hex_color(text: &str) -> Result<[f32; 3]> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.is_ascii() {
        bail!("Expected a colour like #RRGGBB, got {text:?}");
    }
    let channel = |range: std::ops::Range<usize>| -> Result<f32> {
        let value = u8::from_str_radix(&hex[range], 16)
            .with_context(|| format!("Invalid hex digits in colour {text:?}"))?;
        Ok(value as f32 / 255.0)
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_hex_colours() {
        let [r, g, b] = parse_hex_color("#78AFFF").unwrap();
        assert!((r - 120.0 / 255.0).abs() < 1e-6);
        assert!((g - 175.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 1.0);
        assert!(parse_hex_color("#78AF").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn should_fill_missing_sections_with_defaults() {
        let config = DemoConfig::from_json(r#"{ "movement": { "mode": "step", "step": 1.5 } }"#)
            .unwrap();
        assert_eq!(config.movement.mode, MovementMode::Step);
        assert_eq!(config.movement.step, 1.5);
        assert_eq!(config.movement.bank_angle, 0.5);
        assert_eq!(config.particles.count, 3000);
        assert_eq!(config.model.wings, WingNodes::default());
    }

    #[test]
    fn should_reject_invalid_values() {
        assert!(DemoConfig::from_json(r#"{ "particles": { "spread": 0.0 } }"#).is_err());
        assert!(DemoConfig::from_json(r#"{ "camera": { "damping_factor": 1.0 } }"#).is_err());
        assert!(DemoConfig::from_json(r#"{ "particles": { "spread": 1e39 } }"#).is_err());
        assert!(DemoConfig::from_json(r#"{ "particles": { "depth_limit": -1e39 } }"#).is_err());
        assert!(DemoConfig::from_json(r#"{ "tween": { "duration": 1e39 } }"#).is_err());
        assert!(DemoConfig::from_json("not json").is_err());
    }
}
