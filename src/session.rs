//! Everything the scene knows between two frames.
//!
//! [`SceneSession`] owns the ship's transform, the wings, the starfield, the
//! running tweens, the camera and lights and the debug panel. It has no GPU
//! state: the demo flow reads it after every tick and uploads what changed.
//!
//! The ship arrives asynchronously. Until [`SceneSession::bind_ship`] ran,
//! every ship related input is ignored and the tick only moves the starfield
//! and the camera.

use anyhow::{Result, bail};
use cgmath::{Quaternion, Rad, Rotation3, Vector3};

use crate::{
    camera::PerspectiveCamera,
    clock::FrameTime,
    config::{DemoConfig, LightConfig, LightsConfig, parse_hex_color},
    controls::OrbitControls,
    data_structures::{
        instance::Instance,
        scene_graph::{NodeCaps, SceneNode},
    },
    debug::{Action, Axis, DebugPanel, Param},
    input::{Command, InputController, Key},
    mixer::{ActionHandle, AnimationMixer, Pose},
    particles::ParticleField,
    resources::animation::Clip,
    tween::{Animatable, Position, TweenValue, Tweens},
    viewport::Viewport,
    wings::{WingActuator, WingId, WingSet, WingState},
};

/// Properties the tween engine may animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Wing(WingId),
    ShipPositionX,
    ShipRotationZ,
}

impl From<WingId> for Property {
    fn from(id: WingId) -> Self {
        Property::Wing(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipTransform {
    pub position: Vector3<f32>,
    /// Euler angles in XYZ order, radians.
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl ShipTransform {
    pub fn to_instance(&self) -> Instance {
        Instance::from_euler(self.position, self.rotation, self.scale)
    }
}

#[derive(Debug, Clone)]
pub struct ShipState {
    pub transform: ShipTransform,
    clip: Option<ActionHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vector3<f32>,
}

impl Light {
    fn from_config(config: &LightConfig) -> Result<Self> {
        Ok(Self {
            color: parse_hex_color(&config.color)?,
            intensity: config.intensity,
            position: Vector3::from(config.position),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneLights {
    pub ambient: Light,
    pub directional: [Light; 2],
    pub point: Light,
}

impl SceneLights {
    pub fn from_config(config: &LightsConfig) -> Result<Self> {
        Ok(Self {
            ambient: Light::from_config(&config.ambient)?,
            directional: [
                Light::from_config(&config.directional[0])?,
                Light::from_config(&config.directional[1])?,
            ],
            point: Light::from_config(&config.point)?,
        })
    }
}

/// Borrowed view of the tweenable parts, handed to [`Tweens::update`].
struct Animated<'a> {
    ship: &'a mut Option<ShipState>,
    wings: &'a mut Option<WingSet>,
}

impl Animatable<Property> for Animated<'_> {
    fn value(&self, property: Property) -> Option<f32> {
        match property {
            Property::Wing(id) => self.wings.as_ref().map(|wings| wings.wing(id).rotation_y),
            Property::ShipPositionX => self.ship.as_ref().map(|ship| ship.transform.position.x),
            Property::ShipRotationZ => self.ship.as_ref().map(|ship| ship.transform.rotation[2]),
        }
    }

    fn set_value(&mut self, property: Property, value: f32) {
        match property {
            Property::Wing(id) => {
                if let Some(wings) = self.wings.as_mut() {
                    wings.wing_mut(id).rotation_y = value;
                }
            }
            Property::ShipPositionX => {
                if let Some(ship) = self.ship.as_mut() {
                    ship.transform.position.x = value;
                }
            }
            Property::ShipRotationZ => {
                if let Some(ship) = self.ship.as_mut() {
                    ship.transform.rotation[2] = value;
                }
            }
        }
    }
}

pub struct SceneSession {
    config: DemoConfig,
    pub ship: Option<ShipState>,
    pub wings: Option<WingSet>,
    pub mixer: Option<AnimationMixer>,
    pub particles: ParticleField,
    pub tweens: Tweens<Property>,
    pub controls: OrbitControls,
    pub camera: PerspectiveCamera,
    pub lights: SceneLights,
    pub debug: DebugPanel,
    input: InputController,
    actuator: WingActuator,
    status: AssetStatus,
}

impl SceneSession {
    pub fn new(config: &DemoConfig, viewport: &Viewport) -> Result<Self> {
        Self::with_particles(config, viewport, ParticleField::new(&config.particles))
    }

    /// Session with a prepared starfield, e.g. one built from a seeded generator.
    pub fn with_particles(
        config: &DemoConfig,
        viewport: &Viewport,
        particles: ParticleField,
    ) -> Result<Self> {
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        Ok(Self {
            config: config.clone(),
            ship: None,
            wings: None,
            mixer: None,
            particles,
            tweens: Tweens::new(config.tween.duration).with_ease(config.tween.ease),
            controls: OrbitControls::new(camera.position, &config.camera),
            camera,
            lights: SceneLights::from_config(&config.lights)?,
            debug: DebugPanel::with_scene_controls(),
            input: InputController::new(&config.movement),
            actuator: WingActuator::new(config.wings.open_angle),
            status: AssetStatus::Loading,
        })
    }

    pub fn status(&self) -> &AssetStatus {
        &self.status
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Takes over a freshly loaded model.
    ///
    /// Flags standard-material meshes for a material refresh and for shadows,
    /// places the model, binds the wings and the animation clip and adds the
    /// ship controls to the debug panel. `root` is the container holding the
    /// scene's top-level nodes; the wings are looked up among its children.
    pub fn bind_ship(&mut self, root: &mut SceneNode, clips: Vec<Clip>) {
        let model = &self.config.model;
        let tagged = root.traverse_tagged_mut(NodeCaps::MESH | NodeCaps::STANDARD_MATERIAL, &mut |node| {
            node.caps |= NodeCaps::MATERIAL_DIRTY | NodeCaps::CAST_SHADOW | NodeCaps::RECEIVE_SHADOW;
        });
        log::info!("Bound ship with {} nodes, {tagged} standard meshes", root.len());

        let wings = WingSet::new(model.wings);
        self.wings = if wings.max_node() < root.children.len() {
            Some(wings)
        } else {
            log::warn!(
                "Model has {} top-level nodes, wings need index {}; wings stay unbound",
                root.children.len(),
                wings.max_node()
            );
            None
        };

        let mut mixer = AnimationMixer::new(clips);
        let clip = mixer.clip_action(model.clip_index);
        if clip.is_none() {
            log::warn!(
                "Model has {} animation clips, no clip at index {}",
                mixer.clips().len(),
                model.clip_index
            );
        }
        self.mixer = Some(mixer);

        self.ship = Some(ShipState {
            transform: ShipTransform {
                position: Vector3::new(0.0, 0.0, 0.0),
                rotation: model.rotation,
                scale: model.scale,
            },
            clip,
        });
        self.debug.register_ship_controls();
        self.status = AssetStatus::Ready;
    }

    pub fn fail_ship(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("Ship failed to load: {reason}");
        self.status = AssetStatus::Failed(reason);
    }

    /// Advances the scene by one frame.
    pub fn tick(&mut self, time: FrameTime) {
        self.tweens.update(
            time.delta,
            &mut Animated {
                ship: &mut self.ship,
                wings: &mut self.wings,
            },
        );
        if let Some(mixer) = &mut self.mixer {
            mixer.update(time.delta);
        }
        if let Some(ship) = &mut self.ship {
            let model = &self.config.model;
            ship.transform.position.y = (time.elapsed * model.bob_frequency).sin() * model.bob_amplitude;
        }
        self.particles.step();
        self.camera.position = self.controls.update();
        self.camera.target = self.controls.target;
    }

    pub fn resize(&mut self, viewport: &Viewport) {
        self.camera.aspect = viewport.aspect();
    }

    /// Returns whether the key did anything.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.ship.is_none() {
            return false;
        }
        match self.input.key_down(key) {
            Some(command) => self.apply(command),
            None => false,
        }
    }

    pub fn key_up(&mut self, key: Key) -> bool {
        if self.ship.is_none() {
            return false;
        }
        match self.input.key_up(key) {
            Some(command) => self.apply(command),
            None => false,
        }
    }

    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Nudge { dx } => match &mut self.ship {
                Some(ship) => {
                    ship.transform.position.x += dx;
                    true
                }
                None => false,
            },
            Command::Bank { roll, dx } => {
                self.tweens
                    .timeline()
                    .to(Property::ShipRotationZ, TweenValue::To(roll))
                    .to_at(Property::ShipPositionX, TweenValue::By(dx), Position::WithPrevious)
                    .play();
                true
            }
            Command::Level => {
                self.tweens.to(Property::ShipRotationZ, TweenValue::To(0.0));
                true
            }
            Command::ToggleWings => self.toggle_wings().is_some(),
        }
    }

    pub fn open_wings(&mut self) -> bool {
        if self.wings.is_none() {
            log::debug!("Ignoring open: wings not bound");
            return false;
        }
        self.actuator.open(&mut self.tweens);
        true
    }

    pub fn close_wings(&mut self) -> bool {
        if self.wings.is_none() {
            log::debug!("Ignoring close: wings not bound");
            return false;
        }
        self.actuator.close(&mut self.tweens);
        true
    }

    /// Closes the wings if they sample open, opens them otherwise.
    pub fn toggle_wings(&mut self) -> Option<WingState> {
        let wings = self.wings.as_ref()?;
        Some(self.actuator.toggle(wings, &mut self.tweens))
    }

    pub fn wing_state(&self) -> Option<WingState> {
        self.wings.as_ref().map(|wings| self.actuator.state(wings))
    }

    /// Settled wing rotations, ordered as [`WingId::ALL`].
    pub fn wing_targets(&self) -> Option<[f32; 4]> {
        self.wings.as_ref().map(|wings| wings.targets(&self.tweens))
    }

    /// Writes the session's pose onto the model's scene graph.
    pub fn pose_ship(&self, root: &mut SceneNode) {
        let Some(ship) = &self.ship else {
            return;
        };
        root.reset_pose();
        if let Some(mixer) = &self.mixer {
            for sample in mixer.sample() {
                let Some(node) = root.find_by_gltf_index_mut(sample.node) else {
                    continue;
                };
                match sample.pose {
                    Pose::Translation(position) => node.local.position = position,
                    Pose::Rotation(rotation) => node.local.rotation = rotation,
                    Pose::Scale(scale) => node.local.scale = scale,
                }
            }
        }
        if let Some(wings) = &self.wings {
            for (_, wing) in wings.iter() {
                if let Some(node) = root.child_mut(wing.node) {
                    node.local.rotation =
                        node.local.rotation * Quaternion::from_angle_y(Rad(wing.rotation_y));
                }
            }
        }
        root.local = ship.transform.to_instance();
        root.update_world_transforms(&Instance::new());
    }

    /// Sets a debug slider. Returns the value actually stored after clamping
    /// and snapping.
    pub fn debug_set(&mut self, name: &str, value: f32) -> Result<f32> {
        let slider = self.debug.slider(name)?;
        let param = slider.param;
        let value = slider.constrain(value);
        self.set_param(param, value)?;
        Ok(value)
    }

    pub fn debug_press(&mut self, name: &str) -> Result<()> {
        let action = self.debug.button(name)?.action;
        match action {
            Action::OpenWings => {
                self.open_wings();
            }
            Action::CloseWings => {
                self.close_wings();
            }
            Action::ToggleClip => self.toggle_clip()?,
        }
        Ok(())
    }

    pub fn param(&self, param: Param) -> Option<f32> {
        Some(match param {
            Param::ShipRotation(axis) => self.ship.as_ref()?.transform.rotation[axis.index()],
            Param::AmbientIntensity => self.lights.ambient.intensity,
            Param::DirectionalIntensity(light) => self.lights.directional.get(light)?.intensity,
            Param::DirectionalPosition(light, axis) => {
                axis_of(&self.lights.directional.get(light)?.position, axis)
            }
            Param::PointPosition(axis) => axis_of(&self.lights.point.position, axis),
        })
    }

    pub fn set_param(&mut self, param: Param, value: f32) -> Result<()> {
        match param {
            Param::ShipRotation(axis) => match &mut self.ship {
                Some(ship) => ship.transform.rotation[axis.index()] = value,
                None => bail!("Ship is not loaded yet"),
            },
            Param::AmbientIntensity => self.lights.ambient.intensity = value,
            Param::DirectionalIntensity(light) => match self.lights.directional.get_mut(light) {
                Some(light) => light.intensity = value,
                None => bail!("No directional light {light}"),
            },
            Param::DirectionalPosition(light, axis) => match self.lights.directional.get_mut(light) {
                Some(light) => *axis_of_mut(&mut light.position, axis) = value,
                None => bail!("No directional light {light}"),
            },
            Param::PointPosition(axis) => *axis_of_mut(&mut self.lights.point.position, axis) = value,
        }
        Ok(())
    }

    fn toggle_clip(&mut self) -> Result<()> {
        let (Some(ship), Some(mixer)) = (&self.ship, &mut self.mixer) else {
            bail!("Ship is not loaded yet");
        };
        let Some(clip) = ship.clip else {
            bail!("Model has no clip at index {}", self.config.model.clip_index);
        };
        if mixer.is_playing(clip) {
            mixer.stop(clip);
        } else {
            mixer.play(clip);
        }
        Ok(())
    }
}

fn axis_of(vector: &Vector3<f32>, axis: Axis) -> f32 {
    match axis {
        Axis::X => vector.x,
        Axis::Y => vector.y,
        Axis::Z => vector.z,
    }
}

fn axis_of_mut(vector: &mut Vector3<f32>, axis: Axis) -> &mut f32 {
    match axis {
        Axis::X => &mut vector.x,
        Axis::Y => &mut vector.y,
        Axis::Z => &mut vector.z,
    }
}
