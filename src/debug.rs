//! Debug controls: named sliders and buttons bound to scene parameters.
//!
//! The panel only describes the controls. Writes go through
//! [`SceneSession::debug_set`](crate::session::SceneSession::debug_set), which
//! constrains the value with the slider and stores it on the bound parameter.

use anyhow::{Result, anyhow};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A scene value a slider can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    ShipRotation(Axis),
    AmbientIntensity,
    DirectionalIntensity(usize),
    DirectionalPosition(usize, Axis),
    PointPosition(Axis),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenWings,
    CloseWings,
    /// Start or stop the bound animation clip.
    ToggleClip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub name: String,
    pub folder: Option<String>,
    pub param: Param,
    pub min: f32,
    pub max: f32,
    pub step: Option<f32>,
}

impl Slider {
    pub fn range(&mut self, min: f32, max: f32) -> &mut Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn step(&mut self, step: f32) -> &mut Self {
        self.step = (step > 0.0).then_some(step);
        self
    }

    /// Clamps `value` into range and snaps it onto the step grid.
    pub fn constrain(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        match self.step {
            Some(step) => {
                let snapped = self.min + ((clamped - self.min) / step).round() * step;
                snapped.clamp(self.min, self.max)
            }
            None => clamped,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub name: String,
    pub folder: Option<String>,
    pub action: Action,
}

#[derive(Debug, Clone, Default)]
pub struct DebugPanel {
    sliders: Vec<Slider>,
    buttons: Vec<Button>,
}

/// Adds controls under a folder name.
pub struct Folder<'a> {
    panel: &'a mut DebugPanel,
    name: String,
}

impl Folder<'_> {
    pub fn add_slider(&mut self, name: &str, param: Param) -> &mut Slider {
        self.panel.insert_slider(name, Some(self.name.clone()), param)
    }

    pub fn add_button(&mut self, name: &str, action: Action) {
        self.panel.insert_button(name, Some(self.name.clone()), action);
    }
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panel with the controls available before any model is loaded.
    pub fn with_scene_controls() -> Self {
        let mut panel = Self::new();
        panel
            .add_slider("lightIntensity", Param::DirectionalIntensity(0))
            .range(0.0, 10.0)
            .step(0.001);
        for (suffix, light) in [("", 0), ("2", 1)] {
            for (axis_name, axis) in [("X", Axis::X), ("Y", Axis::Y), ("Z", Axis::Z)] {
                panel
                    .add_slider(
                        &format!("light{axis_name}{suffix}"),
                        Param::DirectionalPosition(light, axis),
                    )
                    .range(-10.0, 10.0)
                    .step(0.001);
            }
        }
        panel
            .add_slider("ambientIntensity", Param::AmbientIntensity)
            .range(0.0, 1.0)
            .step(0.001);
        for (axis_name, axis) in [("X", Axis::X), ("Y", Axis::Y), ("Z", Axis::Z)] {
            panel
                .add_slider(&format!("Point{axis_name}"), Param::PointPosition(axis))
                .range(-10.0, 10.0)
                .step(0.001);
        }
        panel.add_button("OpenWings", Action::OpenWings);
        panel.add_button("CloseWings", Action::CloseWings);
        panel
    }

    /// Ship rotation sliders, added once the model is bound.
    pub fn register_ship_controls(&mut self) {
        let mut folder = self.add_folder("xWing");
        for (name, axis) in [("rotate x", Axis::X), ("rotate y", Axis::Y), ("rotate z", Axis::Z)] {
            folder
                .add_slider(name, Param::ShipRotation(axis))
                .range(0.0, 20.0)
                .step(0.0001);
        }
        folder.add_button("PlayClip", Action::ToggleClip);
    }

    pub fn add_folder(&mut self, name: &str) -> Folder<'_> {
        Folder {
            panel: self,
            name: name.to_string(),
        }
    }

    /// Adds a slider, replacing any control registered under the same name.
    pub fn add_slider(&mut self, name: &str, param: Param) -> &mut Slider {
        self.insert_slider(name, None, param)
    }

    pub fn add_button(&mut self, name: &str, action: Action) {
        self.insert_button(name, None, action);
    }

    pub fn slider(&self, name: &str) -> Result<&Slider> {
        self.sliders
            .iter()
            .find(|slider| slider.name == name)
            .ok_or_else(|| anyhow!("No debug slider named {name:?}"))
    }

    pub fn button(&self, name: &str) -> Result<&Button> {
        self.buttons
            .iter()
            .find(|button| button.name == name)
            .ok_or_else(|| anyhow!("No debug button named {name:?}"))
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// JSON listing of every control, for a host page that draws the panel.
    pub fn describe(&self) -> serde_json::Value {
        let sliders: Vec<_> = self
            .sliders
            .iter()
            .map(|slider| {
                json!({
                    "name": slider.name,
                    "folder": slider.folder,
                    "min": slider.min,
                    "max": slider.max,
                    "step": slider.step,
                })
            })
            .collect();
        let buttons: Vec<_> = self
            .buttons
            .iter()
            .map(|button| json!({ "name": button.name, "folder": button.folder }))
            .collect();
        json!({ "sliders": sliders, "buttons": buttons })
    }

    fn insert_slider(&mut self, name: &str, folder: Option<String>, param: Param) -> &mut Slider {
        self.sliders.retain(|slider| slider.name != name);
        self.sliders.push(Slider {
            name: name.to_string(),
            folder,
            param,
            min: f32::MIN,
            max: f32::MAX,
            step: None,
        });
        let last = self.sliders.len() - 1;
        &mut self.sliders[last]
    }

    fn insert_button(&mut self, name: &str, folder: Option<String>, action: Action) {
        self.buttons.retain(|button| button.name != name);
        self.buttons.push(Button {
            name: name.to_string(),
            folder,
            action,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_clamp_and_snap_slider_values() {
        let mut panel = DebugPanel::new();
        panel
            .add_slider("light", Param::AmbientIntensity)
            .range(0.0, 1.0)
            .step(0.25);
        let slider = panel.slider("light").unwrap();
        assert_eq!(slider.constrain(2.0), 1.0);
        assert_eq!(slider.constrain(-1.0), 0.0);
        assert_eq!(slider.constrain(0.3), 0.25);
        assert_eq!(slider.constrain(0.4), 0.5);
    }

    #[test]
    fn should_replace_controls_with_same_name() {
        let mut panel = DebugPanel::new();
        panel.add_slider("x", Param::AmbientIntensity);
        panel.add_slider("x", Param::PointPosition(Axis::X));
        assert_eq!(panel.sliders().len(), 1);
        assert_eq!(panel.slider("x").unwrap().param, Param::PointPosition(Axis::X));
        assert!(panel.slider("y").is_err());
    }

    #[test]
    fn should_register_ship_controls_in_folder() {
        let mut panel = DebugPanel::with_scene_controls();
        assert!(panel.slider("rotate x").is_err());
        panel.register_ship_controls();
        let slider = panel.slider("rotate y").unwrap();
        assert_eq!(slider.folder.as_deref(), Some("xWing"));
        assert_eq!((slider.min, slider.max), (0.0, 20.0));
    }

    #[test]
    fn should_describe_controls_as_json() {
        let description = DebugPanel::with_scene_controls().describe();
        let sliders = description["sliders"].as_array().unwrap();
        assert_eq!(sliders.len(), 11);
        assert_eq!(sliders[0]["name"], "lightIntensity");
        assert_eq!(description["buttons"][1]["name"], "CloseWings");
        assert!(description["buttons"][0]["folder"].is_null());
    }
}
