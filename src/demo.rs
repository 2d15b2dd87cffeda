//! The X-Wing scene as a [`GraphicsFlow`].
//!
//! [`XWingFlow`] owns the [`SceneSession`] and the GPU objects mirroring it:
//! the ship's scene model once it arrived and the starfield point cloud. Model
//! loading runs as a future whose result comes back as a [`DemoEvent`]; debug
//! commands from the host page travel the same way.

use instant::Duration;
use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::PhysicalKey,
};

use crate::{
    clock::FrameClock,
    config::{CONFIG_FILE, DemoConfig},
    context::{Context, DEFAULT_CLEAR, FAILURE_CLEAR, InitContext},
    data_structures::{scene_graph::SceneModel, texture::Texture},
    flow::{FlowConsturctor, GraphicsFlow, Out},
    input::Key,
    pipelines::points::{PointCloud, PointsUniform},
    render::{Points, Render},
    resources::{LoadedShip, load_ship, texture::load_texture},
    session::{AssetStatus, SceneSession},
};

/// Wheel zoom factor per scrolled line.
const ZOOM_PER_LINE: f32 = 0.95;
/// Pixels of touchpad scrolling counted as one line.
const PIXELS_PER_LINE: f64 = 50.0;

/// A debug panel interaction coming from outside the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugCommand {
    Set { name: String, value: f32 },
    Press(String),
}

#[derive(Debug)]
pub enum DemoEvent {
    ShipLoaded(Box<LoadedShip>),
    ShipFailed(String),
    Debug(DebugCommand),
}

#[derive(Debug, Default)]
struct Drag {
    active: bool,
    last: Option<(f64, f64)>,
}

pub struct XWingFlow {
    session: SceneSession,
    clock: FrameClock,
    ship: Option<SceneModel>,
    starfield: PointCloud,
    drag: Drag,
}

impl XWingFlow {
    pub async fn new(ctx: InitContext, config: DemoConfig) -> anyhow::Result<Self> {
        let session = SceneSession::new(&config, &ctx.viewport)?;

        let sprite_path = &config.particles.sprite;
        let sprite = match load_texture(sprite_path, &ctx.device, &ctx.queue, None).await {
            Ok(sprite) => sprite,
            Err(err) => {
                log::warn!("Particle sprite {sprite_path} unavailable ({err:#}), using plain white");
                Texture::solid(&ctx.device, &ctx.queue, [255; 4], "particle sprite")
            }
        };
        let starfield = PointCloud::new(
            &ctx.device,
            &ctx.points_layout,
            session.particles.positions(),
            points_uniform(&session),
            sprite,
        );

        Ok(Self {
            session,
            clock: FrameClock::new(),
            ship: None,
            starfield,
            drag: Drag::default(),
        })
    }

    pub fn session(&self) -> &SceneSession {
        &self.session
    }

    fn bind_loaded(&mut self, ctx: &Context, ship: LoadedShip) {
        let LoadedShip { root, model, clips } = ship;
        let mut scene = SceneModel::new(&ctx.device, root, model);
        self.session.bind_ship(&mut scene.root, clips);
        self.ship = Some(scene);
    }

    fn run_debug(&mut self, command: DebugCommand) {
        let result = match &command {
            DebugCommand::Set { name, value } => self.session.debug_set(name, *value).map(|stored| {
                log::debug!("{name} = {stored}");
            }),
            DebugCommand::Press(name) => self.session.debug_press(name),
        };
        if let Err(err) = result {
            log::warn!("Debug command {command:?} failed: {err:#}");
        }
    }

    fn on_key(&mut self, key: Key, state: ElementState) {
        let handled = match state {
            ElementState::Pressed => self.session.key_down(key),
            ElementState::Released => self.session.key_up(key),
        };
        if handled {
            log::debug!("Handled {key:?} {state:?}");
        }
    }

    fn on_cursor(&mut self, x: f64, y: f64, viewport_height: f32) {
        if !self.drag.active {
            return;
        }
        if let Some((last_x, last_y)) = self.drag.last {
            self.session.controls.rotate_by_pixels(
                (x - last_x) as f32,
                (y - last_y) as f32,
                viewport_height,
            );
        }
        self.drag.last = Some((x, y));
    }
}

/// Sprite transform and size for the current particle and camera state.
fn points_uniform(session: &SceneSession) -> PointsUniform {
    let particles = session.particles.config();
    // Matches pixel-sized sprites that shrink with distance
    let world_size = particles.size * session.camera.half_fov_tan();
    PointsUniform {
        model: session.particles.transform().into(),
        size: [world_size, 0.0, 0.0, 0.0],
        color: [1.0, 1.0, 1.0, 1.0],
    }
}

impl GraphicsFlow<(), DemoEvent> for XWingFlow {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut ()) -> Out<DemoEvent> {
        ctx.clear_colour = DEFAULT_CLEAR;
        self.session.resize(&ctx.viewport);

        let path = self.session.config().model.path.clone();
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();
        let layout = ctx.pipelines.material_layout.clone();
        log::info!("Loading ship from {path}");
        let load: Box<dyn Future<Output = DemoEvent>> = Box::new(async move {
            match load_ship(&path, &device, &queue, &layout).await {
                Ok(ship) => DemoEvent::ShipLoaded(Box::new(ship)),
                Err(err) => DemoEvent::ShipFailed(format!("{err:#}")),
            }
        });
        Out::FutEvent(vec![load])
    }

    fn on_update(&mut self, ctx: &mut Context, _state: &mut (), _dt: Duration) -> Out<DemoEvent> {
        let time = self.clock.tick();
        self.session.tick(time);

        if let Some(ship) = self.ship.as_mut() {
            let refreshed = ship.refresh_materials(&ctx.queue);
            if refreshed > 0 {
                log::debug!("Uploaded {refreshed} ship materials");
            }
            self.session.pose_ship(&mut ship.root);
            ship.write_to_buffers(&ctx.queue);
        }
        if self.session.particles.take_dirty() {
            self.starfield
                .write_centers(&ctx.queue, self.session.particles.positions());
        }
        self.starfield
            .write_uniform(&ctx.queue, &points_uniform(&self.session));
        ctx.camera.write(&ctx.queue, &self.session.camera);
        ctx.lights.write(&ctx.queue, &self.session.lights);
        Out::Empty
    }

    fn on_window_events(&mut self, ctx: &Context, _state: &mut (), event: &WindowEvent) -> Out<DemoEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.on_key(Key::from(code), event.state);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.drag.active = state.is_pressed();
                self.drag.last = None;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let height = ctx.window().inner_size().height.max(1) as f32;
                self.on_cursor(position.x, position.y, height);
            }
            WindowEvent::CursorLeft { .. } => {
                self.drag = Drag::default();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.session.controls.zoom(ZOOM_PER_LINE.powf(lines));
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.session.resize(&ctx.viewport);
            }
            _ => {}
        }
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        ctx: &mut Context,
        _state: &mut (),
        event: DemoEvent,
    ) -> Option<DemoEvent> {
        match event {
            DemoEvent::ShipLoaded(ship) => {
                self.bind_loaded(ctx, *ship);
                ctx.clear_colour = DEFAULT_CLEAR;
            }
            DemoEvent::ShipFailed(reason) => {
                self.session.fail_ship(reason);
                ctx.clear_colour = FAILURE_CLEAR;
            }
            DemoEvent::Debug(command) => self.run_debug(command),
        }
        None
    }

    fn on_render(&self) -> Render<'_> {
        let stars = Render::Points(Points {
            instance: &self.starfield.instance_buffer,
            group: &self.starfield.bind_group,
            amount: self.starfield.amount,
        });
        match (&self.ship, self.session.status()) {
            (Some(ship), AssetStatus::Ready) => {
                Render::Composed(vec![Render::Defaults(ship.get_render()), stars])
            }
            _ => stars,
        }
    }
}

/// Constructor for the flow loop: reads the configuration, then builds the flow.
pub fn constructor() -> FlowConsturctor<(), DemoEvent> {
    Box::new(|ctx: InitContext| {
        Box::pin(async move {
            let config = DemoConfig::load_or_default(CONFIG_FILE).await;
            let flow = XWingFlow::new(ctx, config).await?;
            Ok(Box::new(flow) as Box<dyn GraphicsFlow<(), DemoEvent>>)
        })
    })
}

#[cfg(target_arch = "wasm32")]
pub mod web {
    //! JavaScript bindings for the debug panel.

    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use super::{DebugCommand, DemoEvent};
    use crate::{debug::DebugPanel, flow::EventSender};

    thread_local! {
        static SENDER: RefCell<Option<EventSender<(), DemoEvent>>> = const { RefCell::new(None) };
    }

    pub(crate) fn install(sender: EventSender<(), DemoEvent>) {
        SENDER.with(|slot| *slot.borrow_mut() = Some(sender));
    }

    fn send(command: DebugCommand) -> Result<(), JsValue> {
        SENDER.with(|slot| match slot.borrow().as_ref() {
            Some(sender) => sender
                .send(DemoEvent::Debug(command))
                .map_err(|err| JsValue::from_str(&err.to_string())),
            None => Err(JsValue::from_str("The scene is not running")),
        })
    }

    #[wasm_bindgen]
    pub fn debug_set(name: &str, value: f32) -> Result<(), JsValue> {
        send(DebugCommand::Set {
            name: name.to_string(),
            value,
        })
    }

    #[wasm_bindgen]
    pub fn debug_press(name: &str) -> Result<(), JsValue> {
        send(DebugCommand::Press(name.to_string()))
    }

    /// Every control the panel can show, as JSON.
    #[wasm_bindgen]
    pub fn debug_controls() -> String {
        let mut panel = DebugPanel::with_scene_controls();
        panel.register_ship_controls();
        panel.describe().to_string()
    }
}
