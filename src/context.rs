use std::sync::Arc;

use anyhow::{Context as _, Result};
use winit::window::Window;

use crate::{
    camera::{CameraResources, PerspectiveCamera},
    config::{CameraConfig, LightsConfig},
    data_structures::texture::Texture,
    pipelines::{Pipelines, light::LightResources},
    session::SceneLights,
    viewport::Viewport,
};

/// Black, the clear colour until the scene is set up.
pub const DEFAULT_CLEAR: wgpu::Color = wgpu::Color::BLACK;

/// Dark red, used while the ship cannot be shown.
pub const FAILURE_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.35,
    g: 0.02,
    b: 0.02,
    a: 1.0,
};

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub lights: LightResources,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
    pub viewport: Viewport,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());
        let surface_size = viewport.surface_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter can present to this surface")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL2 only covers the downlevel limits
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders write linear colour and rely on an sRGB target for the encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: surface_size.width,
            height: surface_size.height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = CameraResources::new(
            &device,
            &PerspectiveCamera::new(&CameraConfig::default(), viewport.aspect()),
        );
        let lights = LightResources::new(&device, &SceneLights::from_config(&LightsConfig::default())?);
        let pipelines = Pipelines::new(
            &device,
            config.format,
            &camera.bind_group_layout,
            &lights.bind_group_layout,
        );

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            lights,
            pipelines,
            clear_colour: DEFAULT_CLEAR,
            viewport,
        })
    }

    /// Follows a physical window size change. Returns `false` for a zero-sized
    /// window, in which case the surface keeps its previous configuration.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let size = self.viewport.resize_physical(width, height, scale_factor);
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
        true
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

/// The handles a flow needs to build its own GPU resources.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub material_layout: wgpu::BindGroupLayout,
    pub points_layout: wgpu::BindGroupLayout,
    pub viewport: Viewport,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        // wgpu handles are reference counted, cloning only bumps the count
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            format: ctx.config.format,
            material_layout: ctx.pipelines.material_layout.clone(),
            points_layout: ctx.pipelines.points_layout.clone(),
            viewport: ctx.viewport,
        }
    }
}
