//! Alpha-mapped point sprites for the starfield.
//!
//! Every particle is drawn as a camera-facing quad expanded in view space, so
//! sprites shrink with distance like attenuated points. The sprite's green
//! channel is the alpha map; sprites blend over the scene without writing
//! depth.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{model::Vertex, texture::Texture},
    pipelines::basic::{PipelineOptions, mk_render_pipeline},
};

/// Vertices per sprite quad (two triangles, no index buffer).
pub const SPRITE_VERTICES: u32 = 6;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    pub center: [f32; 3],
}

impl Vertex for PointVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointsUniform {
    pub model: [[f32; 4]; 4],
    /// Sprite edge length in world units at view distance 1 in `x`.
    pub size: [f32; 4],
    pub color: [f32; 4],
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("points_bind_group_layout"),
    })
}

/// GPU side of a point cloud: centers, uniform and sprite.
pub struct PointCloud {
    pub instance_buffer: wgpu::Buffer,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub amount: u32,
    #[allow(unused)]
    sprite: Texture,
}

impl PointCloud {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        centers: &[[f32; 3]],
        uniform: PointsUniform,
        sprite: Texture,
    ) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Instance Buffer"),
            contents: bytemuck::cast_slice(centers),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&sprite.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sprite.sampler),
                },
            ],
            label: Some("points_bind_group"),
        });
        Self {
            instance_buffer,
            uniform_buffer,
            bind_group,
            amount: centers.len() as u32,
            sprite,
        }
    }

    /// Overwrites the centers; `centers` must not outgrow the initial buffer.
    pub fn write_centers(&self, queue: &wgpu::Queue, centers: &[[f32; 3]]) {
        let count = centers.len().min(self.amount as usize);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&centers[..count]));
    }

    pub fn write_uniform(&self, queue: &wgpu::Queue, uniform: &PointsUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }
}

pub fn mk_points_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    points_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Points Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, points_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Points Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        PipelineOptions {
            label: "Points Pipeline",
            color_format: format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_write: false,
            cull_mode: None,
        },
        &[PointVertex::desc()],
        shader,
    )
}
