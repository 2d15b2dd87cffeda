//! Render pipelines: lit meshes and point sprites.

pub mod basic;
pub mod light;
pub mod points;

use crate::data_structures::model::Material;

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub points: wgpu::RenderPipeline,
    pub material_layout: wgpu::BindGroupLayout,
    pub points_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let material_layout = Material::layout(device);
        let points_layout = points::mk_bind_group_layout(device);
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                format,
                &material_layout,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            points: points::mk_points_pipeline(device, format, camera_bind_group_layout, &points_layout),
            material_layout,
            points_layout,
        }
    }
}
