//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn by returning a [`Render`]. The loop
//! sorts the pieces into per-pipeline batches: opaque meshes first, then
//! alpha-blended point sprites on top.

use crate::data_structures::model::{Material, Mesh};

/// A mesh drawn with an instance buffer of world transforms.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub materials: &'a [Material],
    pub amount: u32,
}

/// Camera-facing sprites, one per entry of `instance` (a buffer of centers).
pub struct Points<'a> {
    pub instance: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
    pub amount: u32,
}

pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Points(Points<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, points: &mut Vec<Points<'a>>) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Points(sprites) => points.push(sprites),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, points)),
            Render::None => (),
        }
    }
}
