use anyhow::{Context, Result};

use crate::{
    data_structures::{model::Material, texture::Texture},
    resources::{join_relative, load_binary},
};

/// Base colour used for primitives that reference no material.
const DEFAULT_BASE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: Option<&str>,
) -> Result<Texture> {
    let data = load_binary(file_name).await?;
    Texture::from_bytes(device, queue, &data, file_name, format, false)
        .with_context(|| format!("Failed to decode texture {file_name}"))
}

/// Builds one [`Material`] per glTF material plus a trailing white default.
///
/// Only the base colour texture and factor are used; images are taken from
/// buffer views or fetched relative to `base_dir`.
pub(crate) async fn load_materials(
    document: &gltf::Document,
    buffer_data: &[Vec<u8>],
    base_dir: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> Result<Vec<Material>> {
    let mut materials = Vec::new();
    for material in document.materials() {
        let name = material
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("material-{}", materials.len()));
        let pbr = material.pbr_metallic_roughness();
        let image = pbr.base_color_texture().map(|info| info.texture().source());
        let diffuse = match image {
            Some(image) => load_image(image, buffer_data, base_dir, &name, device, queue).await?,
            None => Texture::solid(device, queue, [255; 4], &name),
        };
        materials.push(Material::new(device, &name, diffuse, pbr.base_color_factor(), layout));
    }

    let fallback = Texture::solid(device, queue, [255; 4], "default");
    materials.push(Material::new(device, "default", fallback, DEFAULT_BASE_COLOR, layout));
    Ok(materials)
}

async fn load_image(
    image: gltf::Image<'_>,
    buffer_data: &[Vec<u8>],
    base_dir: &str,
    label: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<Texture> {
    match image.source() {
        gltf::image::Source::View { view, mime_type } => {
            let buffer = buffer_data
                .get(view.buffer().index())
                .with_context(|| format!("Image of {label} points at a missing buffer"))?;
            let bytes = buffer
                .get(view.offset()..view.offset() + view.length())
                .with_context(|| format!("Image view of {label} exceeds its buffer"))?;
            Texture::from_bytes(device, queue, bytes, label, mime_type.split('/').last(), false)
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            let format = mime_type.and_then(|mime| mime.split('/').last());
            load_texture(&join_relative(base_dir, uri), device, queue, format).await
        }
    }
}
