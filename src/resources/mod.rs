//! Loading of external files: text, binaries, textures and glTF models.
//!
//! Natively every path is resolved against `./assets`; on the web it is
//! fetched from `<origin>/assets/`.

use anyhow::{Context, Result, bail};
use cgmath::Quaternion;

use crate::data_structures::{
    instance::Instance,
    model::{self, ModelVertex},
    scene_graph::{NodeCaps, SceneNode},
};
use wgpu::util::DeviceExt;

pub mod animation;
pub mod texture;

use animation::Clip;

/// Extensions a file may require that this loader cannot decode.
const UNSUPPORTED_EXTENSIONS: [&str; 2] = ["KHR_draco_mesh_compression", "EXT_meshopt_compression"];

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> Result<reqwest::Url> {
    let window = web_sys::window().context("No browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|err| anyhow::anyhow!("Cannot read the page origin: {err:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn asset_path(file_name: &str) -> std::path::PathBuf {
    std::path::Path::new("./").join("assets").join(file_name)
}

pub async fn load_string(file_name: &str) -> Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = tokio::fs::read_to_string(asset_path(file_name)).await?;

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(asset_path(file_name)).await?;

    Ok(data)
}

/// Directory part of an asset path, with a trailing slash when non-empty.
pub(crate) fn parent_dir(file_name: &str) -> &str {
    match file_name.rfind('/') {
        Some(idx) => &file_name[..=idx],
        None => "",
    }
}

/// Resolves a relative reference from inside a file in `base_dir`.
pub(crate) fn join_relative(base_dir: &str, uri: &str) -> String {
    format!("{base_dir}{uri}")
}

/// A model straight out of a glTF file, not yet on the scene.
pub struct LoadedShip {
    /// Container whose children are the default scene's top-level nodes.
    pub root: SceneNode,
    pub model: model::Model,
    pub clips: Vec<Clip>,
}

impl std::fmt::Debug for LoadedShip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedShip")
            .field("nodes", &self.root.len())
            .field("meshes", &self.model.meshes.len())
            .field("clips", &self.clips.len())
            .finish()
    }
}

pub async fn load_ship(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    material_layout: &wgpu::BindGroupLayout,
) -> Result<LoadedShip> {
    let bytes = load_binary(file_name)
        .await
        .with_context(|| format!("Failed to fetch model {file_name}"))?;
    let gltf = gltf::Gltf::from_slice(&bytes)
        .with_context(|| format!("Failed to parse model {file_name}"))?;
    if let Some(ext) = gltf
        .extensions_required()
        .find(|ext| UNSUPPORTED_EXTENSIONS.contains(ext))
    {
        bail!("Model {file_name} requires the unsupported extension {ext}");
    }
    let base_dir = parent_dir(file_name);

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .with_context(|| format!("Model {file_name} lacks its binary chunk"))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                if uri.starts_with("data:") {
                    bail!("Model {file_name} embeds a data URI buffer, which is not supported");
                }
                buffer_data.push(load_binary(&join_relative(base_dir, uri)).await?);
            }
        }
    }

    let materials = texture::load_materials(
        &gltf,
        &buffer_data,
        base_dir,
        device,
        queue,
        material_layout,
    )
    .await?;
    let default_material = materials.len() - 1;

    let meshes = gltf
        .meshes()
        .map(|mesh| read_mesh(&mesh, &buffer_data, device, default_material))
        .collect::<Result<Vec<_>>>()?;

    let clips = animation::read_clips(&gltf, &buffer_data);

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .with_context(|| format!("Model {file_name} contains no scene"))?;
    let mut root = SceneNode::new(scene.name().unwrap_or(file_name));
    for node in scene.nodes() {
        root.add_child(to_scene_node(&node));
    }
    log::info!(
        "Loaded {file_name}: {} top-level nodes, {} meshes, {} clips",
        root.children.len(),
        meshes.len(),
        clips.len()
    );

    Ok(LoadedShip {
        root,
        model: model::Model { meshes, materials },
        clips,
    })
}

fn to_scene_node(node: &gltf::Node<'_>) -> SceneNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Instance {
        position: translation.into(),
        rotation: Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: scale.into(),
    };
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node-{}", node.index()));
    let mut scene_node = SceneNode::new(name).with_transform(transform);
    scene_node.gltf_index = Some(node.index());
    if let Some(mesh) = node.mesh() {
        // glTF materials are metallic-roughness, the standard lit model
        scene_node = scene_node.with_mesh(mesh.index(), NodeCaps::STANDARD_MATERIAL);
    }
    for child in node.children() {
        scene_node.add_child(to_scene_node(&child));
    }
    scene_node
}

fn read_mesh(
    mesh: &gltf::Mesh<'_>,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    default_material: usize,
) -> Result<model::Mesh> {
    let name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh-{}", mesh.index()));
    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping non-triangle primitive in mesh {name}");
            continue;
        }
        let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
        let positions = reader
            .read_positions()
            .with_context(|| format!("Mesh {name} has a primitive without positions"))?;
        let mut vertices: Vec<ModelVertex> = positions
            .map(|position| ModelVertex {
                position,
                ..Default::default()
            })
            .collect();
        if let Some(normals) = reader.read_normals() {
            vertices
                .iter_mut()
                .zip(normals)
                .for_each(|(vertex, normal)| vertex.normal = normal);
        }
        if let Some(tex_coords) = reader.read_tex_coords(0) {
            vertices
                .iter_mut()
                .zip(tex_coords.into_f32())
                .for_each(|(vertex, uv)| vertex.tex_coords = uv);
        }
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        primitives.push(model::Primitive {
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            material: primitive.material().index().unwrap_or(default_material),
        });
    }
    Ok(model::Mesh { name, primitives })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_uris_next_to_the_model() {
        let base = parent_dir("models/xWing/xWing-separate-wings.glb");
        assert_eq!(base, "models/xWing/");
        assert_eq!(join_relative(base, "hull.png"), "models/xWing/hull.png");
        assert_eq!(parent_dir("ship.glb"), "");
    }
}
