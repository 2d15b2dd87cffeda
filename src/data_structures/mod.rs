//! Scene data: transforms, meshes and materials, textures and the node tree.
//!
//! - `instance` holds node transforms and their instance-buffer layout
//! - `model` contains GPU meshes, materials and the draw trait
//! - `scene_graph` is the node hierarchy of a loaded model
//! - `texture` wraps GPU textures and their samplers

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
