//! Scene graph of a loaded model.
//!
//! [`SceneNode`] is the CPU side: a plain tree of transforms with capability
//! tags, freely mutated by the session each tick. [`SceneModel`] pairs the tree
//! with the GPU meshes and one instance buffer per mesh node, and turns the tree
//! into draw calls.

use std::collections::HashMap;

use bitflags::bitflags;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::Model,
    },
    render::Instanced,
};

bitflags! {
    /// What a node is and what should happen to it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NodeCaps: u8 {
        const MESH = 1 << 0;
        const STANDARD_MATERIAL = 1 << 1;
        /// Shadow participation. No shadow pass reads these yet.
        const CAST_SHADOW = 1 << 2;
        const RECEIVE_SHADOW = 1 << 3;
        /// Material parameters changed and must be re-uploaded.
        const MATERIAL_DIRTY = 1 << 4;
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Unique within the tree, assigned depth-first by [`SceneNode::assign_ids`].
    pub id: usize,
    pub name: String,
    pub gltf_index: Option<usize>,
    /// Transform as authored in the file.
    pub base: Instance,
    /// Transform for the current frame, relative to the parent.
    pub local: Instance,
    pub world: Instance,
    pub mesh: Option<usize>,
    pub caps: NodeCaps,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            gltf_index: None,
            base: Instance::new(),
            local: Instance::new(),
            world: Instance::new(),
            mesh: None,
            caps: NodeCaps::empty(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Instance) -> Self {
        self.base = transform;
        self.local = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: usize, caps: NodeCaps) -> Self {
        self.mesh = Some(mesh);
        self.caps |= caps | NodeCaps::MESH;
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn child(&self, index: usize) -> Option<&SceneNode> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.children.get_mut(index)
    }

    /// Numbers the subtree depth-first starting at `next`; returns the next free id.
    pub fn assign_ids(&mut self, next: usize) -> usize {
        self.id = next;
        self.children
            .iter_mut()
            .fold(next + 1, |next, child| child.assign_ids(next))
    }

    pub fn traverse<F: FnMut(&SceneNode)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    pub fn traverse_mut<F: FnMut(&mut SceneNode)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Visits every node carrying all of `caps` and returns how many matched.
    pub fn traverse_tagged_mut<F: FnMut(&mut SceneNode)>(&mut self, caps: NodeCaps, f: &mut F) -> usize {
        let mut matched = 0;
        self.traverse_mut(&mut |node: &mut SceneNode| {
            if node.caps.contains(caps) {
                f(node);
                matched += 1;
            }
        });
        matched
    }

    /// Clears `caps` on every node carrying it and returns the meshes of
    /// those nodes, deduplicated, in traversal order.
    pub fn drain_tagged_meshes(&mut self, caps: NodeCaps) -> Vec<usize> {
        let mut meshes = Vec::new();
        self.traverse_mut(&mut |node: &mut SceneNode| {
            if !node.caps.contains(caps) {
                return;
            }
            node.caps.remove(caps);
            if let Some(mesh) = node.mesh {
                if !meshes.contains(&mesh) {
                    meshes.push(mesh);
                }
            }
        });
        meshes
    }

    pub fn find_by_gltf_index_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        if self.gltf_index == Some(index) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_gltf_index_mut(index))
    }

    /// Puts every local transform back to the authored one.
    pub fn reset_pose(&mut self) {
        self.traverse_mut(&mut |node: &mut SceneNode| node.local = node.base);
    }

    pub fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        let world = self.world;
        for child in &mut self.children {
            child.update_world_transforms(&world);
        }
    }

    pub fn len(&self) -> usize {
        1 + self.children.iter().map(SceneNode::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A scene graph ready to draw.
pub struct SceneModel {
    pub root: SceneNode,
    pub model: Model,
    buffers: HashMap<usize, wgpu::Buffer>,
}

impl SceneModel {
    pub fn new(device: &wgpu::Device, mut root: SceneNode, model: Model) -> Self {
        root.assign_ids(0);
        root.update_world_transforms(&Instance::new());
        let mut buffers = HashMap::new();
        root.traverse(&mut |node: &SceneNode| {
            if node.mesh.is_some() {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Instance Buffer", node.name)),
                    contents: bytemuck::cast_slice(&[node.world.to_raw()]),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                buffers.insert(node.id, buffer);
            }
        });
        Self {
            root,
            model,
            buffers,
        }
    }

    /// Uploads the factors of materials used by nodes flagged
    /// [`NodeCaps::MATERIAL_DIRTY`] and clears the flag. Returns how many
    /// materials were written.
    pub fn refresh_materials(&mut self, queue: &wgpu::Queue) -> usize {
        let mut materials: Vec<usize> = self
            .root
            .drain_tagged_meshes(NodeCaps::MATERIAL_DIRTY)
            .into_iter()
            .filter_map(|mesh| self.model.meshes.get(mesh))
            .flat_map(|mesh| mesh.primitives.iter().map(|primitive| primitive.material))
            .collect();
        materials.sort_unstable();
        materials.dedup();
        for &index in &materials {
            if let Some(material) = self.model.materials.get(index) {
                material.write(queue);
            }
        }
        materials.len()
    }

    /// Uploads the world transform of every mesh node.
    pub fn write_to_buffers(&self, queue: &wgpu::Queue) {
        self.root.traverse(&mut |node: &SceneNode| {
            if let Some(buffer) = self.buffers.get(&node.id) {
                let raw: [InstanceRaw; 1] = [node.world.to_raw()];
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(&raw));
            }
        });
    }

    pub fn get_render(&self) -> Vec<Instanced<'_>> {
        let mut draws = Vec::new();
        self.root.traverse(&mut |node: &SceneNode| {
            let (Some(mesh), Some(buffer)) = (node.mesh, self.buffers.get(&node.id)) else {
                return;
            };
            if let Some(mesh) = self.model.meshes.get(mesh) {
                draws.push(Instanced {
                    instance: buffer,
                    mesh,
                    materials: &self.model.materials,
                    amount: 1,
                });
            }
        });
        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn ship() -> SceneNode {
        let mut root = SceneNode::new("root");
        root.add_child(SceneNode::new("hull").with_mesh(0, NodeCaps::STANDARD_MATERIAL));
        let mut wing = SceneNode::new("wing").with_transform(Instance::from(Vector3::new(1.0, 0.0, 0.0)));
        wing.add_child(SceneNode::new("cannon").with_mesh(1, NodeCaps::empty()));
        root.add_child(wing);
        root
    }

    #[test]
    fn should_visit_only_tagged_nodes() {
        let mut root = ship();
        let matched = root.traverse_tagged_mut(NodeCaps::MESH | NodeCaps::STANDARD_MATERIAL, &mut |node| {
            node.caps |= NodeCaps::CAST_SHADOW;
        });
        assert_eq!(matched, 1);
        assert!(root.children[0].caps.contains(NodeCaps::CAST_SHADOW));
        assert!(!root.children[1].children[0].caps.contains(NodeCaps::CAST_SHADOW));
    }

    #[test]
    fn should_drain_flag_once() {
        let mut root = ship();
        root.children[0].caps |= NodeCaps::MATERIAL_DIRTY;
        root.children[1].children[0].caps |= NodeCaps::MATERIAL_DIRTY;
        root.children[1].caps |= NodeCaps::MATERIAL_DIRTY;

        assert_eq!(root.drain_tagged_meshes(NodeCaps::MATERIAL_DIRTY), vec![0, 1]);
        assert!(!root.children[1].caps.contains(NodeCaps::MATERIAL_DIRTY));
        assert!(root.drain_tagged_meshes(NodeCaps::MATERIAL_DIRTY).is_empty());
        assert!(root.children[0].caps.contains(NodeCaps::MESH));
    }

    #[test]
    fn should_number_nodes_depth_first() {
        let mut root = ship();
        assert_eq!(root.assign_ids(0), 4);
        assert_eq!(root.children[1].children[0].id, 3);
        assert_eq!(root.len(), 4);
    }

    #[test]
    fn should_propagate_world_transforms() {
        let mut root = ship();
        root.local = Instance::from(Vector3::new(0.0, 2.0, 0.0));
        root.update_world_transforms(&Instance::new());
        assert_eq!(root.children[1].children[0].world.position, Vector3::new(1.0, 2.0, 0.0));

        root.reset_pose();
        root.update_world_transforms(&Instance::new());
        assert_eq!(root.children[1].children[0].world.position, Vector3::new(1.0, 0.0, 0.0));
    }
}
