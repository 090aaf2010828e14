//! Scene graph of named nodes.
//!
//! A loaded glTF file becomes a [`ModelBundle`]: a container node whose direct
//! children are the roots of the file's default scene, plus the CPU-side meshes
//! and animation clips the nodes refer to. Bundles are built and validated
//! without touching the GPU; [`GpuBundle`] is the uploaded counterpart that is
//! created once a bundle has been assembled into the scene.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::{GpuMesh, MeshData},
    },
    materials::{GpuMaterials, MaterialKey, MaterialKind, MaterialBank},
    render::{Drawable, Render},
    resources::animation::{AnimationClip, Sample},
};

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    /// glTF node index; `None` for nodes created by the application.
    pub index: Option<usize>,
    pub local: Instance,
    world: Instance,
    /// Index into the owning bundle's meshes.
    pub mesh: Option<usize>,
    pub material: Option<MaterialKey>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            local: Instance::new(),
            world: Instance::new(),
            mesh: None,
            material: None,
            children: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, local: Instance) -> Self {
        self.local = local;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Exact-name lookup among the direct children only.
    pub fn find_child(&self, name: &str) -> Option<&SceneNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// Depth-first search for the node with the given glTF index.
    pub fn find_by_index_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        if self.index == Some(index) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_index_mut(index))
    }

    pub fn world_transform(&self) -> &Instance {
        &self.world
    }

    pub fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }

    fn collect_drawables(&self, inherited: Option<MaterialKey>, out: &mut Vec<DrawableNode>) {
        let material = self.material.or(inherited);
        if let Some(mesh) = self.mesh {
            out.push(DrawableNode {
                mesh,
                world: self.world,
                material,
            });
        }
        for child in &self.children {
            child.collect_drawables(material, out);
        }
    }
}

/// A mesh-carrying node resolved for drawing.
///
/// Nodes without a material of their own draw with the nearest ancestor's.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawableNode {
    pub mesh: usize,
    pub world: Instance,
    pub material: Option<MaterialKey>,
}

#[derive(Clone, Debug)]
pub struct ModelBundle {
    /// Asset path the bundle was loaded from.
    pub name: String,
    pub root: SceneNode,
    pub meshes: Vec<MeshData>,
    pub clips: Vec<AnimationClip>,
}

impl ModelBundle {
    pub fn new(
        name: impl Into<String>,
        root: SceneNode,
        meshes: Vec<MeshData>,
        clips: Vec<AnimationClip>,
    ) -> Self {
        let mut bundle = Self {
            name: name.into(),
            root,
            meshes,
            clips,
        };
        bundle.update_world_transforms();
        bundle
    }

    pub fn update_world_transforms(&mut self) {
        self.root.update_world_transforms(&Instance::new());
    }

    /// Drawable nodes in depth-first order. The order is stable for a given
    /// tree, which is what ties each node to its instance buffer.
    pub fn drawables(&self) -> Vec<DrawableNode> {
        let mut out = Vec::new();
        self.root.collect_drawables(None, &mut out);
        out
    }

    /// Writes sampled keyframe values into the local transforms of the
    /// animated nodes. World transforms are left for the caller to refresh.
    pub fn apply_sample(&mut self, node: usize, sample: Sample) {
        let Some(target) = self.root.find_by_index_mut(node) else {
            return;
        };
        match sample {
            Sample::Translation(position) => target.local.position = position,
            Sample::Rotation(rotation) => target.local.rotation = rotation,
            Sample::Scale(scale) => target.local.scale = scale,
        }
    }
}

struct DrawSlot {
    mesh: usize,
    material: Option<MaterialKey>,
    instance_buffer: wgpu::Buffer,
}

/// GPU buffers of an assembled bundle: one mesh upload per glTF mesh and one
/// single-instance buffer per drawable node.
pub struct GpuBundle {
    meshes: Vec<GpuMesh>,
    slots: Vec<DrawSlot>,
}

impl GpuBundle {
    pub fn upload(device: &wgpu::Device, bundle: &ModelBundle) -> Self {
        let meshes = bundle
            .meshes
            .iter()
            .map(|mesh| GpuMesh::upload(device, mesh))
            .collect();
        let slots = bundle
            .drawables()
            .into_iter()
            .map(|drawable| DrawSlot {
                mesh: drawable.mesh,
                material: drawable.material,
                instance_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Instance Buffer", bundle.name)),
                    contents: bytemuck::cast_slice(&[drawable.world.to_raw()]),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                }),
            })
            .collect();
        Self { meshes, slots }
    }

    /// Re-writes every instance buffer from the bundle's current world
    /// transforms.
    pub fn write_transforms(&self, queue: &wgpu::Queue, bundle: &ModelBundle) {
        let drawables = bundle.drawables();
        if drawables.len() != self.slots.len() {
            log::warn!(
                "bundle `{}` changed shape after upload ({} drawables, {} slots)",
                bundle.name,
                drawables.len(),
                self.slots.len()
            );
        }
        for (slot, drawable) in self.slots.iter().zip(drawables) {
            let raw: InstanceRaw = drawable.world.to_raw();
            queue.write_buffer(&slot.instance_buffer, 0, bytemuck::cast_slice(&[raw]));
        }
    }

    pub fn get_render<'a>(&'a self, bank: &MaterialBank, gpu: &'a GpuMaterials) -> Render<'a> {
        let renders = self
            .slots
            .iter()
            .filter_map(|slot| {
                let mesh = self.meshes.get(slot.mesh)?;
                let Some(key) = slot.material else {
                    return Some(Render::Flat(Drawable {
                        instance: &slot.instance_buffer,
                        mesh,
                        material: gpu.fallback(),
                    }));
                };
                let drawable = Drawable {
                    instance: &slot.instance_buffer,
                    mesh,
                    material: gpu.bind_group(key)?,
                };
                Some(match bank.get(key).kind {
                    MaterialKind::Flat { .. } => Render::Flat(drawable),
                    MaterialKind::Matcap { .. } => Render::Matcap(drawable),
                    MaterialKind::Translucent { .. } => Render::Translucent(drawable),
                    MaterialKind::Fire { program, .. } => Render::Fire(program, drawable),
                })
            })
            .collect();
        Render::Composed(renders)
    }
}
