//! Asset loading.
//!
//! Everything here turns files into CPU-side data; nothing needs a device.
//! Models become [`ModelBundle`]s, textures become decoded images and the
//! [`loader::LoadingManager`] keeps count of what is still outstanding.

use crate::{
    data_structures::{
        instance::Instance,
        model::{MeshData, ModelVertex, Primitive},
        scene_graph::{ModelBundle, SceneNode},
    },
    error::AssetLoadError,
    resources::animation::{AnimationClip, Channel, Interpolation, Keyframes},
};

pub mod animation;
pub mod loader;
pub mod texture;

pub use texture::{load_binary, load_image};

/// Fetches a binary glTF file and parses it into a bundle.
pub async fn load_model_gltf(file_name: &str) -> Result<ModelBundle, AssetLoadError> {
    let bytes = load_binary(file_name).await?;
    parse_gltf(file_name, &bytes)
}

/// Parses a self-contained glTF (`.glb`, or `.gltf` with embedded buffers).
pub fn parse_gltf(file_name: &str, bytes: &[u8]) -> Result<ModelBundle, AssetLoadError> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|source| AssetLoadError::Gltf {
            path: file_name.to_string(),
            source,
        })?;

    let meshes = document
        .meshes()
        .map(|mesh| read_mesh(&mesh, &buffers))
        .collect::<Vec<_>>();

    let clips = document
        .animations()
        .enumerate()
        .map(|(idx, animation)| read_animation(idx, &animation, &buffers))
        .collect::<Vec<_>>();

    let mut root = SceneNode::new(file_name);
    if let Some(scene) = document
        .default_scene()
        .or_else(|| document.scenes().next())
    {
        for node in scene.nodes() {
            root.add_child(read_node(&node));
        }
    } else {
        log::warn!("{} contains no scene", file_name);
    }

    log::info!(
        "parsed {}: {} nodes, {} meshes, {} clips",
        file_name,
        root.count() - 1,
        meshes.len(),
        clips.len()
    );
    Ok(ModelBundle::new(file_name, root, meshes, clips))
}

fn read_node(node: &gltf::Node) -> SceneNode {
    let (position, rotation, scale) = node.transform().decomposed();
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));
    let mut scene_node = SceneNode::new(name)
        .with_index(node.index())
        .with_transform(Instance {
            position: position.into(),
            rotation: rotation.into(),
            scale: scale.into(),
        });
    if let Some(mesh) = node.mesh() {
        scene_node = scene_node.with_mesh(mesh.index());
    }
    for child in node.children() {
        scene_node.add_child(read_node(&child));
    }
    scene_node
}

fn read_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> MeshData {
    let primitives = mesh
        .primitives()
        .filter(|primitive| primitive.mode() == gltf::mesh::Mode::Triangles)
        .map(|primitive| {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

            let mut vertices: Vec<ModelVertex> = reader
                .read_positions()
                .map(|positions| {
                    positions
                        .map(|position| ModelVertex {
                            position,
                            ..Default::default()
                        })
                        .collect()
                })
                .unwrap_or_default();
            if let Some(normals) = reader.read_normals() {
                vertices
                    .iter_mut()
                    .zip(normals)
                    .for_each(|(vertex, normal)| vertex.normal = normal);
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                vertices
                    .iter_mut()
                    .zip(tex_coords)
                    .for_each(|(vertex, uv)| vertex.tex_coords = uv);
            }

            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            Primitive { vertices, indices }
        })
        .collect();

    MeshData {
        name: mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh{}", mesh.index())),
        primitives,
    }
}

fn read_animation(
    idx: usize,
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
) -> AnimationClip {
    let channels = animation
        .channels()
        .filter_map(|channel| {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
            let timestamps: Vec<f32> = reader.read_inputs()?.collect();
            let cubic = channel.sampler().interpolation()
                == gltf::animation::Interpolation::CubicSpline;
            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Step => Interpolation::Step,
                // cubic splines are sampled linearly between their key values
                _ => Interpolation::Linear,
            };
            let keyframes = match reader.read_outputs()? {
                gltf::animation::util::ReadOutputs::Translations(translations) => {
                    Keyframes::Translation(spline_values(translations.map(Into::into), cubic))
                }
                gltf::animation::util::ReadOutputs::Rotations(rotations) => Keyframes::Rotation(
                    spline_values(rotations.into_f32().map(Into::into), cubic),
                ),
                gltf::animation::util::ReadOutputs::Scales(scales) => {
                    Keyframes::Scale(spline_values(scales.map(Into::into), cubic))
                }
                gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => Keyframes::Other,
            };
            Some(Channel {
                node: channel.target().node().index(),
                keyframes,
                timestamps,
                interpolation,
            })
        })
        .collect();

    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("clip{}", idx));
    AnimationClip::new(name, channels)
}

/// Cubic-spline outputs store (in-tangent, value, out-tangent) per key; keep
/// the values only.
fn spline_values<T>(values: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}
