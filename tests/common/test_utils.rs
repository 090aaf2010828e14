#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use cake_scene::{
    assembler::{FIRE_NODES, LEAF_NODES},
    data_structures::{
        model::{MeshData, ModelVertex, Primitive},
        scene_graph::{ModelBundle, SceneNode},
    },
    overlay::Overlay,
    resources::animation::{AnimationClip, Channel, Interpolation, Keyframes},
};
use cgmath::Vector3;

/// Top-level node names of the authored cake file.
pub const CAKE_NODES: [&str; 7] = [
    "Alas1",
    "BaseCake1",
    "Decor1",
    "NamePlate1",
    "Candle1",
    "Extra",
    "RedCherry",
];

pub fn triangle_mesh(name: &str) -> MeshData {
    let vertex = |x: f32, y: f32| ModelVertex {
        position: [x, y, 0.0],
        tex_coords: [x, y],
        normal: [0.0, 0.0, 1.0],
    };
    MeshData {
        name: name.to_string(),
        primitives: vec![Primitive {
            vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
            indices: vec![0, 1, 2],
        }],
    }
}

/// A cake bundle with every required node except `skip`. Each node carries
/// mesh 0; `Candle1` has a `Wick` child so inheritance can be checked.
pub fn cake_bundle_without(skip: &[&str]) -> ModelBundle {
    let mut root = SceneNode::new("models/birthday.glb");
    let names = CAKE_NODES.iter().chain(FIRE_NODES.iter());
    for (index, name) in names.enumerate() {
        if skip.contains(name) {
            continue;
        }
        let mut node = SceneNode::new(*name).with_index(index).with_mesh(0);
        if *name == "Candle1" {
            node.add_child(SceneNode::new("Wick").with_index(100).with_mesh(0));
        }
        root.add_child(node);
    }
    ModelBundle::new("models/birthday.glb", root, vec![triangle_mesh("cake")], vec![])
}

pub fn cake_bundle() -> ModelBundle {
    cake_bundle_without(&[])
}

/// Clip that moves node `node` from the origin to `(0, height, 0)` over one
/// second.
pub fn rise_clip(name: &str, node: usize, height: f32) -> AnimationClip {
    AnimationClip::new(
        name.to_string(),
        vec![Channel {
            node,
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, height, 0.0),
            ]),
            timestamps: vec![0.0, 1.0],
            interpolation: Interpolation::Linear,
        }],
    )
}

/// The particle bundle: one node per leaf emitter (glTF index = position in
/// [`LEAF_NODES`]) and one rising clip per node, `clip_count` in total.
pub fn particle_bundle(clip_count: usize) -> ModelBundle {
    let mut root = SceneNode::new("particle/particle.glb");
    for (index, name) in LEAF_NODES.iter().enumerate() {
        root.add_child(SceneNode::new(*name).with_index(index).with_mesh(0));
    }
    let clips = (0..clip_count)
        .map(|i| rise_clip(&format!("leaf{}", i), i % LEAF_NODES.len(), 1.0))
        .collect();
    ModelBundle::new(
        "particle/particle.glb",
        root,
        vec![triangle_mesh("leaf")],
        clips,
    )
}

/// Self-contained glTF: one triangle node named `Fire1` and a one-second clip
/// that lifts it by two units.
pub const EMBEDDED_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "name": "Fire1", "mesh": 0 } ],
  "meshes": [ { "name": "flame", "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
  "animations": [ {
    "name": "flicker",
    "channels": [ { "sampler": 0, "target": { "node": 0, "path": "translation" } } ],
    "samplers": [ { "input": 1, "output": 2, "interpolation": "LINEAR" } ]
  } ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] },
    { "bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0], "max": [1] },
    { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3" }
  ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 44, "byteLength": 24 }
  ],
  "buffers": [ {
    "byteLength": 68,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAAAAAAAAQAAAAAA="
  } ]
}"#;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// Overlay that writes every call it receives into a shared list.
pub struct RecordingOverlay {
    calls: Rc<RefCell<Vec<String>>>,
}

impl RecordingOverlay {
    pub fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl Overlay for RecordingOverlay {
    fn set_progress(&mut self, percent: u32) {
        self.record(format!("progress {}", percent));
    }

    fn hide_progress(&mut self) {
        self.record("hide progress".to_string());
    }

    fn show_content(&mut self) {
        self.record("content".to_string());
    }

    fn set_reveal_radius(&mut self, radius: f32) {
        self.record(format!("reveal {}", radius));
    }

    fn show_error(&mut self, message: &str) {
        self.record(format!("error {}", message));
    }

    fn show_retry(&mut self, failed: &[String]) {
        self.record(format!("retry {}", failed.join(",")));
    }
}
