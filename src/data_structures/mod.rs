//! Scene data structures: transforms, meshes, textures and the scene graph.
//!
//! - `instance` holds node transforms and their GPU layout
//! - `model` contains the vertex layout, CPU meshes and their uploads
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `scene_graph` holds named nodes, loaded bundles and their GPU buffers

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
