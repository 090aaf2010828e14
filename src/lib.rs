//! cake-scene
//!
//! An interactive birthday-cake scene for native windows and the browser
//! (WebGL2 through wgpu). Two glTF bundles are loaded, their named nodes are
//! bound to a fixed bank of materials, the flames run on a shared uniform
//! block, particle clips play on a staggered schedule and everything passes
//! through a bloom post-process. A click starts the intro: the loading mask
//! closes, the music starts and the camera flies in before the orbit controls
//! unlock.
//!
//! High-level modules
//! - `resources`: fetching assets, glTF parsing, progress bookkeeping
//! - `materials`: the material bank and the shared fire uniforms
//! - `assembler`: node-to-material manifests validated against loaded bundles
//! - `mixer`: staggered animation clip playback
//! - `camera`, `controls`: perspective camera, viewport sizing, orbit controls
//! - `pipelines`, `render`: geometry pipelines, bloom and frame composition
//! - `frame`, `intro`, `debug`: frame clock, intro timeline, debug panel
//! - `overlay`, `audio`: the page around the canvas
//! - `context`, `flow`: GPU context and the winit event loop
//! - `experience`: the scene flow that wires it all together

pub mod assembler;
pub mod audio;
pub mod camera;
pub mod cancel;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod debug;
pub mod error;
pub mod experience;
pub mod flow;
pub mod frame;
pub mod intro;
pub mod materials;
pub mod mixer;
pub mod overlay;
pub mod pipelines;
pub mod render;
pub mod resources;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Runs the scene with the configuration taken from the host environment.
pub fn run() -> anyhow::Result<()> {
    let config = config::SceneConfig::from_environment();
    flow::run(vec![experience::Experience::constructor(config.clone())], config)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
