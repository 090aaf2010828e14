//! Scene configuration.
//!
//! [`SceneConfig`] gathers every tunable the scene starts with. The defaults are
//! the values the scene was authored with; nothing here is validated, values out
//! of the authored range only change the look of the scene.

use instant::Duration;

use crate::{materials::FireUniforms, pipelines::bloom::BloomSettings};

/// Environment variable that shows the debug panel on native builds.
pub const DEBUG_ENV: &str = "CAKE_SCENE_DEBUG";

/// URL fragment that shows the debug panel in the browser.
pub const DEBUG_FRAGMENT: &str = "#debug";

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub start: cgmath::Point3<f32>,
    /// Where the intro fly-in ends.
    pub framing: cgmath::Point3<f32>,
    pub target: cgmath::Point3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            near: 0.1,
            far: 2000.0,
            start: cgmath::Point3::new(0.0, 0.9, 0.75),
            framing: cgmath::Point3::new(0.0, 1.2, 2.0),
            target: cgmath::Point3::new(0.0, 0.0, 0.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub cake_model: &'static str,
    pub particle_model: &'static str,
    pub audio: &'static str,
    pub camera: CameraConfig,
    pub bloom: BloomSettings,
    pub fire: FireUniforms,
    /// Upper bound for the device pixel ratio used to size the surface.
    pub max_pixel_ratio: f64,
    /// Pause between the end of loading and revealing the start button.
    pub reveal_delay: Duration,
    pub debug: bool,
    pub clear_colour: wgpu::Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cake_model: "models/birthday.glb",
            particle_model: "particle/particle.glb",
            audio: "songs/bgsong.mp3",
            camera: CameraConfig::default(),
            bloom: BloomSettings::default(),
            fire: FireUniforms::default(),
            max_pixel_ratio: 2.0,
            reveal_delay: Duration::from_secs(2),
            debug: false,
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

impl SceneConfig {
    /// Defaults plus the debug toggle read from the host environment.
    pub fn from_environment() -> Self {
        Self {
            debug: debug_requested(),
            ..Default::default()
        }
    }
}

/// `true` when the location fragment is exactly `#debug`.
pub fn is_debug_fragment(hash: &str) -> bool {
    hash == DEBUG_FRAGMENT
}

#[cfg(target_arch = "wasm32")]
fn debug_requested() -> bool {
    web_sys::window()
        .and_then(|window| window.location().hash().ok())
        .is_some_and(|hash| is_debug_fragment(&hash))
}

#[cfg(not(target_arch = "wasm32"))]
fn debug_requested() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true"))
        .unwrap_or(false)
}
