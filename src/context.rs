//! GPU and window context shared by every flow.
//!
//! Owns the surface, device and queue plus everything that lives exactly as
//! long as they do: the camera and its controls, the material layouts, the
//! geometry pipelines and the bloom pass.

use std::sync::Arc;

use anyhow::Context as _;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::{CameraResources, PerspectiveCamera, Viewport},
    cancel::CancellationToken,
    config::SceneConfig,
    controls::OrbitControls,
    data_structures::texture::Texture,
    materials::MaterialLayouts,
    pipelines::{
        Pipelines,
        bloom::{BloomPass, BloomSettings},
    },
};

pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub(crate) pipelines: Pipelines,
    pub(crate) bloom: BloomPass,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub controls: OrbitControls,
    pub viewport: Viewport,
    pub layouts: MaterialLayouts,
    /// Written back to the bloom pass with [`Context::apply_bloom_settings`].
    pub bloom_settings: BloomSettings,
    pub clear_colour: wgpu::Color,
    pub max_pixel_ratio: f64,
    pub cancel: CancellationToken,
}

/// The parts of the [`Context`] a flow needs while it is being constructed.
///
/// Device and queue are reference counted handles; cloning them does not
/// duplicate GPU state.
#[derive(Clone, Debug)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub layouts: MaterialLayouts,
    pub cancel: CancellationToken,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            layouts: ctx.layouts.clone(),
            cancel: ctx.cancel.clone(),
        }
    }
}

impl Context {
    pub async fn new(
        window: Arc<Window>,
        scene: &SceneConfig,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let [width, height] = viewport.surface_size(scene.max_pixel_ratio);

        log::info!("WGPU setup");
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("could not open the GPU device")?;

        log::info!("surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders write linear colour; an sRGB surface does the display encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera = CameraResources::new(
            &device,
            PerspectiveCamera::new(&scene.camera, viewport.aspect()),
        );
        let mut controls = OrbitControls::new(scene.camera.target);
        controls.set_screen_height(height);

        let depth_texture = Texture::create_depth_texture(&device, [width, height], "depth_texture");
        let layouts = MaterialLayouts::new(&device);

        log::info!("pipelines");
        let pipelines = Pipelines::new(&device, &camera.bind_group_layout, &layouts)?;
        let mut bloom = BloomPass::new(&device, surface_format, [width, height], &scene.bloom)?;
        bloom.write_settings(&queue, &scene.bloom);

        Ok(Self {
            window,
            depth_texture,
            pipelines,
            bloom,
            surface,
            device,
            queue,
            config,
            camera,
            controls,
            viewport,
            layouts,
            bloom_settings: scene.bloom,
            clear_colour: scene.clear_colour,
            max_pixel_ratio: scene.max_pixel_ratio,
            cancel,
        })
    }

    /// Follows a window resize: new aspect ratio, surface capped at the
    /// maximum pixel ratio, depth and bloom targets at the new size.
    pub fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }
        self.viewport = Viewport::from_physical(size, scale_factor);
        let [width, height] = self.viewport.surface_size(self.max_pixel_ratio);
        log::debug!(
            "resize to {}x{} (pixel ratio {})",
            width,
            height,
            self.viewport.pixel_ratio(self.max_pixel_ratio)
        );

        self.camera.camera.set_aspect(self.viewport.aspect());
        self.controls.set_screen_height(height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.bloom.resize(&self.device, [width, height]);
        // texel size depends on the target size
        self.bloom.write_settings(&self.queue, &self.bloom_settings);
        true
    }

    pub fn apply_bloom_settings(&mut self) {
        self.bloom.write_settings(&self.queue, &self.bloom_settings);
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}
