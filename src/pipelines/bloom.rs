//! Bloom post-processing.
//!
//! The scene is rendered into an off-screen target. Bloom then runs four
//! full-screen passes:
//!
//! 1. bright pass: scene → half-resolution `ping`, keeping texels above the
//!    luminance threshold
//! 2. horizontal blur: `ping` → `pong`
//! 3. vertical blur: `pong` → `ping`
//! 4. composite: scene + `ping` × strength → surface
//!
//! With bloom disabled only the composite runs, with a zero factor.

use wgpu::util::DeviceExt;

use crate::{data_structures::texture::Texture, error::ShaderCompileError, pipelines::compile_shader};

pub const BLOOM_SHADER: &str = include_str!("bloom.wgsl");

/// Live-tunable bloom parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomSettings {
    pub enabled: bool,
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 0.2,
            radius: 0.2,
            threshold: 0.1,
        }
    }
}

/// Layout matches `BloomParams` in `bloom.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomParams {
    direction: [f32; 2],
    texel: [f32; 2],
    threshold: f32,
    strength: f32,
    radius: f32,
    _padding: f32,
}

impl BloomParams {
    fn from_settings(settings: &BloomSettings, direction: [f32; 2], texel: [f32; 2]) -> Self {
        Self {
            direction,
            texel,
            threshold: settings.threshold,
            strength: if settings.enabled { settings.strength } else { 0.0 },
            radius: settings.radius,
            _padding: 0.0,
        }
    }
}

struct BloomTargets {
    scene: Texture,
    ping: Texture,
    pong: Texture,
    bright: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

struct BloomBuffers {
    bright: wgpu::Buffer,
    blur_h: wgpu::Buffer,
    blur_v: wgpu::Buffer,
    composite: wgpu::Buffer,
}

pub struct BloomPass {
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    single_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    buffers: BloomBuffers,
    targets: BloomTargets,
    size: [u32; 2],
    enabled: bool,
}

fn layout_entries(with_bloom: bool) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
    ];
    if with_bloom {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 3,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        });
    }
    entries
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    entry_point: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[Some(bind_group_layout)],
        immediate_size: 0,
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(entry_point),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    source: &Texture,
    params: &wgpu::Buffer,
    bloom: Option<&Texture>,
) -> wgpu::BindGroup {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&source.view),
        },
        wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::Sampler(&source.sampler),
        },
        wgpu::BindGroupEntry {
            binding: 2,
            resource: params.as_entire_binding(),
        },
    ];
    if let Some(bloom) = bloom {
        entries.push(wgpu::BindGroupEntry {
            binding: 3,
            resource: wgpu::BindingResource::TextureView(&bloom.view),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some(label),
    })
}

fn half(size: [u32; 2]) -> [u32; 2] {
    [(size[0] / 2).max(1), (size[1] / 2).max(1)]
}

impl BloomPass {
    /// `output_format` is the format of the surface the composite writes to.
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        size: [u32; 2],
        settings: &BloomSettings,
    ) -> Result<Self, ShaderCompileError> {
        let shader = compile_shader(device, "bloom", BLOOM_SHADER)?;
        let single_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &layout_entries(false),
            label: Some("bloom_bind_group_layout"),
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &layout_entries(true),
            label: Some("bloom_composite_bind_group_layout"),
        });

        let bright_pipeline = fullscreen_pipeline(
            device,
            "Bloom Bright Pipeline",
            &single_layout,
            &shader,
            "fs_bright",
            Texture::TARGET_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "Bloom Blur Pipeline",
            &single_layout,
            &shader,
            "fs_blur",
            Texture::TARGET_FORMAT,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "Bloom Composite Pipeline",
            &composite_layout,
            &shader,
            "fs_composite",
            output_format,
        );

        let params = |label: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&[BloomParams::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let buffers = BloomBuffers {
            bright: params("Bloom Bright Params"),
            blur_h: params("Bloom Blur H Params"),
            blur_v: params("Bloom Blur V Params"),
            composite: params("Bloom Composite Params"),
        };
        let targets =
            Self::create_targets(device, &single_layout, &composite_layout, &buffers, size);

        Ok(Self {
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            single_layout,
            composite_layout,
            buffers,
            targets,
            size,
            enabled: settings.enabled,
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        single_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
        buffers: &BloomBuffers,
        size: [u32; 2],
    ) -> BloomTargets {
        let scene = Texture::create_render_target(device, size, Texture::TARGET_FORMAT, "scene_target");
        let ping = Texture::create_render_target(device, half(size), Texture::TARGET_FORMAT, "bloom_ping");
        let pong = Texture::create_render_target(device, half(size), Texture::TARGET_FORMAT, "bloom_pong");
        let bright = bind_group(device, single_layout, "bloom_bright", &scene, &buffers.bright, None);
        let blur_h = bind_group(device, single_layout, "bloom_blur_h", &ping, &buffers.blur_h, None);
        let blur_v = bind_group(device, single_layout, "bloom_blur_v", &pong, &buffers.blur_v, None);
        let composite = bind_group(
            device,
            composite_layout,
            "bloom_composite",
            &scene,
            &buffers.composite,
            Some(&ping),
        );
        BloomTargets {
            scene,
            ping,
            pong,
            bright,
            blur_h,
            blur_v,
            composite,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.targets = Self::create_targets(
            device,
            &self.single_layout,
            &self.composite_layout,
            &self.buffers,
            size,
        );
    }

    /// The view the geometry pass renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    pub fn write_settings(&mut self, queue: &wgpu::Queue, settings: &BloomSettings) {
        self.enabled = settings.enabled;
        let [w, h] = half(self.size);
        let texel = [1.0 / w as f32, 1.0 / h as f32];
        let write = |buffer: &wgpu::Buffer, params: BloomParams| {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[params]));
        };
        write(&self.buffers.bright, BloomParams::from_settings(settings, [0.0, 0.0], texel));
        write(&self.buffers.blur_h, BloomParams::from_settings(settings, [1.0, 0.0], texel));
        write(&self.buffers.blur_v, BloomParams::from_settings(settings, [0.0, 1.0], texel));
        write(&self.buffers.composite, BloomParams::from_settings(settings, [0.0, 0.0], texel));
    }

    fn pass(
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        target: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    /// Records the bloom passes, ending with the composite into `output`.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let targets = &self.targets;
        if self.enabled {
            Self::pass(encoder, "Bloom Bright", &self.bright_pipeline, &targets.bright, &targets.ping.view);
            Self::pass(encoder, "Bloom Blur H", &self.blur_pipeline, &targets.blur_h, &targets.pong.view);
            Self::pass(encoder, "Bloom Blur V", &self.blur_pipeline, &targets.blur_v, &targets.ping.view);
        }
        Self::pass(
            encoder,
            "Bloom Composite",
            &self.composite_pipeline,
            &targets.composite,
            output,
        );
    }
}
