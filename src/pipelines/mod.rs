//! Render pipelines.
//!
//! Geometry pipelines draw into the off-screen scene target; the bloom pass
//! reads that target and writes the final image to the surface.
//!
//! Bind group 0 of every geometry pipeline is the camera, group 1 is the
//! material. All WGSL goes through [`compile_shader`], which validates it with
//! naga before handing it to the device.

use crate::{error::ShaderCompileError, materials::MaterialLayouts};

pub mod background;
pub mod basic;
pub mod bloom;
pub mod fire;
pub mod transparent;

/// Every WGSL program of the crate with its label.
pub const SHADERS: [(&str, &str); 6] = [
    ("flat", basic::FLAT_SHADER),
    ("matcap", basic::MATCAP_SHADER),
    ("fire_a", fire::FIRE_A_SHADER),
    ("fire_b", fire::FIRE_B_SHADER),
    ("background", background::BACKGROUND_SHADER),
    ("bloom", bloom::BLOOM_SHADER),
];

/// Parses and validates WGSL.
pub fn validate_wgsl(label: &str, source: &str) -> Result<naga::Module, ShaderCompileError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderCompileError {
        label: label.to_string(),
        message: e.emit_to_string(source),
    })?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| ShaderCompileError {
        label: label.to_string(),
        message: format!("{:?}", e),
    })?;
    Ok(module)
}

pub fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
) -> Result<wgpu::ShaderModule, ShaderCompileError> {
    validate_wgsl(label, source)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}

/// Rasterizer and depth settings that vary between the geometry pipelines.
#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    pub blend: Option<wgpu::BlendState>,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
    options: PipelineOptions,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: options.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: options.cull_mode,
            ..Default::default()
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(options.depth_write),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}

/// All geometry pipelines of the scene pass.
#[derive(Debug)]
pub struct Pipelines {
    pub background: wgpu::RenderPipeline,
    pub flat: wgpu::RenderPipeline,
    pub matcap: wgpu::RenderPipeline,
    pub translucent: wgpu::RenderPipeline,
    pub fire_a: wgpu::RenderPipeline,
    pub fire_b: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        layouts: &MaterialLayouts,
    ) -> Result<Self, ShaderCompileError> {
        Ok(Self {
            background: background::mk_background_pipeline(device, layouts)?,
            flat: basic::mk_flat_pipeline(device, camera_layout, layouts)?,
            matcap: basic::mk_matcap_pipeline(device, camera_layout, layouts)?,
            translucent: transparent::mk_translucent_pipeline(device, camera_layout, layouts)?,
            fire_a: fire::mk_fire_pipeline(
                device,
                camera_layout,
                layouts,
                crate::materials::FireProgram::A,
            )?,
            fire_b: fire::mk_fire_pipeline(
                device,
                camera_layout,
                layouts,
                crate::materials::FireProgram::B,
            )?,
        })
    }
}
