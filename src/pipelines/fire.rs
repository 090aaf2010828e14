use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    error::ShaderCompileError,
    materials::{FireProgram, MaterialLayouts},
    pipelines::{PipelineOptions, basic::geometry_layout, compile_shader, mk_render_pipeline},
};

/// Both programs share the vertex stage and the uniform block declared in
/// `fire_common.wgsl`.
pub const FIRE_A_SHADER: &str = concat!(include_str!("fire_common.wgsl"), include_str!("fire_a.wgsl"));
pub const FIRE_B_SHADER: &str = concat!(include_str!("fire_common.wgsl"), include_str!("fire_b.wgsl"));

/// Colour is added onto what is behind the flame, weighted by its opacity.
pub const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub fn mk_fire_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    layouts: &MaterialLayouts,
    program: FireProgram,
) -> Result<wgpu::RenderPipeline, ShaderCompileError> {
    let (label, source) = match program {
        FireProgram::A => ("fire_a", FIRE_A_SHADER),
        FireProgram::B => ("fire_b", FIRE_B_SHADER),
    };
    let layout = geometry_layout(device, "Fire Pipeline Layout", camera_layout, &layouts.fire);
    let shader = compile_shader(device, label, source)?;
    Ok(mk_render_pipeline(
        device,
        label,
        &layout,
        Texture::TARGET_FORMAT,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        &shader,
        PipelineOptions {
            blend: Some(ADDITIVE),
            cull_mode: None,
            depth_write: false,
        },
    ))
}
