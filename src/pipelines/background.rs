use crate::{
    data_structures::texture::Texture,
    error::ShaderCompileError,
    materials::MaterialLayouts,
    pipelines::{PipelineOptions, compile_shader, mk_render_pipeline},
};

pub const BACKGROUND_SHADER: &str = include_str!("background.wgsl");

/// Full-screen triangle stretched over the viewport, drawn first and without
/// depth writes so all geometry lands in front of it.
pub fn mk_background_pipeline(
    device: &wgpu::Device,
    layouts: &MaterialLayouts,
) -> Result<wgpu::RenderPipeline, ShaderCompileError> {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Background Pipeline Layout"),
        bind_group_layouts: &[Some(&layouts.texture)],
        immediate_size: 0,
    });
    let shader = compile_shader(device, "background", BACKGROUND_SHADER)?;
    Ok(mk_render_pipeline(
        device,
        "Background Pipeline",
        &layout,
        Texture::TARGET_FORMAT,
        Some(Texture::DEPTH_FORMAT),
        &[],
        &shader,
        PipelineOptions {
            blend: Some(wgpu::BlendState::REPLACE),
            cull_mode: None,
            depth_write: false,
        },
    ))
}
