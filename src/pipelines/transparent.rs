use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    error::ShaderCompileError,
    materials::MaterialLayouts,
    pipelines::{
        PipelineOptions,
        basic::{FLAT_SHADER, geometry_layout},
        compile_shader, mk_render_pipeline,
    },
};

/**
 * Alpha-blended, double-sided geometry (the falling leaves).
 *
 * Runs the flat shader; only blending, culling and depth writes differ.
 * Translucent draws are issued after every opaque draw.
 */
pub fn mk_translucent_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    layouts: &MaterialLayouts,
) -> Result<wgpu::RenderPipeline, ShaderCompileError> {
    let layout = geometry_layout(
        device,
        "Translucent Pipeline Layout",
        camera_layout,
        &layouts.texture,
    );
    let shader = compile_shader(device, "translucent", FLAT_SHADER)?;
    Ok(mk_render_pipeline(
        device,
        "Translucent Pipeline",
        &layout,
        Texture::TARGET_FORMAT,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        &shader,
        PipelineOptions {
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            cull_mode: None,
            depth_write: false,
        },
    ))
}
