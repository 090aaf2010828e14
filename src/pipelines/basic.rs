use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    error::ShaderCompileError,
    materials::MaterialLayouts,
    pipelines::{PipelineOptions, compile_shader, mk_render_pipeline},
};

pub const FLAT_SHADER: &str = include_str!("flat.wgsl");
pub const MATCAP_SHADER: &str = include_str!("matcap.wgsl");

pub(crate) fn geometry_layout(
    device: &wgpu::Device,
    label: &str,
    camera_layout: &wgpu::BindGroupLayout,
    material_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[Some(camera_layout), Some(material_layout)],
        immediate_size: 0,
    })
}

const OPAQUE: PipelineOptions = PipelineOptions {
    blend: Some(wgpu::BlendState::REPLACE),
    cull_mode: Some(wgpu::Face::Back),
    depth_write: true,
};

/// Unlit, texture-mapped geometry.
pub fn mk_flat_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    layouts: &MaterialLayouts,
) -> Result<wgpu::RenderPipeline, ShaderCompileError> {
    let layout = geometry_layout(device, "Flat Pipeline Layout", camera_layout, &layouts.texture);
    let shader = compile_shader(device, "flat", FLAT_SHADER)?;
    Ok(mk_render_pipeline(
        device,
        "Flat Pipeline",
        &layout,
        Texture::TARGET_FORMAT,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        &shader,
        OPAQUE,
    ))
}

/// Geometry shaded by a matcap lookup on the view-space normal.
pub fn mk_matcap_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    layouts: &MaterialLayouts,
) -> Result<wgpu::RenderPipeline, ShaderCompileError> {
    let layout = geometry_layout(
        device,
        "Matcap Pipeline Layout",
        camera_layout,
        &layouts.texture,
    );
    let shader = compile_shader(device, "matcap", MATCAP_SHADER)?;
    Ok(mk_render_pipeline(
        device,
        "Matcap Pipeline",
        &layout,
        Texture::TARGET_FORMAT,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        &shader,
        OPAQUE,
    ))
}
