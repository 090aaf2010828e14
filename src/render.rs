//! Render composition.
//!
//! A flow describes what it wants drawn with a [`Render`] tree. The tree is
//! flattened into per-pipeline batches and drawn in a fixed order:
//!
//! 1. background
//! 2. flat geometry, then matcap geometry (depth writes on)
//! 3. translucent leaves
//! 4. both flame programs (additive, no depth writes)
//!
//! The geometry pass targets the off-screen scene texture; the bloom pass
//! composites it onto the surface. A native debug panel is drawn last, on top
//! of the composite.

use std::iter;

use crate::{
    context::Context,
    data_structures::model::{DrawMesh, GpuMesh},
    materials::FireProgram,
};

/// One mesh, its single-instance buffer and its material bind group.
pub struct Drawable<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a GpuMesh,
    pub material: &'a wgpu::BindGroup,
}

/// Describes what to draw this frame.
///
/// - `None` draws nothing
/// - `Background(bind_group)` fills the viewport with a texture
/// - `Flat`, `Matcap`, `Translucent` draw geometry with the respective material kind
/// - `Fire(program, drawable)` draws a flame with one of the two programs
/// - `Ui(layer)` draws the native debug panel over the finished frame
/// - `Composed(renders)` draws every contained render
pub enum Render<'a> {
    None,
    Background(&'a wgpu::BindGroup),
    Flat(Drawable<'a>),
    Matcap(Drawable<'a>),
    Translucent(Drawable<'a>),
    Fire(FireProgram, Drawable<'a>),
    #[cfg(not(target_arch = "wasm32"))]
    Ui(&'a crate::debug::UiLayer),
    Composed(Vec<Render<'a>>),
}

#[derive(Default)]
pub(crate) struct Batches<'a> {
    background: Option<&'a wgpu::BindGroup>,
    flat: Vec<Drawable<'a>>,
    matcap: Vec<Drawable<'a>>,
    translucent: Vec<Drawable<'a>>,
    fire_a: Vec<Drawable<'a>>,
    fire_b: Vec<Drawable<'a>>,
    #[cfg(not(target_arch = "wasm32"))]
    ui: Option<&'a crate::debug::UiLayer>,
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::None => (),
            Render::Background(group) => batches.background = Some(group),
            Render::Flat(drawable) => batches.flat.push(drawable),
            Render::Matcap(drawable) => batches.matcap.push(drawable),
            Render::Translucent(drawable) => batches.translucent.push(drawable),
            Render::Fire(FireProgram::A, drawable) => batches.fire_a.push(drawable),
            Render::Fire(FireProgram::B, drawable) => batches.fire_b.push(drawable),
            #[cfg(not(target_arch = "wasm32"))]
            Render::Ui(layer) => batches.ui = Some(layer),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
        }
    }
}

fn draw_batch(
    render_pass: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    drawables: &[Drawable<'_>],
) {
    if drawables.is_empty() {
        return;
    }
    render_pass.set_pipeline(pipeline);
    for drawable in drawables {
        render_pass.set_bind_group(1, drawable.material, &[]);
        render_pass.set_vertex_buffer(1, drawable.instance.slice(..));
        render_pass.draw_mesh_instanced(drawable.mesh, 0..1);
    }
}

/// Draws `render` into the scene target and composites it onto the surface.
pub(crate) fn render_frame(ctx: &Context, render: Render<'_>) -> Result<(), wgpu::SurfaceError> {
    let output = ctx.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut batches = Batches::default();
    render.set_pipelines(&mut batches);

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.bloom.scene_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        if let Some(background) = batches.background {
            render_pass.set_pipeline(&ctx.pipelines.background);
            render_pass.set_bind_group(0, background, &[]);
            render_pass.draw(0..3, 0..1);
        }

        render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
        draw_batch(&mut render_pass, &ctx.pipelines.flat, &batches.flat);
        draw_batch(&mut render_pass, &ctx.pipelines.matcap, &batches.matcap);
        draw_batch(&mut render_pass, &ctx.pipelines.translucent, &batches.translucent);
        draw_batch(&mut render_pass, &ctx.pipelines.fire_a, &batches.fire_a);
        draw_batch(&mut render_pass, &ctx.pipelines.fire_b, &batches.fire_b);
    }

    ctx.bloom.run(&mut encoder, &view);
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(ui) = batches.ui {
            ui.draw(&mut encoder, &view);
        }
    }

    ctx.queue.submit(iter::once(encoder.finish()));
    output.present();
    Ok(())
}
