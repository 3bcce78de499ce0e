//! Frame rendering.
//!
//! [`Renderer`] is the seam the game loop renders through; [`WgpuRenderer`]
//! is the real implementation owning the [`Context`]. A frame is a prepare
//! walk over the node tree (staged uniforms reach the GPU here), one
//! clearing render pass recording the draw walk, then submit and present.

use std::iter;

use anyhow::{Result, anyhow};

use crate::context::Context;
use crate::scene::SceneNode;

/// The rendering half of the game loop's frame.
pub trait Renderer {
    /// Renders one frame from the scene's drawable root.
    fn render(&mut self, root: &mut dyn SceneNode) -> Result<()>;
}

/// Renders node trees into the context's surface.
#[derive(Debug)]
pub struct WgpuRenderer {
    ctx: Context,
}

impl WgpuRenderer {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }
}

impl Renderer for WgpuRenderer {
    fn render(&mut self, root: &mut dyn SceneNode) -> Result<()> {
        root.prepare(&self.ctx.queue, &self.ctx.device);

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            // Reconfigure the surface if it's lost or outdated and skip the
            // frame; the next one renders against the fresh configuration.
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window().inner_size();
                self.ctx.resize(size.width, size.height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("the GPU ran out of surface memory"));
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            root.draw(&mut render_pass);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
