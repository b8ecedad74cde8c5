//! Per-frame command encoding and the pass that draws resident chunks.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use tileproto_world::{CHUNK_SIZE, ChunkCoord, ChunkResidency, ViewRect};

use crate::baker::LiveChunk;
use crate::quad::{QuadPipeline, TransformSlots};

/// Orthographic projection over the camera's visible rectangle.
pub fn view_projection(view: &ViewRect) -> Mat4 {
    let max = view.max();
    Mat4::orthographic_rh(view.pos.x, max.x, view.pos.y, max.y, -0.1, 0.1)
}

/// Transform scaling the unit quad onto one chunk's world footprint.
fn chunk_model(coord: ChunkCoord) -> Mat4 {
    let min = coord.min_corner();
    Mat4::from_translation(min.extend(0.0))
        * Mat4::from_scale(Vec3::new(CHUNK_SIZE as f32, CHUNK_SIZE as f32, 1.0))
}

/// Owns one frame's command encoder and surface texture; submitting
/// presents the frame.
pub struct FrameEncoder {
    encoder: Option<wgpu::CommandEncoder>,
    queue: wgpu::Queue,
    surface_texture: Option<wgpu::SurfaceTexture>,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            encoder: Some(encoder),
            queue: queue.clone(),
            surface_texture: Some(surface_texture),
            surface_view,
        }
    }

    /// Begin the frame's color pass, clearing the surface to `clear_color`.
    pub fn begin_pass(
        &mut self,
        label: &'static str,
        clear_color: wgpu::Color,
    ) -> wgpu::RenderPass<'_> {
        let encoder = self.encoder.as_mut().expect("frame already submitted");
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        })
    }

    /// Submit the frame's commands and present. Consumes self so a frame
    /// cannot be submitted twice.
    pub fn submit(mut self) {
        if let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        {
            self.queue.submit(std::iter::once(encoder.finish()));
            surface_texture.present();
        }
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        if let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        {
            log::warn!("FrameEncoder dropped without submit, auto-submitting");
            self.queue.submit(std::iter::once(encoder.finish()));
            surface_texture.present();
        }
    }
}

/// Draws every resident chunk as one textured quad per frame.
pub struct ChunkRenderer {
    pipeline: Arc<QuadPipeline>,
    slots: TransformSlots,
}

/// Slots allocated up front; enough for far more chunks than a typical
/// view holds. Grown on demand if a huge window proves it wrong.
const INITIAL_SLOTS: u32 = 64;

impl ChunkRenderer {
    pub fn new(device: &wgpu::Device, pipeline: Arc<QuadPipeline>) -> Self {
        let slots = pipeline.create_slots(device, INITIAL_SLOTS);
        Self { pipeline, slots }
    }

    /// Record one draw per resident chunk into `pass`.
    ///
    /// Transform slots are written through the queue while recording; the
    /// writes land before the pass executes at submit.
    pub fn draw<'a>(
        &'a mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'a>,
        view: &ViewRect,
        chunks: &'a ChunkResidency<LiveChunk>,
    ) {
        let count = chunks.resident_count() as u32;
        if count == 0 {
            return;
        }
        if count > self.slots.capacity() {
            self.slots = self.pipeline.create_slots(device, count.next_power_of_two());
        }

        let view_proj = view_projection(view);
        let mut draws = Vec::with_capacity(count as usize);
        for (slot, (coord, chunk)) in chunks.iter().enumerate() {
            let slot = slot as u32;
            self.slots.write(queue, slot, &(view_proj * chunk_model(coord)));
            draws.push((self.slots.offset(slot), &chunk.bind_group));
        }

        pass.set_pipeline(&self.pipeline.screen_pipeline);
        self.pipeline.mesh.bind(pass);
        for (offset, bind_group) in draws {
            pass.set_bind_group(0, self.slots.bind_group(), &[offset]);
            pass.set_bind_group(1, bind_group, &[]);
            self.pipeline.mesh.draw(pass);
        }
    }
}
