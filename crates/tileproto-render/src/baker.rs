//! Offscreen chunk baking.
//!
//! A bake queries the world for one chunk's block grid and renders every
//! non-empty cell into a fresh chunk-sized texture, one small quad per
//! cell. That texture is then drawn as a single quad each frame for as
//! long as the chunk stays resident, so the per-cell cost is paid once per
//! admission instead of once per frame.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use tileproto_world::{CHUNK_AREA, CHUNK_PIXELS, CHUNK_SIZE, ChunkBaker, ChunkCoord, WorldSource};

use crate::atlas::BlockAtlas;
use crate::quad::{QuadPipeline, TransformSlots};

/// Format of baked chunk textures. The bake pipeline targets this format.
pub const CHUNK_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A resident chunk: its baked texture and the bind group that draws it.
///
/// Dropping the handle releases the GPU memory.
#[derive(Debug)]
pub struct LiveChunk {
    pub texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

/// Failures while baking one chunk. The chunk is left non-resident and
/// retried while it stays visible.
#[derive(Debug, thiserror::Error)]
pub enum BakeError {
    #[error("chunk texture {size}x{size} exceeds device limit {limit}")]
    TextureTooLarge { size: u32, limit: u32 },

    #[error("GPU error while baking chunk: {0}")]
    Gpu(#[from] wgpu::Error),
}

/// Bakes chunks by rendering their block grids offscreen.
///
/// Owns the world source and the block atlas; shares the quad pipeline
/// with the frame renderer.
pub struct GpuChunkBaker<S> {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: Arc<QuadPipeline>,
    atlas: BlockAtlas,
    source: S,
    slots: TransformSlots,
}

impl<S: WorldSource> GpuChunkBaker<S> {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: Arc<QuadPipeline>,
        atlas: BlockAtlas,
        source: S,
    ) -> Self {
        // Worst case is a fully occupied grid, one slot per cell.
        let slots = pipeline.create_slots(device, CHUNK_AREA as u32);
        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            atlas,
            source,
            slots,
        }
    }
}

/// Projection over chunk space: cell (x, y) is a 1x1 quad at (x, y).
fn bake_projection() -> Mat4 {
    let extent = CHUNK_SIZE as f32;
    Mat4::orthographic_rh(0.0, extent, 0.0, extent, -0.1, 0.1)
}

impl<S: WorldSource> ChunkBaker for GpuChunkBaker<S> {
    type Chunk = LiveChunk;
    type Error = BakeError;

    fn bake(&mut self, coord: ChunkCoord) -> Result<LiveChunk, BakeError> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if CHUNK_PIXELS > limit {
            return Err(BakeError::TextureTooLarge { size: CHUNK_PIXELS, limit });
        }

        // The whole bake runs under error scopes so render-target and
        // allocation failures come back as Err instead of an uncaptured
        // error, leaving nothing partially admitted.
        let validation_scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let oom_scope = self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let grid = self.source.query(coord);

        let projection = bake_projection();
        let mut draws = Vec::new();
        for (x, y, id) in grid.iter() {
            // Cells without art (the empty block included) draw nothing.
            let Some(bind_group) = self.atlas.bind_group(id) else {
                continue;
            };
            let slot = draws.len() as u32;
            let model = Mat4::from_translation(Vec3::new(x as f32, y as f32, 0.0));
            self.slots.write(&self.queue, slot, &(projection * model));
            draws.push((self.slots.offset(slot), bind_group));
        }

        let label = format!("chunk-{}x{}", coord.cx, coord.cy);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width: CHUNK_PIXELS,
                height: CHUNK_PIXELS,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CHUNK_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chunk-bake-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("chunk-bake-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline.bake_pipeline);
            self.pipeline.mesh.bind(&mut pass);
            for (offset, bind_group) in &draws {
                pass.set_bind_group(0, self.slots.bind_group(), &[*offset]);
                pass.set_bind_group(1, *bind_group, &[]);
                self.pipeline.mesh.draw(&mut pass);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        let bind_group = self.pipeline.texture_bind_group(&self.device, &view, &label);

        // Scopes pop in reverse push order.
        let oom = pollster::block_on(oom_scope.pop());
        let validation = pollster::block_on(validation_scope.pop());
        if let Some(err) = oom.or(validation) {
            return Err(BakeError::Gpu(err));
        }

        log::debug!("Baked chunk {coord}: {} of {CHUNK_AREA} cells textured", draws.len());
        Ok(LiveChunk { texture, bind_group })
    }
}

#[cfg(test)]
mod tests {
    use tileproto_world::{BlockGrid, BlockId};

    use super::*;
    use crate::quad::create_test_device_queue;

    /// World with every cell set to the same block.
    struct SolidWorld(BlockId);

    impl WorldSource for SolidWorld {
        fn query(&mut self, _coord: ChunkCoord) -> BlockGrid {
            BlockGrid::filled(self.0)
        }
    }

    fn test_atlas(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &QuadPipeline,
    ) -> BlockAtlas {
        let red: Vec<u8> = [255, 0, 0, 255].repeat(4);
        let green: Vec<u8> = [0, 255, 0, 255].repeat(4);
        let blue: Vec<u8> = [0, 0, 255, 255].repeat(4);
        BlockAtlas::from_rgba(
            device,
            queue,
            pipeline,
            &[(&red, 2, 2), (&green, 2, 2), (&blue, 2, 2)],
        )
        .unwrap()
    }

    /// Copy a texture to the CPU, stripping row padding.
    fn read_texture_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
    ) -> Vec<u8> {
        let (w, h) = (texture.width(), texture.height());
        let unpadded = w * 4;
        let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("bake-readback"),
            size: u64::from(padded * h),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(h),
                },
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        });
        rx.recv().expect("map callback dropped").expect("readback map failed");

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * h) as usize);
        for row in 0..h {
            let start = (row * padded) as usize;
            pixels.extend_from_slice(&mapped[start..start + unpadded as usize]);
        }
        drop(mapped);
        buffer.unmap();
        pixels
    }

    #[test]
    fn test_bake_produces_chunk_sized_texture() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let pipeline = Arc::new(QuadPipeline::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb));
        let atlas = test_atlas(&device, &queue, &pipeline);
        let mut baker =
            GpuChunkBaker::new(&device, &queue, pipeline, atlas, SolidWorld(BlockId(1)));

        let chunk = baker.bake(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(chunk.texture.width(), CHUNK_PIXELS);
        assert_eq!(chunk.texture.height(), CHUNK_PIXELS);
        assert_eq!(chunk.texture.format(), CHUNK_TEXTURE_FORMAT);
    }

    #[test]
    fn test_bake_solid_chunk_fills_every_pixel() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let pipeline = Arc::new(QuadPipeline::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb));
        let atlas = test_atlas(&device, &queue, &pipeline);
        let mut baker =
            GpuChunkBaker::new(&device, &queue, pipeline, atlas, SolidWorld(BlockId(1)));

        let chunk = baker.bake(ChunkCoord::new(3, -2)).unwrap();
        let pixels = read_texture_rgba(&device, &queue, &chunk.texture);

        // Sample a few spots; a solid block 1 chunk is solid red.
        for index in [
            0usize,
            (CHUNK_PIXELS * CHUNK_PIXELS / 2 + CHUNK_PIXELS / 2) as usize,
            (CHUNK_PIXELS * CHUNK_PIXELS - 1) as usize,
        ] {
            let pixel = &pixels[index * 4..index * 4 + 4];
            assert_eq!(pixel, [255, 0, 0, 255], "pixel {index} should be block art");
        }
    }

    #[test]
    fn test_bake_empty_chunk_is_fully_transparent() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let pipeline = Arc::new(QuadPipeline::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb));
        let atlas = test_atlas(&device, &queue, &pipeline);
        let mut baker =
            GpuChunkBaker::new(&device, &queue, pipeline, atlas, SolidWorld(BlockId::EMPTY));

        let chunk = baker.bake(ChunkCoord::new(0, 0)).unwrap();
        let pixels = read_texture_rgba(&device, &queue, &chunk.texture);
        assert!(
            pixels.iter().all(|&b| b == 0),
            "empty chunk must stay at the transparent clear color"
        );
    }

    #[test]
    fn test_bake_respects_cell_positions() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let pipeline = Arc::new(QuadPipeline::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb));
        let atlas = test_atlas(&device, &queue, &pipeline);

        /// One green cell at grid position (0, 0), everything else empty.
        struct CornerWorld;
        impl WorldSource for CornerWorld {
            fn query(&mut self, _coord: ChunkCoord) -> BlockGrid {
                let mut grid = BlockGrid::default();
                grid.set(0, 0, BlockId(2));
                grid
            }
        }

        let mut baker = GpuChunkBaker::new(&device, &queue, pipeline, atlas, CornerWorld);
        let chunk = baker.bake(ChunkCoord::new(0, 0)).unwrap();
        let pixels = read_texture_rgba(&device, &queue, &chunk.texture);

        let pixel_at = |x: u32, y: u32| {
            let index = ((y * CHUNK_PIXELS + x) * 4) as usize;
            &pixels[index..index + 4]
        };

        // Cell (0, 0) is the chunk's bottom-left; +y in chunk space is the
        // texture's bottom rows under the shared orientation convention,
        // which land at the END of the readback (row 0 read first is the
        // texture's top).
        let inside = pixel_at(8, CHUNK_PIXELS - 8);
        assert_eq!(inside, [0, 255, 0, 255], "cell (0, 0) must be textured");
        let outside = pixel_at(24, CHUNK_PIXELS - 8);
        assert_eq!(outside, [0, 0, 0, 0], "cell (1, 0) must stay empty");
        let top = pixel_at(8, 8);
        assert_eq!(top, [0, 0, 0, 0], "cell (0, 31) must stay empty");
    }

    #[test]
    fn test_bake_fails_when_texture_exceeds_device_limit() {
        let limited = pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits {
                        // Below CHUNK_PIXELS, so every bake must refuse.
                        max_texture_dimension_2d: 256,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    experimental_features: Default::default(),
                    ..Default::default()
                })
                .await
                .ok()
        });
        let Some((device, queue)) = limited else {
            return;
        };

        let pipeline = Arc::new(QuadPipeline::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb));
        let atlas = test_atlas(&device, &queue, &pipeline);
        let mut baker =
            GpuChunkBaker::new(&device, &queue, pipeline, atlas, SolidWorld(BlockId(1)));

        let err = baker.bake(ChunkCoord::new(0, 0)).unwrap_err();
        assert!(
            matches!(err, BakeError::TextureTooLarge { size, limit } if size == CHUNK_PIXELS && limit == 256),
            "expected TextureTooLarge, got {err:?}"
        );
    }
}
