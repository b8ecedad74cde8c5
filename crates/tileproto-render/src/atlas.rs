//! Block art: one small texture per block type, loaded at startup.

use std::path::{Path, PathBuf};

use tileproto_world::{BLOCK_TYPES, BlockId};

use crate::quad::QuadPipeline;

/// Art files in block ID order starting at ID 1. ID 0 is the empty block
/// and has no art.
const BLOCK_ART: [&str; (BLOCK_TYPES - 1) as usize] = ["grass.png", "stone.png", "brick.png"];

/// Errors while loading or uploading block art.
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("failed to load block texture {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("expected {expected} block tiles, got {got}")]
    TileCount { expected: usize, got: usize },

    #[error("tile data size ({actual}) does not match {width}x{height} RGBA ({expected})")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}

/// Uploaded block textures with ready-to-bind groups, indexed by block ID.
#[derive(Debug)]
pub struct BlockAtlas {
    bind_groups: Vec<wgpu::BindGroup>,
}

impl BlockAtlas {
    /// Load the block art files from `dir` and upload them.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &QuadPipeline,
        dir: &Path,
    ) -> Result<Self, AtlasError> {
        let mut bind_groups = Vec::with_capacity(BLOCK_ART.len());
        for file in BLOCK_ART {
            let path = dir.join(file);
            let image = image::open(&path)
                .map_err(|source| AtlasError::Image { path: path.clone(), source })?
                .to_rgba8();
            let (width, height) = image.dimensions();
            bind_groups.push(upload_tile(device, queue, pipeline, file, &image, width, height)?);
        }
        log::info!("Loaded {} block textures from {}", BLOCK_ART.len(), dir.display());
        Ok(Self { bind_groups })
    }

    /// Build an atlas from raw RGBA tiles, one per block ID starting at 1.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &QuadPipeline,
        tiles: &[(&[u8], u32, u32)],
    ) -> Result<Self, AtlasError> {
        if tiles.len() != BLOCK_ART.len() {
            return Err(AtlasError::TileCount {
                expected: BLOCK_ART.len(),
                got: tiles.len(),
            });
        }
        let mut bind_groups = Vec::with_capacity(tiles.len());
        for (index, &(data, width, height)) in tiles.iter().enumerate() {
            let label = format!("block-tile-{}", index + 1);
            bind_groups.push(upload_tile(device, queue, pipeline, &label, data, width, height)?);
        }
        Ok(Self { bind_groups })
    }

    /// Bind group for the given block's art. `None` for the empty block and
    /// for IDs without art; such cells draw nothing.
    pub fn bind_group(&self, id: BlockId) -> Option<&wgpu::BindGroup> {
        if id.is_empty() {
            return None;
        }
        self.bind_groups.get(id.0 as usize - 1)
    }

    /// Number of block types with art.
    pub fn tile_count(&self) -> usize {
        self.bind_groups.len()
    }
}

fn upload_tile(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &QuadPipeline,
    label: &str,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<wgpu::BindGroup, AtlasError> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(AtlasError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
        });
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: None,
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok(pipeline.texture_bind_group(device, &view, label))
}
