//! wgpu rendering for tileproto: device and surface setup, the shared quad
//! pipeline, block atlas upload, offscreen chunk baking, and the per-frame
//! pass that draws resident chunks.

pub mod atlas;
pub mod baker;
pub mod frame;
pub mod gpu;
pub mod quad;

pub use atlas::{AtlasError, BlockAtlas};
pub use baker::{BakeError, GpuChunkBaker, LiveChunk};
pub use frame::{ChunkRenderer, FrameEncoder, view_projection};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use quad::{QUAD_SHADER_SOURCE, QuadMesh, QuadPipeline, QuadVertex, TransformSlots};
