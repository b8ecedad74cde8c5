//! The winit shell and per-frame driver.
//!
//! [`AppState`] owns the window, the GPU context, and the chunk subsystem,
//! and wires them together on `RedrawRequested`: fixed-step the camera,
//! tick chunk residency against the visible rectangle, then draw one quad
//! per resident chunk.

use std::path::Path;
use std::sync::Arc;

use tileproto_config::{Config, GeneratorKind, WorldConfig};
use tileproto_input::KeyboardState;
use tileproto_render::{
    AtlasError, BlockAtlas, ChunkRenderer, FrameEncoder, GpuChunkBaker, LiveChunk, QuadPipeline,
    RenderContext, SurfaceError, init_render_context_blocking,
};
use tileproto_world::{
    BlockGrid, ChunkCoord, ChunkResidency, SeededWorld, UniformRandomWorld, WorldSource,
};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::ScrollCamera;
use crate::overlay::{DebugOverlay, OverlayStats};
use crate::ticker::FixedTicker;

/// Directory the block art is loaded from, relative to the working dir.
const BLOCK_ART_DIR: &str = "assets/blocks";

/// The block generator selected by config.
enum BlockGenerator {
    Seeded(SeededWorld),
    Uniform(UniformRandomWorld),
}

impl BlockGenerator {
    fn from_config(world: &WorldConfig) -> Self {
        match world.generator {
            GeneratorKind::Seeded => Self::Seeded(SeededWorld::new(world.seed)),
            GeneratorKind::Uniform => Self::Uniform(UniformRandomWorld::new()),
        }
    }
}

impl WorldSource for BlockGenerator {
    fn query(&mut self, coord: ChunkCoord) -> BlockGrid {
        match self {
            Self::Seeded(world) => world.query(coord),
            Self::Uniform(world) => world.query(coord),
        }
    }
}

/// The GPU-dependent pieces, created once the window and device exist.
struct ChunkScene {
    baker: GpuChunkBaker<BlockGenerator>,
    residency: ChunkResidency<LiveChunk>,
    renderer: ChunkRenderer,
}

impl ChunkScene {
    fn new(gpu: &RenderContext, config: &Config) -> Result<Self, AtlasError> {
        let pipeline = Arc::new(QuadPipeline::new(&gpu.device, gpu.surface_format));
        let atlas = BlockAtlas::load(&gpu.device, &gpu.queue, &pipeline, Path::new(BLOCK_ART_DIR))?;
        let source = BlockGenerator::from_config(&config.world);
        let baker = GpuChunkBaker::new(
            &gpu.device,
            &gpu.queue,
            Arc::clone(&pipeline),
            atlas,
            source,
        );
        let renderer = ChunkRenderer::new(&gpu.device, pipeline);
        Ok(Self {
            baker,
            residency: ChunkResidency::new(),
            renderer,
        })
    }
}

/// Top-level application state driven by the winit event loop.
pub struct AppState {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    scene: Option<ChunkScene>,
    keyboard: KeyboardState,
    camera: ScrollCamera,
    ticker: FixedTicker,
    overlay: DebugOverlay,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let camera = ScrollCamera::new(&config.camera);
        let overlay = DebugOverlay::new(&config.window.title);
        Self {
            config,
            window: None,
            gpu: None,
            scene: None,
            keyboard: KeyboardState::new(),
            camera,
            ticker: FixedTicker::new(),
            overlay,
        }
    }

    /// One frame: step the camera, tick residency, draw, report.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let steer = self.keyboard.steer_axis();
        let camera = &mut self.camera;
        let report = self.ticker.tick(|| camera.step(steer));
        self.overlay.note_frame(report.frame_seconds);

        let (Some(gpu), Some(scene)) = (&self.gpu, &mut self.scene) else {
            return;
        };

        let view = self.camera.view_rect(gpu.aspect_ratio());
        let tick = scene.residency.tick(&view, &mut scene.baker);

        match gpu.get_current_texture() {
            Ok(surface_texture) => {
                let mut frame = FrameEncoder::new(&gpu.device, &gpu.queue, surface_texture);
                {
                    let mut pass = frame.begin_pass("chunk-screen-pass", wgpu::Color::BLACK);
                    scene
                        .renderer
                        .draw(&gpu.device, &gpu.queue, &mut pass, &view, &scene.residency);
                }
                frame.submit();
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
            Err(err @ (SurfaceError::Lost | SurfaceError::OutOfMemory)) => {
                error!("Unrecoverable surface error: {err}, shutting down");
                event_loop.exit();
                return;
            }
        }

        let stats = OverlayStats {
            camera_pos: self.camera.position,
            camera_speed: self.camera.speed(),
            resident: scene.residency.resident_count(),
            compiled: tick.compiled,
            freed: tick.freed,
        };
        if let Some(window) = &self.window {
            window.set_title(&self.overlay.title(&stats));
        }
        self.overlay.log_periodic(&stats);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = window_attributes_from_config(&self.config);
            let window = event_loop
                .create_window(attrs)
                .expect("Failed to create window");
            let window = Arc::new(window);

            match init_render_context_blocking(window.clone(), self.config.window.vsync) {
                Ok(gpu) => match ChunkScene::new(&gpu, &self.config) {
                    Ok(scene) => {
                        self.scene = Some(scene);
                        self.gpu = Some(gpu);
                    }
                    Err(err) => {
                        error!("Block atlas load failed: {err}");
                        event_loop.exit();
                        return;
                    }
                },
                Err(err) => {
                    error!("GPU initialization failed: {err}");
                    event_loop.exit();
                    return;
                }
            }

            window.request_redraw();
            self.window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    info!("Window resized to {}x{}", new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
                if self.keyboard.just_pressed(KeyCode::Escape) {
                    info!("Escape pressed, shutting down");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                self.keyboard.clear_transients();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(winit::window::Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// Run the event loop until the window closes. Blocks the calling thread.
pub fn run_with_config(config: Config) {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = AppState::new(config);
    event_loop.run_app(&mut app).expect("Event loop failed");
}
