//! WGPU presentation layer for the oubliette.
//!
//! This module provides [`WgpuRenderer`], which owns the GPU surface, device,
//! and queue, plus the CPU-side [`SceneRenderer`] that paints every frame and
//! the [`FrameBlitter`] that stretches the result across the window.
//!
//! # Features
//! - Initializes WGPU against a winit surface
//! - Runs the software raycaster into an offscreen pixel buffer each frame
//! - Uploads the composed frame and blits it with nearest-neighbor sampling
//!
//! # Usage
//! Create a [`WgpuRenderer`] via [`WgpuRenderer::new`] and call
//! [`WgpuRenderer::update_canvas`] each frame to render the current game state.

use crate::config::{COMPOSE_H, COMPOSE_W};
use crate::game::GameState;
use crate::renderer::blit::FrameBlitter;
use crate::renderer::scene::SceneRenderer;
use wgpu::{SurfaceTexture, TextureView};

/// Owns the WGPU device, surface, and the CPU compositor feeding it.
pub struct WgpuRenderer {
    /// The WGPU surface for presenting rendered frames.
    pub surface: wgpu::Surface<'static>,
    /// The surface configuration (format, size, etc.).
    pub surface_config: wgpu::SurfaceConfiguration,
    /// The WGPU device for resource creation.
    pub device: wgpu::Device,
    /// The WGPU queue for submitting commands.
    pub queue: wgpu::Queue,
    /// The software renderer that composes each frame on the CPU.
    pub scene: SceneRenderer,
    /// Uploads and stretches the composed frame onto the surface.
    pub blitter: FrameBlitter,
}

impl WgpuRenderer {
    /// Initializes a new [`WgpuRenderer`] and all associated GPU resources.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Self {
        let adapter = Self::create_adapter(instance, &surface).await;
        let (device, queue) = Self::create_device(&adapter).await;
        let surface_config = Self::create_surface_config(&surface, &adapter, width, height);

        surface.configure(&device, &surface_config);

        let scene = SceneRenderer::new();
        let blitter = FrameBlitter::new(
            &device,
            surface_config.format,
            COMPOSE_W as u32,
            COMPOSE_H as u32,
        );

        Self {
            surface,
            surface_config,
            device,
            queue,
            scene,
            blitter,
        }
    }

    /// Composes the frame for the current game state and records the blit
    /// pass. The caller submits the encoder and presents the returned
    /// surface texture.
    pub fn update_canvas(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        game_state: &GameState,
    ) -> Result<SurfaceTexture, String> {
        let frame = self.scene.compose_frame(game_state);
        self.blitter.upload(&self.queue, frame);

        let (surface_texture, surface_view) = self.get_surface_texture_and_view()?;

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.blitter.render(&mut render_pass);
        }

        Ok(surface_texture)
    }

    // Private helper methods

    async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> wgpu::Adapter {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(surface),
            })
            .await
            .expect("Failed to find an appropriate adapter")
    }

    async fn create_device(adapter: &wgpu::Adapter) -> (wgpu::Device, wgpu::Queue) {
        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: Default::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .expect("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> wgpu::SurfaceConfiguration {
        let capabilities = surface.get_capabilities(adapter);
        let format = capabilities
            .formats
            .iter()
            .find(|&&f| f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .copied()
            .expect("Failed to select proper surface texture format");

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 0,
            alpha_mode: capabilities.alpha_modes[0],
            view_formats: vec![],
        }
    }

    fn get_surface_texture_and_view(&self) -> Result<(SurfaceTexture, TextureView), String> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Outdated) => {
                return Err("WGPU surface outdated".to_string());
            }
            Err(_) => {
                return Err("Failed to acquire next swap chain texture".to_string());
            }
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok((surface_texture, surface_view))
    }
}
