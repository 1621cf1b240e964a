//! AppState module for the oubliette.
//!
//! This module defines the [`AppState`] struct, which holds all state required
//! for a running game session, including the rendering backend, game logic,
//! input state, and frame timing.

use crate::game::{GameState, keys::KeyState};
use crate::renderer::wgpu_lib::WgpuRenderer;
use std::time::Instant;
use winit::window::{CursorGrabMode, Window};

/// Holds all state required for a running game session.
///
/// This includes the rendering backend, game logic, input state, and the
/// timestamps used for delta timing and the FPS readout.
pub struct AppState {
    /// The WGPU renderer and the CPU compositor feeding it.
    pub wgpu_renderer: WgpuRenderer,
    /// The main game state (screens, run, player, stalkers).
    pub game_state: GameState,
    /// The current input state (pressed keys).
    pub key_state: KeyState,
    /// Timestamp of the previous frame, for delta timing.
    pub last_frame_time: Instant,
    /// Frames rendered since the last FPS report.
    pub frame_count: u32,
    /// When the FPS readout was last refreshed.
    pub last_fps_time: Instant,
    /// Whether the OS cursor is currently grabbed.
    pub mouse_captured: bool,
}

impl AppState {
    /// Asynchronously creates a new [`AppState`] with initialized renderer
    /// and game state.
    ///
    /// # Arguments
    /// - `instance`: The WGPU instance.
    /// - `surface`: The WGPU surface for rendering.
    /// - `width`: Initial surface width.
    /// - `height`: Initial surface height.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Self {
        let wgpu_renderer = WgpuRenderer::new(instance, surface, width, height).await;
        let game_state = GameState::new();

        Self {
            wgpu_renderer,
            game_state,
            key_state: KeyState::new(),
            last_frame_time: Instant::now(),
            frame_count: 0,
            last_fps_time: Instant::now(),
            mouse_captured: false,
        }
    }

    /// Resizes the WGPU surface and updates the configuration.
    ///
    /// # Arguments
    /// - `width`: New width of the surface.
    /// - `height`: New height of the surface.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.wgpu_renderer.surface_config.width = width;
        self.wgpu_renderer.surface_config.height = height;
        self.wgpu_renderer.surface.configure(
            &self.wgpu_renderer.device,
            &self.wgpu_renderer.surface_config,
        );
    }

    /// Handles mouse capture and cursor visibility based on game state.
    ///
    /// Grabs and hides the cursor while the game wants relative mouse look,
    /// releases it otherwise. Only acts when the desired state changes.
    pub fn triage_mouse(&mut self, window: &Window) {
        let want_capture = self.game_state.capture_mouse;
        if want_capture == self.mouse_captured {
            return;
        }
        self.mouse_captured = want_capture;

        if want_capture {
            // Locked is not available everywhere; Confined still gives
            // usable relative motion.
            if let Err(e) = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
            {
                eprintln!("Failed to grab cursor: {}", e);
            }
            window.set_cursor_visible(false);
            let size = window.inner_size();
            if let Err(e) = window.set_cursor_position(winit::dpi::PhysicalPosition::new(
                size.width / 2,
                size.height / 2,
            )) {
                eprintln!("Failed to center cursor: {}", e);
            }
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                eprintln!("Failed to release cursor: {}", e);
            }
            window.set_cursor_visible(true);
        }
    }
}
