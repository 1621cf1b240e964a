//! Update logic for the oubliette App.
//!
//! Contains the per-frame update and rendering methods for the App struct.

use crate::config::{MAX_FRAME_DT, Options};
use std::time::Instant;
use winit::dpi::PhysicalSize;
use winit::window::{Fullscreen, Window};

use super::event_handler::App;

impl App {
    /// Runs one frame: applies pending video mode changes, advances the
    /// simulation by `dt`, composes the frame on the CPU, and presents it.
    ///
    /// Rendering is skipped while the window is minimized. A failed canvas
    /// update (for example an outdated surface during a resize) is logged
    /// and the frame dropped; the next one reconfigures naturally.
    pub fn handle_redraw(&mut self, dt: f32) {
        let window = self
            .window
            .as_ref()
            .expect("Window must be initialized before use");
        if window.is_minimized().unwrap_or(false) {
            return;
        }

        let state = self
            .state
            .as_mut()
            .expect("State must be initialized before use");

        if state.game_state.video_dirty {
            state.game_state.video_dirty = false;
            apply_video_mode(window, &state.game_state.options);
        }

        state.game_state.update(dt, &state.key_state);
        state.triage_mouse(window);

        let mut encoder = state
            .wgpu_renderer
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        let surface_texture = match state
            .wgpu_renderer
            .update_canvas(&mut encoder, &state.game_state)
        {
            Ok(texture) => texture,
            Err(err) => {
                eprintln!("Failed to update canvas: {}", err);
                return;
            }
        };

        state.wgpu_renderer.queue.submit(Some(encoder.finish()));
        surface_texture.present();
    }

    /// Updates frame timing and returns the clamped delta for this frame.
    ///
    /// Long gaps (window drags, debugger stops) are clamped to
    /// [`MAX_FRAME_DT`] so the simulation never takes a runaway step. Once
    /// per second the window title is refreshed with the measured FPS.
    pub fn handle_frame_timing(&mut self, current_time: Instant) -> f32 {
        let Some(state) = self.state.as_mut() else {
            return 0.0;
        };

        let dt = current_time
            .duration_since(state.last_frame_time)
            .as_secs_f32()
            .min(MAX_FRAME_DT);
        state.last_frame_time = current_time;

        state.frame_count += 1;
        let since_report = current_time.duration_since(state.last_fps_time);
        if since_report.as_secs_f32() >= 1.0 {
            if let Some(window) = self.window.as_ref() {
                let fps = (state.frame_count as f32 / since_report.as_secs_f32()).round() as u32;
                window.set_title(&format!("oubliette | {} fps", fps));
            }
            state.frame_count = 0;
            state.last_fps_time = current_time;
        }

        dt
    }
}

/// Applies the saved display options to the live window: borderless
/// fullscreen on the current monitor, or a window at the configured size.
fn apply_video_mode(window: &Window, options: &Options) {
    if options.fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
        let (width, height) = options.window_size;
        let _ = window.request_inner_size(PhysicalSize::new(width, height));
    }
}
