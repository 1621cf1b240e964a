//! Main renderer module.
//!
//! This module contains the software raycaster, the pixel-buffer drawing
//! primitives it builds on, and the thin WGPU layer that presents the
//! composed frame. Everything visible is painted on the CPU; the GPU only
//! stretches the finished buffer over the window.

/// Uploads the composed frame and draws it as a fullscreen quad.
pub mod blit;
/// Tiny built-in bitmap font for HUD and menu text.
pub mod font;
/// CPU pixel buffers and blitting primitives.
pub mod framebuffer;
/// HUD, minimap, vignette, and other play-screen overlays.
pub mod overlay;
/// Pipeline building utilities for WGPU.
pub mod pipeline_builder;
/// The raycasting core: walls, the door slab, and billboard sprites.
pub mod raycast;
/// Per-screen frame composition.
pub mod scene;
/// Full-screen menu, settings, pause, and end-card drawing.
pub mod screens;
/// Procedurally painted texture set.
pub mod textures;
/// Core WGPU library and utilities.
pub mod wgpu_lib;
