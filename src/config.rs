//! Tuning constants and persisted player options.
//!
//! [`Tuning`] is the immutable bundle of gameplay and presentation constants.
//! It is built once at startup and passed by reference into the systems that
//! need it, so there is a single source of truth for feel-critical numbers.
//!
//! [`Options`] is the small mutable set the player can change from the
//! settings screen. It round-trips through `settings.json` next to the
//! executable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Internal framebuffer width in pixels. The world is raycast at this
/// resolution and upscaled afterwards.
pub const RENDER_W: usize = 320;
/// Internal framebuffer height in pixels.
pub const RENDER_H: usize = 180;

/// Width of the compose target the presentation layer upscales into before
/// HUD and overlay drawing.
pub const COMPOSE_W: usize = 960;
/// Height of the compose target.
pub const COMPOSE_H: usize = 540;

/// Side length of procedurally painted textures.
pub const TEXTURE_SIZE: usize = 256;

/// Largest simulation step in seconds. Frames longer than this (window drag,
/// debugger stop) are clamped so physics and AI never take a runaway step.
pub const MAX_FRAME_DT: f32 = 0.05;

/// Gameplay and atmosphere constants.
///
/// Everything here is fixed for the lifetime of the process. Per-player
/// preferences live in [`Options`] instead.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    /// Walk speed in cells per second.
    pub move_speed: f32,
    /// Multiplier applied to `move_speed` while sprinting.
    pub run_mult: f32,
    /// Arrow-key yaw rate in radians per second.
    pub rot_speed_keys: f32,
    /// Mouse yaw in radians per count of relative motion.
    pub mouse_sens: f32,
    /// Player collision radius in cells.
    pub player_radius: f32,
    /// Half-tangent of the horizontal field of view (camera plane length).
    pub fov_plane: f32,
    /// Exponential fog falloff factor.
    pub fog_strength: f32,
    /// Ceiling fill color.
    pub ceil_color: [u8; 3],
    /// Floor fill color.
    pub floor_color: [u8; 3],
    /// Seconds after spawn before a stalker starts hunting.
    pub stalker_spawn_delay: f32,
    /// Distance at which a stalker catches the player.
    pub kill_dist: f32,
    /// Seconds between pathfinding replans.
    pub replan_interval: f32,
    /// Tunnel distance in cells at which the hunt drone fades to its floor.
    pub audible_cells: i32,
    /// Exponent shaping the drone intensity curve (below 1 sharpens
    /// mid-range proximity).
    pub sound_curve: f32,
    /// Minimum perpendicular wall distance; avoids near-plane blowups.
    pub min_wall_dist: f32,
    /// Wall column height cap as a multiple of the screen height.
    pub max_lineheight_mult: i32,
    /// Grain dots scattered over the frame each present.
    pub noise_dots: usize,
    /// Lives per run.
    pub lives: i32,
    /// Pickup radius around a seal.
    pub pickup_dist: f32,
    /// Radius around the door trigger that ends the run once it is open.
    pub door_trigger_dist: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_speed: 2.6,
            run_mult: 1.75,
            rot_speed_keys: 2.2,
            mouse_sens: 0.0025,
            player_radius: 0.28,
            fov_plane: 0.66,
            fog_strength: 0.055,
            ceil_color: [205, 195, 120],
            floor_color: [115, 105, 75],
            stalker_spawn_delay: 1.0,
            kill_dist: 0.65,
            replan_interval: 0.12,
            audible_cells: 22,
            sound_curve: 0.60,
            min_wall_dist: 0.18,
            max_lineheight_mult: 4,
            noise_dots: 80,
            lives: 3,
            pickup_dist: 0.6,
            door_trigger_dist: 0.85,
        }
    }
}

/// Windowed resolutions offered on the settings screen.
pub const RESOLUTIONS: [(u32, u32); 4] = [(960, 540), (1280, 720), (1600, 900), (1920, 1080)];

/// Player-changeable options, persisted to `settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Borderless fullscreen instead of a window.
    pub fullscreen: bool,
    /// Windowed-mode size in physical pixels.
    pub window_size: (u32, u32),
    /// Flips the horizontal mouse axis.
    pub invert_mouse_x: bool,
    /// Music channel volume, 0 to 1.
    pub music_volume: f32,
    /// Effect channel volume, 0 to 1.
    pub sfx_volume: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fullscreen: true,
            window_size: (960, 540),
            invert_mouse_x: false,
            music_volume: 0.10,
            sfx_volume: 1.00,
        }
    }
}

impl Options {
    /// Index of the current window size in [`RESOLUTIONS`], or 0 when the
    /// stored size is not one of the presets.
    pub fn res_index(&self) -> usize {
        RESOLUTIONS
            .iter()
            .position(|&r| r == self.window_size)
            .unwrap_or(0)
    }

    /// Cycles the window size, wrapping around the preset list.
    pub fn set_res_index(&mut self, idx: isize) {
        let n = RESOLUTIONS.len() as isize;
        let idx = idx.rem_euclid(n) as usize;
        self.window_size = RESOLUTIONS[idx];
    }

    /// Loads options from disk, falling back to defaults when the file is
    /// missing or unreadable. A bad file is reported but never fatal.
    pub fn load() -> Self {
        let path = config_path("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Options>(&text) {
                Ok(mut opts) => {
                    opts.music_volume = opts.music_volume.clamp(0.0, 1.0);
                    opts.sfx_volume = opts.sfx_volume.clamp(0.0, 1.0);
                    opts
                }
                Err(e) => {
                    eprintln!("settings.json is invalid ({e}), using defaults");
                    Options::default()
                }
            },
            Err(_) => Options::default(),
        }
    }

    /// Writes options to disk. Failures are reported and swallowed so a
    /// read-only install never breaks the settings screen.
    pub fn save(&self) {
        let path = config_path("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(text) => {
                if let Err(e) = std::fs::write(&path, text) {
                    eprintln!("failed to write {}: {e}", path.display());
                }
            }
            Err(e) => eprintln!("failed to encode settings: {e}"),
        }
    }
}

/// Resolves a data file next to the executable, falling back to the working
/// directory when the executable path is unavailable.
pub fn config_path(name: &str) -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolution cycling wraps in both directions.
    #[test]
    fn resolution_index_wraps() {
        let mut opts = Options::default();
        assert_eq!(opts.res_index(), 0);
        opts.set_res_index(-1);
        assert_eq!(opts.window_size, RESOLUTIONS[3]);
        opts.set_res_index(opts.res_index() as isize + 1);
        assert_eq!(opts.window_size, RESOLUTIONS[0]);
    }

    /// Unknown window sizes map to the first preset rather than panicking.
    #[test]
    fn unknown_resolution_defaults_to_first() {
        let opts = Options {
            window_size: (123, 456),
            ..Options::default()
        };
        assert_eq!(opts.res_index(), 0);
    }

    /// Options survive a JSON round trip unchanged.
    #[test]
    fn options_round_trip() {
        let opts = Options {
            fullscreen: false,
            window_size: (1280, 720),
            invert_mouse_x: true,
            music_volume: 0.4,
            sfx_volume: 0.8,
        };
        let text = serde_json::to_string(&opts).unwrap();
        let back: Options = serde_json::from_str(&text).unwrap();
        assert_eq!(back.fullscreen, opts.fullscreen);
        assert_eq!(back.window_size, opts.window_size);
        assert_eq!(back.invert_mouse_x, opts.invert_mouse_x);
        assert!((back.music_volume - opts.music_volume).abs() < 1e-6);
        assert!((back.sfx_volume - opts.sfx_volume).abs() < 1e-6);
    }
}
