//! Owns the CPU surfaces and composes one finished frame per present.
//!
//! The play view is raycast into a small internal buffer, integer-upscaled
//! into the compose buffer, and the overlays go on top at full resolution.
//! Menu and card screens paint the compose buffer directly. Whatever screen
//! is active, [`SceneRenderer::compose_frame`] ends with the finished RGBA
//! frame ready for upload.

use crate::config::{COMPOSE_H, COMPOSE_W, RENDER_H, RENDER_W};
use crate::game::{CurrentScreen, GameState};
use crate::renderer::framebuffer::{PixelBuffer, opaque};
use crate::renderer::textures::{Texture, TextureSet, vignette_alpha};
use crate::renderer::{overlay, raycast, screens};

/// How far the ceiling and floor fade by the horizon line.
const HORIZON_FADE: f32 = 0.22;

/// The software renderer: internal framebuffer, compose target, z-buffer,
/// painted textures, vignette mask.
pub struct SceneRenderer {
    render: PixelBuffer,
    compose: PixelBuffer,
    zbuffer: Vec<f32>,
    textures: TextureSet,
    vignette: Vec<u8>,
}

impl SceneRenderer {
    /// Builds the surfaces and paints the texture set.
    pub fn new() -> Self {
        Self {
            render: PixelBuffer::new(RENDER_W, RENDER_H),
            compose: PixelBuffer::new(COMPOSE_W, COMPOSE_H),
            zbuffer: vec![raycast::FAR; RENDER_W],
            textures: TextureSet::new(),
            vignette: vignette_alpha(COMPOSE_W, COMPOSE_H),
        }
    }

    /// Composes the frame for whatever screen is active and returns it.
    pub fn compose_frame(&mut self, gs: &GameState) -> &PixelBuffer {
        match gs.current_screen {
            CurrentScreen::Menu => screens::draw_menu(&mut self.compose, gs.menu_sel),
            CurrentScreen::Settings => screens::draw_settings(&mut self.compose, gs),
            CurrentScreen::Play => self.draw_play(gs),
            CurrentScreen::Pause => screens::draw_pause(&mut self.compose, gs),
            CurrentScreen::Screamer => screens::draw_screamer(&mut self.compose, &self.textures),
            CurrentScreen::Victory => screens::draw_victory(&mut self.compose),
            CurrentScreen::GameOver => screens::draw_game_over(&mut self.compose),
        }
        &self.compose
    }

    fn draw_play(&mut self, gs: &GameState) {
        let Some(run) = gs.run.as_ref() else {
            self.compose.fill([10, 10, 10, 255]);
            return;
        };

        self.fill_ceiling_and_floor(gs.tuning.ceil_color, gs.tuning.floor_color);

        self.zbuffer.fill(raycast::FAR);
        raycast::cast_walls(
            &mut self.render,
            &mut self.zbuffer,
            &run.grid,
            &gs.player,
            &self.textures.wall,
            &self.textures.door,
            &gs.tuning,
        );
        raycast::draw_door_plane(
            &mut self.render,
            &self.zbuffer,
            &run.door,
            &gs.player,
            &self.textures.door,
            &gs.tuning,
        );

        // Sprites, painter-sorted far to near so near ones win overlaps.
        struct Sprite<'a> {
            x: f32,
            y: f32,
            scale: f32,
            tex: &'a Texture,
            dist_sq: f32,
        }
        let mut sprites: Vec<Sprite> = Vec::new();
        for s in &gs.stalkers {
            if s.is_dormant(gs.clock) {
                continue;
            }
            let (dx, dy) = (s.x - gs.player.x, s.y - gs.player.y);
            sprites.push(Sprite {
                x: s.x,
                y: s.y,
                scale: 1.10,
                tex: &self.textures.stalker,
                dist_sq: dx * dx + dy * dy,
            });
        }
        for (i, &(sx, sy)) in run.seals.iter().enumerate() {
            if run.collected[i] {
                continue;
            }
            let (dx, dy) = (sx - gs.player.x, sy - gs.player.y);
            sprites.push(Sprite {
                x: sx,
                y: sy,
                scale: 1.0,
                tex: &self.textures.seal,
                dist_sq: dx * dx + dy * dy,
            });
        }
        sprites.sort_by(|a, b| b.dist_sq.total_cmp(&a.dist_sq));
        for s in &sprites {
            raycast::draw_billboard(
                &mut self.render,
                &self.zbuffer,
                &gs.player,
                s.tex,
                s.x,
                s.y,
                s.scale,
                gs.tuning.fog_strength,
            );
        }

        self.compose.upscale_from(&self.render, COMPOSE_W / RENDER_W);

        overlay::apply_vignette(&mut self.compose, &self.vignette, run.lives, gs.clock);
        overlay::draw_noise(&mut self.compose, gs.tuning.noise_dots);
        overlay::draw_hud(&mut self.compose, gs, &self.textures);
        overlay::draw_door_hint(&mut self.compose, gs);
        if gs.show_minimap {
            overlay::draw_minimap(&mut self.compose, run, &gs.player);
        }
    }

    /// Flat fills with a subtle vertical fade toward the horizon, which
    /// reads as depth without any real floor casting.
    fn fill_ceiling_and_floor(&mut self, ceil: [u8; 3], floor: [u8; 3]) {
        let w = self.render.w as i32;
        let h = self.render.h as i32;
        let half = h / 2;
        for y in 0..half {
            let f = 1.0 - HORIZON_FADE * (y as f32 / half as f32);
            self.render.fill_rect(0, y, w, 1, opaque(scale_rgb(ceil, f)));
        }
        for y in half..h {
            let f = (1.0 - HORIZON_FADE) + HORIZON_FADE * ((y - half) as f32 / (h - half) as f32);
            self.render.fill_rect(0, y, w, 1, opaque(scale_rgb(floor, f)));
        }
    }
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn scale_rgb(c: [u8; 3], f: f32) -> [u8; 3] {
    [
        (c[0] as f32 * f) as u8,
        (c[1] as f32 * f) as u8,
        (c[2] as f32 * f) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_every_screen_without_a_run() {
        let mut scene = SceneRenderer::new();
        let mut gs = GameState::new();
        for screen in [
            CurrentScreen::Menu,
            CurrentScreen::Settings,
            CurrentScreen::Play,
            CurrentScreen::Pause,
            CurrentScreen::Screamer,
            CurrentScreen::Victory,
            CurrentScreen::GameOver,
        ] {
            gs.current_screen = screen;
            let frame = scene.compose_frame(&gs);
            assert_eq!(frame.bytes().len(), COMPOSE_W * COMPOSE_H * 4);
        }
    }

    #[test]
    fn play_frame_draws_world_and_hud() {
        let mut scene = SceneRenderer::new();
        let mut gs = GameState::new();
        gs.start_new_run();
        gs.current_screen = CurrentScreen::Play;
        let frame = scene.compose_frame(&gs);
        // Ceiling fill reaches the top-left corner under the vignette.
        assert_ne!(frame.bytes()[3], 0);
        // A heart pixel sits in the HUD area when lives are full; hearts
        // are drawn after the vignette, so the crimson survives.
        let i = ((20 * COMPOSE_W) + 24) * 4;
        assert!(frame.bytes()[i] > 150);
        assert!(frame.bytes()[i + 1] < 150);
    }
}
