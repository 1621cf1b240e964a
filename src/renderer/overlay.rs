//! Full-resolution overlays drawn on the compose buffer after the world:
//! vignette, film grain, the HUD stack, the door hint, and the minimap.
//!
//! All coordinates here are compose-buffer pixels (960x540 by default), so
//! the layout constants read like absolute screen positions.

use crate::game::GameState;
use crate::game::director::Run;
use crate::game::player::Player;
use crate::maze::grid::CellKind;
use crate::renderer::font;
use crate::renderer::framebuffer::PixelBuffer;
use crate::renderer::textures::TextureSet;
use rand::Rng;

/// Player-to-trigger distance under which the door hint appears.
const HINT_DIST: f32 = 1.15;
/// Minimap edge length budget in pixels.
const MINIMAP_TARGET: i32 = 220;

/// Darkens the frame toward its corners using a precomputed alpha mask.
/// On the last life the mask breathes, scaled up and down on a slow sine.
pub fn apply_vignette(frame: &mut PixelBuffer, mask: &[u8], lives: i32, clock: f32) {
    debug_assert_eq!(mask.len(), frame.w * frame.h);
    let pulse = if lives == 1 {
        1.0 + 0.35 * (0.5 + 0.5 * (clock * 5.0).sin())
    } else {
        1.0
    };
    let w = frame.w as i32;
    for (i, &a) in mask.iter().enumerate() {
        if a == 0 {
            continue;
        }
        let a = ((a as f32 * pulse) as i32).min(255) as u8;
        frame.blend_px(i as i32 % w, i as i32 / w, [0, 0, 0, a]);
    }
}

/// Scatters dark grain dots over the frame. Intentionally not seeded; the
/// grain should differ every present.
pub fn draw_noise(frame: &mut PixelBuffer, dots: usize) {
    let mut rng = rand::thread_rng();
    let (w, h) = (frame.w as i32, frame.h as i32);
    for _ in 0..dots {
        let x = rng.gen_range(0..w);
        let y = rng.gen_range(0..h);
        let c = rng.gen_range(10..=28) as u8;
        frame.set_px(x, y, [c, c, c, 255]);
    }
}

/// Draws the aiming cross at the frame center.
fn draw_reticle(frame: &mut PixelBuffer) {
    let cx = frame.w as i32 / 2;
    let cy = frame.h as i32 / 2;
    let c = [230, 230, 230, 160];
    frame.blend_rect(cx - 8, cy - 1, 6, 2, c);
    frame.blend_rect(cx + 2, cy - 1, 6, 2, c);
    frame.blend_rect(cx - 1, cy - 8, 2, 6, c);
    frame.blend_rect(cx - 1, cy + 2, 2, 6, c);
}

/// The left-edge HUD stack: hearts, seal icons, the tally, the map line,
/// the door state line, plus the center reticle.
pub fn draw_hud(frame: &mut PixelBuffer, gs: &GameState, textures: &TextureSet) {
    let Some(run) = gs.run.as_ref() else {
        return;
    };

    for i in 0..run.lives {
        frame.blit_scaled(&textures.heart, 12 + i * 32, 12, 28, 28, 255);
    }

    for (i, &got) in run.collected.iter().enumerate() {
        let brightness = if got { 255 } else { 110 };
        frame.blit_scaled(&textures.seal, 12 + i as i32 * 40, 50, 34, 34, brightness);
    }

    let total = run.seals.len();
    let got = total - run.seals_remaining();
    font::draw_text(frame, 12, 90, &format!("{got}/{total}"), [235, 235, 235, 255], 2);
    font::draw_text(
        frame,
        12,
        116,
        &format!("Map {}", run.map_index + 1),
        [150, 150, 150, 255],
        2,
    );

    let (line, color) = if run.door_open {
        if gs.clock < gs.door_flash_until {
            ("Door: open", [255, 250, 180, 255])
        } else {
            ("Door: open", [170, 240, 170, 255])
        }
    } else {
        ("Door: sealed", [150, 150, 150, 255])
    };
    font::draw_text(frame, 12, 142, line, color, 2);

    draw_reticle(frame);
}

/// Centered hint near the bottom when the player stands at a sealed door.
pub fn draw_door_hint(frame: &mut PixelBuffer, gs: &GameState) {
    let Some(run) = gs.run.as_ref() else {
        return;
    };
    let remaining = run.seals_remaining();
    if run.door_open || remaining == 0 {
        return;
    }
    let (tx, ty) = run.door.trigger;
    if gs.player.distance_to(tx, ty) >= HINT_DIST {
        return;
    }
    let noun = if remaining == 1 { "seal" } else { "seals" };
    let msg = format!("The door is sealed. {remaining} {noun} remaining");
    let y = (frame.h as f32 * 0.82) as i32;
    font::draw_text_centered(frame, frame.w as i32 / 2, y, &msg, [240, 220, 140, 255], 2);
}

/// Top-right minimap: walls, the door, uncollected seals, the player dot
/// with a heading tick. Composited through its own surface so the
/// translucent background keeps one uniform alpha under the solid marks.
pub fn draw_minimap(frame: &mut PixelBuffer, run: &Run, player: &Player) {
    let grid = &run.grid;
    let cell = (MINIMAP_TARGET / grid.w).min(MINIMAP_TARGET / grid.h).max(1);
    let map_w = cell * grid.w;
    let map_h = cell * grid.h;

    let mut map = PixelBuffer::new(map_w as usize, map_h as usize);
    map.fill([0, 0, 0, 110]);

    for y in 0..grid.h {
        for x in 0..grid.w {
            if grid.cell_at(x, y) == CellKind::Wall {
                map.fill_rect(x * cell, y * cell, cell, cell, [35, 35, 35, 230]);
            }
        }
    }

    let (dx, dy) = run.door.cell;
    map.fill_circle(
        ((dx as f32 + 0.5) * cell as f32) as i32,
        ((dy as f32 + 0.5) * cell as f32) as i32,
        (cell / 2).max(2),
        [40, 140, 255, 240],
    );

    for (i, &(sx, sy)) in run.seals.iter().enumerate() {
        if run.collected[i] {
            continue;
        }
        map.fill_circle(
            (sx * cell as f32) as i32,
            (sy * cell as f32) as i32,
            (cell / 3).max(2),
            [250, 200, 70, 240],
        );
    }

    let px = (player.x * cell as f32) as i32;
    let py = (player.y * cell as f32) as i32;
    let len = cell.max(6) as f32;
    map.fill_circle(px, py, (cell / 3).max(2), [255, 80, 80, 255]);
    map.draw_line(
        px,
        py,
        px + (player.dirx * len) as i32,
        py + (player.diry * len) as i32,
        [255, 200, 200, 255],
        2,
    );

    frame.blit_alpha(&map, frame.w as i32 - map_w - 12, 12);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::textures::vignette_alpha;

    #[test]
    fn vignette_darkens_corners_not_center() {
        let mut frame = PixelBuffer::new(64, 64);
        frame.fill([200, 200, 200, 255]);
        let mask = vignette_alpha(64, 64);
        apply_vignette(&mut frame, &mask, 3, 0.0);
        let corner = &frame.bytes()[0..3];
        let center = ((32 * 64 + 32) * 4) as usize;
        assert!(corner[0] < 200);
        assert_eq!(frame.bytes()[center], 200);
    }

    #[test]
    fn last_life_pulse_never_overflows() {
        let mut frame = PixelBuffer::new(8, 8);
        frame.fill([255, 255, 255, 255]);
        let mask = vec![255u8; 64];
        // Peak of the sine: 255 * 1.35 must clamp, not wrap.
        apply_vignette(&mut frame, &mask, 1, std::f32::consts::FRAC_PI_2 / 5.0);
        assert_eq!(&frame.bytes()[0..3], &[0, 0, 0]);
    }

    #[test]
    fn noise_stays_dark_and_in_bounds() {
        let mut frame = PixelBuffer::new(16, 16);
        draw_noise(&mut frame, 200);
        for px in frame.bytes().chunks_exact(4) {
            assert!(px[0] <= 28);
        }
    }
}
