//! Whole-screen composition for everything that is not the 3D world: the
//! main menu, settings, pause, and the three end cards.
//!
//! Layout follows fractions of the compose height so the proportions hold
//! if the compose target ever changes: title at 18%, first row at 36%,
//! rows every 40px, captions at 82%, hints at 88%. Text is centered on its
//! anchor point.

use crate::game::{GameState, MENU_ITEMS, PAUSE_ITEMS};
use crate::renderer::font::{self, GLYPH_H};
use crate::renderer::framebuffer::PixelBuffer;
use crate::renderer::textures::TextureSet;

const BG: [u8; 4] = [10, 10, 10, 255];
const TITLE: [u8; 4] = [220, 220, 220, 255];
const SELECTED: [u8; 4] = [255, 235, 120, 255];
const UNSELECTED: [u8; 4] = [170, 170, 170, 255];
const HINT: [u8; 4] = [130, 130, 130, 255];
const CAPTION: [u8; 4] = [240, 240, 240, 255];

const SCALE_TEXT: usize = 2;
const SCALE_ITEM: usize = 3;
const SCALE_TITLE: usize = 5;
const SCALE_LOGO: usize = 8;
const ROW_STEP: i32 = 40;

/// Draws `text` centered on `(cx, cy)` both ways.
fn text_center(frame: &mut PixelBuffer, cx: i32, cy: i32, text: &str, color: [u8; 4], scale: usize) {
    let top = cy - (GLYPH_H * scale) as i32 / 2;
    font::draw_text_centered(frame, cx, top, text, color, scale);
}

/// Shared body of the list screens: a plain title, selectable rows, an
/// optional hint line at the bottom.
fn draw_list(frame: &mut PixelBuffer, title: &str, items: &[String], selected: usize, hint: &str) {
    frame.fill(BG);
    let cx = frame.w as i32 / 2;
    let h = frame.h as f32;

    text_center(frame, cx, (h * 0.18) as i32, title, TITLE, SCALE_TITLE);

    let base_y = (h * 0.36) as i32;
    for (i, item) in items.iter().enumerate() {
        let color = if i == selected { SELECTED } else { UNSELECTED };
        text_center(frame, cx, base_y + i as i32 * ROW_STEP + 12, item, color, SCALE_ITEM);
    }

    if !hint.is_empty() {
        text_center(frame, cx, (h * 0.88) as i32, hint, HINT, SCALE_TEXT);
    }
}

/// The main menu, with the outlined logo treatment above the items.
pub fn draw_menu(frame: &mut PixelBuffer, selected: usize) {
    frame.fill(BG);
    let cx = frame.w as i32 / 2;
    let h = frame.h as f32;
    let title_y = (h * 0.18) as i32;

    text_center(frame, cx, title_y - 30, "ESCAPE FROM THE", TITLE, SCALE_TEXT);
    font::draw_text_outlined(
        frame,
        cx,
        title_y - (GLYPH_H * SCALE_LOGO) as i32 / 2,
        "OUBLIETTE",
        &[([10, 70, 60, 255], 4), ([210, 140, 40, 255], 2)],
        [235, 235, 225, 255],
        SCALE_LOGO,
    );

    let base_y = (h * 0.36) as i32;
    for (i, item) in MENU_ITEMS.iter().enumerate() {
        let color = if i == selected { SELECTED } else { UNSELECTED };
        text_center(frame, cx, base_y + i as i32 * ROW_STEP + 12, item, color, SCALE_ITEM);
    }
}

/// The settings screen; rows are rendered from the live option values.
pub fn draw_settings(frame: &mut PixelBuffer, gs: &GameState) {
    let o = &gs.options;
    let on_off = |v: bool| if v { "ON" } else { "OFF" };
    let rows = [
        format!("Mouse invert X: {}", on_off(o.invert_mouse_x)),
        format!("Fullscreen: {}", on_off(o.fullscreen)),
        format!(
            "Resolution: {}x{}{}",
            o.window_size.0,
            o.window_size.1,
            if o.fullscreen { " (only windowed)" } else { "" }
        ),
        format!("Music volume: {}%", (o.music_volume * 100.0).round() as i32),
        format!("SFX volume: {}%", (o.sfx_volume * 100.0).round() as i32),
        "Back".to_string(),
    ];
    draw_list(frame, "Settings", &rows, gs.settings_sel, "Left/Right to change");
}

/// The pause menu. A non-empty notice renders as an extra, never-selected
/// grey row under the items, which is where "Saved" and "No save" land.
pub fn draw_pause(frame: &mut PixelBuffer, gs: &GameState) {
    let mut items: Vec<String> = PAUSE_ITEMS.iter().map(|s| s.to_string()).collect();
    if !gs.pause_notice.is_empty() {
        items.push(gs.pause_notice.to_string());
    }
    draw_list(frame, "Paused", &items, gs.pause_sel, "");
}

/// The jumpscare card: the screamer face stretched over the whole frame.
pub fn draw_screamer(frame: &mut PixelBuffer, textures: &TextureSet) {
    frame.fill([0, 0, 0, 255]);
    frame.blit_scaled(&textures.screamer, 0, 0, frame.w as i32, frame.h as i32, 255);
}

/// The victory card: a lit doorway in a warm haze, painted per pixel.
pub fn draw_victory(frame: &mut PixelBuffer) {
    let (w, h) = (frame.w as i32, frame.h as i32);
    for y in 0..h {
        for x in 0..w {
            let fx = (x - w / 2) as f32 / w as f32;
            let fy = (y - h / 2) as f32 / h as f32;
            let d = (fx * fx * 2.2 + fy * fy * 3.0).sqrt();
            let glow = (1.0 - d).clamp(0.0, 1.0).powf(1.6);
            frame.set_px(
                x,
                y,
                [
                    (18.0 + 170.0 * glow) as u8,
                    (14.0 + 132.0 * glow) as u8,
                    (10.0 + 78.0 * glow) as u8,
                    255,
                ],
            );
        }
    }
    // The doorway itself: an arched slab of light.
    frame.fill_rect(w / 2 - 60, h / 2 - 120, 120, 250, [245, 232, 200, 255]);
    frame.fill_circle(w / 2, h / 2 - 120, 60, [245, 232, 200, 255]);

    let cx = w / 2;
    text_center(frame, cx, (h as f32 * 0.82) as i32, "You escaped", CAPTION, SCALE_TITLE);
    text_center(frame, cx, (h as f32 * 0.88) as i32, "Press Enter", HINT, SCALE_TEXT);
}

/// The defeat card: a red-black pall with the verdict.
pub fn draw_game_over(frame: &mut PixelBuffer) {
    let (w, h) = (frame.w as i32, frame.h as i32);
    for y in 0..h {
        for x in 0..w {
            let fx = (x - w / 2) as f32 / w as f32;
            let fy = (y - h / 2) as f32 / h as f32;
            let d = (fx * fx + fy * fy * 2.0).sqrt();
            let ember = (1.0 - d).clamp(0.0, 1.0);
            frame.set_px(
                x,
                y,
                [
                    (8.0 + 72.0 * ember) as u8,
                    (6.0 + 14.0 * ember) as u8,
                    (6.0 + 12.0 * ember) as u8,
                    255,
                ],
            );
        }
    }
    let cx = w / 2;
    text_center(frame, cx, (h as f32 * 0.82) as i32, "You failed", CAPTION, SCALE_TITLE);
    text_center(frame, cx, (h as f32 * 0.88) as i32, "Press Enter", HINT, SCALE_TEXT);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_color(frame: &PixelBuffer, color: [u8; 4]) -> bool {
        frame.bytes().chunks_exact(4).any(|px| px == color)
    }

    #[test]
    fn menu_highlight_follows_selection() {
        let mut a = PixelBuffer::new(960, 540);
        let mut b = PixelBuffer::new(960, 540);
        draw_menu(&mut a, 0);
        draw_menu(&mut b, 2);
        assert!(has_color(&a, SELECTED));
        assert!(has_color(&a, UNSELECTED));
        assert_ne!(a.bytes(), b.bytes());
    }

    #[test]
    fn end_cards_carry_their_captions() {
        let mut v = PixelBuffer::new(960, 540);
        draw_victory(&mut v);
        assert!(has_color(&v, CAPTION));
        let mut g = PixelBuffer::new(960, 540);
        draw_game_over(&mut g);
        assert!(has_color(&g, CAPTION));
    }
}
