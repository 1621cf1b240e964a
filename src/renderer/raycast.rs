//! The column raycaster: DDA walls, the exit-door slab, sprite billboards.
//!
//! Everything here draws into the small internal framebuffer at one ray per
//! column. Walls fill a shared z-buffer of perpendicular distances; the door
//! slab and billboards test against it so occlusion falls out naturally.
//! Wrap portals are part of the march itself: a ray that leaves the grid
//! through an open edge re-enters from the opposite side with its travel
//! distance intact, which is what makes a portal corridor look seamless.

use crate::config::Tuning;
use crate::game::director::{Door, DoorOrientation};
use crate::game::player::Player;
use crate::maze::grid::{CellKind, Edge, Grid};
use crate::renderer::framebuffer::PixelBuffer;
use crate::renderer::textures::Texture;

/// Distance stored in the z-buffer for columns that hit nothing.
pub const FAR: f32 = 1e9;

/// Darkest the door slab is allowed to fade to.
const DOOR_MIN_LEVEL: i32 = 80;
/// Darkest a billboard is allowed to fade to.
const SPRITE_MIN_LEVEL: i32 = 120;

/// Exponential distance fog. The 22 matches the cell scale the fog strength
/// was tuned against.
fn fog_factor(strength: f32, dist: f32) -> f32 {
    (-strength * dist * 22.0).exp()
}

/// Marches one ray per screen column and draws textured wall strips.
///
/// `zbuffer` must hold one entry per column, pre-filled with [`FAR`];
/// columns that hit a wall get their perpendicular distance written.
pub fn cast_walls(
    frame: &mut PixelBuffer,
    zbuffer: &mut [f32],
    grid: &Grid,
    player: &Player,
    wall_tex: &Texture,
    door_tex: &Texture,
    tuning: &Tuning,
) {
    let w = frame.w as i32;
    let h = frame.h as i32;
    let max_steps = (grid.w * grid.h * 4) as usize;

    for x in 0..w {
        let camera_x = 2.0 * x as f32 / w as f32 - 1.0;
        let ray_dx = player.dirx + player.planex * camera_x;
        let ray_dy = player.diry + player.planey * camera_x;

        let delta_x = if ray_dx.abs() <= 1e-12 {
            1e30
        } else {
            (1.0 / ray_dx).abs()
        };
        let delta_y = if ray_dy.abs() <= 1e-12 {
            1e30
        } else {
            (1.0 / ray_dy).abs()
        };

        let mut map_x = player.x.floor() as i32;
        let mut map_y = player.y.floor() as i32;

        let (step_x, mut side_x) = if ray_dx < 0.0 {
            (-1, (player.x - map_x as f32) * delta_x)
        } else {
            (1, (map_x as f32 + 1.0 - player.x) * delta_x)
        };
        let (step_y, mut side_y) = if ray_dy < 0.0 {
            (-1, (player.y - map_y as f32) * delta_y)
        } else {
            (1, (map_y as f32 + 1.0 - player.y) * delta_y)
        };

        let mut side = 0;
        let mut dist = 0.0f32;
        let mut hit = false;

        for _ in 0..max_steps {
            let traveled;
            if side_x < side_y {
                traveled = side_x;
                side_x += delta_x;
                map_x += step_x;
                side = 0;
            } else {
                traveled = side_y;
                side_y += delta_y;
                map_y += step_y;
                side = 1;
            }

            // Rim checks come before the cell itself. An allowed portal
            // re-enters from the far row or column and keeps marching; a
            // denied rim is a wall at the edge.
            if map_y < 0 {
                let x_at = player.x + ray_dx * traveled;
                if grid.portal_allows(Edge::North, x_at) {
                    map_y = grid.h - 1;
                    continue;
                }
                dist = traveled;
                hit = true;
                break;
            }
            if map_y >= grid.h {
                let x_at = player.x + ray_dx * traveled;
                if grid.portal_allows(Edge::South, x_at) {
                    map_y = 0;
                    continue;
                }
                dist = traveled;
                hit = true;
                break;
            }
            if map_x < 0 {
                let y_at = player.y + ray_dy * traveled;
                if grid.portal_allows(Edge::West, y_at) {
                    map_x = grid.w - 1;
                    continue;
                }
                dist = traveled;
                hit = true;
                break;
            }
            if map_x >= grid.w {
                let y_at = player.y + ray_dy * traveled;
                if grid.portal_allows(Edge::East, y_at) {
                    map_x = 0;
                    continue;
                }
                dist = traveled;
                hit = true;
                break;
            }
            if grid.is_blocking(map_x, map_y) {
                dist = traveled;
                hit = true;
                break;
            }
        }

        if !hit {
            // Open column: leave the far z so sprites still draw there.
            continue;
        }

        let perp = dist.max(tuning.min_wall_dist);
        zbuffer[x as usize] = perp;

        let line_h = ((h as f32 / perp) as i32).min(h * tuning.max_lineheight_mult);
        let draw_start = (h / 2 - (line_h + 1) / 2).max(0);
        let draw_end = (h / 2 + line_h / 2).min(h - 1);
        let visible_h = draw_end - draw_start;
        if visible_h <= 0 {
            continue;
        }

        let tex = if grid.cell_at(map_x, map_y) == CellKind::Door {
            door_tex
        } else {
            wall_tex
        };

        let hit_along = if side == 0 {
            player.y + perp * ray_dy
        } else {
            player.x + perp * ray_dx
        };
        let wall_frac = hit_along - hit_along.floor();
        let mut tex_x = (wall_frac * tex.w as f32) as i32;
        if (side == 0 && ray_dx > 0.0) || (side == 1 && ray_dy < 0.0) {
            tex_x = tex.w as i32 - tex_x - 1;
        }
        let tex_x = tex_x.clamp(0, tex.w as i32 - 1) as usize;

        let shade = if side == 1 { 0.78 } else { 1.0 };
        let level = ((255.0 * fog_factor(tuning.fog_strength, perp) * shade) as i32)
            .clamp(20, 255) as u32;

        for row in 0..visible_h {
            // The whole texture column is squashed into the visible span,
            // so close-up walls compress rather than crop.
            let ty = (row as usize * tex.h) / visible_h as usize;
            let c = tex.at(tex_x, ty);
            frame.set_px(
                x,
                draw_start + row,
                [
                    ((c[0] as u32 * level) / 255) as u8,
                    ((c[1] as u32 * level) / 255) as u8,
                    ((c[2] as u32 * level) / 255) as u8,
                    255,
                ],
            );
        }
    }
}

/// Draws the door slab as a textured plane on its cell boundary.
///
/// The slab is ray/plane intersected per column and z-tested against the
/// wall distances, but never writes the z-buffer itself: sprites in front
/// of the door still occlude it by distance.
pub fn draw_door_plane(
    frame: &mut PixelBuffer,
    zbuffer: &[f32],
    door: &Door,
    player: &Player,
    tex: &Texture,
    tuning: &Tuning,
) {
    let w = frame.w as i32;
    let h = frame.h as i32;
    let (plane_x, plane_y) = door.plane;

    for x in 0..w {
        let camera_x = 2.0 * x as f32 / w as f32 - 1.0;
        let ray_dx = player.dirx + player.planex * camera_x;
        let ray_dy = player.diry + player.planey * camera_x;

        let (t, coord) = match door.orientation {
            DoorOrientation::Vertical => {
                if ray_dx.abs() < 1e-6 {
                    continue;
                }
                let t = (plane_x - player.x) / ray_dx;
                (t, player.y + t * ray_dy - (plane_y - 0.5))
            }
            DoorOrientation::Horizontal => {
                if ray_dy.abs() < 1e-6 {
                    continue;
                }
                let t = (plane_y - player.y) / ray_dy;
                (t, player.x + t * ray_dx - (plane_x - 0.5))
            }
        };
        if t <= 0.0 || !(0.0..=1.0).contains(&coord) {
            continue;
        }

        let perp = (t - 1e-4).max(1e-4);
        if perp > zbuffer[x as usize] + 1e-6 {
            continue;
        }

        let line_h = ((h as f32 / perp).abs() as i32).clamp(4, h * tuning.max_lineheight_mult);
        let draw_start = h / 2 - (line_h + 1) / 2;
        let y0 = draw_start.max(0);
        let y1 = (draw_start + line_h).min(h);

        let tex_x = ((coord * tex.w as f32) as i32).clamp(0, tex.w as i32 - 1) as usize;
        let shade = match door.orientation {
            DoorOrientation::Vertical => 0.85,
            DoorOrientation::Horizontal => 0.92,
        };
        let level = ((255.0 * fog_factor(tuning.fog_strength, perp) * shade) as i32)
            .clamp(DOOR_MIN_LEVEL, 255) as u32;

        for y in y0..y1 {
            // Cropped, not squashed: off-screen rows fall off the slab.
            let ty = ((y - draw_start) as usize * tex.h) / line_h as usize;
            let c = tex.at(tex_x, ty);
            frame.set_px(
                x,
                y,
                [
                    ((c[0] as u32 * level) / 255) as u8,
                    ((c[1] as u32 * level) / 255) as u8,
                    ((c[2] as u32 * level) / 255) as u8,
                    255,
                ],
            );
        }
    }
}

/// Draws one camera-facing sprite, alpha-blended and z-tested per column.
pub fn draw_billboard(
    frame: &mut PixelBuffer,
    zbuffer: &[f32],
    player: &Player,
    tex: &Texture,
    x: f32,
    y: f32,
    scale: f32,
    fog_strength: f32,
) {
    let w = frame.w as i32;
    let h = frame.h as i32;
    let spr_x = x - player.x;
    let spr_y = y - player.y;

    // Inverse of the camera matrix, guarded against a degenerate basis.
    let inv_det = 1.0 / (player.planex * player.diry - player.dirx * player.planey + 1e-9);
    let trans_x = inv_det * (player.diry * spr_x - player.dirx * spr_y);
    let trans_y = inv_det * (-player.planey * spr_x + player.planex * spr_y);
    if trans_y <= 0.06 {
        return;
    }

    let screen_x = ((w as f32 / 2.0) * (1.0 + trans_x / trans_y)) as i32;
    let sprite_h = (((h as f32 / trans_y).abs() * scale) as i32).clamp(6, h * 2);
    let sprite_w = sprite_h;

    let start_y = h / 2 - (sprite_h + 1) / 2;
    let start_x = screen_x - (sprite_w + 1) / 2;
    let x0 = start_x.max(0);
    let x1 = (start_x + sprite_w).min(w);
    let y0 = start_y.max(0);
    let y1 = (start_y + sprite_h).min(h);

    let level = ((255.0 * fog_factor(fog_strength, trans_y)) as i32)
        .clamp(SPRITE_MIN_LEVEL, 255) as u32;

    for sx in x0..x1 {
        if trans_y >= zbuffer[sx as usize] {
            continue;
        }
        let tx = ((sx - start_x) as usize * tex.w) / sprite_w as usize;
        for sy in y0..y1 {
            let ty = ((sy - start_y) as usize * tex.h) / sprite_h as usize;
            let mut c = tex.at(tx, ty);
            if c[3] == 0 {
                continue;
            }
            c[0] = ((c[0] as u32 * level) / 255) as u8;
            c[1] = ((c[1] as u32 * level) / 255) as u8;
            c[2] = ((c[2] as u32 * level) / 255) as u8;
            frame.blend_px(sx, sy, c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::grid::{MapSpec, WrapPortal};

    fn grid_from(rows: &[&str], portals: Vec<WrapPortal>) -> Grid {
        let rows = rows.iter().map(|s| s.to_string()).collect();
        Grid::from_spec(&MapSpec::new(rows, portals))
    }

    fn player_at(x: f32, y: f32, dir: (f32, f32)) -> Player {
        let mut p = Player::new(0.66);
        p.place(x, y, 0.66);
        p.dirx = dir.0;
        p.diry = dir.1;
        // Plane stays perpendicular with the same length.
        p.planex = -dir.1 * 0.66;
        p.planey = dir.0 * 0.66;
        p
    }

    fn cast(grid: &Grid, player: &Player) -> (PixelBuffer, Vec<f32>) {
        let tuning = Tuning::default();
        let wall = Texture::filled(8, 8, [200, 200, 200, 255]);
        let door = Texture::filled(8, 8, [200, 120, 40, 255]);
        let mut frame = PixelBuffer::new(64, 36);
        let mut zbuffer = vec![FAR; 64];
        cast_walls(&mut frame, &mut zbuffer, grid, player, &wall, &door, &tuning);
        (frame, zbuffer)
    }

    #[test]
    fn corridor_center_column_distance() {
        let grid = grid_from(&["1111111", "1000001", "1111111"], vec![]);
        let player = player_at(1.5, 1.5, (1.0, 0.0));
        let (frame, zbuffer) = cast(&grid, &player);
        // Center ray runs straight down the corridor to the far wall.
        assert!((zbuffer[32] - 4.5).abs() < 1e-3, "got {}", zbuffer[32]);
        // The wall strip was actually drawn.
        let mid = ((18 * frame.w + 32) * 4) as usize;
        assert_ne!(frame.bytes()[mid + 3], 0);
    }

    fn portal_grid() -> Grid {
        // Open rim cells at columns 6-7 on both the north and south rows,
        // wrap portals covering them, one interior wall at (6, 7).
        grid_from(
            &[
                "11111100111",
                "10000000001",
                "10000000001",
                "10000000001",
                "10000000001",
                "10000000001",
                "10000000001",
                "10000010001",
                "10000000001",
                "10000000001",
                "11111100111",
            ],
            vec![
                WrapPortal::new(Edge::North, 6.0, 7.0),
                WrapPortal::new(Edge::South, 6.0, 7.0),
            ],
        )
    }

    #[test]
    fn portal_ray_keeps_stitched_distance() {
        let grid = portal_grid();
        let player = player_at(6.5, 2.5, (0.0, -1.0));
        let (_, zbuffer) = cast(&grid, &player);
        // 2.5 cells to the north rim, wrap, then 3 more cells from the
        // south rim to the interior wall at row 7.
        assert!((zbuffer[32] - 5.5).abs() < 1e-3, "got {}", zbuffer[32]);
    }

    #[test]
    fn ray_outside_portal_span_stops_at_the_rim() {
        let grid = portal_grid();
        // Column 7 is an open rim cell, but 7.5 is past the portal's hi
        // bound, so the rim itself reads as a wall.
        let player = player_at(7.5, 2.5, (0.0, -1.0));
        let (_, zbuffer) = cast(&grid, &player);
        assert!((zbuffer[32] - 2.5).abs() < 1e-3, "got {}", zbuffer[32]);
    }

    #[test]
    fn door_slab_draws_and_respects_depth() {
        let tuning = Tuning::default();
        let tex = Texture::filled(8, 8, [200, 120, 40, 255]);
        let door = Door {
            trigger: (4.5, 5.5),
            plane: (5.0, 5.5),
            cell: (5, 5),
            orientation: DoorOrientation::Vertical,
        };
        let player = player_at(2.5, 5.5, (1.0, 0.0));

        let mut frame = PixelBuffer::new(64, 36);
        let zfar = vec![FAR; 64];
        draw_door_plane(&mut frame, &zfar, &door, &player, &tex, &tuning);
        let mid = ((18 * frame.w + 32) * 4) as usize;
        assert_ne!(frame.bytes()[mid + 3], 0);
        // The slab is one cell wide: edge columns look past it.
        let corner = (18 * frame.w * 4) as usize;
        assert_eq!(frame.bytes()[corner + 3], 0);

        let mut hidden = PixelBuffer::new(64, 36);
        let znear = vec![0.5; 64];
        draw_door_plane(&mut hidden, &znear, &door, &player, &tex, &tuning);
        assert!(hidden.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn billboard_is_occluded_by_nearer_walls() {
        let tex = Texture::filled(8, 8, [255, 255, 255, 255]);
        let player = player_at(2.5, 5.5, (1.0, 0.0));

        let mut visible = PixelBuffer::new(64, 36);
        let zfar = vec![FAR; 64];
        draw_billboard(&mut visible, &zfar, &player, &tex, 4.5, 5.5, 1.0, 0.055);
        assert!(visible.bytes().iter().any(|&b| b != 0));

        let mut hidden = PixelBuffer::new(64, 36);
        let znear = vec![0.5; 64];
        draw_billboard(&mut hidden, &znear, &player, &tex, 4.5, 5.5, 1.0, 0.055);
        assert!(hidden.bytes().iter().all(|&b| b == 0));
    }
}
