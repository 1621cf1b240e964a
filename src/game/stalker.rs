//! The pursuit agent.
//!
//! A stalker wakes after a short grace period, then alternates between two
//! clocks: a replan tick that reads the shared distance field and picks the
//! next corridor cell, and per-frame movement toward that pick. Losing the
//! field (isolated pocket, wrap seam) degrades to walking at the player's
//! raw position, so a stalker is never idle once awake.

use crate::game::pathfind::{DistanceField, pick_next_cell};
use crate::maze::Grid;

/// Corridor distance reported when the stalker's cell is outside the field.
pub const UNREACHED_DIST: i32 = 999;

/// How close the stalker must get before a waypoint counts as reached.
const TARGET_REACHED: f32 = 0.18;

/// One pursuer: a position, an activation time, and the replan state the
/// update loop drives.
#[derive(Debug, Clone)]
pub struct Stalker {
    /// East/west position in cells.
    pub x: f32,
    /// North/south position in cells.
    pub y: f32,
    /// Run-clock second at which the stalker starts hunting.
    pub active_time: f32,
    /// Run-clock second of the next field read.
    pub next_replan: f32,
    /// Current waypoint in world coordinates, if any.
    pub target: Option<(f32, f32)>,
    /// Corridor distance to the player in cells, as of the last replan.
    /// Drives the hunt drone volume.
    pub tunnel_dist_cells: i32,
}

impl Stalker {
    /// Spawns at `(x, y)`, dormant until `active_time` on the run clock.
    pub fn new(x: f32, y: f32, active_time: f32) -> Self {
        Self {
            x,
            y,
            active_time,
            next_replan: 0.0,
            target: None,
            tunnel_dist_cells: UNREACHED_DIST,
        }
    }

    /// True while the post-spawn grace period is still running.
    pub fn is_dormant(&self, now: f32) -> bool {
        now < self.active_time
    }

    /// Grid cell currently occupied.
    pub fn cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Reads the distance field: records the corridor distance for the
    /// audio layer and picks the next waypoint. When no neighbor was
    /// reached the stalker targets the player's raw position, which walks
    /// it into walls harmlessly until the field finds it again.
    pub fn replan(
        &mut self,
        now: f32,
        interval: f32,
        field: &DistanceField,
        player_pos: (f32, f32),
    ) {
        self.next_replan = now + interval;

        let (cx, cy) = self.cell();
        let d = field.get(cx, cy);
        self.tunnel_dist_cells = if d >= 0 { d } else { UNREACHED_DIST };

        self.target = match pick_next_cell(field, cx, cy) {
            Some((nx, ny)) => Some((nx as f32 + 0.5, ny as f32 + 0.5)),
            None => Some(player_pos),
        };
    }

    /// One frame of movement toward the waypoint.
    ///
    /// Falls back to the player's position when no waypoint is set, steps a
    /// normalized `speed * dt` with per-axis cell checks so corners slide
    /// instead of snagging, lets the grid wrap the position, and drops the
    /// waypoint once it is reached.
    pub fn advance(&mut self, grid: &Grid, dt: f32, speed: f32, player_pos: (f32, f32)) {
        let (tx, ty) = *self.target.get_or_insert(player_pos);

        let dx = tx - self.x;
        let dy = ty - self.y;
        let dist = dx.hypot(dy) + 1e-9;
        let step = speed * dt;

        let nx = self.x + dx / dist * step;
        if !grid.is_blocking(nx.floor() as i32, self.y.floor() as i32) {
            self.x = nx;
        }
        let ny = self.y + dy / dist * step;
        if !grid.is_blocking(self.x.floor() as i32, ny.floor() as i32) {
            self.y = ny;
        }

        grid.apply_wrap(&mut self.x, &mut self.y);

        if (self.x - tx).hypot(self.y - ty) < TARGET_REACHED {
            self.target = None;
        }
    }

    /// Straight-line distance to the player, used for the catch test.
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        (self.x - x).hypot(self.y - y)
    }
}
