//! Run setup: layout choice, objective placement, and respawn.
//!
//! A run is built in one pass: pick a layout from the pool, find a spawn,
//! flood-fill the reachable cells, then place the door and the three seals
//! inside that reachable set. A final doors-open flood check confirms every
//! objective can actually be walked to; layouts that fail it are thrown
//! away and the whole pass retries, up to a small bound.
//!
//! Respawning is separate from setup because it happens again after every
//! lost life: the player goes back to the spawn point and the stalkers are
//! re-seeded far away, biased toward the deepest corridors.

use std::error::Error;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::game::pathfind::{DIRS4, compute_distance_field};
use crate::game::player::Player;
use crate::game::stalker::Stalker;
use crate::maze::{Grid, MapSpec};

/// Layout attempts before setup gives up.
const MAX_LAYOUT_ATTEMPTS: usize = 10;
/// Candidate tries for the door before the fixed fallback.
const MAX_DOOR_TRIES: usize = 250;
/// Minimum spacing between placed objectives, in cells.
const OBJECTIVE_SPACING: f32 = 2.0;
/// Stalkers must seed at least this far (straight line) from objectives.
const STALKER_CLEARANCE: f32 = 4.0;

/// Which axis the door slab spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorOrientation {
    /// The slab spans a north/south boundary (constant x).
    Vertical,
    /// The slab spans an east/west boundary (constant y).
    Horizontal,
}

/// The exit door, fully described.
///
/// `trigger` is the open cell in front of the door; standing inside it once
/// the door is open ends the run. `cell` is the wall cell converted to a
/// door, and `plane` is the exact point on their shared boundary where the
/// slab is rendered.
#[derive(Debug, Clone)]
pub struct Door {
    /// Center of the open cell in front of the door.
    pub trigger: (f32, f32),
    /// Point on the trigger/door boundary where the slab is drawn.
    pub plane: (f32, f32),
    /// The wall cell converted to a door.
    pub cell: (i32, i32),
    /// Which axis the slab spans.
    pub orientation: DoorOrientation,
}

/// Per-run world and objective state.
#[derive(Debug, Clone)]
pub struct Run {
    /// The cell world, door cell stamped.
    pub grid: Grid,
    /// Index into the layout pool, persisted so a save can rebuild the grid.
    pub map_index: usize,
    /// Stalkers seeded per life.
    pub stalker_count: usize,
    /// Where the player starts every life.
    pub spawn_point: (f32, f32),
    /// Seal positions, fixed for the run.
    pub seals: Vec<(f32, f32)>,
    /// Parallel to `seals`.
    pub collected: Vec<bool>,
    /// The exit door.
    pub door: Door,
    /// Recomputed every frame from the collected set.
    pub door_open: bool,
    /// Lives left; reaching zero ends the run.
    pub lives: i32,
}

impl Run {
    /// How many seals are still uncollected.
    pub fn seals_remaining(&self) -> usize {
        self.collected.iter().filter(|&&c| !c).count()
    }
}

/// Builds a fresh run from the layout pool.
///
/// The largest layouts in the pool get two stalkers, everything else one.
/// Fails only when every attempt produced a layout whose objectives could
/// not all be reached from the spawn.
pub fn start_run(
    pool: &[MapSpec],
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> Result<Run, Box<dyn Error>> {
    if pool.is_empty() {
        return Err("layout pool is empty".into());
    }
    let max_area = pool.iter().map(MapSpec::area).max().unwrap_or(0);

    for attempt in 0..MAX_LAYOUT_ATTEMPTS {
        let map_index = rng.gen_range(0..pool.len());
        let mut grid = Grid::from_spec(&pool[map_index]);
        let stalker_count = if pool[map_index].area() == max_area { 2 } else { 1 };

        let spawn_point = find_empty_cell(&grid, (2, 2), rng);
        let spawn_cell = (spawn_point.0.floor() as i32, spawn_point.1.floor() as i32);

        let field =
            compute_distance_field(&grid, spawn_cell.0, spawn_cell.1, |x, y| grid.is_wall(x, y));
        let reachable: Vec<(i32, i32)> = field
            .cells()
            .filter(|&(x, y, d)| d != -1 && !grid.is_wall(x, y))
            .map(|(x, y, _)| (x, y))
            .collect();

        let door = pick_door(&grid, &reachable, spawn_point, rng);
        grid.set_door(door.cell.0, door.cell.1);

        let anchors = [
            ((grid.w / 2) as f32, (grid.h / 2) as f32),
            (2.0, (grid.h - 3) as f32),
            ((grid.w - 3) as f32, 2.0),
        ];
        let mut seals: Vec<(f32, f32)> = Vec::with_capacity(anchors.len());
        for prefer in anchors {
            let mut avoid = vec![spawn_point, door.trigger];
            avoid.extend_from_slice(&seals);
            seals.push(pick_reachable(&reachable, prefer, &avoid, rng));
        }

        // Doors-open check: with the door passable, every objective must be
        // reachable from the spawn or the layout is unplayable.
        let sanity =
            compute_distance_field(&grid, spawn_cell.0, spawn_cell.1, |x, y| grid.is_wall(x, y));
        let solvable = std::iter::once(door.trigger)
            .chain(seals.iter().copied())
            .all(|(tx, ty)| sanity.get(tx.floor() as i32, ty.floor() as i32) != -1);
        if !solvable {
            eprintln!("discarding unsolvable layout (attempt {attempt})");
            continue;
        }

        let collected = vec![false; seals.len()];
        return Ok(Run {
            grid,
            map_index,
            stalker_count,
            spawn_point,
            seals,
            collected,
            door,
            door_open: false,
            lives: tuning.lives,
        });
    }

    Err("failed to generate a reachable layout".into())
}

/// Places the player at the spawn facing east and seeds a fresh set of
/// stalkers. Returns the stalkers; the caller owns them for the life.
///
/// Seeding works from the corridor-distance field around the player:
/// candidates at least 45% of the way to the farthest cell (and at least 6
/// cells out) that also keep a straight-line clearance from every objective
/// are preferred; each relaxation drops one of those constraints so the
/// pick never fails outright. Among the surviving pool the deepest few
/// cells are kept and one is drawn at random per stalker.
pub fn respawn(
    run: &Run,
    player: &mut Player,
    tuning: &Tuning,
    now: f32,
    rng: &mut impl Rng,
) -> Vec<Stalker> {
    player.place(run.spawn_point.0, run.spawn_point.1, tuning.fov_plane);

    let (px, py) = player.cell();
    let field = compute_distance_field(&run.grid, px, py, |x, y| run.grid.is_blocking(x, y));

    let mut candidates: Vec<(i32, i32, i32)> = field
        .cells()
        .filter(|&(x, y, d)| d >= 0 && !run.grid.is_blocking(x, y))
        .map(|(x, y, d)| (d, x, y))
        .collect();
    if candidates.is_empty() {
        candidates.push((0, px + 1, py + 1));
    }

    let dmax = candidates.iter().map(|&(d, _, _)| d).max().unwrap_or(0);
    let min_d = ((dmax as f32 * 0.45) as i32).max(6).min(dmax);

    let mut avoid = vec![run.spawn_point, run.door.trigger];
    avoid.extend_from_slice(&run.seals);

    let mut taken: Vec<(i32, i32)> = Vec::new();
    let clear = |x: i32, y: i32, taken: &[(i32, i32)]| {
        if taken.contains(&(x, y)) {
            return false;
        }
        let cx = x as f32 + 0.5;
        let cy = y as f32 + 0.5;
        avoid
            .iter()
            .all(|&(ax, ay)| (cx - ax).hypot(cy - ay) > STALKER_CLEARANCE)
    };

    let far: Vec<(i32, i32, i32)> = candidates
        .iter()
        .copied()
        .filter(|&(d, x, y)| d >= min_d && clear(x, y, &taken))
        .collect();
    let mut pool = if !far.is_empty() {
        far
    } else {
        let near: Vec<(i32, i32, i32)> = candidates
            .iter()
            .copied()
            .filter(|&(_, x, y)| clear(x, y, &taken))
            .collect();
        if near.is_empty() { candidates.clone() } else { near }
    };

    pool.sort_by(|a, b| b.cmp(a));

    let mut stalkers = Vec::with_capacity(run.stalker_count);
    for _ in 0..run.stalker_count {
        let top_n = (pool.len() / 10).max(8).min(pool.len());
        let (_, x, y) = pool[rng.gen_range(0..top_n)];
        taken.push((x, y));

        let active = now + tuning.stalker_spawn_delay + rng.gen_range(0.0..0.4);
        stalkers.push(Stalker::new(x as f32 + 0.5, y as f32 + 0.5, active));

        pool.retain(|&(_, cx, cy)| !taken.contains(&(cx, cy)));
        if pool.is_empty() {
            pool = candidates.clone();
        }
    }
    stalkers
}

/// Finds a spawn cell, preferring the area around `prefer`.
///
/// Interior open cells are grouped into connected components. The component
/// containing `prefer` wins if it is big enough to play in (at least 80
/// cells or 12% of the map); otherwise the largest component does. Within
/// the chosen component, cells with two or more open neighbors are
/// preferred so nobody spawns facing the back of a dead end.
pub fn find_empty_cell(grid: &Grid, prefer: (i32, i32), rng: &mut impl Rng) -> (f32, f32) {
    let walkable =
        |x: i32, y: i32| x >= 0 && x < grid.w && y >= 0 && y < grid.h && !grid.is_blocking(x, y);

    let mut visited = vec![false; (grid.w * grid.h) as usize];
    let mut comps: Vec<Vec<(i32, i32)>> = Vec::new();
    for y in 1..grid.h - 1 {
        for x in 1..grid.w - 1 {
            if !walkable(x, y) || visited[(y * grid.w + x) as usize] {
                continue;
            }
            let mut comp = Vec::new();
            let mut q = std::collections::VecDeque::new();
            visited[(y * grid.w + x) as usize] = true;
            q.push_back((x, y));
            while let Some((cx, cy)) = q.pop_front() {
                comp.push((cx, cy));
                for (dx, dy) in DIRS4 {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if walkable(nx, ny) && !visited[(ny * grid.w + nx) as usize] {
                        visited[(ny * grid.w + nx) as usize] = true;
                        q.push_back((nx, ny));
                    }
                }
            }
            comps.push(comp);
        }
    }

    if comps.is_empty() {
        return (2.5, 2.5);
    }

    let mut largest = 0;
    for (i, comp) in comps.iter().enumerate() {
        if comp.len() > comps[largest].len() {
            largest = i;
        }
    }

    let mut chosen = largest;
    if walkable(prefer.0, prefer.1) {
        if let Some(i) = comps.iter().position(|c| c.contains(&prefer)) {
            let min_ok = ((grid.w * grid.h) as usize * 12 / 100).max(80);
            if comps[i].len() >= min_ok {
                chosen = i;
            }
        }
    }
    let chosen = &comps[chosen];

    let open_neighbors = |x: i32, y: i32| {
        DIRS4
            .iter()
            .filter(|&&(dx, dy)| walkable(x + dx, y + dy))
            .count()
    };
    let good: Vec<(i32, i32)> = chosen
        .iter()
        .copied()
        .filter(|&(x, y)| open_neighbors(x, y) >= 2)
        .collect();
    let pool = if good.is_empty() { chosen } else { &good };

    let (x, y) = pool[rng.gen_range(0..pool.len())];
    (x as f32 + 0.5, y as f32 + 0.5)
}

/// Picks a cell from the reachable set: at least [`OBJECTIVE_SPACING`] from
/// everything in `avoid` when possible, then as close to `prefer` as the
/// set allows. The shuffle before the stable sort randomizes among
/// equally-near candidates.
fn pick_reachable(
    reachable: &[(i32, i32)],
    prefer: (f32, f32),
    avoid: &[(f32, f32)],
    rng: &mut impl Rng,
) -> (f32, f32) {
    if reachable.is_empty() {
        return (prefer.0 + 0.5, prefer.1 + 0.5);
    }

    let spaced = |&(x, y): &(i32, i32)| {
        let cx = x as f32 + 0.5;
        let cy = y as f32 + 0.5;
        avoid
            .iter()
            .all(|&(ax, ay)| (cx - ax).hypot(cy - ay) > OBJECTIVE_SPACING)
    };

    let mut candidates: Vec<(i32, i32)> = reachable.iter().copied().filter(|c| spaced(c)).collect();
    if candidates.is_empty() {
        candidates = reachable.to_vec();
    }

    candidates.shuffle(rng);
    candidates.sort_by(|a, b| {
        let da = (a.0 as f32 + 0.5 - prefer.0).hypot(a.1 as f32 + 0.5 - prefer.1);
        let db = (b.0 as f32 + 0.5 - prefer.0).hypot(b.1 as f32 + 0.5 - prefer.1);
        da.total_cmp(&db)
    });

    let (cx, cy) = candidates[0];
    (cx as f32 + 0.5, cy as f32 + 0.5)
}

/// Finds the door: a reachable trigger cell biased toward the far corner
/// with a wall neighbor to convert. The plane point sits exactly on the
/// boundary the two cells share, so the renderer draws the slab flush with
/// the wall face.
fn pick_door(
    grid: &Grid,
    reachable: &[(i32, i32)],
    spawn: (f32, f32),
    rng: &mut impl Rng,
) -> Door {
    let prefer = ((grid.w - 3) as f32, (grid.h - 3) as f32);

    for _ in 0..MAX_DOOR_TRIES {
        let trigger = pick_reachable(reachable, prefer, &[spawn], rng);
        let mx = trigger.0.floor() as i32;
        let my = trigger.1.floor() as i32;
        if grid.is_wall(mx, my) {
            continue;
        }

        let mut neighbors = [
            (-1, 0, DoorOrientation::Vertical),
            (1, 0, DoorOrientation::Vertical),
            (0, -1, DoorOrientation::Horizontal),
            (0, 1, DoorOrientation::Horizontal),
        ];
        neighbors.shuffle(rng);

        for (dx, dy, orientation) in neighbors {
            let wx = mx + dx;
            let wy = my + dy;
            if !grid.is_wall(wx, wy) {
                continue;
            }
            let plane = match orientation {
                DoorOrientation::Vertical => {
                    let plane_x = if dx == -1 { mx as f32 } else { (mx + 1) as f32 };
                    (plane_x, my as f32 + 0.5)
                }
                DoorOrientation::Horizontal => {
                    let plane_y = if dy == -1 { my as f32 } else { (my + 1) as f32 };
                    (mx as f32 + 0.5, plane_y)
                }
            };
            return Door {
                trigger: (mx as f32 + 0.5, my as f32 + 0.5),
                plane,
                cell: (wx, wy),
                orientation,
            };
        }
    }

    // Pathological layouts get a fixed door near the origin corner.
    Door {
        trigger: (2.5, 2.5),
        plane: (3.0, 2.5),
        cell: (3, 2),
        orientation: DoorOrientation::Vertical,
    }
}
