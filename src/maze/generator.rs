//! Procedural maze carving.
//!
//! Layouts are produced in four passes over an all-wall grid:
//!
//! 1. A randomized depth-first backtracker carves one-cell corridors on the
//!    odd lattice, stepping two cells at a time. The result is a spanning
//!    tree of the lattice, so every carved cell is reachable by
//!    construction.
//! 2. A handful of random rectangular rooms are cleared. Rooms only turn
//!    walls into floor, so they can merge regions but never split one.
//! 3. A loop pass knocks out the occasional wall that has open floor on
//!    both opposite sides, adding cycles without disconnecting anything.
//! 4. The outer border is forced back to wall (a room may have breached
//!    it), and a flood fill from the first open cell walls off any island
//!    the room/loop passes accidentally created. Placement logic later
//!    assumes one connected open region, so this repair is what makes the
//!    level solvable.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

use super::grid::MapSpec;

/// Smallest usable maze side. The lattice carve needs room to work; tiny
/// requests are clamped up to this.
pub const MIN_SIZE: usize = 25;

/// Probability that the loop pass clears an eligible wall.
pub const DEFAULT_LOOP_CHANCE: f32 = 0.07;

/// Room-carving attempts per maze.
pub const DEFAULT_ROOM_ATTEMPTS: usize = 22;

fn force_odd(n: usize) -> usize {
    if n % 2 == 1 { n } else { n + 1 }
}

/// Carves a maze and returns it in map-source form: rows of `'0'` and
/// `'1'`. Dimensions are clamped to at least [`MIN_SIZE`] and forced odd so
/// corridor/wall parity lines up with the lattice.
pub fn generate_rows(
    width: usize,
    height: usize,
    loop_chance: f32,
    room_attempts: usize,
    rng: &mut impl Rng,
) -> Vec<String> {
    let w = force_odd(width.max(MIN_SIZE));
    let h = force_odd(height.max(MIN_SIZE));

    // true = wall
    let mut g = vec![vec![true; w]; h];

    // Backtracker over the odd lattice.
    g[1][1] = false;
    let mut stack: Vec<(i32, i32)> = vec![(1, 1)];
    let dirs: [(i32, i32); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

    while let Some(&(x, y)) = stack.last() {
        let mut neigh: Vec<(i32, i32, i32, i32)> = Vec::new();
        for (dx, dy) in dirs {
            let nx = x + dx;
            let ny = y + dy;
            if nx >= 1
                && nx < w as i32 - 1
                && ny >= 1
                && ny < h as i32 - 1
                && g[ny as usize][nx as usize]
            {
                neigh.push((nx, ny, dx, dy));
            }
        }

        if let Some(&(nx, ny, dx, dy)) = neigh.choose(rng) {
            g[(y + dy / 2) as usize][(x + dx / 2) as usize] = false;
            g[ny as usize][nx as usize] = false;
            stack.push((nx, ny));
        } else {
            stack.pop();
        }
    }

    // Rooms.
    for _ in 0..room_attempts {
        let rw = rng.gen_range(3..8);
        let rh = rng.gen_range(3..8);
        let x0 = rng.gen_range(1..w - rw - 1);
        let y0 = rng.gen_range(1..h - rh - 1);
        for row in g.iter_mut().skip(y0).take(rh) {
            for cell in row.iter_mut().skip(x0).take(rw) {
                *cell = false;
            }
        }
    }

    // Loops: clear a wall only when both opposite sides are already open,
    // so both sides belong to the connected set and nothing can split.
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if !g[y][x] {
                continue;
            }
            if rng.r#gen::<f32>() >= loop_chance {
                continue;
            }
            if !g[y][x - 1] && !g[y][x + 1] {
                g[y][x] = false;
            } else if !g[y - 1][x] && !g[y + 1][x] {
                g[y][x] = false;
            }
        }
    }

    // Rooms and loops near the edge may have breached the border.
    for x in 0..w {
        g[0][x] = true;
        g[h - 1][x] = true;
    }
    for row in g.iter_mut() {
        row[0] = true;
        row[w - 1] = true;
    }

    // Connectivity repair: everything the flood fill from the first open
    // cell cannot reach becomes wall again.
    let mut start = None;
    'scan: for y in 1..h - 1 {
        for x in 1..w - 1 {
            if !g[y][x] {
                start = Some((x, y));
                break 'scan;
            }
        }
    }

    if let Some((sx, sy)) = start {
        let mut seen = vec![vec![false; w]; h];
        let mut q = VecDeque::new();
        seen[sy][sx] = true;
        q.push_back((sx as i32, sy as i32));
        while let Some((x, y)) = q.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let nx = x + dx;
                let ny = y + dy;
                if nx >= 0
                    && nx < w as i32
                    && ny >= 0
                    && ny < h as i32
                    && !g[ny as usize][nx as usize]
                    && !seen[ny as usize][nx as usize]
                {
                    seen[ny as usize][nx as usize] = true;
                    q.push_back((nx, ny));
                }
            }
        }

        for y in 1..h - 1 {
            for x in 1..w - 1 {
                if !g[y][x] && !seen[y][x] {
                    g[y][x] = true;
                }
            }
        }
    }

    g.into_iter()
        .map(|row| row.into_iter().map(|wall| if wall { '1' } else { '0' }).collect())
        .collect()
}

/// Generates a portal-free [`MapSpec`] with random odd dimensions in
/// `min_size..=max_size`.
pub fn generate_spec(min_size: usize, max_size: usize, rng: &mut impl Rng) -> MapSpec {
    let w = force_odd(rng.gen_range(min_size..=max_size));
    let h = force_odd(rng.gen_range(min_size..=max_size));
    MapSpec::new(
        generate_rows(w, h, DEFAULT_LOOP_CHANCE, DEFAULT_ROOM_ATTEMPTS, rng),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn open_cells(rows: &[String]) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '0' {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn flood_count(rows: &[String], start: (usize, usize)) -> usize {
        let h = rows.len() as i32;
        let w = rows[0].len() as i32;
        let cell = |x: i32, y: i32| rows[y as usize].as_bytes()[x as usize] == b'0';
        let mut seen = vec![false; (w * h) as usize];
        let mut q = VecDeque::new();
        seen[start.1 * w as usize + start.0] = true;
        q.push_back((start.0 as i32, start.1 as i32));
        let mut count = 0;
        while let Some((x, y)) = q.pop_front() {
            count += 1;
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let nx = x + dx;
                let ny = y + dy;
                if nx >= 0 && nx < w && ny >= 0 && ny < h {
                    let idx = (ny * w + nx) as usize;
                    if cell(nx, ny) && !seen[idx] {
                        seen[idx] = true;
                        q.push_back((nx, ny));
                    }
                }
            }
        }
        count
    }

    /// Tiny requests are clamped up and both dimensions end up odd.
    #[test]
    fn clamps_small_sizes_to_odd_minimum() {
        let mut rng = StdRng::seed_from_u64(1);
        let rows = generate_rows(10, 12, DEFAULT_LOOP_CHANCE, DEFAULT_ROOM_ATTEMPTS, &mut rng);
        assert_eq!(rows.len(), MIN_SIZE);
        assert_eq!(rows[0].len(), MIN_SIZE);

        let rows = generate_rows(30, 26, DEFAULT_LOOP_CHANCE, 0, &mut rng);
        assert_eq!(rows.len(), 27);
        assert_eq!(rows[0].len(), 31);
    }

    /// The border is solid wall regardless of where rooms landed.
    #[test]
    fn border_is_always_wall() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = generate_rows(33, 33, 0.2, 40, &mut rng);
            let h = rows.len();
            let w = rows[0].len();
            for x in 0..w {
                assert_eq!(rows[0].as_bytes()[x], b'1');
                assert_eq!(rows[h - 1].as_bytes()[x], b'1');
            }
            for row in &rows {
                assert_eq!(row.as_bytes()[0], b'1');
                assert_eq!(row.as_bytes()[w - 1], b'1');
            }
        }
    }

    /// Every open cell is reachable from every other: a flood fill from the
    /// first open cell visits all of them, across many seeds.
    #[test]
    fn generated_mazes_are_fully_connected() {
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = generate_rows(45, 37, DEFAULT_LOOP_CHANCE, DEFAULT_ROOM_ATTEMPTS, &mut rng);
            let opens = open_cells(&rows);
            assert!(!opens.is_empty());
            assert_eq!(flood_count(&rows, opens[0]), opens.len());
        }
    }

    /// Without rooms and loops the backtracker yields a perfect maze: a
    /// spanning tree of the odd lattice with exactly 2n − 1 open cells.
    #[test]
    fn bare_backtracker_is_a_spanning_tree() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = generate_rows(25, 25, 0.0, 0, &mut rng);
            let nodes = 12 * 12; // odd coordinates in 1..24, squared
            assert_eq!(open_cells(&rows).len(), 2 * nodes - 1);
        }
    }

    /// Random specs stay inside the requested size band.
    #[test]
    fn generated_specs_respect_size_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let spec = generate_spec(45, 65, &mut rng);
            let h = spec.rows.len();
            let w = spec.rows[0].len();
            assert!((45..=66).contains(&w), "width {w} out of band");
            assert!((45..=66).contains(&h), "height {h} out of band");
            assert_eq!(w % 2, 1);
            assert_eq!(h % 2, 1);
        }
    }
}
