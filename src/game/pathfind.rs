//! Breadth-first distance fields over the cell grid.
//!
//! The field is the backbone of pursuit: it is computed from the *player's*
//! cell outward, so one field answers "how many corridor cells away is the
//! player" for every stalker at once, and a stalker advances by stepping to
//! whichever neighbor holds the smallest value. Because the queue is FIFO,
//! cells leave it in non-decreasing distance order and every recorded value
//! is the true minimum hop count.
//!
//! Which cells count as passable is injected as a predicate. Pursuit and
//! collision treat the closed door like a wall; the level sanity check
//! passes a walls-only predicate to ask about the world as it will be once
//! the door opens.

use std::collections::VecDeque;

use crate::maze::Grid;

/// Neighbor scan order. Ties in [`pick_next_cell`] resolve to the earliest
/// entry, which keeps replans deterministic.
pub const DIRS4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Hop counts from a single source cell. `-1` marks cells the search never
/// reached (walls, and open cells cut off from the source).
#[derive(Debug, Clone)]
pub struct DistanceField {
    w: i32,
    h: i32,
    dist: Vec<i32>,
}

impl DistanceField {
    fn unreached(w: i32, h: i32) -> Self {
        Self {
            w,
            h,
            dist: vec![-1; (w.max(0) * h.max(0)) as usize],
        }
    }

    /// Distance at a cell; out of range reads as unreached.
    pub fn get(&self, x: i32, y: i32) -> i32 {
        if x >= 0 && x < self.w && y >= 0 && y < self.h {
            self.dist[(y * self.w + x) as usize]
        } else {
            -1
        }
    }

    /// Iterates `(x, y, distance)` over every cell, unreached included.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let w = self.w;
        self.dist
            .iter()
            .enumerate()
            .map(move |(i, &d)| (i as i32 % w, i as i32 / w, d))
    }
}

/// Computes the distance field from `(sx, sy)` under `is_blocking`.
///
/// The source is seeded at distance 0 and the search expands through
/// 4-connected neighbors that are in range, unvisited, and non-blocking.
/// An out-of-range source yields a fully unreached field.
pub fn compute_distance_field(
    grid: &Grid,
    sx: i32,
    sy: i32,
    mut is_blocking: impl FnMut(i32, i32) -> bool,
) -> DistanceField {
    let mut field = DistanceField::unreached(grid.w, grid.h);
    if sx < 0 || sx >= grid.w || sy < 0 || sy >= grid.h {
        return field;
    }

    let mut q = VecDeque::new();
    field.dist[(sy * grid.w + sx) as usize] = 0;
    q.push_back((sx, sy));

    while let Some((x, y)) = q.pop_front() {
        let d = field.dist[(y * grid.w + x) as usize];
        for (dx, dy) in DIRS4 {
            let nx = x + dx;
            let ny = y + dy;
            if nx >= 0
                && nx < grid.w
                && ny >= 0
                && ny < grid.h
                && field.dist[(ny * grid.w + nx) as usize] == -1
                && !is_blocking(nx, ny)
            {
                field.dist[(ny * grid.w + nx) as usize] = d + 1;
                q.push_back((nx, ny));
            }
        }
    }
    field
}

/// The neighbor of `(x, y)` with the strictly smallest non-negative
/// distance, or `None` when no neighbor was reached. The tie break is the
/// [`DIRS4`] scan order; it only affects which of two equally short
/// corridors a stalker takes.
pub fn pick_next_cell(field: &DistanceField, x: i32, y: i32) -> Option<(i32, i32)> {
    let mut best = None;
    let mut best_d = i32::MAX;
    for (dx, dy) in DIRS4 {
        let nx = x + dx;
        let ny = y + dy;
        let d = field.get(nx, ny);
        if d != -1 && d < best_d {
            best_d = d;
            best = Some((nx, ny));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Grid, MapSpec};

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_spec(&MapSpec::new(
            rows.iter().map(|r| r.to_string()).collect(),
            vec![],
        ))
    }

    /// Hop counts around a bend match a hand count, and walls stay -1.
    #[test]
    fn exact_hop_counts() {
        let g = grid(&[
            "11111", //
            "10001",
            "11101",
            "10001",
            "11111",
        ]);
        let f = compute_distance_field(&g, 1, 1, |x, y| g.is_blocking(x, y));
        assert_eq!(f.get(1, 1), 0);
        assert_eq!(f.get(2, 1), 1);
        assert_eq!(f.get(3, 1), 2);
        assert_eq!(f.get(3, 2), 3);
        assert_eq!(f.get(3, 3), 4);
        assert_eq!(f.get(2, 3), 5);
        assert_eq!(f.get(1, 3), 6);
        // Walls are never visited.
        assert_eq!(f.get(0, 0), -1);
        assert_eq!(f.get(2, 2), -1);
    }

    /// Open cells behind an unbroken wall stay unreached.
    #[test]
    fn separated_region_is_unreached() {
        let g = grid(&[
            "11111", //
            "10101",
            "10101",
            "10101",
            "11111",
        ]);
        let f = compute_distance_field(&g, 1, 1, |x, y| g.is_blocking(x, y));
        assert_eq!(f.get(1, 3), 2);
        assert_eq!(f.get(3, 1), -1);
        assert_eq!(f.get(3, 3), -1);
    }

    /// Swapping the predicate changes the graph: a door blocks pursuit but
    /// not the walls-only view.
    #[test]
    fn predicate_injection_changes_reachability() {
        let mut g = grid(&[
            "11111", //
            "10001",
            "11111",
        ]);
        g.set_door(2, 1);

        let closed = compute_distance_field(&g, 1, 1, |x, y| g.is_blocking(x, y));
        assert_eq!(closed.get(3, 1), -1);

        let open = compute_distance_field(&g, 1, 1, |x, y| g.is_wall(x, y));
        assert_eq!(open.get(2, 1), 1);
        assert_eq!(open.get(3, 1), 2);
    }

    /// Out-of-range sources produce a fully unreached field instead of
    /// panicking.
    #[test]
    fn out_of_range_source_is_harmless() {
        let g = grid(&["111", "101", "111"]);
        let f = compute_distance_field(&g, 9, 9, |x, y| g.is_blocking(x, y));
        assert!(f.cells().all(|(_, _, d)| d == -1));
    }

    /// The next-cell pick descends the field and breaks ties by scan
    /// order.
    #[test]
    fn next_cell_descends_toward_source() {
        let g = grid(&[
            "11111", //
            "10001",
            "10101",
            "10001",
            "11111",
        ]);
        let f = compute_distance_field(&g, 1, 1, |x, y| g.is_blocking(x, y));
        // From (3, 3) both (2, 3) and (3, 2) sit at distance 3; the scan
        // order reaches (-1, 0) first, so the tie goes to (2, 3).
        let step = pick_next_cell(&f, 3, 3);
        assert_eq!(step, Some((2, 3)));
        // Walking the picks from (3, 3) reaches the source.
        let (mut cx, mut cy) = (3, 3);
        for _ in 0..10 {
            if (cx, cy) == (1, 1) {
                break;
            }
            let (nx, ny) = pick_next_cell(&f, cx, cy).unwrap();
            assert!(f.get(nx, ny) < f.get(cx, cy));
            cx = nx;
            cy = ny;
        }
        assert_eq!((cx, cy), (1, 1));
    }

    /// A stalker boxed in by walls gets no pick and must fall back.
    #[test]
    fn isolated_cell_yields_none() {
        let g = grid(&[
            "11111", //
            "10101",
            "11111",
        ]);
        let f = compute_distance_field(&g, 1, 1, |x, y| g.is_blocking(x, y));
        assert_eq!(pick_next_cell(&f, 3, 1), None);
    }
}
