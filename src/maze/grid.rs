//! Static cell world: classification, portals, and collision queries.
//!
//! A [`Grid`] is parsed once from a [`MapSpec`] and stays fixed for the run,
//! with one exception: the run director stamps a single [`CellKind::Door`]
//! cell during level setup. Gameplay never mutates cells after that; the
//! door's open/closed state lives in run state and is consulted through
//! blocking predicates instead.

/// What occupies one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Walkable floor.
    Open,
    /// Solid wall. Blocks movement, pathfinding, and rays.
    Wall,
    /// The exit door. Solid like a wall while the run is in progress.
    Door,
}

/// A border of the grid, used to address wrap portals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The y = 0 border.
    North,
    /// The y = h border.
    South,
    /// The x = w border.
    East,
    /// The x = 0 border.
    West,
}

/// An interval along one border where crossing teleports to the opposite
/// edge instead of colliding. The range is measured along the perpendicular
/// axis (x for north/south, y for east/west) and is inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapPortal {
    /// Which border the portal sits on.
    pub edge: Edge,
    /// Start of the covered interval.
    pub lo: f32,
    /// End of the covered interval.
    pub hi: f32,
}

impl WrapPortal {
    /// Portal on `edge` covering `lo..=hi`.
    pub fn new(edge: Edge, lo: f32, hi: f32) -> Self {
        Self { edge, lo, hi }
    }
}

/// Source form of a map: equal-length rows of `'0'` (open) and `'1'`
/// (wall), plus any wrap portals. `'D'` never appears in authored rows;
/// doors are assigned at run setup.
#[derive(Debug, Clone)]
pub struct MapSpec {
    /// Cell rows, top to bottom.
    pub rows: Vec<String>,
    /// Wrap portals along the borders.
    pub portals: Vec<WrapPortal>,
}

impl MapSpec {
    /// Bundles rows and portals.
    pub fn new(rows: Vec<String>, portals: Vec<WrapPortal>) -> Self {
        Self { rows, portals }
    }

    /// Total cell count, used to scale stalker numbers to the map.
    pub fn area(&self) -> usize {
        self.rows.len() * self.rows.first().map_or(0, |r| r.len())
    }
}

/// The immutable cell world.
///
/// Width and height are `i32` because ray marching and neighbor scans index
/// past the borders on purpose; [`Grid::cell_at`] answers [`CellKind::Wall`]
/// for anything out of range so boundary math never needs a range check at
/// the call site.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<CellKind>,
    /// Width in cells.
    pub w: i32,
    /// Height in cells.
    pub h: i32,
    portals: Vec<WrapPortal>,
}

/// How close to a border (in cells) a mover must be for portal transport to
/// engage.
const WRAP_EDGE_MARGIN: f32 = 0.35;

impl Grid {
    /// Parses a [`MapSpec`]. Rows are assumed equal length; a ragged spec is
    /// a programming error in the map tables, not a runtime condition.
    pub fn from_spec(spec: &MapSpec) -> Self {
        let h = spec.rows.len() as i32;
        let w = spec.rows.first().map_or(0, |r| r.len()) as i32;
        let mut cells = Vec::with_capacity((w * h) as usize);
        for row in &spec.rows {
            for ch in row.chars() {
                cells.push(match ch {
                    '1' => CellKind::Wall,
                    'D' => CellKind::Door,
                    _ => CellKind::Open,
                });
            }
        }
        Self {
            cells,
            w,
            h,
            portals: spec.portals.clone(),
        }
    }

    /// Cell kind at integer coordinates. Out of range reads as wall.
    pub fn cell_at(&self, x: i32, y: i32) -> CellKind {
        if x >= 0 && x < self.w && y >= 0 && y < self.h {
            self.cells[(y * self.w + x) as usize]
        } else {
            CellKind::Wall
        }
    }

    /// True only for plain walls. Doors do not count; this is the predicate
    /// the level sanity check uses to ask "is the layout solvable once the
    /// door opens".
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.cell_at(x, y) == CellKind::Wall
    }

    /// True for anything movement and pursuit must not enter: walls and the
    /// (closed) door.
    pub fn is_blocking(&self, x: i32, y: i32) -> bool {
        matches!(self.cell_at(x, y), CellKind::Wall | CellKind::Door)
    }

    /// Stamps the door cell during level setup. Ignored out of range.
    pub fn set_door(&mut self, x: i32, y: i32) {
        if x >= 0 && x < self.w && y >= 0 && y < self.h {
            self.cells[(y * self.w + x) as usize] = CellKind::Door;
        }
    }

    /// Circle-vs-grid collision by sampling the four corners of the
    /// circle's bounding square against [`Grid::is_blocking`].
    ///
    /// This is deliberately approximate: for radii under 0.5 the square
    /// spans at most two cells per axis, so the corners cover every cell
    /// the square touches and the test behaves as a square collider
    /// (slightly generous at the diagonals). Larger radii could slip a
    /// thin wall past the unsampled edge midpoints; callers keep `r` small.
    pub fn collides_circle(&self, x: f32, y: f32, r: f32) -> bool {
        for ox in [-r, r] {
            for oy in [-r, r] {
                if self.is_blocking((x + ox).floor() as i32, (y + oy).floor() as i32) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether a portal on `edge` covers the crossing coordinate.
    pub fn portal_allows(&self, edge: Edge, coord: f32) -> bool {
        self.portals
            .iter()
            .any(|p| p.edge == edge && p.lo <= coord && coord <= p.hi)
    }

    /// Transports a mover that has come within the edge margin of a
    /// portaled border to the opposite edge, offset by dimension − 1, then
    /// snaps it to the nearest open cell if the landing spot is blocked.
    /// Non-portaled borders are left to ordinary collision.
    pub fn apply_wrap(&self, x: &mut f32, y: &mut f32) {
        if self.portals.is_empty() {
            return;
        }

        let mut wrapped = false;

        if *y < WRAP_EDGE_MARGIN && self.portal_allows(Edge::North, *x) {
            *y += (self.h - 1) as f32;
            wrapped = true;
        } else if *y > self.h as f32 - WRAP_EDGE_MARGIN && self.portal_allows(Edge::South, *x) {
            *y -= (self.h - 1) as f32;
            wrapped = true;
        }

        if *x < WRAP_EDGE_MARGIN && self.portal_allows(Edge::West, *y) {
            *x += (self.w - 1) as f32;
            wrapped = true;
        } else if *x > self.w as f32 - WRAP_EDGE_MARGIN && self.portal_allows(Edge::East, *y) {
            *x -= (self.w - 1) as f32;
            wrapped = true;
        }

        if wrapped {
            let (sx, sy) = self.snap_to_open(*x, *y);
            *x = sx;
            *y = sy;
        }
    }

    /// Nearest open cell center within a 3-cell search radius, or the input
    /// unchanged when everything nearby is solid.
    fn snap_to_open(&self, x: f32, y: f32) -> (f32, f32) {
        let mx = x.floor() as i32;
        let my = y.floor() as i32;
        if mx >= 0 && mx < self.w && my >= 0 && my < self.h && !self.is_blocking(mx, my) {
            return (x, y);
        }

        for rad in 1..4 {
            for dy in -rad..=rad {
                for dx in -rad..=rad {
                    let nx = mx + dx;
                    let ny = my + dy;
                    if nx >= 0 && nx < self.w && ny >= 0 && ny < self.h && !self.is_blocking(nx, ny)
                    {
                        return (nx as f32 + 0.5, ny as f32 + 0.5);
                    }
                }
            }
        }
        (x, y)
    }
}
