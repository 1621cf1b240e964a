//! Player pose and movement logic.
//!
//! This module defines the [`Player`] struct, which tracks the player's position on the cell
//! grid and the orientation basis the raycaster projects through, and provides methods for
//! rotation and collision-checked movement.
//!
//! # Overview
//!
//! The player system handles:
//! - **Position**: Continuous `(x, y)` coordinates measured in cells
//! - **Orientation**: A unit facing vector plus a camera plane vector
//! - **Rotation**: Yaw applied to both vectors so the view basis never shears
//! - **Movement**: Per-axis sliding movement against the collision grid
//! - **Wrap Portals**: Border transport delegated to the grid after each move
//!
//! # Coordinate System
//!
//! The world is a 2D cell grid viewed from above:
//! - X-axis: East/West, increasing east (column index)
//! - Y-axis: South/North, increasing south (row index)
//!
//! Orientation is not stored as an angle. The facing direction `(dirx, diry)` stays unit
//! length, and the camera plane `(planex, planey)` stays perpendicular to it with length
//! equal to the half-tangent of the horizontal field of view. Rays are linear combinations
//! of the two, so rotating both by the same angle is the whole camera model.
//!
//! # Usage Example
//!
//! ```rust
//! use crate::game::player::Player;
//!
//! let mut player = Player::new(0.66);
//!
//! // Turn left a quarter turn over several frames.
//! player.rotate(-std::f32::consts::FRAC_PI_2);
//!
//! // Step forward, sliding along any wall in the way.
//! let step = 2.6 * 0.016; // speed * delta time
//! player.try_move(&grid, player.dirx * step, player.diry * step, 0.28);
//! ```

use crate::maze::Grid;

/// Represents the player's pose in the world.
///
/// The `Player` struct is the camera: the raycaster reads its position and basis vectors
/// directly, and the run director rewrites them on spawn. It carries no health or inventory;
/// run-scoped state like lives and collected seals belongs to the director.
///
/// # Fields
///
/// ## Position
/// - `x`, `y`: Continuous world coordinates in cells
///
/// ## Orientation
/// - `dirx`, `diry`: Unit facing vector
/// - `planex`, `planey`: Camera plane vector, perpendicular to the facing
///
/// # Examples
///
/// ```rust
/// use crate::game::player::Player;
///
/// let player = Player::new(0.66);
/// assert_eq!((player.x, player.y), (2.5, 2.5));
/// assert_eq!((player.dirx, player.diry), (1.0, 0.0));
/// assert_eq!((player.planex, player.planey), (0.0, 0.66));
/// ```
#[derive(Debug, Clone)]
pub struct Player {
    /// East/west position in cells.
    pub x: f32,

    /// North/south position in cells.
    pub y: f32,

    /// X component of the unit facing vector.
    pub dirx: f32,

    /// Y component of the unit facing vector.
    pub diry: f32,

    /// X component of the camera plane vector.
    ///
    /// The plane is perpendicular to the facing vector; its length is the
    /// half-tangent of the horizontal field of view.
    pub planex: f32,

    /// Y component of the camera plane vector.
    pub planey: f32,
}

impl Player {
    /// Creates a player at the fallback spawn, facing east.
    ///
    /// The run director immediately overwrites the position via [`Player::place`], so the
    /// `(2.5, 2.5)` default only matters if a layout fails to provide a spawn.
    ///
    /// # Arguments
    ///
    /// * `fov_plane` - Camera plane length (half-tangent of the horizontal FOV)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crate::game::player::Player;
    ///
    /// let player = Player::new(0.66);
    /// assert_eq!(player.diry, 0.0);
    /// ```
    pub fn new(fov_plane: f32) -> Self {
        Self {
            x: 2.5,
            y: 2.5,
            dirx: 1.0,
            diry: 0.0,
            planex: 0.0,
            planey: fov_plane,
        }
    }

    /// Moves the player to `(x, y)` and resets the view to face east.
    ///
    /// Used on spawn and respawn so every life starts with the same view basis regardless
    /// of where the previous one ended.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - New position in cells
    /// * `fov_plane` - Camera plane length to rebuild the basis with
    pub fn place(&mut self, x: f32, y: f32, fov_plane: f32) {
        self.x = x;
        self.y = y;
        self.dirx = 1.0;
        self.diry = 0.0;
        self.planex = 0.0;
        self.planey = fov_plane;
    }

    /// Rotates the view by `ang` radians.
    ///
    /// Both the facing vector and the camera plane are rotated by the same 2D rotation, so
    /// the basis keeps its lengths and its right angle. Positive angles turn clockwise on
    /// screen (y grows south).
    ///
    /// # Arguments
    ///
    /// * `ang` - Rotation in radians
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crate::game::player::Player;
    ///
    /// let mut player = Player::new(0.66);
    /// player.rotate(std::f32::consts::PI);
    /// assert!((player.dirx - -1.0).abs() < 1e-5);
    /// ```
    pub fn rotate(&mut self, ang: f32) {
        let (sin, cos) = ang.sin_cos();

        let old_dirx = self.dirx;
        self.dirx = self.dirx * cos - self.diry * sin;
        self.diry = old_dirx * sin + self.diry * cos;

        let old_planex = self.planex;
        self.planex = self.planex * cos - self.planey * sin;
        self.planey = old_planex * sin + self.planey * cos;
    }

    /// Attempts to move by `(dx, dy)`, sliding along walls.
    ///
    /// Each axis is applied and collision-checked independently, so a move into a wall
    /// keeps its tangential component instead of stopping dead. After both axes the grid
    /// gets a chance to wrap the position through a border portal.
    ///
    /// # Arguments
    ///
    /// * `grid` - Collision world
    /// * `dx`, `dy` - Displacement in cells for this frame
    /// * `radius` - Collision radius in cells
    pub fn try_move(&mut self, grid: &Grid, dx: f32, dy: f32, radius: f32) {
        let nx = self.x + dx;
        if !grid.collides_circle(nx, self.y, radius) {
            self.x = nx;
        }
        let ny = self.y + dy;
        if !grid.collides_circle(self.x, ny, radius) {
            self.y = ny;
        }
        grid.apply_wrap(&mut self.x, &mut self.y);
    }

    /// Returns the grid cell the player currently occupies.
    ///
    /// # Returns
    ///
    /// The `(x, y)` cell indices of the position, floored.
    pub fn cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Returns the straight-line distance from the player to `(x, y)`.
    ///
    /// Used for pickup, catch, and door-trigger proximity tests; pursuit uses corridor
    /// distance from the distance field instead.
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        (self.x - x).hypot(self.y - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MapSpec;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_spec(&MapSpec::new(
            rows.iter().map(|r| r.to_string()).collect(),
            vec![],
        ))
    }

    /// Rotation keeps the facing unit length and the plane perpendicular
    /// to it at its original length.
    #[test]
    fn rotate_preserves_basis_shape() {
        let mut p = Player::new(0.66);
        for _ in 0..7 {
            p.rotate(0.37);
        }
        let dir_len = p.dirx.hypot(p.diry);
        let plane_len = p.planex.hypot(p.planey);
        let dot = p.dirx * p.planex + p.diry * p.planey;
        assert!((dir_len - 1.0).abs() < 1e-4);
        assert!((plane_len - 0.66).abs() < 1e-4);
        assert!(dot.abs() < 1e-4);
    }

    /// A full turn comes back to the starting basis.
    #[test]
    fn full_turn_is_identity() {
        let mut p = Player::new(0.66);
        let steps = 48;
        for _ in 0..steps {
            p.rotate(std::f32::consts::TAU / steps as f32);
        }
        assert!((p.dirx - 1.0).abs() < 1e-3);
        assert!(p.diry.abs() < 1e-3);
        assert!(p.planex.abs() < 1e-3);
        assert!((p.planey - 0.66).abs() < 1e-3);
    }

    /// Moving straight into a wall stops, but a diagonal move keeps its
    /// free component and slides.
    #[test]
    fn moves_slide_along_walls() {
        let g = grid(&[
            "11111", //
            "10001",
            "10001",
            "11111",
        ]);
        let mut p = Player::new(0.66);
        p.place(1.5, 1.5, 0.66);

        // Due north is a wall: the y component is rejected, x passes.
        p.try_move(&g, 0.4, -0.4, 0.28);
        assert!((p.x - 1.9).abs() < 1e-6);
        assert!((p.y - 1.5).abs() < 1e-6);
    }

    /// A fully blocked move leaves the position untouched.
    #[test]
    fn blocked_move_is_a_no_op() {
        let g = grid(&[
            "111", //
            "101",
            "111",
        ]);
        let mut p = Player::new(0.66);
        p.place(1.5, 1.5, 0.28);
        p.try_move(&g, 0.5, 0.5, 0.28);
        assert!((p.x - 1.5).abs() < 1e-6);
        assert!((p.y - 1.5).abs() < 1e-6);
    }

    /// Placement resets the orientation basis, not just the position.
    #[test]
    fn place_resets_facing() {
        let mut p = Player::new(0.66);
        p.rotate(1.2);
        p.place(4.5, 7.5, 0.66);
        assert_eq!((p.x, p.y), (4.5, 7.5));
        assert_eq!((p.dirx, p.diry), (1.0, 0.0));
        assert_eq!((p.planex, p.planey), (0.0, 0.66));
        assert_eq!(p.cell(), (4, 7));
    }
}
