//! Maze data and construction.
//!
//! [`grid::Grid`] is the static cell world the raycaster, collision, and
//! pathfinding all read. [`generator`] carves fresh layouts and
//! [`variants`] mixes them with the authored ones.

pub mod generator;
pub mod grid;
pub mod variants;

pub use grid::{CellKind, Edge, Grid, MapSpec, WrapPortal};
pub use variants::build_pool;
