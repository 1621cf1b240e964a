//! The map pool: authored layouts plus freshly generated ones.
//!
//! Five hand-tuned layouts anchor the rotation (two of them carry
//! north/south wrap portals), and six procedurally carved mazes are mixed
//! in when the pool is built, so every process run sees some layouts nobody
//! has played before.

use rand::Rng;

use super::generator;
use super::grid::{Edge, MapSpec, WrapPortal};

/// Size band for the generated pool members.
const GENERATED_MIN: usize = 45;
const GENERATED_MAX: usize = 65;
/// How many generated layouts join the authored ones.
const GENERATED_COUNT: usize = 6;

fn rows(src: &[&str]) -> Vec<String> {
    src.iter().map(|r| r.to_string()).collect()
}

/// The five authored layouts, in rotation order.
pub fn authored_variants() -> Vec<MapSpec> {
    vec![
        // Small loop-heavy block with a vertical wrap corridor.
        MapSpec::new(
            rows(&[
                "111111011111111",
                "100000000100001",
                "101111110101101",
                "101000010101001",
                "101011010101101",
                "101010010001001",
                "101010011101101",
                "101000000001001",
                "101111011101101",
                "100000010000001",
                "111111011111111",
            ]),
            vec![
                WrapPortal::new(Edge::North, 6.0, 7.0),
                WrapPortal::new(Edge::South, 6.0, 7.0),
            ],
        ),
        // Wide comb of pillared halls.
        MapSpec::new(
            rows(&[
                "1111111111111111111111111111111",
                "1000000000000000000000000000001",
                "1001110111110111110111110111001",
                "1000101010101010101010101010001",
                "1000000000000000000000000000001",
                "1000000000000000000000000000001",
                "1001110111111111110111110111001",
                "1000010000001000000100000000001",
                "1000010000001000000100000000001",
                "1111111111101010101111111111111",
                "1001110111110111110111110111001",
                "1000010000001000000100000000001",
                "1000010000001000000100000000001",
                "1000010000001000000100000000001",
                "1001110111110111110111110111001",
                "1000101010101010101010101010001",
                "1000000000000000000000000000001",
                "1000000000000000000000000000001",
                "1111111111111111111111111111111",
            ]),
            vec![],
        ),
        // Office-block warren, long sightlines broken by stub walls.
        MapSpec::new(
            rows(&[
                "1111111111111111111111111111111",
                "1010000100001001010000100001001",
                "1010000100001000010000100001001",
                "1011111111111101111110111111001",
                "1000000000000000000000000000001",
                "1010000100001000010000100001001",
                "1010000100001000010000100001001",
                "1010000100001000010000100001001",
                "1001111011000001000000111111001",
                "1010000100000001000000100001001",
                "1010000100001111111000100001001",
                "1010000100000001000000100001001",
                "1000000000000001000000000000001",
                "1011111111111101111110111111001",
                "1010000100001000010000100001001",
                "1010000100001000010000100001001",
                "1000000000000000000000000000001",
                "1010000100001000010000100001001",
                "1010000100001000010000100001001",
                "1010000100001001010000100001001",
                "1111111111111111111111111111111",
            ]),
            vec![],
        ),
        // Tall spiral with a wide wrap gap top and bottom.
        MapSpec::new(
            rows(&[
                "111111100000111111",
                "100000000000000001",
                "101111010111110101",
                "101001010100010101",
                "101001010100010101",
                "101001010111010101",
                "101001010001010101",
                "101001010001010101",
                "100001000001000001",
                "101001011111010101",
                "101001000000010101",
                "101001111110010101",
                "101000000010010101",
                "101111110010010101",
                "100000000000000001",
                "111111100000111111",
            ]),
            vec![
                WrapPortal::new(Edge::North, 7.5, 10.5),
                WrapPortal::new(Edge::South, 7.5, 10.5),
            ],
        ),
        // Sparse storage floor, the largest of the authored set.
        MapSpec::new(
            rows(&[
                "111111111111111111111111111111111",
                "100100000001000000010000000100001",
                "101110001001100010011000100110101",
                "100100000001000000010000000100001",
                "100100000001000000010000000100001",
                "100011001000100010001000100110001",
                "100100000001000000010000000100001",
                "100100000001000000000000000100001",
                "100110001001100000001000100110001",
                "111111000001000000000000000111111",
                "100000000000000000000000000000001",
                "100110001001100010011100100110001",
                "100100000001000000010000000100001",
                "100100000001000000010000000100001",
                "100110001001101010111000100110001",
                "100000000000000000000000000000001",
                "100100000001000000010000000100001",
                "100100000001000000010000000100001",
                "111111111111111111111111111111111",
            ]),
            vec![],
        ),
    ]
}

/// Builds the full rotation: authored layouts followed by
/// [`GENERATED_COUNT`] freshly carved ones.
pub fn build_pool(rng: &mut impl Rng) -> Vec<MapSpec> {
    let mut pool = authored_variants();
    for _ in 0..GENERATED_COUNT {
        pool.push(generator::generate_spec(GENERATED_MIN, GENERATED_MAX, rng));
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::grid::Grid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Authored rows are rectangular and parse into grids of the right
    /// size.
    #[test]
    fn authored_layouts_are_rectangular() {
        for (i, spec) in authored_variants().iter().enumerate() {
            let w = spec.rows[0].len();
            for row in &spec.rows {
                assert_eq!(row.len(), w, "variant {i} is ragged");
            }
            let g = Grid::from_spec(spec);
            assert_eq!(g.w as usize, w);
            assert_eq!(g.h as usize, spec.rows.len());
        }
    }

    /// Portal ranges on authored maps sit over open border cells, so a
    /// wrapped traveler always has somewhere to land.
    #[test]
    fn authored_portals_cover_open_border() {
        for spec in authored_variants() {
            let g = Grid::from_spec(&spec);
            for p in &spec.portals {
                let mid = (p.lo + p.hi) * 0.5;
                let (x, y) = match p.edge {
                    Edge::North => (mid.floor() as i32, 0),
                    Edge::South => (mid.floor() as i32, g.h - 1),
                    Edge::West => (0, mid.floor() as i32),
                    Edge::East => (g.w - 1, mid.floor() as i32),
                };
                assert!(
                    !g.is_blocking(x, y),
                    "portal on {:?} lands on a solid border cell",
                    p.edge
                );
            }
        }
    }

    /// The pool holds the authored set plus the generated batch.
    #[test]
    fn pool_has_authored_and_generated() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = build_pool(&mut rng);
        assert_eq!(pool.len(), authored_variants().len() + 6);
        // Generated members are portal-free and at least the minimum size.
        for spec in &pool[authored_variants().len()..] {
            assert!(spec.portals.is_empty());
            assert!(spec.rows.len() >= 45);
        }
    }
}
