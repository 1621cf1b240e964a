//! Save-state capture and restore.
//!
//! The record is a flat snapshot of everything a run needs to resume:
//! player pose, stalker timers, objective state, the door, and the layout
//! pool index. The run clock is part of the record so activation and
//! replan timestamps stay meaningful after a reload. Stalker waypoints are
//! deliberately not stored; the first replan after a load rebuilds them
//! from the same distance field, which keeps the resumed pursuit identical
//! to an unsaved one.

use std::error::Error;

use serde::{Deserialize, Serialize};

use crate::config::{Tuning, config_path};
use crate::game::director::{Door, DoorOrientation, Run};
use crate::game::player::Player;
use crate::game::stalker::{Stalker, UNREACHED_DIST};
use crate::maze::{Grid, MapSpec};

/// File name of the save record, resolved next to the executable.
pub const SAVE_FILE: &str = "savegame.json";

/// Serialized player pose, field for field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// East/west position in cells.
    pub x: f32,
    /// North/south position in cells.
    pub y: f32,
    /// Facing vector x.
    pub dirx: f32,
    /// Facing vector y.
    pub diry: f32,
    /// Camera plane x.
    pub planex: f32,
    /// Camera plane y.
    pub planey: f32,
}

/// Serialized stalker. Waypoints are intentionally absent; the first replan
/// after a load rebuilds them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalkerRecord {
    /// East/west position in cells.
    pub x: f32,
    /// North/south position in cells.
    pub y: f32,
    /// Run-clock activation second.
    pub active_time: f32,
    /// Run-clock second of the next field read.
    pub next_replan: f32,
    /// Corridor distance as of the save.
    pub tunnel_dist_cells: i32,
}

/// One complete saved run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    /// Run clock at the moment of the save.
    pub clock: f32,
    /// Player pose.
    pub player: PlayerRecord,
    /// All live stalkers.
    pub stalkers: Vec<StalkerRecord>,
    /// Lives left.
    pub lives: i32,
    /// Respawn point.
    pub spawn_point: (f32, f32),
    /// Seal positions.
    pub seals: Vec<(f32, f32)>,
    /// Door trigger cell center.
    pub door_trigger: (f32, f32),
    /// Door slab point.
    pub door_plane: (f32, f32),
    /// Door cell indices.
    pub door_cell: (i32, i32),
    /// Door slab axis.
    pub door_orientation: DoorOrientation,
    /// Per-seal collected flags.
    pub collected: Vec<bool>,
    /// Door state flag; restore recomputes it from `collected` as well.
    pub door_open: bool,
    /// Index into the layout pool.
    pub map_index: usize,
}

impl SaveState {
    /// Snapshots the live run.
    pub fn capture(run: &Run, player: &Player, stalkers: &[Stalker], clock: f32) -> Self {
        Self {
            clock,
            player: PlayerRecord {
                x: player.x,
                y: player.y,
                dirx: player.dirx,
                diry: player.diry,
                planex: player.planex,
                planey: player.planey,
            },
            stalkers: stalkers
                .iter()
                .map(|s| StalkerRecord {
                    x: s.x,
                    y: s.y,
                    active_time: s.active_time,
                    next_replan: s.next_replan,
                    tunnel_dist_cells: s.tunnel_dist_cells,
                })
                .collect(),
            lives: run.lives,
            spawn_point: run.spawn_point,
            seals: run.seals.clone(),
            door_trigger: run.door.trigger,
            door_plane: run.door.plane,
            door_cell: run.door.cell,
            door_orientation: run.door.orientation,
            collected: run.collected.clone(),
            door_open: run.door_open,
            map_index: run.map_index,
        }
    }

    /// Rebuilds a live run from the record.
    ///
    /// The grid comes back from the layout pool by index (wrapped, in case
    /// the record predates a pool change) with the door cell re-stamped.
    /// A record with no stalkers gets one inert stalker at the origin so
    /// the pursuit loop always has something to drive.
    pub fn restore(
        &self,
        pool: &[MapSpec],
        tuning: &Tuning,
    ) -> Result<(Run, Player, Vec<Stalker>, f32), Box<dyn Error>> {
        if pool.is_empty() {
            return Err("layout pool is empty".into());
        }
        let map_index = self.map_index % pool.len();
        let mut grid = Grid::from_spec(&pool[map_index]);
        grid.set_door(self.door_cell.0, self.door_cell.1);

        let mut player = Player::new(tuning.fov_plane);
        player.x = self.player.x;
        player.y = self.player.y;
        player.dirx = self.player.dirx;
        player.diry = self.player.diry;
        player.planex = self.player.planex;
        player.planey = self.player.planey;

        let mut stalkers: Vec<Stalker> = self
            .stalkers
            .iter()
            .map(|r| {
                let mut s = Stalker::new(r.x, r.y, r.active_time);
                s.next_replan = r.next_replan;
                s.tunnel_dist_cells = r.tunnel_dist_cells;
                s
            })
            .collect();
        if stalkers.is_empty() {
            let mut inert = Stalker::new(0.0, 0.0, 0.0);
            inert.tunnel_dist_cells = UNREACHED_DIST;
            stalkers.push(inert);
        }

        let mut collected = self.collected.clone();
        if collected.is_empty() {
            collected = vec![false; self.seals.len()];
        }
        let door_open =
            self.door_open || (!collected.is_empty() && collected.iter().all(|&c| c));

        let run = Run {
            grid,
            map_index,
            stalker_count: stalkers.len().max(1),
            spawn_point: self.spawn_point,
            seals: self.seals.clone(),
            collected,
            door: Door {
                trigger: self.door_trigger,
                plane: self.door_plane,
                cell: self.door_cell,
                orientation: self.door_orientation,
            },
            door_open,
            lives: self.lives,
        };

        Ok((run, player, stalkers, self.clock))
    }
}

/// Writes the record next to the executable.
pub fn write_save(state: &SaveState) -> Result<(), Box<dyn Error>> {
    let text = serde_json::to_string_pretty(state)?;
    std::fs::write(config_path(SAVE_FILE), text)?;
    Ok(())
}

/// Reads the record back. Missing file and parse failure both surface as
/// errors; the pause screen turns them into a notice.
pub fn read_save() -> Result<SaveState, Box<dyn Error>> {
    let text = std::fs::read_to_string(config_path(SAVE_FILE))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::director::start_run;
    use crate::game::pathfind::compute_distance_field;
    use crate::maze::build_pool;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn live_run(seed: u64) -> (Vec<MapSpec>, Tuning, Run, Player, Vec<Stalker>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pool = build_pool(&mut rng);
        let tuning = Tuning::default();
        let run = start_run(&pool, &tuning, &mut rng).expect("layout generation failed");
        let mut player = Player::new(tuning.fov_plane);
        let stalkers =
            crate::game::director::respawn(&run, &mut player, &tuning, 2.0, &mut rng);
        (pool, tuning, run, player, stalkers)
    }

    /// The record survives a JSON round trip with every field intact.
    #[test]
    fn record_round_trips_through_json() {
        let (_, _, mut run, player, stalkers) = live_run(3);
        run.collected[1] = true;
        run.lives = 2;

        let state = SaveState::capture(&run, &player, &stalkers, 12.75);
        let text = serde_json::to_string(&state).unwrap();
        let back: SaveState = serde_json::from_str(&text).unwrap();

        assert_eq!(back.clock, 12.75);
        assert_eq!(back.player.x, player.x);
        assert_eq!(back.player.planey, player.planey);
        assert_eq!(back.stalkers.len(), stalkers.len());
        assert_eq!(back.stalkers[0].x, stalkers[0].x);
        assert_eq!(back.stalkers[0].active_time, stalkers[0].active_time);
        assert_eq!(back.lives, 2);
        assert_eq!(back.spawn_point, run.spawn_point);
        assert_eq!(back.seals, run.seals);
        assert_eq!(back.door_trigger, run.door.trigger);
        assert_eq!(back.door_plane, run.door.plane);
        assert_eq!(back.door_cell, run.door.cell);
        assert_eq!(back.door_orientation, run.door.orientation);
        assert_eq!(back.collected, vec![false, true, false]);
        assert!(!back.door_open);
        assert_eq!(back.map_index, run.map_index);
    }

    /// The orientation serializes as the lowercase strings the format
    /// promises.
    #[test]
    fn orientation_uses_lowercase_names() {
        let v = serde_json::to_string(&DoorOrientation::Vertical).unwrap();
        let h = serde_json::to_string(&DoorOrientation::Horizontal).unwrap();
        assert_eq!(v, "\"vertical\"");
        assert_eq!(h, "\"horizontal\"");
    }

    /// Restoring reproduces the run: same grid door cell, same objective
    /// state, same stalker timers, and waypoints cleared for the replan.
    #[test]
    fn restore_rebuilds_the_run() {
        let (pool, tuning, run, player, stalkers) = live_run(5);
        let state = SaveState::capture(&run, &player, &stalkers, 30.0);
        let (run2, player2, stalkers2, clock) =
            state.restore(&pool, &tuning).expect("restore failed");

        assert_eq!(clock, 30.0);
        assert_eq!(run2.map_index, run.map_index);
        assert_eq!(run2.grid.w, run.grid.w);
        assert_eq!(run2.grid.h, run.grid.h);
        assert_eq!(
            run2.grid.cell_at(run.door.cell.0, run.door.cell.1),
            crate::maze::CellKind::Door
        );
        assert_eq!(run2.spawn_point, run.spawn_point);
        assert_eq!(run2.seals, run.seals);
        assert_eq!(run2.collected, run.collected);
        assert_eq!(run2.lives, run.lives);
        assert_eq!((player2.x, player2.y), (player.x, player.y));
        assert_eq!((player2.dirx, player2.diry), (player.dirx, player.diry));
        assert_eq!(stalkers2.len(), stalkers.len());
        for (a, b) in stalkers.iter().zip(&stalkers2) {
            assert_eq!((a.x, a.y), (b.x, b.y));
            assert_eq!(a.active_time, b.active_time);
            assert_eq!(a.next_replan, b.next_replan);
            assert_eq!(a.tunnel_dist_cells, b.tunnel_dist_cells);
            assert_eq!(b.target, None);
        }
    }

    /// A restored run replays exactly: ticking the original and the
    /// restored stalkers against a static player produces identical
    /// trajectories, because the first replan rebuilds the dropped
    /// waypoints from the same field.
    #[test]
    fn restored_pursuit_is_deterministic() {
        let (pool, tuning, run, player, mut live) = live_run(9);
        // Force both copies awake and due for a replan on the first tick.
        for s in &mut live {
            s.active_time = 0.0;
            s.next_replan = 0.0;
        }
        let state = SaveState::capture(&run, &player, &live, 10.0);
        let (run2, player2, mut loaded, _) =
            state.restore(&pool, &tuning).expect("restore failed");

        let mut step = |run: &Run, player: &Player, stalkers: &mut Vec<Stalker>, now: f32| {
            let (px, py) = player.cell();
            let field =
                compute_distance_field(&run.grid, px, py, |x, y| run.grid.is_blocking(x, y));
            for s in stalkers.iter_mut() {
                if s.is_dormant(now) {
                    continue;
                }
                if now >= s.next_replan {
                    s.replan(now, tuning.replan_interval, &field, (player.x, player.y));
                }
                s.advance(&run.grid, 0.016, tuning.move_speed, (player.x, player.y));
            }
        };

        let mut now = 10.0;
        for _ in 0..50 {
            now += 0.016;
            step(&run, &player, &mut live, now);
            step(&run2, &player2, &mut loaded, now);
        }

        for (a, b) in live.iter().zip(&loaded) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
            assert_eq!(a.target, b.target);
            assert_eq!(a.tunnel_dist_cells, b.tunnel_dist_cells);
        }
    }

    /// An empty stalker list comes back as one inert stalker, and a missing
    /// collected list is rebuilt to match the seals.
    #[test]
    fn restore_repairs_degenerate_records() {
        let (pool, tuning, run, player, _) = live_run(11);
        let mut state = SaveState::capture(&run, &player, &[], 0.0);
        state.collected.clear();

        let (run2, _, stalkers, _) = state.restore(&pool, &tuning).expect("restore failed");
        assert_eq!(stalkers.len(), 1);
        assert_eq!(run2.stalker_count, 1);
        assert_eq!(run2.collected, vec![false; run2.seals.len()]);
    }

    /// All seals collected forces the door open even if the flag was lost.
    #[test]
    fn restore_reopens_door_when_all_collected() {
        let (pool, tuning, mut run, player, stalkers) = live_run(13);
        for c in &mut run.collected {
            *c = true;
        }
        run.door_open = false;
        let state = SaveState::capture(&run, &player, &stalkers, 0.0);
        let (run2, _, _, _) = state.restore(&pool, &tuning).expect("restore failed");
        assert!(run2.door_open);
    }
}
